use std::fmt::Display;

use tracing::info;

use crate::commands::{BindError, SlashCommand};

/// Handle to a loaded extension, stays valid until the extension is unloaded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExtensionId(usize);

impl Display for ExtensionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A named group of commands loaded and unloaded together
#[derive(Debug, Clone)]
pub struct Extension {
    name: String,
    commands: Vec<SlashCommand>,
}

impl Extension {
    pub fn new(name: &str) -> Self {
        Extension {
            name: name.to_string(),
            commands: vec![],
        }
    }

    pub fn with_command(mut self, command: SlashCommand) -> Self {
        self.commands.push(command);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn commands(&self) -> &[SlashCommand] {
        &self.commands
    }
}

// Two commands clash when discord would see both in the same guild or globally
fn same_scope(c1: &SlashCommand, c2: &SlashCommand) -> bool {
    match (c1.is_global(), c2.is_global()) {
        (true, true) => true,
        (false, false) => c1.guild_ids().iter().any(|id| c2.guild_ids().contains(id)),
        _ => false,
    }
}

/// Holds every loaded extension and binds their commands
#[derive(Debug, Default)]
pub struct ExtensionRegistry {
    // Unloaded extensions leave a hole so ids are never reused
    extensions: Vec<Option<Extension>>,
}

impl ExtensionRegistry {
    /// Validate and bind the commands of the extension, then store it
    ///
    /// Nothing is stored if a command fails validation.
    pub fn load(&mut self, mut extension: Extension) -> Result<ExtensionId, BindError> {
        for (idx, command) in extension.commands.iter().enumerate() {
            command.validate()?;
            let clashes = self.commands().chain(&extension.commands[..idx]).any(|other| {
                other.name() == command.name() && same_scope(other, command)
            });
            if clashes {
                return Err(BindError::DuplicateCommand {
                    name: command.name().to_string(),
                });
            }
        }

        let id = ExtensionId(self.extensions.len());
        extension
            .commands
            .iter_mut()
            .for_each(|command| command.bind(Some(id)));
        info!(
            "Loaded extension {} {id} with {} commands",
            extension.name,
            extension.commands.len()
        );
        self.extensions.push(Some(extension));
        Ok(id)
    }

    /// Remove the extension and unbind its commands
    pub fn unload(&mut self, id: ExtensionId) -> Option<Extension> {
        let mut extension = self.extensions.get_mut(id.0)?.take()?;
        extension
            .commands
            .iter_mut()
            .for_each(|command| command.bind(None));
        info!("Unloaded extension {} {id}", extension.name);
        Some(extension)
    }

    pub fn get(&self, id: ExtensionId) -> Option<&Extension> {
        self.extensions.get(id.0)?.as_ref()
    }

    /// Every command of every loaded extension
    pub fn commands(&self) -> impl Iterator<Item = &SlashCommand> {
        self.extensions
            .iter()
            .flatten()
            .flat_map(|extension| extension.commands.iter())
    }

    /// Find the loaded command discord invoked, the name is matched case-insensitively
    ///
    /// Inside a guild a command bound to that guild wins over a global one.
    pub fn find_command(&self, name: &str, guild_id: Option<u64>) -> Option<&SlashCommand> {
        let name = name.to_lowercase();
        let mut named = self.commands().filter(|command| command.name() == name);
        match guild_id {
            Some(id) => {
                let mut global = None;
                for command in named {
                    if command.guild_ids().contains(&id) {
                        return Some(command);
                    }
                    if command.is_global() && global.is_none() {
                        global = Some(command);
                    }
                }
                global
            }
            None => named.find(|command| command.is_global()),
        }
    }
}
