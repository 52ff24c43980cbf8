use std::sync::Arc;

use anyhow::{Context, Result};
use serenity::{
    builder::{CreateApplicationCommand, CreateApplicationCommandOption},
    model::prelude::{command::CommandType, interaction::autocomplete::AutocompleteInteraction},
};
use tracing::{debug, warn};

use crate::extensions::ExtensionId;

use super::{
    autocomplete::{Autocomplete, AutocompleteChoice, Autocompletes},
    error::BindError,
    option::SlashOption,
    shape::{CommandShape, OptionShape},
};

/// A discord slash command
///
/// The name is stored lower-cased. A command without guild ids is global,
/// otherwise it is only registered in the listed guilds.
#[derive(Debug, Clone)]
pub struct SlashCommand {
    name: String,
    description: String,
    guild_ids: Vec<u64>,
    options: Vec<SlashOption>,
    extension: Option<ExtensionId>,
    autocompletes: Autocompletes,
}

impl SlashCommand {
    pub fn new(name: &str, description: &str) -> Self {
        SlashCommand {
            name: name.to_lowercase(),
            description: description.to_string(),
            guild_ids: vec![],
            options: vec![],
            extension: None,
            autocompletes: Autocompletes::default(),
        }
    }

    /// Bind the command to these guilds instead of registering it globally
    pub fn with_guild_ids(mut self, guild_ids: impl IntoIterator<Item = u64>) -> Self {
        self.guild_ids = guild_ids.into_iter().collect();
        self
    }

    /// Replace the options of the command, order is kept
    pub fn with_options(mut self, options: impl IntoIterator<Item = SlashOption>) -> Self {
        self.options = options.into_iter().collect();
        self
    }

    pub fn with_option(mut self, option: SlashOption) -> Self {
        self.options.push(option);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn guild_ids(&self) -> &[u64] {
        &self.guild_ids
    }

    pub fn options(&self) -> &[SlashOption] {
        &self.options
    }

    /// Extension this command is bound to, if it was loaded
    pub fn extension(&self) -> Option<ExtensionId> {
        self.extension
    }

    pub fn is_global(&self) -> bool {
        self.guild_ids.is_empty()
    }

    /// Add autocomplete for a command option
    ///
    /// The handler is checked against the declared options when the command
    /// gets loaded in an extension.
    pub fn autocomplete(&mut self, option_name: &str, handler: impl Autocomplete + 'static) {
        self.autocompletes.insert(option_name, Arc::new(handler));
    }

    pub fn autocomplete_handler(&self, option_name: &str) -> Option<Arc<dyn Autocomplete>> {
        self.autocompletes.get(option_name)
    }

    /// Run the handler of the focused option of an autocomplete interaction
    ///
    /// Returns `None` when nothing is focused or the option has no handler.
    pub async fn complete(
        &self,
        interaction: &AutocompleteInteraction,
    ) -> Result<Option<Vec<AutocompleteChoice>>> {
        let Some(focused) = interaction.data.options.iter().find(|o| o.focused) else {
            debug!("No focused option in autocomplete for {}", self.name);
            return Ok(None);
        };
        let Some(handler) = self.autocomplete_handler(&focused.name) else {
            warn!(
                "No autocomplete handler for option {} of command {}",
                focused.name, self.name
            );
            return Ok(None);
        };
        let choices = handler
            .complete(interaction, focused)
            .await
            .context(format!(
                "Autocomplete for option {} of command {} failed",
                focused.name, self.name
            ))?;
        Ok(Some(choices))
    }

    /// Is this command the same as the one registered on discord?
    ///
    /// Options are compared by position, not by name.
    pub fn compare_with<C: CommandShape>(&self, command: &C) -> bool {
        self.name == command.name()
            && self.description == command.description()
            && self.options.len() == command.options().len()
            && self
                .options
                .iter()
                .zip(command.options())
                .all(|(option, option_c)| {
                    // TODO: compare against `option_c.kind()` once it's confirmed a type change
                    // alone should trigger an edit, until then only name and description count
                    (option.name(), option.description(), option.kind())
                        == (option_c.name(), option_c.description(), option.kind())
                })
    }

    /// Fill a serenity command builder with this command
    pub fn register<'a>(
        &self,
        command: &'a mut CreateApplicationCommand,
    ) -> &'a mut CreateApplicationCommand {
        command
            .name(&self.name)
            .description(&self.description)
            .kind(CommandType::ChatInput);
        for option in &self.options {
            let mut o = CreateApplicationCommandOption::default();
            option.register(&mut o);
            command.add_option(o);
        }
        command
    }

    /// Check the autocomplete handlers against the declared options
    pub(crate) fn validate(&self) -> Result<(), BindError> {
        for option_name in self.autocompletes.option_names() {
            match self.options.iter().find(|o| o.name() == option_name) {
                None => {
                    return Err(BindError::UnknownOption {
                        command: self.name.to_string(),
                        option: option_name.to_string(),
                    })
                }
                Some(o) if !o.autocomplete() => warn!(
                    "Option {option_name} of command {} has a handler but autocomplete is disabled",
                    self.name
                ),
                Some(_) => (),
            }
        }
        self.options
            .iter()
            .filter(|o| o.autocomplete() && !self.autocompletes.contains(o.name()))
            .for_each(|o| {
                warn!(
                    "Option {} of command {} expects autocomplete but has no handler",
                    o.name(),
                    self.name
                )
            });
        Ok(())
    }

    pub(crate) fn bind(&mut self, extension: Option<ExtensionId>) {
        self.extension = extension;
    }
}

impl CommandShape for SlashCommand {
    type Option = SlashOption;

    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn options(&self) -> &[SlashOption] {
        &self.options
    }
}
