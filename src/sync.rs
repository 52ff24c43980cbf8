use std::{collections::BTreeMap, fmt::Display};

use anyhow::{Context, Result};
use serenity::{
    http::Http,
    model::prelude::{
        command::{Command, CommandOptionType},
        CommandId, GuildId,
    },
};
use tracing::{debug, info, warn};

use crate::commands::{CommandShape, OptionShape, SlashCommand};

/// Where a command is registered on discord
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Scope {
    Global,
    Guild(u64),
}

impl Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Scope::Global => write!(f, "global"),
            Scope::Guild(id) => write!(f, "guild {id}"),
        }
    }
}

/// A command as it is currently registered on discord
pub trait RemoteCommand: CommandShape {
    fn id(&self) -> CommandId;
}

impl RemoteCommand for Command {
    fn id(&self) -> CommandId {
        self.id
    }
}

/// Group commands by the scopes they are registered in
///
/// A global command lands in `Scope::Global`, a guild command in each of its guilds.
pub fn scopes<'a>(
    commands: impl IntoIterator<Item = &'a SlashCommand>,
) -> BTreeMap<Scope, Vec<&'a SlashCommand>> {
    let mut scopes: BTreeMap<Scope, Vec<&SlashCommand>> = BTreeMap::new();
    for command in commands {
        if command.is_global() {
            scopes.entry(Scope::Global).or_default().push(command);
        }
        for guild_id in command.guild_ids() {
            let local = scopes.entry(Scope::Guild(*guild_id)).or_default();
            // A guild listed twice must not register the command twice
            if !local.iter().any(|&other| std::ptr::eq(other, command)) {
                local.push(command);
            }
        }
    }
    scopes
}

// Deleting unknown commands needs the global ones even when no local command is global
fn scopes_to_sync<'a>(
    commands: impl IntoIterator<Item = &'a SlashCommand>,
    delete_unknown: bool,
) -> BTreeMap<Scope, Vec<&'a SlashCommand>> {
    let mut scopes = scopes(commands);
    if delete_unknown {
        scopes.entry(Scope::Global).or_default();
    }
    scopes
}

/// What needs to be done in one scope to match the local commands
#[derive(Debug)]
pub struct SyncPlan<'a> {
    pub scope: Scope,
    pub create: Vec<&'a SlashCommand>,
    pub edit: Vec<(CommandId, &'a SlashCommand)>,
    pub unchanged: Vec<&'a SlashCommand>,
    pub delete: Vec<(CommandId, String)>,
}

impl SyncPlan<'_> {
    /// Nothing to send to discord
    pub fn is_noop(&self) -> bool {
        self.create.is_empty() && self.edit.is_empty() && self.delete.is_empty()
    }
}

// `compare_with` does not look at option types
fn option_kinds<C: CommandShape>(command: &C) -> Vec<CommandOptionType> {
    command.options().iter().map(OptionShape::kind).collect()
}

/// Compare the local commands of a scope with the ones registered on discord
///
/// Remote commands are matched by name. Remote commands without a local
/// counterpart are only deleted when `delete_unknown` is set.
pub fn plan<'a, R: RemoteCommand>(
    scope: Scope,
    local: &[&'a SlashCommand],
    remote: &[R],
    delete_unknown: bool,
) -> SyncPlan<'a> {
    let mut plan = SyncPlan {
        scope,
        create: vec![],
        edit: vec![],
        unchanged: vec![],
        delete: vec![],
    };

    for &command in local {
        match remote.iter().find(|r| r.name() == command.name()) {
            None => plan.create.push(command),
            Some(r) if command.compare_with(r) => {
                if option_kinds(command) != option_kinds(r) {
                    warn!(
                        "Option types of {scope} command {} changed but the command is not edited",
                        command.name()
                    );
                }
                plan.unchanged.push(command)
            }
            Some(r) => plan.edit.push((r.id(), command)),
        }
    }

    if delete_unknown {
        plan.delete = remote
            .iter()
            .filter(|r| !local.iter().any(|command| command.name() == r.name()))
            .map(|r| (r.id(), r.name().to_string()))
            .collect();
    }

    plan
}

/// Counts of what a sync did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub created: usize,
    pub edited: usize,
    pub unchanged: usize,
    pub deleted: usize,
}

impl SyncReport {
    fn add(&mut self, plan: &SyncPlan<'_>) {
        self.created += plan.create.len();
        self.edited += plan.edit.len();
        self.unchanged += plan.unchanged.len();
        self.deleted += plan.delete.len();
    }
}

impl Display for SyncReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} created, {} edited, {} unchanged, {} deleted",
            self.created, self.edited, self.unchanged, self.deleted
        )
    }
}

async fn fetch(http: &Http, scope: Scope) -> Result<Vec<Command>> {
    match scope {
        Scope::Global => Command::get_global_application_commands(http).await,
        Scope::Guild(id) => GuildId(id).get_application_commands(http).await,
    }
    .context(format!("Failed to fetch {scope} commands"))
}

async fn execute(http: &Http, plan: &SyncPlan<'_>) -> Result<()> {
    let scope = plan.scope;
    for command in &plan.create {
        match scope {
            Scope::Global => {
                Command::create_global_application_command(http, |c| command.register(c)).await
            }
            Scope::Guild(id) => {
                GuildId(id)
                    .create_application_command(http, |c| command.register(c))
                    .await
            }
        }
        .context(format!("Failed to create {scope} command {}", command.name()))?;
        info!("Created {scope} command {}", command.name());
    }

    for (command_id, command) in &plan.edit {
        match scope {
            Scope::Global => {
                Command::edit_global_application_command(http, *command_id, |c| {
                    command.register(c)
                })
                .await
            }
            Scope::Guild(id) => {
                GuildId(id)
                    .edit_application_command(http, *command_id, |c| command.register(c))
                    .await
            }
        }
        .context(format!("Failed to edit {scope} command {}", command.name()))?;
        info!("Edited {scope} command {}", command.name());
    }

    for (command_id, name) in &plan.delete {
        match scope {
            Scope::Global => Command::delete_global_application_command(http, *command_id).await,
            Scope::Guild(id) => {
                GuildId(id)
                    .delete_application_command(http, *command_id)
                    .await
            }
        }
        .context(format!("Failed to delete {scope} command {name}"))?;
        info!("Deleted {scope} command {name}");
    }
    Ok(())
}

/// Make the commands registered on discord match the given ones
///
/// Only the global scope and the guilds the commands are bound to are touched,
/// the global scope is always checked when `delete_unknown` is set.
pub async fn apply<'a>(
    http: &Http,
    commands: impl IntoIterator<Item = &'a SlashCommand>,
    delete_unknown: bool,
) -> Result<SyncReport> {
    let mut report = SyncReport::default();
    for (scope, local) in scopes_to_sync(commands, delete_unknown) {
        let remote = fetch(http, scope).await?;
        let plan = plan(scope, &local, &remote, delete_unknown);
        if plan.is_noop() {
            debug!("{scope} commands are up to date");
        } else {
            execute(http, &plan).await?;
        }
        report.add(&plan);
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use serenity::model::prelude::{command::CommandOptionType, CommandId};

    use crate::commands::{CommandShape, SlashCommand, SlashOption};

    use super::{option_kinds, plan, scopes, scopes_to_sync, RemoteCommand, Scope, SyncReport};

    struct Registered {
        id: u64,
        command: SlashCommand,
    }

    impl CommandShape for Registered {
        type Option = SlashOption;

        fn name(&self) -> &str {
            self.command.name()
        }

        fn description(&self) -> &str {
            self.command.description()
        }

        fn options(&self) -> &[SlashOption] {
            self.command.options()
        }
    }

    impl RemoteCommand for Registered {
        fn id(&self) -> CommandId {
            CommandId(self.id)
        }
    }

    fn registered(id: u64, command: SlashCommand) -> Registered {
        Registered { id, command }
    }

    #[test]
    fn scopes_split_global_and_guilds() {
        let ping = SlashCommand::new("ping", "Ping");
        let roll = SlashCommand::new("roll", "Roll").with_guild_ids([2, 1]);
        let dice = SlashCommand::new("dice", "Dice").with_guild_ids([2]);
        let scopes = scopes([&ping, &roll, &dice]);

        let keys: Vec<Scope> = scopes.keys().copied().collect();
        assert_eq!(keys, vec![Scope::Global, Scope::Guild(1), Scope::Guild(2)]);
        assert_eq!(scopes[&Scope::Global].len(), 1);
        assert_eq!(scopes[&Scope::Guild(1)][0].name(), "roll");
        let guild_2: Vec<&str> = scopes[&Scope::Guild(2)].iter().map(|c| c.name()).collect();
        assert_eq!(guild_2, vec!["roll", "dice"]);
    }

    #[test]
    fn scopes_ignore_repeated_guild_ids() {
        let roll = SlashCommand::new("roll", "Roll").with_guild_ids([7, 7]);
        let scopes = scopes([&roll]);
        assert_eq!(scopes[&Scope::Guild(7)].len(), 1);

        let plan = plan(
            Scope::Guild(7),
            &scopes[&Scope::Guild(7)],
            &[] as &[Registered],
            false,
        );
        assert_eq!(plan.create.len(), 1);
    }

    #[test]
    fn scopes_keep_distinct_commands_with_same_guild() {
        let roll = SlashCommand::new("roll", "Roll").with_guild_ids([7]);
        let dice = SlashCommand::new("dice", "Dice").with_guild_ids([7, 7]);
        let scopes = scopes([&roll, &dice]);
        let names: Vec<&str> = scopes[&Scope::Guild(7)].iter().map(|c| c.name()).collect();
        assert_eq!(names, vec!["roll", "dice"]);
    }

    #[test]
    fn global_scope_checked_when_deleting_unknown() {
        let roll = SlashCommand::new("roll", "Roll").with_guild_ids([7]);

        let scopes = scopes_to_sync([&roll], true);
        let keys: Vec<Scope> = scopes.keys().copied().collect();
        assert_eq!(keys, vec![Scope::Global, Scope::Guild(7)]);
        assert!(scopes[&Scope::Global].is_empty());

        let remote = vec![registered(9, SlashCommand::new("old", "Old"))];
        let plan = plan(Scope::Global, &scopes[&Scope::Global], &remote, true);
        assert_eq!(plan.delete, vec![(CommandId(9), "old".to_string())]);

        let kept = scopes_to_sync([&roll], false);
        assert!(!kept.contains_key(&Scope::Global));
    }

    #[test]
    fn plan_classifies_commands() {
        let ping = SlashCommand::new("ping", "Ping");
        let roll = SlashCommand::new("roll", "Roll a dice");
        let help = SlashCommand::new("help", "Help");
        let remote = vec![
            registered(1, SlashCommand::new("ping", "Ping")),
            registered(2, SlashCommand::new("roll", "Roll")),
            registered(3, SlashCommand::new("old", "Old")),
        ];

        let plan = plan(Scope::Global, &[&ping, &roll, &help], &remote, false);
        assert_eq!(plan.unchanged[0].name(), "ping");
        assert_eq!(plan.edit.len(), 1);
        assert_eq!(plan.edit[0].0, CommandId(2));
        assert_eq!(plan.edit[0].1.name(), "roll");
        assert_eq!(plan.create.len(), 1);
        assert_eq!(plan.create[0].name(), "help");
        assert!(plan.delete.is_empty());
        assert!(!plan.is_noop());
    }

    #[test]
    fn plan_deletes_unknown_when_asked() {
        let ping = SlashCommand::new("ping", "Ping");
        let remote = vec![
            registered(1, SlashCommand::new("ping", "Ping")),
            registered(3, SlashCommand::new("old", "Old")),
        ];

        let plan = plan(Scope::Guild(5), &[&ping], &remote, true);
        assert_eq!(plan.delete, vec![(CommandId(3), "old".to_string())]);
        assert_eq!(plan.scope, Scope::Guild(5));
    }

    #[test]
    fn plan_is_noop_when_up_to_date() {
        let ping = SlashCommand::new("ping", "Ping");
        let remote = vec![registered(1, SlashCommand::new("ping", "Ping"))];
        assert!(plan(Scope::Global, &[&ping], &remote, true).is_noop());
    }

    // Option type changes are invisible to the comparison
    #[test]
    fn plan_skips_option_type_change() {
        let dice = SlashCommand::new("dice", "Dice").with_option(
            SlashOption::new("faces", "Faces").with_kind(CommandOptionType::Integer),
        );
        let remote = vec![registered(
            1,
            SlashCommand::new("dice", "Dice").with_option(SlashOption::new("faces", "Faces")),
        )];
        let plan = plan(Scope::Global, &[&dice], &remote, false);
        assert!(plan.is_noop());
        assert_ne!(option_kinds(&dice), option_kinds(&remote[0]));
    }

    #[test]
    fn report_counts_plans() {
        let ping = SlashCommand::new("ping", "Ping");
        let help = SlashCommand::new("help", "Help");
        let remote = vec![
            registered(1, SlashCommand::new("ping", "Ping")),
            registered(2, SlashCommand::new("old", "Old")),
        ];
        let mut report = SyncReport::default();
        report.add(&plan(Scope::Global, &[&ping, &help], &remote, true));
        report.add(&plan(Scope::Guild(1), &[&help], &[] as &[Registered], true));

        assert_eq!(
            report,
            SyncReport {
                created: 2,
                edited: 0,
                unchanged: 1,
                deleted: 1,
            }
        );
        assert_eq!(
            report.to_string(),
            "2 created, 0 edited, 1 unchanged, 1 deleted"
        );
    }
}
