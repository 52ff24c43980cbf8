use serenity::model::prelude::command::{Command, CommandOption, CommandOptionType};

/// The parts of an option Discord compares when deciding if a command changed
pub trait OptionShape {
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    fn kind(&self) -> CommandOptionType;
}

/// The parts of a command Discord compares when deciding if a command changed
pub trait CommandShape {
    type Option: OptionShape;

    fn name(&self) -> &str;
    fn description(&self) -> &str;
    fn options(&self) -> &[Self::Option];
}

impl CommandShape for Command {
    type Option = CommandOption;

    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn options(&self) -> &[CommandOption] {
        &self.options
    }
}
