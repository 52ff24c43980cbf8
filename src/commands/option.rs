use serenity::{
    builder::CreateApplicationCommandOption,
    model::prelude::command::{CommandOption, CommandOptionType},
};

use super::shape::OptionShape;

/// Describe one option of a slash command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlashOption {
    name: String,
    description: String,
    kind: CommandOptionType,
    required: bool,
    autocomplete: bool,
}

impl SlashOption {
    /// A required string option without autocomplete
    pub fn new(name: &str, description: &str) -> Self {
        SlashOption {
            name: name.to_string(),
            description: description.to_string(),
            kind: CommandOptionType::String,
            required: true,
            autocomplete: false,
        }
    }

    pub fn with_kind(mut self, kind: CommandOptionType) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    /// Ask Discord to send autocomplete interactions for this option
    pub fn with_autocomplete(mut self, autocomplete: bool) -> Self {
        self.autocomplete = autocomplete;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn kind(&self) -> CommandOptionType {
        self.kind
    }

    pub fn required(&self) -> bool {
        self.required
    }

    pub fn autocomplete(&self) -> bool {
        self.autocomplete
    }

    /// Fill a serenity option builder with this option
    pub fn register<'a>(
        &self,
        option: &'a mut CreateApplicationCommandOption,
    ) -> &'a mut CreateApplicationCommandOption {
        option
            .name(&self.name)
            .description(&self.description)
            .kind(self.kind)
            .required(self.required)
            .set_autocomplete(self.autocomplete)
    }
}

impl OptionShape for SlashOption {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn kind(&self) -> CommandOptionType {
        self.kind
    }
}

impl OptionShape for CommandOption {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn kind(&self) -> CommandOptionType {
        self.kind
    }
}

#[cfg(test)]
mod tests {
    use serenity::model::prelude::command::CommandOptionType;

    use super::SlashOption;

    #[test]
    fn defaults_to_required_string() {
        let option = SlashOption::new("color", "Pick a color");
        assert_eq!(option.name(), "color");
        assert_eq!(option.description(), "Pick a color");
        assert_eq!(option.kind(), CommandOptionType::String);
        assert!(option.required());
        assert!(!option.autocomplete());
    }

    #[test]
    fn builders_override_defaults() {
        let option = SlashOption::new("faces", "Number of faces")
            .with_kind(CommandOptionType::Integer)
            .with_required(false)
            .with_autocomplete(true);
        assert_eq!(option.kind(), CommandOptionType::Integer);
        assert!(!option.required());
        assert!(option.autocomplete());
    }

    #[test]
    fn keeps_name_casing() {
        let option = SlashOption::new("Color", "Pick a color");
        assert_eq!(option.name(), "Color");
    }
}
