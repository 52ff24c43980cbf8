use thiserror::Error;

/// Returned when a command cannot be bound to an extension
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BindError {
    #[error("Command '{command}' has an autocomplete handler for undeclared option '{option}'")]
    UnknownOption { command: String, option: String },
    #[error("Command '{name}' is already registered")]
    DuplicateCommand { name: String },
}
