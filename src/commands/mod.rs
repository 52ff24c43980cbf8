pub mod autocomplete;
pub mod error;
pub mod option;
pub mod shape;
pub mod slash;

pub use autocomplete::{Autocomplete, AutocompleteChoice};
pub use error::BindError;
pub use option::SlashOption;
pub use shape::{CommandShape, OptionShape};
pub use slash::SlashCommand;
