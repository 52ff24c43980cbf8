use std::{collections::HashMap, fmt, sync::Arc};

use anyhow::Result;
use async_trait::async_trait;
use serde_json::{json, Value};
use serenity::model::prelude::interaction::{
    application_command::CommandDataOption, autocomplete::AutocompleteInteraction,
};

/// A suggestion returned to Discord while the user is typing
#[derive(Debug, Clone, PartialEq)]
pub enum AutocompleteChoice {
    /// Shown to the user as-is and sent back as the value
    Value(String),
    /// A label shown to the user and the value sent back
    Named { name: String, value: Value },
}

impl AutocompleteChoice {
    pub fn named(name: &str, value: impl Into<Value>) -> Self {
        AutocompleteChoice::Named {
            name: name.to_string(),
            value: value.into(),
        }
    }

    /// The `{ name, value }` object Discord expects in an autocomplete response
    pub fn to_json(&self) -> Value {
        match self {
            AutocompleteChoice::Value(v) => json!({ "name": v, "value": v }),
            AutocompleteChoice::Named { name, value } => json!({ "name": name, "value": value }),
        }
    }
}

impl From<&str> for AutocompleteChoice {
    fn from(value: &str) -> Self {
        AutocompleteChoice::Value(value.to_string())
    }
}

impl From<String> for AutocompleteChoice {
    fn from(value: String) -> Self {
        AutocompleteChoice::Value(value)
    }
}

/// Produce suggestions for one option of a slash command
#[async_trait]
pub trait Autocomplete: Send + Sync {
    async fn complete(
        &self,
        interaction: &AutocompleteInteraction,
        option: &CommandDataOption,
    ) -> Result<Vec<AutocompleteChoice>>;
}

/// Autocomplete handlers of a command, keyed by option name
#[derive(Clone, Default)]
pub struct Autocompletes {
    handlers: HashMap<String, Arc<dyn Autocomplete>>,
}

impl Autocompletes {
    /// Register a handler, replacing any previous one for the same option
    pub fn insert(&mut self, option_name: &str, handler: Arc<dyn Autocomplete>) {
        self.handlers.insert(option_name.to_string(), handler);
    }

    pub fn get(&self, option_name: &str) -> Option<Arc<dyn Autocomplete>> {
        self.handlers.get(option_name).cloned()
    }

    pub fn contains(&self, option_name: &str) -> bool {
        self.handlers.contains_key(option_name)
    }

    /// Names of the options that have a handler, sorted
    pub fn option_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl fmt::Debug for Autocompletes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.option_names()).finish()
    }
}
