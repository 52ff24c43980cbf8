use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Corresponds to the customizable config file that can be modified by the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Push the local commands to discord when the bot connects
    pub sync_commands_on_ready: bool,
    /// Delete registered commands that no loaded extension declares
    pub delete_unknown_commands: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            sync_commands_on_ready: true,
            delete_unknown_commands: false,
        }
    }
}

impl Config {
    pub fn from(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path).context(format!("Could not read {path}"))?;
        Self::parse(&content).context(format!("Could not parse {path}"))
    }

    fn parse(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }
}

#[cfg(test)]
mod tests {
    use super::Config;

    #[test]
    fn missing_fields_use_defaults() {
        assert_eq!(Config::parse("{}").unwrap(), Config::default());
    }

    #[test]
    fn parse_all_fields() {
        let config = Config::parse(
            r#"{ "sync_commands_on_ready": false, "delete_unknown_commands": true }"#,
        )
        .unwrap();
        assert!(!config.sync_commands_on_ready);
        assert!(config.delete_unknown_commands);
    }

    #[test]
    fn invalid_json_fails() {
        assert!(Config::parse("sync = true").is_err());
    }

    #[test]
    fn missing_file_fails() {
        let err = Config::from("./does/not/exist.json").unwrap_err();
        assert!(err.to_string().contains("Could not read"));
    }
}
