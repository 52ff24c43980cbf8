use std::sync::Arc;

use anyhow::Result;
use serenity::prelude::{RwLock, TypeMapKey};
use tracing::warn;

use config::Config;
use extensions::ExtensionRegistry;

pub mod commands;
pub mod config;
pub mod extensions;
pub mod sync;

/// Holds the configuration and the loaded extensions at all time
#[derive(Debug, Default)]
pub struct State {
    pub config: Config,
    pub extensions: ExtensionRegistry,
}

impl TypeMapKey for State {
    type Value = Arc<RwLock<Self>>;
}

impl State {
    /// Read the config folder, an absent config file falls back to the defaults
    pub fn from_config_files() -> Result<Self> {
        let config_path = "./config/config.json";
        let config = if std::path::Path::new(config_path).exists() {
            Config::from(config_path)?
        } else {
            warn!("No config file at {config_path}, using defaults");
            Config::default()
        };
        Ok(State {
            config,
            extensions: ExtensionRegistry::default(),
        })
    }
}
