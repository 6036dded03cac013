//! Environment-backed bot configuration
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 1.1.0: Per-command overrides loaded from YAML
//! - 1.0.0: Initial environment loader

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use serenity::model::id::UserId;
use std::collections::HashMap;
use std::path::Path;

pub const DEFAULT_PREFIX: &str = "!";

#[derive(Debug, Clone)]
pub struct Config {
    pub discord_token: String,
    pub discord_guild_id: Option<String>,
    pub command_prefix: String,
    pub owner_ids: Vec<UserId>,
    pub database_path: String,
    pub guessing_service_url: Option<String>,
    pub guessing_region: String,
    pub commands_config_path: String,
    pub log_level: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let discord_token = std::env::var("DISCORD_TOKEN")
            .map_err(|_| anyhow!("DISCORD_TOKEN must be set"))?;

        let owner_ids = match std::env::var("BOT_OWNER_IDS") {
            Ok(raw) => parse_owner_ids(&raw)?,
            Err(_) => Vec::new(),
        };

        Ok(Config {
            discord_token,
            discord_guild_id: std::env::var("DISCORD_GUILD_ID").ok().filter(|s| !s.is_empty()),
            command_prefix: std::env::var("COMMAND_PREFIX")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_PREFIX.to_string()),
            owner_ids,
            database_path: std::env::var("DATABASE_PATH")
                .unwrap_or_else(|_| "steward.db".to_string()),
            guessing_service_url: std::env::var("GUESSING_SERVICE_URL")
                .ok()
                .filter(|s| !s.is_empty()),
            guessing_region: std::env::var("GUESSING_REGION").unwrap_or_else(|_| "en".to_string()),
            commands_config_path: std::env::var("COMMANDS_CONFIG_PATH")
                .unwrap_or_else(|_| "commands.yaml".to_string()),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

/// Parse a comma separated list of user ids, ignoring blanks
pub fn parse_owner_ids(raw: &str) -> Result<Vec<UserId>> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<u64>()
                .map(UserId)
                .with_context(|| format!("Invalid owner id in BOT_OWNER_IDS: {s}"))
        })
        .collect()
}

/// Operator overrides for individual commands, keyed by command name
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CommandOverrides {
    #[serde(default)]
    pub commands: HashMap<String, CommandOverride>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CommandOverride {
    pub enabled: Option<bool>,
    pub cooldown_secs: Option<u64>,
}

impl CommandOverrides {
    /// Load overrides from a YAML file
    pub fn load(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    /// Load overrides if the file exists, otherwise return an empty set
    pub fn load_optional(path: &str) -> Result<Self> {
        if Path::new(path).exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let overrides: CommandOverrides = serde_yaml::from_str(yaml)?;
        Ok(overrides)
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}
