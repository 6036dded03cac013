//! # Guild Settings Feature
//!
//! Per-guild settings (prefix, moderation log channel, premium flag) behind a
//! store trait. Guards read the premium flag, the dispatcher reads the prefix,
//! and moderation flows read the log channel.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false

pub mod audit;
pub mod sqlite;

use anyhow::Result;
use async_trait::async_trait;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use crate::gateway::{ChannelId, GuildId};

pub use self::audit::{log_permission_notice, AuditLog, AuditOutcome};
pub use self::sqlite::SqliteSettingsStore;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LogChannelSettings {
    pub enabled: bool,
    #[serde(rename = "channelID")]
    pub channel_id: Option<u64>,
}

impl LogChannelSettings {
    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn channel(channel: ChannelId) -> Self {
        Self {
            enabled: true,
            channel_id: Some(channel.0),
        }
    }

    /// The destination channel, if logging is switched on
    pub fn destination(&self) -> Option<ChannelId> {
        if self.enabled {
            self.channel_id.map(ChannelId)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GuildSettings {
    pub prefix: Option<String>,
    pub log_channel: LogChannelSettings,
    pub premium: bool,
}

impl GuildSettings {
    pub fn prefix_or<'a>(&'a self, default: &'a str) -> &'a str {
        self.prefix
            .as_deref()
            .filter(|p| !p.is_empty())
            .unwrap_or(default)
    }
}

/// Partial update; `None` leaves the field untouched
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GuildSettingsUpdate {
    pub prefix: Option<String>,
    pub log_channel: Option<LogChannelSettings>,
    pub premium: Option<bool>,
}

impl GuildSettingsUpdate {
    pub fn apply(self, settings: &mut GuildSettings) {
        if let Some(prefix) = self.prefix {
            settings.prefix = Some(prefix);
        }
        if let Some(log_channel) = self.log_channel {
            settings.log_channel = log_channel;
        }
        if let Some(premium) = self.premium {
            settings.premium = premium;
        }
    }
}

#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Settings for a guild; defaults when nothing was ever stored
    async fn get_guild_settings(&self, guild: GuildId) -> Result<GuildSettings>;

    /// Merge `update` into the stored settings and return the result
    async fn update_guild_settings(
        &self,
        guild: GuildId,
        update: GuildSettingsUpdate,
    ) -> Result<GuildSettings>;
}

/// Process-local store, for tests and runs without a database
#[derive(Default)]
pub struct MemorySettingsStore {
    guilds: DashMap<GuildId, GuildSettings>,
}

impl MemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SettingsStore for MemorySettingsStore {
    async fn get_guild_settings(&self, guild: GuildId) -> Result<GuildSettings> {
        Ok(self
            .guilds
            .get(&guild)
            .map(|s| s.clone())
            .unwrap_or_default())
    }

    async fn update_guild_settings(
        &self,
        guild: GuildId,
        update: GuildSettingsUpdate,
    ) -> Result<GuildSettings> {
        let mut entry = self.guilds.entry(guild).or_default();
        update.apply(&mut entry);
        Ok(entry.clone())
    }
}
