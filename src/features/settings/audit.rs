//! Moderation audit log.
//!
//! Entries go to the guild's configured log channel. Nothing here ever fails
//! the calling action; the outcome is reported so the caller can tell the
//! invoker when the bot could not write to the channel.

use std::sync::Arc;

use log::{debug, warn};

use super::{GuildSettingsUpdate, LogChannelSettings, SettingsStore};
use crate::core::Reply;
use crate::gateway::{ChatGateway, GuildId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditOutcome {
    Sent,
    /// Logging is off for this guild
    Disabled,
    /// The configured channel is gone; logging has been switched off
    ChannelRemoved,
    /// The channel exists but the entry could not be posted
    SendFailed,
}

pub struct AuditLog {
    gateway: Arc<dyn ChatGateway>,
    settings: Arc<dyn SettingsStore>,
}

impl AuditLog {
    pub fn new(gateway: Arc<dyn ChatGateway>, settings: Arc<dyn SettingsStore>) -> Self {
        Self { gateway, settings }
    }

    pub async fn record(&self, guild: GuildId, entry: &Reply) -> AuditOutcome {
        let settings = match self.settings.get_guild_settings(guild).await {
            Ok(settings) => settings,
            Err(e) => {
                warn!("Could not read log channel settings for guild {}: {:#}", guild.0, e);
                return AuditOutcome::Disabled;
            }
        };

        let Some(channel) = settings.log_channel.destination() else {
            return AuditOutcome::Disabled;
        };

        match self.gateway.channel_exists(guild, channel).await {
            Ok(true) => {}
            Ok(false) => {
                debug!("Log channel {} removed from guild {}, disabling logging", channel.0, guild.0);
                let update = GuildSettingsUpdate {
                    log_channel: Some(LogChannelSettings::disabled()),
                    ..Default::default()
                };
                if let Err(e) = self.settings.update_guild_settings(guild, update).await {
                    warn!("Failed to disable logging for guild {}: {:#}", guild.0, e);
                }
                return AuditOutcome::ChannelRemoved;
            }
            Err(e) => {
                warn!("Could not look up log channel {}: {:#}", channel.0, e);
                return AuditOutcome::SendFailed;
            }
        }

        match self.gateway.send_message(channel, entry).await {
            Ok(_) => AuditOutcome::Sent,
            Err(e) => {
                warn!("Failed to write audit entry to channel {}: {:#}", channel.0, e);
                AuditOutcome::SendFailed
            }
        }
    }
}

/// Shown to the invoker when the audit entry could not be written
pub fn log_permission_notice(prefix: &str) -> String {
    format!(
        "I don't have permission to log this in the configured log channel. Please give me permission to write messages there, or use `{}config logChannel` to change it.",
        prefix
    )
}
