//! Shared context for command handlers
//!
//! - **Version**: 2.0.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 2.0.0: Gateway, response waiter, settings and guessing collaborators
//! - 1.0.0: Initial implementation with core shared state

use std::sync::Arc;
use std::time::Instant;

use super::registry::CommandRegistry;
use crate::features::guessing::GuessingService;
use crate::features::interactive::ResponseWaiter;
use crate::features::settings::{AuditLog, SettingsStore};
use crate::gateway::{ChatGateway, GuildId, UserId};

/// Shared context for all command handlers
///
/// Contains the collaborators most handlers need:
/// - ChatGateway for talking to the platform
/// - ResponseWaiter for multi-turn flows
/// - SettingsStore and AuditLog for guild settings and moderation logs
/// - An optional GuessingService
/// - The registry, for help listings
/// - Bot start time for uptime tracking
#[derive(Clone)]
pub struct CommandContext {
    pub gateway: Arc<dyn ChatGateway>,
    pub waiter: Arc<ResponseWaiter>,
    pub settings: Arc<dyn SettingsStore>,
    pub audit: Arc<AuditLog>,
    pub guessing: Option<Arc<dyn GuessingService>>,
    pub registry: Arc<CommandRegistry>,
    pub owner_ids: Vec<UserId>,
    pub default_prefix: String,
    pub start_time: Instant,
}

impl CommandContext {
    pub fn new(
        gateway: Arc<dyn ChatGateway>,
        settings: Arc<dyn SettingsStore>,
        registry: Arc<CommandRegistry>,
        default_prefix: impl Into<String>,
    ) -> Self {
        Self {
            audit: Arc::new(AuditLog::new(gateway.clone(), settings.clone())),
            gateway,
            waiter: Arc::new(ResponseWaiter::new()),
            settings,
            guessing: None,
            registry,
            owner_ids: Vec::new(),
            default_prefix: default_prefix.into(),
            start_time: Instant::now(),
        }
    }

    pub fn with_guessing(mut self, service: Arc<dyn GuessingService>) -> Self {
        self.guessing = Some(service);
        self
    }

    pub fn with_owners(mut self, owner_ids: Vec<UserId>) -> Self {
        self.owner_ids = owner_ids;
        self
    }

    /// The prefix configured for a guild, or the default outside guilds
    /// and when settings cannot be read
    pub async fn prefix_for(&self, guild: Option<GuildId>) -> String {
        let Some(guild) = guild else {
            return self.default_prefix.clone();
        };
        match self.settings.get_guild_settings(guild).await {
            Ok(settings) => settings.prefix_or(&self.default_prefix).to_string(),
            Err(e) => {
                log::warn!("Failed to load settings for guild {}: {:#}", guild.0, e);
                self.default_prefix.clone()
            }
        }
    }

    pub fn uptime(&self) -> std::time::Duration {
        self.start_time.elapsed()
    }
}
