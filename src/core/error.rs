//! Error taxonomy shared by the command framework
//!
//! Collaborator failures travel as `anyhow::Error`; the enums here are the
//! conditions callers branch on.

use serenity::model::permissions::Permissions;
use std::time::Duration;
use thiserror::Error;

/// A guard refused to run a command. This is an expected outcome, not a fault.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("This command can only be used in a server.")]
    GuildOnly,

    #[error("Nice try, you don't have permission to use this command. Missing: {}", permission_list(.0))]
    MissingPermissions(Permissions),

    #[error("I don't have permission to do that! I need: {}", permission_list(.0))]
    BotMissingPermissions(Permissions),

    #[error("This command can only be used by the bot owner.")]
    OwnerOnly,

    #[error("This command is only available on premium servers.")]
    PremiumOnly,

    #[error("Please wait {:.1} more second(s) before reusing the `{command}` command.", seconds(.remaining))]
    Cooldown { command: String, remaining: Duration },
}

impl Rejection {
    /// Stable machine-readable reason code
    pub fn code(&self) -> &'static str {
        match self {
            Rejection::GuildOnly => "guild_only",
            Rejection::MissingPermissions(_) => "missing_permissions",
            Rejection::BotMissingPermissions(_) => "bot_missing_permissions",
            Rejection::OwnerOnly => "owner_only",
            Rejection::PremiumOnly => "premium_only",
            Rejection::Cooldown { .. } => "cooldown",
        }
    }
}

/// Human readable permission names, e.g. "Kick Members, Embed Links"
pub fn permission_list(permissions: &Permissions) -> String {
    permissions.get_permission_names().join(", ")
}

fn seconds(duration: &Duration) -> f32 {
    duration.as_secs_f32()
}

/// Arguments could not be turned into the values a command body expects
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArgumentError {
    #[error("{message}")]
    Missing { name: String, message: String },

    #[error("{message}")]
    Invalid { name: String, message: String },

    #[error("Couldn't find that member, try again!")]
    TargetNotFound { name: String },
}

impl ArgumentError {
    pub fn name(&self) -> &str {
        match self {
            ArgumentError::Missing { name, .. }
            | ArgumentError::Invalid { name, .. }
            | ArgumentError::TargetNotFound { name } => name,
        }
    }
}

/// The remote guessing game could not serve a request
#[derive(Debug, Error)]
pub enum GameError {
    #[error("guessing service unavailable: {0}")]
    Unavailable(#[source] anyhow::Error),
}

impl From<anyhow::Error> for GameError {
    fn from(err: anyhow::Error) -> Self {
        GameError::Unavailable(err)
    }
}

impl From<reqwest::Error> for GameError {
    fn from(err: reqwest::Error) -> Self {
        GameError::Unavailable(err.into())
    }
}
