//! Guard pipeline
//!
//! Checks run before a command body, in a fixed order, stopping at the first
//! failure:
//!
//! 1. guild only
//! 2. caller permissions
//! 3. bot permissions
//! 4. owner and premium gates
//! 5. cooldown (written only when every earlier check passed)
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0

use anyhow::Context;
use log::debug;
use thiserror::Error;

use super::cooldown::CooldownTable;
use super::definition::CommandDefinition;
use super::invocation::InvocationContext;
use crate::core::Rejection;
use crate::features::settings::SettingsStore;
use crate::gateway::{ChatGateway, Permissions, UserId};

#[derive(Debug, Error)]
pub enum GuardError {
    #[error(transparent)]
    Rejected(#[from] Rejection),

    /// A collaborator needed to evaluate a guard failed
    #[error("guard lookup failed: {0:#}")]
    Lookup(#[from] anyhow::Error),
}

/// Shared state the guards read
pub struct GuardEnv<'a> {
    pub gateway: &'a dyn ChatGateway,
    pub settings: &'a dyn SettingsStore,
    pub owner_ids: &'a [UserId],
    pub cooldowns: &'a CooldownTable,
}

fn missing(required: Permissions, held: Permissions) -> Permissions {
    if held.administrator() {
        Permissions::empty()
    } else {
        required - held
    }
}

async fn check_permissions(
    required: Permissions,
    user: UserId,
    inv: &InvocationContext,
    gateway: &dyn ChatGateway,
) -> Result<Permissions, anyhow::Error> {
    if required.is_empty() {
        return Ok(Permissions::empty());
    }
    // Capabilities only exist inside a guild
    let Some(guild) = inv.guild_id else {
        return Ok(required);
    };
    let held = gateway
        .permissions_in(guild, inv.channel_id, user)
        .await
        .with_context(|| format!("permission lookup for user {}", user.0))?;
    Ok(missing(required, held))
}

pub async fn run_guards(
    def: &CommandDefinition,
    inv: &InvocationContext,
    env: &GuardEnv<'_>,
) -> Result<(), GuardError> {
    if def.guild_only && inv.guild_id.is_none() {
        return Err(Rejection::GuildOnly.into());
    }

    let lacking = check_permissions(def.member_permissions, inv.author.id, inv, env.gateway).await?;
    if !lacking.is_empty() {
        return Err(Rejection::MissingPermissions(lacking).into());
    }

    let lacking =
        check_permissions(def.bot_permissions, env.gateway.bot_user_id(), inv, env.gateway).await?;
    if !lacking.is_empty() {
        return Err(Rejection::BotMissingPermissions(lacking).into());
    }

    if def.owner_only && !env.owner_ids.contains(&inv.author.id) {
        return Err(Rejection::OwnerOnly.into());
    }

    if def.premium_only {
        let premium = match inv.guild_id {
            Some(guild) => env.settings.get_guild_settings(guild).await?.premium,
            None => false,
        };
        if !premium {
            return Err(Rejection::PremiumOnly.into());
        }
    }

    env.cooldowns
        .try_acquire(&def.name, inv.author.id, def.cooldown)
        .map_err(|remaining| Rejection::Cooldown {
            command: def.name.clone(),
            remaining,
        })?;

    debug!("[{}] Guards passed for {}", inv.request_id, def.name);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::settings::{GuildSettingsUpdate, MemorySettingsStore};
    use crate::gateway::{ChannelId, GuildId};
    use crate::test_support::{text_invocation, MockGateway, BOT_ID};
    use std::sync::Arc;
    use std::time::Duration;

    const GUILD: GuildId = GuildId(1);
    const CHANNEL: ChannelId = ChannelId(10);
    const USER: UserId = UserId(100);

    struct Fixture {
        gateway: Arc<MockGateway>,
        settings: MemorySettingsStore,
        owners: Vec<UserId>,
        cooldowns: CooldownTable,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                gateway: Arc::new(MockGateway::new()),
                settings: MemorySettingsStore::new(),
                owners: vec![UserId(999)],
                cooldowns: CooldownTable::new(),
            }
        }

        fn env(&self) -> GuardEnv<'_> {
            GuardEnv {
                gateway: self.gateway.as_ref(),
                settings: &self.settings,
                owner_ids: &self.owners,
                cooldowns: &self.cooldowns,
            }
        }

        fn invocation(&self, guild: Option<GuildId>) -> InvocationContext {
            text_invocation(self.gateway.clone(), USER, CHANNEL, guild, "cmd")
        }
    }

    async fn rejection(def: &CommandDefinition, fx: &Fixture, guild: Option<GuildId>) -> Rejection {
        match run_guards(def, &fx.invocation(guild), &fx.env()).await {
            Err(GuardError::Rejected(r)) => r,
            other => panic!("expected rejection, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_guild_only_checked_before_permissions() {
        let fx = Fixture::new();
        let def = CommandDefinition::new("kick", "moderation", "Kick")
            .guild_only()
            .member_permissions(Permissions::KICK_MEMBERS)
            .bot_permissions(Permissions::KICK_MEMBERS);

        assert_eq!(rejection(&def, &fx, None).await, Rejection::GuildOnly);
        assert_eq!(fx.gateway.permission_lookups(), 0);
    }

    #[tokio::test]
    async fn test_caller_permission_rejection() {
        let fx = Fixture::new();
        fx.gateway.set_permissions(USER, Permissions::SEND_MESSAGES);
        fx.gateway.set_permissions(BOT_ID, Permissions::KICK_MEMBERS);
        let def = CommandDefinition::new("kick", "moderation", "Kick")
            .member_permissions(Permissions::KICK_MEMBERS)
            .bot_permissions(Permissions::KICK_MEMBERS);

        assert_eq!(
            rejection(&def, &fx, Some(GUILD)).await,
            Rejection::MissingPermissions(Permissions::KICK_MEMBERS)
        );
    }

    #[tokio::test]
    async fn test_bot_permission_rejection_is_distinct() {
        let fx = Fixture::new();
        fx.gateway.set_permissions(USER, Permissions::KICK_MEMBERS);
        let def = CommandDefinition::new("kick", "moderation", "Kick")
            .member_permissions(Permissions::KICK_MEMBERS)
            .bot_permissions(Permissions::KICK_MEMBERS | Permissions::EMBED_LINKS);

        assert_eq!(
            rejection(&def, &fx, Some(GUILD)).await,
            Rejection::BotMissingPermissions(Permissions::KICK_MEMBERS | Permissions::EMBED_LINKS)
        );
    }

    #[tokio::test]
    async fn test_administrator_holds_everything() {
        let fx = Fixture::new();
        fx.gateway.set_permissions(USER, Permissions::ADMINISTRATOR);
        fx.gateway.set_permissions(BOT_ID, Permissions::ADMINISTRATOR);
        let def = CommandDefinition::new("kick", "moderation", "Kick")
            .member_permissions(Permissions::KICK_MEMBERS)
            .bot_permissions(Permissions::KICK_MEMBERS);

        assert!(run_guards(&def, &fx.invocation(Some(GUILD)), &fx.env()).await.is_ok());
    }

    #[tokio::test]
    async fn test_permissions_outside_guild_are_missing() {
        let fx = Fixture::new();
        let def = CommandDefinition::new("purge", "moderation", "Purge")
            .member_permissions(Permissions::MANAGE_MESSAGES);

        assert_eq!(
            rejection(&def, &fx, None).await,
            Rejection::MissingPermissions(Permissions::MANAGE_MESSAGES)
        );
    }

    #[tokio::test]
    async fn test_permission_lookup_failure_is_not_a_rejection() {
        let fx = Fixture::new();
        fx.gateway.fail_permission_lookups();
        let def = CommandDefinition::new("kick", "moderation", "Kick")
            .member_permissions(Permissions::KICK_MEMBERS);

        let result = run_guards(&def, &fx.invocation(Some(GUILD)), &fx.env()).await;
        assert!(matches!(result, Err(GuardError::Lookup(_))));
    }

    #[tokio::test]
    async fn test_owner_and_premium_gates() {
        let fx = Fixture::new();
        let owner_def = CommandDefinition::new("eval", "owner", "Eval").owner_only();
        assert_eq!(rejection(&owner_def, &fx, Some(GUILD)).await, Rejection::OwnerOnly);

        let premium_def = CommandDefinition::new("fancy", "fun", "Fancy").premium_only();
        assert_eq!(rejection(&premium_def, &fx, Some(GUILD)).await, Rejection::PremiumOnly);

        fx.settings
            .update_guild_settings(
                GUILD,
                GuildSettingsUpdate {
                    premium: Some(true),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(run_guards(&premium_def, &fx.invocation(Some(GUILD)), &fx.env()).await.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cooldown_rejects_then_recovers() {
        let fx = Fixture::new();
        let def = CommandDefinition::new("whois", "info", "Who").cooldown(Duration::from_secs(3));
        let inv = fx.invocation(Some(GUILD));

        assert!(run_guards(&def, &inv, &fx.env()).await.is_ok());
        match run_guards(&def, &inv, &fx.env()).await {
            Err(GuardError::Rejected(Rejection::Cooldown { command, .. })) => {
                assert_eq!(command, "whois")
            }
            other => panic!("expected cooldown, got {other:?}"),
        }

        tokio::time::advance(Duration::from_secs(3)).await;
        assert!(run_guards(&def, &inv, &fx.env()).await.is_ok());
        assert!(run_guards(&def, &inv, &fx.env()).await.is_err());
    }

    #[tokio::test]
    async fn test_rejected_invocation_does_not_start_cooldown() {
        let fx = Fixture::new();
        let def = CommandDefinition::new("whois", "info", "Who")
            .guild_only()
            .cooldown(Duration::from_secs(3));

        assert_eq!(rejection(&def, &fx, None).await, Rejection::GuildOnly);
        assert!(fx.cooldowns.is_empty());
    }
}
