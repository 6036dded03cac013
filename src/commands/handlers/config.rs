//! Config command handler
//!
//! Changes per-guild settings: the text command prefix and the moderation
//! log channel.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use log::info;
use std::sync::Arc;

use crate::commands::context::CommandContext;
use crate::commands::definition::{CommandDefinition, CommandOption, OptionKind};
use crate::commands::handler::CommandHandler;
use crate::commands::invocation::InvocationContext;
use crate::features::settings::{GuildSettingsUpdate, LogChannelSettings};
use crate::gateway::{parse_channel_mention, GuildId, Permissions};

/// Longest prefix a guild may configure
pub const MAX_PREFIX_LENGTH: usize = 5;

pub struct ConfigHandler;

impl ConfigHandler {
    async fn set_prefix(
        &self,
        ctx: &CommandContext,
        inv: &InvocationContext,
        guild: GuildId,
        value: Option<&str>,
    ) -> Result<()> {
        let Some(prefix) = value.map(str::trim).filter(|p| !p.is_empty()) else {
            inv.notify("Please provide a new prefix.").await;
            return Ok(());
        };
        if prefix.chars().count() > MAX_PREFIX_LENGTH {
            inv.notify(format!(
                "The prefix can't be longer than {} characters.",
                MAX_PREFIX_LENGTH
            ))
            .await;
            return Ok(());
        }

        ctx.settings
            .update_guild_settings(
                guild,
                GuildSettingsUpdate {
                    prefix: Some(prefix.to_string()),
                    ..Default::default()
                },
            )
            .await?;
        info!("[{}] ⚙️ Prefix for guild {} set to {}", inv.request_id, guild.0, prefix);
        inv.reply(format!("Prefix changed to `{}`.", prefix)).await?;
        Ok(())
    }

    async fn set_log_channel(
        &self,
        ctx: &CommandContext,
        inv: &InvocationContext,
        guild: GuildId,
        value: Option<&str>,
    ) -> Result<()> {
        let value = value.map(str::trim).filter(|v| !v.is_empty());
        let log_channel = match value {
            None => LogChannelSettings::disabled(),
            Some(v) if v.eq_ignore_ascii_case("off") => LogChannelSettings::disabled(),
            Some(v) => match parse_channel_mention(v) {
                Some(channel) if ctx.gateway.channel_exists(guild, channel).await? => {
                    LogChannelSettings::channel(channel)
                }
                _ => {
                    inv.notify("Couldn't find that channel, try again!").await;
                    return Ok(());
                }
            },
        };

        let destination = log_channel.destination();
        ctx.settings
            .update_guild_settings(
                guild,
                GuildSettingsUpdate {
                    log_channel: Some(log_channel),
                    ..Default::default()
                },
            )
            .await?;

        match destination {
            Some(channel) => {
                info!("[{}] ⚙️ Log channel for guild {} set to {}", inv.request_id, guild.0, channel.0);
                inv.reply(format!("Moderation logs will be sent to <#{}>.", channel.0))
                    .await?;
            }
            None => {
                info!("[{}] ⚙️ Logging disabled for guild {}", inv.request_id, guild.0);
                inv.reply("Moderation logging disabled.").await?;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl CommandHandler for ConfigHandler {
    fn definition(&self) -> CommandDefinition {
        CommandDefinition::new("config", "admin", "Change the bot's settings for this server.")
            .usage("config <prefix | logChannel> [value]")
            .example("config prefix ?")
            .example("config logChannel #mod-log")
            .example("config logChannel off")
            .guild_only()
            .member_permissions(Permissions::MANAGE_GUILD)
            .option(
                CommandOption::new("setting", OptionKind::String, "The setting to change")
                    .required()
                    .choice("prefix")
                    .choice("logChannel"),
            )
            .option(CommandOption::new("value", OptionKind::String, "The new value").rest())
    }

    async fn handle(&self, ctx: Arc<CommandContext>, inv: &InvocationContext) -> Result<()> {
        let guild = inv
            .guild_id
            .ok_or_else(|| anyhow!("config invoked outside a guild"))?;
        let setting = inv.args.get_str("setting").unwrap_or_default();
        let value = inv.args.get_str("value");

        if setting.eq_ignore_ascii_case("prefix") {
            self.set_prefix(&ctx, inv, guild, value).await
        } else {
            self.set_log_channel(&ctx, inv, guild, value).await
        }
    }
}
