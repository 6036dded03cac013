//! Kick command handler
//!
//! Kicks a member after the invoker confirms with a reaction. The kick is
//! recorded in the guild's moderation log when one is configured.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::Utc;
use log::info;
use std::sync::Arc;

use crate::commands::context::CommandContext;
use crate::commands::definition::{CommandDefinition, CommandOption, OptionKind};
use crate::commands::handler::CommandHandler;
use crate::commands::invocation::InvocationContext;
use crate::core::{colors, Embed};
use crate::features::interactive::ConfirmFlow;
use crate::gateway::{MemberInfo, Permissions};

pub struct KickHandler;

fn audit_entry(target: &MemberInfo, inv: &InvocationContext, reason: &str) -> Embed {
    let mut entry = Embed::new()
        .color(colors::RED)
        .footer_with_icon(inv.author_name.clone(), inv.author.avatar_url.clone())
        .timestamp(Utc::now())
        .description(format!(
            "**\\> Kicked member:** {} ({})\n**\\> Kicked by:** {}\n**\\> Reason:** {}",
            target.mention(),
            target.id().0,
            inv.author.mention(),
            reason
        ));
    if let Some(avatar) = &target.user.avatar_url {
        entry = entry.thumbnail(avatar.clone());
    }
    entry
}

fn confirm_prompt(target: &MemberInfo) -> Embed {
    Embed::new()
        .color(colors::GREEN)
        .author("This verification becomes invalid after 30s")
        .description(format!("Do you want to kick {}?", target.mention()))
}

#[async_trait]
impl CommandHandler for KickHandler {
    fn definition(&self) -> CommandDefinition {
        CommandDefinition::new("kick", "moderation", "Kicks the member.")
            .usage("kick <mention | id> <reason>")
            .example("kick @someone spamming")
            .guild_only()
            .member_permissions(Permissions::KICK_MEMBERS)
            .bot_permissions(Permissions::KICK_MEMBERS)
            .option(
                CommandOption::new("user", OptionKind::User, "The member to kick")
                    .required()
                    .missing_message("Please provide a user to kick."),
            )
            .option(
                CommandOption::new("reason", OptionKind::String, "Why they are being kicked")
                    .required()
                    .rest()
                    .missing_message("Please provide a reason to kick."),
            )
    }

    async fn handle(&self, ctx: Arc<CommandContext>, inv: &InvocationContext) -> Result<()> {
        let guild = inv
            .guild_id
            .ok_or_else(|| anyhow!("kick invoked outside a guild"))?;
        let target = inv
            .args
            .get_member("user")
            .ok_or_else(|| anyhow!("kick target was not resolved"))?
            .clone();
        let reason = inv.args.get_str("reason").unwrap_or_default().to_string();

        if target.id() == inv.author.id {
            inv.notify("Don't kick yourself...It'll be alright.").await;
            inv.delete_trigger().await;
            return Ok(());
        }
        if target.user.bot {
            inv.notify("Don't try to kick bots...").await;
            inv.delete_trigger().await;
            return Ok(());
        }
        if !ctx.gateway.can_moderate(guild, target.id()).await? {
            inv.notify("They can't be kicked by the likes of you.").await;
            inv.delete_trigger().await;
            return Ok(());
        }

        let gateway = ctx.gateway.clone();
        let outcome = ConfirmFlow::new(
            confirm_prompt(&target).into(),
            "Kick cancelled...",
            "Kick cancelled due to inactivity.",
        )
        .audit(&ctx.audit, guild, audit_entry(&target, inv, &reason).into())
        .run(inv, &ctx.waiter, || async {
            gateway.kick_member(guild, target.id(), &reason).await?;
            info!(
                "[{}] 👢 Kicked {} from guild {} ({})",
                inv.request_id,
                target.user.tag(),
                guild.0,
                reason
            );
            Ok(())
        })
        .await?;

        info!("[{}] Kick prompt finished: {:?}", inv.request_id, outcome);
        Ok(())
    }
}
