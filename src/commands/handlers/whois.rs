//! Whois command handler
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;

use crate::commands::context::CommandContext;
use crate::commands::definition::{CommandDefinition, CommandOption, OptionKind};
use crate::commands::handler::CommandHandler;
use crate::commands::invocation::InvocationContext;
use crate::core::{colors, Embed};
use crate::gateway::{MemberInfo, Permissions};

/// Avatar shown for users without a custom one
const DEFAULT_AVATAR: &str = "https://cdn.discordapp.com/embed/avatars/0.png";

pub struct WhoisHandler;

fn format_date(date: Option<DateTime<Utc>>) -> String {
    date.map(|d| d.format("%m/%d/%Y").to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Profile embed for one member
pub fn member_card(member: &MemberInfo) -> Embed {
    let avatar = member
        .user
        .avatar_url
        .clone()
        .unwrap_or_else(|| DEFAULT_AVATAR.to_string());
    let roles = if member.roles.is_empty() {
        "`none`".to_string()
    } else {
        member.roles.join(", ")
    };
    let color = member.color.filter(|c| *c != 0).unwrap_or(colors::WHITE);

    Embed::new()
        .footer_with_icon(member.display_name.clone(), Some(avatar.clone()))
        .thumbnail(avatar.clone())
        .color(color)
        .description(member.mention())
        .timestamp(Utc::now())
        .field(
            "Member information",
            format!(
                "**\\> Display name:** {}\n**\\> Joined the server:** {}\n**\\> Roles: ** {}",
                member.display_name,
                format_date(member.joined_at),
                roles
            ),
            true,
        )
        .field(
            "User information",
            format!(
                "**\\> ID:** {}\n**\\> Username:** {}\n**\\> Discord Tag:** {}\n**\\>** [Avatar link]({})\n**\\> Created account:** {}",
                member.id().0,
                member.user.name,
                member.user.tag(),
                avatar,
                format_date(Some(member.user.created_at))
            ),
            true,
        )
}

#[async_trait]
impl CommandHandler for WhoisHandler {
    fn definition(&self) -> CommandDefinition {
        CommandDefinition::new(
            "whois",
            "info",
            "Returns user information. If no one is specified, it will return user information about the person who used this command.",
        )
        .alias("userinfo")
        .alias("who")
        .usage("whois [username | id | mention]")
        .guild_only()
        .bot_permissions(Permissions::EMBED_LINKS)
        .cooldown(Duration::from_secs(3))
        .option(CommandOption::new("user", OptionKind::User, "The user to get info about").rest())
    }

    async fn handle(&self, ctx: Arc<CommandContext>, inv: &InvocationContext) -> Result<()> {
        let member = match inv.args.get_member("user") {
            Some(member) => member.clone(),
            None => {
                let guild = inv
                    .guild_id
                    .ok_or_else(|| anyhow!("whois invoked outside a guild"))?;
                ctx.gateway
                    .member(guild, inv.author.id)
                    .await?
                    .ok_or_else(|| anyhow!("invoker {} is not a member of guild {}", inv.author.id.0, guild.0))?
            }
        };

        inv.reply(member_card(&member)).await?;
        Ok(())
    }
}
