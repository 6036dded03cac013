//! Serenity-backed gateway and event conversion
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 1.1.0: Guild-level permissions come from the member; uncached guilds are an error
//! - 1.0.0: Initial implementation over serenity's HTTP client and cache

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::debug;
use serenity::builder::CreateEmbed;
use serenity::cache::Cache;
use serenity::http::Http;
use serenity::model::application::interaction::application_command::{
    ApplicationCommandInteraction, CommandDataOptionValue,
};
use serenity::model::application::interaction::InteractionResponseType;
use serenity::model::channel::{Channel, Message, Reaction, ReactionType};
use serenity::model::guild::Member;
use serenity::model::user::User;
use serenity::model::Timestamp;
use std::sync::Arc;

use super::events::{IncomingInteraction, IncomingMessage, IncomingReaction, OptionValue};
use super::mention::parse_user_mention;
use super::{
    ChannelId, ChatGateway, GuildId, InteractionResponder, MemberInfo, MessageHandle,
    Permissions, UserId, UserInfo,
};
use crate::core::{Embed, Reply};

/// Convert our embed model into serenity's builder
pub fn to_create_embed(embed: &Embed) -> CreateEmbed {
    let mut e = CreateEmbed::default();
    if let Some(title) = &embed.title {
        e.title(title);
    }
    if let Some(description) = &embed.description {
        e.description(description);
    }
    if let Some(author) = &embed.author {
        e.author(|a| a.name(author));
    }
    if let Some(color) = embed.color {
        e.color(color);
    }
    if let Some(footer) = &embed.footer {
        e.footer(|f| {
            f.text(&footer.text);
            if let Some(url) = &footer.icon_url {
                f.icon_url(url);
            }
            f
        });
    }
    if let Some(url) = &embed.thumbnail {
        e.thumbnail(url);
    }
    for field in &embed.fields {
        e.field(&field.name, &field.value, field.inline);
    }
    if let Some(at) = embed.timestamp {
        if let Ok(ts) = Timestamp::from_unix_timestamp(at.timestamp()) {
            e.timestamp(ts);
        }
    }
    e
}

fn to_chrono(ts: Timestamp) -> DateTime<Utc> {
    DateTime::from_timestamp(ts.unix_timestamp(), 0).unwrap_or_else(Utc::now)
}

fn handle_of(message: &Message) -> MessageHandle {
    MessageHandle {
        channel_id: message.channel_id,
        message_id: message.id,
    }
}

pub fn user_info(user: &User) -> UserInfo {
    UserInfo {
        id: user.id,
        name: user.name.clone(),
        discriminator: user.discriminator,
        bot: user.bot,
        avatar_url: Some(user.face()),
        created_at: to_chrono(user.created_at()),
    }
}

pub struct SerenityGateway {
    http: Arc<Http>,
    cache: Arc<Cache>,
    bot_user_id: UserId,
}

impl SerenityGateway {
    pub fn new(http: Arc<Http>, cache: Arc<Cache>, bot_user_id: UserId) -> Self {
        Self {
            http,
            cache,
            bot_user_id,
        }
    }

    fn member_info(&self, member: &Member) -> MemberInfo {
        let roles = self
            .cache
            .guild(member.guild_id)
            .map(|guild| {
                let mut roles: Vec<_> = member
                    .roles
                    .iter()
                    .filter_map(|id| guild.roles.get(id))
                    .collect();
                roles.sort_by(|a, b| b.position.cmp(&a.position));
                roles.iter().map(|r| r.name.clone()).collect()
            })
            .unwrap_or_default();

        MemberInfo {
            user: user_info(&member.user),
            guild_id: member.guild_id,
            display_name: member
                .nick
                .clone()
                .unwrap_or_else(|| member.user.name.clone()),
            joined_at: member.joined_at.map(to_chrono),
            roles,
            color: member.colour(&self.cache).map(|c| c.0),
        }
    }

    /// Convert a slash command interaction, resolving user options to members
    pub async fn incoming_interaction(
        &self,
        command: ApplicationCommandInteraction,
    ) -> IncomingInteraction {
        let mut options = Vec::with_capacity(command.data.options.len());
        for option in &command.data.options {
            let value = match &option.resolved {
                Some(CommandDataOptionValue::String(s)) => OptionValue::String(s.clone()),
                Some(CommandDataOptionValue::Integer(i)) => OptionValue::Integer(*i),
                Some(CommandDataOptionValue::Boolean(b)) => OptionValue::Boolean(*b),
                Some(CommandDataOptionValue::User(user, _)) => {
                    let member = match command.guild_id {
                        Some(guild_id) => self.member(guild_id, user.id).await.ok().flatten(),
                        None => None,
                    };
                    OptionValue::User {
                        id: user.id,
                        member,
                    }
                }
                Some(CommandDataOptionValue::Channel(channel)) => OptionValue::Channel(channel.id),
                _ => {
                    debug!("Skipping unsupported option '{}'", option.name);
                    continue;
                }
            };
            options.push((option.name.clone(), value));
        }

        IncomingInteraction {
            id: command.id.0,
            command_name: command.data.name.clone(),
            guild_id: command.guild_id,
            channel_id: command.channel_id,
            user: user_info(&command.user),
            user_nick: command.member.as_ref().and_then(|m| m.nick.clone()),
            options,
            responder: Arc::new(SerenityResponder {
                http: Arc::clone(&self.http),
                command,
            }),
        }
    }
}

pub fn incoming_message(msg: &Message) -> IncomingMessage {
    IncomingMessage {
        id: msg.id,
        channel_id: msg.channel_id,
        guild_id: msg.guild_id,
        author: user_info(&msg.author),
        author_nick: msg.member.as_ref().and_then(|m| m.nick.clone()),
        content: msg.content.clone(),
    }
}

pub fn incoming_reaction(reaction: &Reaction) -> Option<IncomingReaction> {
    let emoji = match &reaction.emoji {
        ReactionType::Unicode(s) => s.clone(),
        ReactionType::Custom { name, .. } => name.clone()?,
        _ => return None,
    };
    Some(IncomingReaction {
        message_id: reaction.message_id,
        channel_id: reaction.channel_id,
        guild_id: reaction.guild_id,
        user_id: reaction.user_id?,
        emoji,
    })
}

#[async_trait]
impl ChatGateway for SerenityGateway {
    fn bot_user_id(&self) -> UserId {
        self.bot_user_id
    }

    async fn send_message(&self, channel: ChannelId, reply: &Reply) -> Result<MessageHandle> {
        let embed = reply.embed.as_ref().map(to_create_embed);
        let message = channel
            .send_message(&self.http, |m| {
                if let Some(content) = &reply.content {
                    m.content(content);
                }
                if let Some(embed) = embed {
                    m.embed(|e| {
                        *e = embed;
                        e
                    });
                }
                m
            })
            .await?;
        Ok(handle_of(&message))
    }

    async fn edit_message(&self, message: MessageHandle, reply: &Reply) -> Result<()> {
        let embed = reply.embed.as_ref().map(to_create_embed);
        message
            .channel_id
            .edit_message(&self.http, message.message_id, |m| {
                if let Some(content) = &reply.content {
                    m.content(content);
                }
                if let Some(embed) = embed {
                    m.embed(|e| {
                        *e = embed;
                        e
                    });
                }
                m
            })
            .await?;
        Ok(())
    }

    async fn delete_message(&self, message: MessageHandle) -> Result<()> {
        message
            .channel_id
            .delete_message(&self.http, message.message_id)
            .await?;
        Ok(())
    }

    async fn add_reaction(&self, message: MessageHandle, emoji: &str) -> Result<()> {
        message
            .channel_id
            .create_reaction(
                &self.http,
                message.message_id,
                ReactionType::Unicode(emoji.to_string()),
            )
            .await?;
        Ok(())
    }

    async fn permissions_in(
        &self,
        guild_id: GuildId,
        channel: ChannelId,
        user: UserId,
    ) -> Result<Permissions> {
        let guild = self
            .cache
            .guild(guild_id)
            .ok_or_else(|| anyhow!("Guild {guild_id} is not cached"))?;
        let member = guild_id
            .member((&self.cache, self.http.as_ref()), user)
            .await?;

        match guild.channels.get(&channel) {
            Some(Channel::Guild(gc)) => Ok(gc.permissions_for_user(&self.cache, user)?),
            _ => Ok(member.permissions(&self.cache)?),
        }
    }

    async fn member(&self, guild: GuildId, user: UserId) -> Result<Option<MemberInfo>> {
        match guild.member((&self.cache, self.http.as_ref()), user).await {
            Ok(member) => Ok(Some(self.member_info(&member))),
            Err(serenity::Error::Http(_)) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn find_member(&self, guild: GuildId, query: &str) -> Result<Option<MemberInfo>> {
        if let Some(id) = parse_user_mention(query) {
            return self.member(guild, id).await;
        }

        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Ok(None);
        }

        let found = self.cache.guild(guild).and_then(|g| {
            g.members
                .values()
                .find(|m| {
                    m.user.name.to_lowercase() == needle
                        || m.user.tag().to_lowercase() == needle
                        || m.nick.as_deref().map(str::to_lowercase).as_deref() == Some(needle.as_str())
                })
                .cloned()
        });
        Ok(found.map(|m| self.member_info(&m)))
    }

    async fn channel_exists(&self, guild: GuildId, channel: ChannelId) -> Result<bool> {
        let guild = self
            .cache
            .guild(guild)
            .ok_or_else(|| anyhow!("Guild {guild} is not cached"))?;
        Ok(guild.channels.contains_key(&channel))
    }

    async fn can_moderate(&self, guild_id: GuildId, target: UserId) -> Result<bool> {
        let guild = self
            .cache
            .guild(guild_id)
            .ok_or_else(|| anyhow!("Guild {guild_id} is not cached"))?;
        if guild.owner_id == target {
            return Ok(false);
        }

        let top_position = |user: UserId| {
            guild
                .members
                .get(&user)
                .and_then(|m| {
                    m.roles
                        .iter()
                        .filter_map(|r| guild.roles.get(r))
                        .map(|r| r.position)
                        .max()
                })
                .unwrap_or_default()
        };

        Ok(top_position(self.bot_user_id) > top_position(target))
    }

    async fn kick_member(&self, guild: GuildId, user: UserId, reason: &str) -> Result<()> {
        guild.kick_with_reason(&self.http, user, reason).await?;
        Ok(())
    }
}

/// Answers one slash command through the interaction webhook
pub struct SerenityResponder {
    http: Arc<Http>,
    command: ApplicationCommandInteraction,
}

#[async_trait]
impl InteractionResponder for SerenityResponder {
    async fn respond(&self, reply: &Reply) -> Result<MessageHandle> {
        let embed = reply.embed.as_ref().map(to_create_embed);
        self.command
            .create_interaction_response(&self.http, |response| {
                response
                    .kind(InteractionResponseType::ChannelMessageWithSource)
                    .interaction_response_data(|data| {
                        if let Some(content) = &reply.content {
                            data.content(content);
                        }
                        if let Some(embed) = embed {
                            data.add_embed(embed);
                        }
                        data.ephemeral(reply.ephemeral)
                    })
            })
            .await?;

        let message = self.command.get_interaction_response(&self.http).await?;
        Ok(handle_of(&message))
    }

    async fn follow_up(&self, reply: &Reply) -> Result<MessageHandle> {
        let embed = reply.embed.as_ref().map(to_create_embed);
        let message = self
            .command
            .create_followup_message(&self.http, |f| {
                if let Some(content) = &reply.content {
                    f.content(content);
                }
                if let Some(embed) = embed {
                    f.add_embed(embed);
                }
                f.ephemeral(reply.ephemeral)
            })
            .await?;
        Ok(handle_of(&message))
    }
}
