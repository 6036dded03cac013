//! # Chat Gateway
//!
//! The narrow slice of the chat platform the command framework depends on:
//! sending, editing and deleting messages, reactions, permission lookups and
//! member resolution. The serenity-backed implementation lives in
//! [`discord`]; tests substitute a recording mock.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false

pub mod events;
pub mod mention;
pub mod discord;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::core::Reply;

pub use ::serenity::model::id::{ChannelId, GuildId, MessageId, UserId};
pub use ::serenity::model::permissions::Permissions;
pub use events::{
    InboundEvent, IncomingInteraction, IncomingMessage, IncomingReaction, OptionValue,
};
pub use mention::{parse_channel_mention, parse_user_mention};

/// Location of a message the bot can edit, delete or react to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MessageHandle {
    pub channel_id: ChannelId,
    pub message_id: MessageId,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UserInfo {
    pub id: UserId,
    pub name: String,
    pub discriminator: u16,
    pub bot: bool,
    pub avatar_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl UserInfo {
    /// `name#0001`, or just the name for accounts on the new username system
    pub fn tag(&self) -> String {
        if self.discriminator == 0 {
            self.name.clone()
        } else {
            format!("{}#{:04}", self.name, self.discriminator)
        }
    }

    pub fn mention(&self) -> String {
        format!("<@{}>", self.id.0)
    }
}

/// A user as seen from inside one guild
#[derive(Debug, Clone, PartialEq)]
pub struct MemberInfo {
    pub user: UserInfo,
    pub guild_id: GuildId,
    pub display_name: String,
    pub joined_at: Option<DateTime<Utc>>,
    /// Role names, highest first, without @everyone
    pub roles: Vec<String>,
    pub color: Option<u32>,
}

impl MemberInfo {
    pub fn id(&self) -> UserId {
        self.user.id
    }

    pub fn mention(&self) -> String {
        self.user.mention()
    }
}

#[async_trait]
pub trait ChatGateway: Send + Sync {
    /// The bot's own user id
    fn bot_user_id(&self) -> UserId;

    async fn send_message(&self, channel: ChannelId, reply: &Reply) -> Result<MessageHandle>;

    async fn edit_message(&self, message: MessageHandle, reply: &Reply) -> Result<()>;

    async fn delete_message(&self, message: MessageHandle) -> Result<()>;

    async fn add_reaction(&self, message: MessageHandle, emoji: &str) -> Result<()>;

    /// Effective permissions of `user` in `channel`
    async fn permissions_in(
        &self,
        guild: GuildId,
        channel: ChannelId,
        user: UserId,
    ) -> Result<Permissions>;

    async fn member(&self, guild: GuildId, user: UserId) -> Result<Option<MemberInfo>>;

    /// Resolve a mention, raw id, or name into a guild member
    async fn find_member(&self, guild: GuildId, query: &str) -> Result<Option<MemberInfo>>;

    async fn channel_exists(&self, guild: GuildId, channel: ChannelId) -> Result<bool>;

    /// Whether the bot outranks `target` and may moderate them
    async fn can_moderate(&self, guild: GuildId, target: UserId) -> Result<bool>;

    async fn kick_member(&self, guild: GuildId, user: UserId, reason: &str) -> Result<()>;
}

/// Transport for answering one structured interaction.
///
/// The first answer must go through `respond`; anything after that is a
/// follow-up.
#[async_trait]
pub trait InteractionResponder: Send + Sync {
    async fn respond(&self, reply: &Reply) -> Result<MessageHandle>;

    async fn follow_up(&self, reply: &Reply) -> Result<MessageHandle>;
}
