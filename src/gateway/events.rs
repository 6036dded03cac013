//! Inbound events, decoupled from the platform's own model types

use std::fmt;
use std::sync::Arc;

use super::{ChannelId, GuildId, InteractionResponder, MemberInfo, MessageId, UserId, UserInfo};

#[derive(Debug, Clone, PartialEq)]
pub struct IncomingMessage {
    pub id: MessageId,
    pub channel_id: ChannelId,
    pub guild_id: Option<GuildId>,
    pub author: UserInfo,
    /// Guild nickname when the message came from a guild
    pub author_nick: Option<String>,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IncomingReaction {
    pub message_id: MessageId,
    pub channel_id: ChannelId,
    pub guild_id: Option<GuildId>,
    pub user_id: UserId,
    pub emoji: String,
}

/// A named option value from a structured invocation
#[derive(Debug, Clone, PartialEq)]
pub enum OptionValue {
    String(String),
    Integer(i64),
    Boolean(bool),
    /// The platform resolves user options up front; `member` is absent when
    /// the user is not in the guild.
    User {
        id: UserId,
        member: Option<MemberInfo>,
    },
    Channel(ChannelId),
}

pub struct IncomingInteraction {
    pub id: u64,
    pub command_name: String,
    pub guild_id: Option<GuildId>,
    pub channel_id: ChannelId,
    pub user: UserInfo,
    pub user_nick: Option<String>,
    pub options: Vec<(String, OptionValue)>,
    pub responder: Arc<dyn InteractionResponder>,
}

impl fmt::Debug for IncomingInteraction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IncomingInteraction")
            .field("id", &self.id)
            .field("command_name", &self.command_name)
            .field("guild_id", &self.guild_id)
            .field("channel_id", &self.channel_id)
            .field("user", &self.user.id)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

#[derive(Debug)]
pub enum InboundEvent {
    Message(IncomingMessage),
    Reaction(IncomingReaction),
    Interaction(IncomingInteraction),
}
