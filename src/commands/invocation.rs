//! Invocation context
//!
//! One [`InvocationContext`] is built per dispatch from either a text message
//! or a structured interaction. Command bodies see the same fields and reply
//! methods for both; only the transport underneath differs.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use log::{debug, warn};

use super::arguments::Arguments;
use crate::core::Reply;
use crate::gateway::{
    ChannelId, ChatGateway, GuildId, IncomingInteraction, IncomingMessage, InteractionResponder,
    MessageHandle, MessageId, UserInfo,
};

/// How long transient text notices stay up
pub const NOTICE_LIFETIME: Duration = Duration::from_secs(5);

#[derive(Clone)]
pub enum Origin {
    Text {
        message_id: MessageId,
        prefix: String,
        invoked_name: String,
    },
    Structured {
        interaction_id: u64,
        responder: Arc<dyn InteractionResponder>,
    },
}

pub struct InvocationContext {
    pub request_id: String,
    /// Canonical command name
    pub command: String,
    pub origin: Origin,
    pub author: UserInfo,
    /// Guild nickname, falling back to the username
    pub author_name: String,
    pub guild_id: Option<GuildId>,
    pub channel_id: ChannelId,
    pub args: Arguments,
    gateway: Arc<dyn ChatGateway>,
    acknowledged: AtomicBool,
}

impl InvocationContext {
    /// Adapt a text message. `tokens` are stored as raw arguments until the
    /// dispatcher resolves them against the option schema.
    pub fn from_message(
        request_id: String,
        command: &str,
        message: &IncomingMessage,
        prefix: &str,
        invoked_name: &str,
        gateway: Arc<dyn ChatGateway>,
    ) -> Self {
        Self {
            request_id,
            command: command.to_string(),
            origin: Origin::Text {
                message_id: message.id,
                prefix: prefix.to_string(),
                invoked_name: invoked_name.to_string(),
            },
            author_name: message
                .author_nick
                .clone()
                .unwrap_or_else(|| message.author.name.clone()),
            author: message.author.clone(),
            guild_id: message.guild_id,
            channel_id: message.channel_id,
            args: Arguments::new(),
            gateway,
            acknowledged: AtomicBool::new(false),
        }
    }

    /// Adapt a structured interaction
    pub fn from_interaction(
        request_id: String,
        command: &str,
        interaction: &IncomingInteraction,
        gateway: Arc<dyn ChatGateway>,
    ) -> Self {
        Self {
            request_id,
            command: command.to_string(),
            origin: Origin::Structured {
                interaction_id: interaction.id,
                responder: interaction.responder.clone(),
            },
            author_name: interaction
                .user_nick
                .clone()
                .unwrap_or_else(|| interaction.user.name.clone()),
            author: interaction.user.clone(),
            guild_id: interaction.guild_id,
            channel_id: interaction.channel_id,
            args: Arguments::new(),
            gateway,
            acknowledged: AtomicBool::new(false),
        }
    }

    pub fn is_structured(&self) -> bool {
        matches!(self.origin, Origin::Structured { .. })
    }

    /// Prefix the command was typed with; `/` for structured invocations
    pub fn prefix(&self) -> &str {
        match &self.origin {
            Origin::Text { prefix, .. } => prefix,
            Origin::Structured { .. } => "/",
        }
    }

    pub fn gateway(&self) -> &Arc<dyn ChatGateway> {
        &self.gateway
    }

    /// Answer this turn.
    ///
    /// Structured invocations acknowledge the interaction on the first call
    /// and follow up afterwards; text invocations send to the channel.
    pub async fn reply(&self, reply: impl Into<Reply>) -> Result<MessageHandle> {
        let reply = reply.into();
        match &self.origin {
            Origin::Text { .. } => self.gateway.send_message(self.channel_id, &reply).await,
            Origin::Structured { responder, .. } => {
                if self.acknowledged.swap(true, Ordering::SeqCst) {
                    responder.follow_up(&reply).await
                } else {
                    responder.respond(&reply).await
                }
            }
        }
    }

    /// An additional message in a multi-turn exchange
    pub async fn follow_up(&self, reply: impl Into<Reply>) -> Result<MessageHandle> {
        self.reply(reply).await
    }

    pub async fn edit(&self, message: MessageHandle, reply: impl Into<Reply>) -> Result<()> {
        self.gateway.edit_message(message, &reply.into()).await
    }

    pub async fn delete(&self, message: MessageHandle) -> Result<()> {
        self.gateway.delete_message(message).await
    }

    pub async fn react(&self, message: MessageHandle, emoji: &str) -> Result<()> {
        self.gateway.add_reaction(message, emoji).await
    }

    /// Short-lived notice for the invoker: deleted after a few seconds on the
    /// text path, ephemeral on the structured path. Failures are logged.
    pub async fn notify(&self, reply: impl Into<Reply>) {
        let reply = reply.into();
        if self.is_structured() {
            if let Err(e) = self.reply(reply.ephemeral()).await {
                warn!("[{}] Failed to send notice: {:#}", self.request_id, e);
            }
            return;
        }

        match self.gateway.send_message(self.channel_id, &reply).await {
            Ok(handle) => {
                let gateway = self.gateway.clone();
                tokio::spawn(async move {
                    tokio::time::sleep(NOTICE_LIFETIME).await;
                    if let Err(e) = gateway.delete_message(handle).await {
                        debug!("Transient notice already gone: {:#}", e);
                    }
                });
            }
            Err(e) => warn!("[{}] Failed to send notice: {:#}", self.request_id, e),
        }
    }

    /// Remove the message that triggered a text invocation, if the bot can
    pub async fn delete_trigger(&self) {
        if let Origin::Text { message_id, .. } = &self.origin {
            let handle = MessageHandle {
                channel_id: self.channel_id,
                message_id: *message_id,
            };
            if let Err(e) = self.gateway.delete_message(handle).await {
                debug!("[{}] Could not delete trigger message: {:#}", self.request_id, e);
            }
        }
    }
}
