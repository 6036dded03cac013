//! Confirm/cancel prompt.
//!
//! Posts a prompt, adds the two decision reactions and waits for the invoker
//! to pick one. Only a confirmation runs the action; cancelling or letting
//! the prompt expire just acknowledges.
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 1.1.0: The log permission notice no longer aborts a confirmed action

use std::future::Future;
use std::time::Duration;

use anyhow::Result;
use log::{debug, info, warn};

use super::waiter::ResponseWaiter;
use crate::commands::InvocationContext;
use crate::core::Reply;
use crate::features::settings::{log_permission_notice, AuditLog, AuditOutcome};
use crate::gateway::GuildId;

pub const CONFIRM: &str = "💯";
pub const CANCEL: &str = "❌";
pub const CONFIRM_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmOutcome {
    Confirmed,
    Cancelled,
    TimedOut,
}

/// Audit entry written when the prompt is confirmed
pub struct AuditRequest<'a> {
    pub log: &'a AuditLog,
    pub guild: GuildId,
    pub entry: Reply,
}

pub struct ConfirmFlow<'a> {
    pub prompt: Reply,
    pub timeout: Duration,
    pub cancelled_message: String,
    pub timed_out_message: String,
    pub audit: Option<AuditRequest<'a>>,
}

impl<'a> ConfirmFlow<'a> {
    pub fn new(prompt: Reply, cancelled_message: &str, timed_out_message: &str) -> Self {
        Self {
            prompt,
            timeout: CONFIRM_TIMEOUT,
            cancelled_message: cancelled_message.to_string(),
            timed_out_message: timed_out_message.to_string(),
            audit: None,
        }
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn audit(mut self, log: &'a AuditLog, guild: GuildId, entry: Reply) -> Self {
        self.audit = Some(AuditRequest { log, guild, entry });
        self
    }

    /// Run the prompt. `action` is awaited at most once, and only on
    /// [`ConfirmOutcome::Confirmed`].
    pub async fn run<F, Fut>(
        self,
        inv: &InvocationContext,
        waiter: &ResponseWaiter,
        action: F,
    ) -> Result<ConfirmOutcome>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<()>>,
    {
        let prompt = inv.reply(self.prompt).await?;
        inv.react(prompt, CONFIRM).await?;
        inv.react(prompt, CANCEL).await?;

        let decision = waiter
            .await_reaction(prompt.message_id, inv.author.id, &[CONFIRM, CANCEL], self.timeout)
            .await;

        let outcome = match decision {
            Some(reaction) if reaction.emoji == CONFIRM => ConfirmOutcome::Confirmed,
            Some(_) => ConfirmOutcome::Cancelled,
            None => ConfirmOutcome::TimedOut,
        };
        debug!("[{}] Confirm prompt resolved: {:?}", inv.request_id, outcome);

        if let Err(e) = inv.delete(prompt).await {
            debug!("[{}] Prompt already gone: {:#}", inv.request_id, e);
        }

        match outcome {
            ConfirmOutcome::Confirmed => {
                if let Some(audit) = self.audit {
                    if audit.log.record(audit.guild, &audit.entry).await == AuditOutcome::SendFailed {
                        if let Err(e) = inv.follow_up(log_permission_notice(inv.prefix())).await {
                            warn!("[{}] Failed to send log permission notice: {:#}", inv.request_id, e);
                        }
                    }
                }
                inv.delete_trigger().await;
                action().await?;
                info!("[{}] ✅ Confirmed action performed", inv.request_id);
            }
            ConfirmOutcome::Cancelled => {
                inv.delete_trigger().await;
                inv.notify(self.cancelled_message).await;
            }
            ConfirmOutcome::TimedOut => {
                inv.follow_up(self.timed_out_message).await?;
            }
        }

        Ok(outcome)
    }
}
