//! Akinator command handler
//!
//! Plays one guessing game with the invoker in the invoking channel.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0

use anyhow::Result;
use async_trait::async_trait;
use log::info;
use std::sync::Arc;

use crate::commands::context::CommandContext;
use crate::commands::definition::CommandDefinition;
use crate::commands::handler::CommandHandler;
use crate::commands::invocation::InvocationContext;
use crate::features::interactive::{GuessingConfig, GuessingFlow};

pub struct AkinatorHandler;

#[async_trait]
impl CommandHandler for AkinatorHandler {
    fn definition(&self) -> CommandDefinition {
        CommandDefinition::new("akinator", "fun", "Start a game of Akinator!").usage("akinator")
    }

    async fn handle(&self, ctx: Arc<CommandContext>, inv: &InvocationContext) -> Result<()> {
        let Some(service) = ctx.guessing.as_deref() else {
            inv.notify("The guessing game is not configured on this bot.").await;
            return Ok(());
        };

        let (state, conversation) =
            GuessingFlow::new(inv, &ctx.waiter, service, GuessingConfig::default())
                .run()
                .await?;
        info!(
            "[{}] 🧠 Guessing game ended as {:?} after {} answer(s)",
            inv.request_id, state, conversation.step
        );
        Ok(())
    }
}
