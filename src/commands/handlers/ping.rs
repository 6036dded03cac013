//! Ping command handler

use anyhow::Result;
use async_trait::async_trait;
use log::info;
use std::sync::Arc;

use crate::commands::context::CommandContext;
use crate::commands::definition::CommandDefinition;
use crate::commands::handler::CommandHandler;
use crate::commands::invocation::InvocationContext;

pub struct PingHandler;

#[async_trait]
impl CommandHandler for PingHandler {
    fn definition(&self) -> CommandDefinition {
        CommandDefinition::new("ping", "info", "Test bot responsiveness").usage("ping")
    }

    async fn handle(&self, _ctx: Arc<CommandContext>, inv: &InvocationContext) -> Result<()> {
        inv.reply("Pong!").await?;
        info!("[{}] Ping command completed for user {}", inv.request_id, inv.author.id.0);
        Ok(())
    }
}
