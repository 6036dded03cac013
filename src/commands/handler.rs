//! Command handler trait
//!
//! - **Version**: 2.0.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 2.0.0: Handlers describe themselves with a `CommandDefinition` and receive a
//!   unified `InvocationContext` for text and slash invocations
//! - 1.0.0: Initial implementation for modular command handling

use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;

use super::context::CommandContext;
use super::definition::CommandDefinition;
use super::invocation::InvocationContext;

/// Trait for command handlers
///
/// Each handler owns one command. The dispatcher runs the guards, resolves
/// arguments and then calls exactly one of the two bodies.
///
/// # Example
///
/// ```ignore
/// pub struct PingHandler;
///
/// #[async_trait]
/// impl CommandHandler for PingHandler {
///     fn definition(&self) -> CommandDefinition {
///         CommandDefinition::new("ping", "info", "Check that the bot is alive")
///     }
///
///     async fn handle(&self, _ctx: Arc<CommandContext>, inv: &InvocationContext) -> Result<()> {
///         inv.reply("Pong!").await?;
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait CommandHandler: Send + Sync {
    fn definition(&self) -> CommandDefinition;

    /// Body for text invocations
    async fn handle(&self, ctx: Arc<CommandContext>, inv: &InvocationContext) -> Result<()>;

    /// Body for structured invocations; defaults to the text body
    async fn handle_structured(
        &self,
        ctx: Arc<CommandContext>,
        inv: &InvocationContext,
    ) -> Result<()> {
        self.handle(ctx, inv).await
    }
}
