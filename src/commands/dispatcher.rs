//! # Command Dispatcher
//!
//! Entry point for every inbound event. Follow-up messages and reactions go
//! to the response waiter first; anything left over is treated as a possible
//! command, adapted into an [`InvocationContext`], guarded and executed.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false

use std::sync::Arc;
use std::time::Instant;

use log::{debug, error, info, trace, warn};
use uuid::Uuid;

use super::arguments::{parse_text_arguments, structured_arguments, Arguments};
use super::context::CommandContext;
use super::cooldown::CooldownTable;
use super::guards::{run_guards, GuardEnv, GuardError};
use super::invocation::InvocationContext;
use super::registry::{CommandRegistry, RegisteredCommand};
use crate::core::{ArgumentError, Rejection, Reply};
use crate::gateway::{InboundEvent, IncomingInteraction, IncomingMessage, UserId};

/// Reply for any fault inside a command body
pub const GENERIC_FAILURE: &str = "Something went wrong, action cancelled.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Not a command, or consumed by a waiting flow
    Ignored,
    Rejected(Rejection),
    InvalidArguments(ArgumentError),
    Completed,
    Failed,
}

pub struct Dispatcher {
    ctx: Arc<CommandContext>,
    cooldowns: CooldownTable,
}

/// Strip the prefix or a leading bot mention from a message.
pub fn strip_prefix<'a>(content: &'a str, prefix: &str, bot: UserId) -> Option<&'a str> {
    let content = content.trim_start();
    let mentions = [format!("<@{}>", bot.0), format!("<@!{}>", bot.0)];
    for mention in &mentions {
        if let Some(rest) = content.strip_prefix(mention.as_str()) {
            return Some(rest.trim_start());
        }
    }
    if prefix.is_empty() {
        return None;
    }
    content.strip_prefix(prefix)
}

impl Dispatcher {
    pub fn new(ctx: Arc<CommandContext>) -> Self {
        Self {
            ctx,
            cooldowns: CooldownTable::new(),
        }
    }

    pub fn context(&self) -> &Arc<CommandContext> {
        &self.ctx
    }

    pub fn registry(&self) -> &CommandRegistry {
        &self.ctx.registry
    }

    pub fn cooldowns(&self) -> &CooldownTable {
        &self.cooldowns
    }

    /// Pure lookup by name or alias
    pub fn resolve(&self, name: &str) -> Option<Arc<RegisteredCommand>> {
        self.ctx.registry.resolve(name)
    }

    pub async fn handle_event(&self, event: InboundEvent) -> DispatchOutcome {
        if self.ctx.waiter.deliver(&event) {
            return DispatchOutcome::Ignored;
        }
        match event {
            InboundEvent::Message(message) => self.dispatch_message(message).await,
            InboundEvent::Interaction(interaction) => self.dispatch_interaction(interaction).await,
            InboundEvent::Reaction(_) => DispatchOutcome::Ignored,
        }
    }

    pub async fn dispatch_message(&self, message: IncomingMessage) -> DispatchOutcome {
        if message.author.bot {
            return DispatchOutcome::Ignored;
        }

        let prefix = self.ctx.prefix_for(message.guild_id).await;
        let Some(body) = strip_prefix(&message.content, &prefix, self.ctx.gateway.bot_user_id())
        else {
            return DispatchOutcome::Ignored;
        };

        let mut tokens = body.split_whitespace().map(str::to_string);
        let Some(invoked) = tokens.next() else {
            return DispatchOutcome::Ignored;
        };
        let Some(command) = self.resolve(&invoked) else {
            trace!("Ignoring unknown command `{}`", invoked);
            return DispatchOutcome::Ignored;
        };
        let tokens: Vec<String> = tokens.collect();

        let request_id = Uuid::new_v4().to_string();
        info!(
            "[{}] 📥 Text command received | Command: {} | User: {} | Channel: {} | Guild: {:?}",
            request_id,
            command.definition.name,
            message.author.id.0,
            message.channel_id.0,
            message.guild_id.map(|g| g.0)
        );

        let inv = InvocationContext::from_message(
            request_id,
            &command.definition.name,
            &message,
            &prefix,
            &invoked.to_lowercase(),
            self.ctx.gateway.clone(),
        );

        if let Some(outcome) = self.guard(&command, &inv).await {
            return outcome;
        }

        let args = parse_text_arguments(
            &command.definition,
            &tokens,
            &prefix,
            inv.guild_id,
            self.ctx.gateway.as_ref(),
        )
        .await;
        self.execute(command, inv, args).await
    }

    pub async fn dispatch_interaction(&self, interaction: IncomingInteraction) -> DispatchOutcome {
        let request_id = Uuid::new_v4().to_string();
        info!(
            "[{}] 📥 Slash command received | Command: {} | User: {} | Channel: {} | Guild: {:?}",
            request_id,
            interaction.command_name,
            interaction.user.id.0,
            interaction.channel_id.0,
            interaction.guild_id.map(|g| g.0)
        );

        let Some(command) = self.resolve(&interaction.command_name) else {
            warn!("[{}] ❓ Unknown slash command: {}", request_id, interaction.command_name);
            let reply = Reply::text("This command is not available right now.").ephemeral();
            if let Err(e) = interaction.responder.respond(&reply).await {
                warn!("[{request_id}] Failed to answer unknown command: {e:#}");
            }
            return DispatchOutcome::Ignored;
        };

        let inv = InvocationContext::from_interaction(
            request_id,
            &command.definition.name,
            &interaction,
            self.ctx.gateway.clone(),
        );

        if let Some(outcome) = self.guard(&command, &inv).await {
            return outcome;
        }

        let args = structured_arguments(&command.definition, &interaction.options);
        self.execute(command, inv, args).await
    }

    /// Run the guards; `Some` means the invocation stops here
    async fn guard(
        &self,
        command: &RegisteredCommand,
        inv: &InvocationContext,
    ) -> Option<DispatchOutcome> {
        let env = GuardEnv {
            gateway: self.ctx.gateway.as_ref(),
            settings: self.ctx.settings.as_ref(),
            owner_ids: &self.ctx.owner_ids,
            cooldowns: &self.cooldowns,
        };

        match run_guards(&command.definition, inv, &env).await {
            Ok(()) => None,
            Err(GuardError::Rejected(rejection)) => {
                debug!(
                    "[{}] 🚫 {} rejected: {}",
                    inv.request_id,
                    command.definition.name,
                    rejection.code()
                );
                inv.notify(rejection.to_string()).await;
                Some(DispatchOutcome::Rejected(rejection))
            }
            Err(GuardError::Lookup(e)) => {
                error!("[{}] ❌ Guard lookup failed for {}: {:#}", inv.request_id, command.definition.name, e);
                self.report_failure(inv).await;
                Some(DispatchOutcome::Failed)
            }
        }
    }

    async fn execute(
        &self,
        command: Arc<RegisteredCommand>,
        mut inv: InvocationContext,
        args: Result<Arguments, ArgumentError>,
    ) -> DispatchOutcome {
        match args {
            Ok(args) => inv.args = args,
            Err(err) => {
                debug!("[{}] Invalid arguments for {}: {}", inv.request_id, command.definition.name, err);
                inv.notify(err.to_string()).await;
                return DispatchOutcome::InvalidArguments(err);
            }
        }

        let inv = Arc::new(inv);
        let started = Instant::now();
        let structured = inv.is_structured();
        info!("[{}] 🎯 Processing command: {}", inv.request_id, command.definition.name);

        // The body runs on its own task so a panic stays contained
        let task = {
            let ctx = self.ctx.clone();
            let inv = inv.clone();
            let command = command.clone();
            tokio::spawn(async move {
                if structured {
                    command.handler.handle_structured(ctx, &inv).await
                } else {
                    command.handler.handle(ctx, &inv).await
                }
            })
        };

        match task.await {
            Ok(Ok(())) => {
                info!(
                    "[{}] ✅ Command {} completed in {}ms",
                    inv.request_id,
                    command.definition.name,
                    started.elapsed().as_millis()
                );
                DispatchOutcome::Completed
            }
            Ok(Err(e)) => {
                error!("[{}] ❌ Command {} failed: {:#}", inv.request_id, command.definition.name, e);
                self.report_failure(&inv).await;
                DispatchOutcome::Failed
            }
            Err(join_error) => {
                error!(
                    "[{}] ❌ Command {} aborted: {}",
                    inv.request_id, command.definition.name, join_error
                );
                self.report_failure(&inv).await;
                DispatchOutcome::Failed
            }
        }
    }

    async fn report_failure(&self, inv: &InvocationContext) {
        if let Err(e) = inv.reply(GENERIC_FAILURE).await {
            warn!("[{}] ⚠️ Could not deliver failure reply: {:#}", inv.request_id, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::definition::{CommandDefinition, CommandOption, OptionKind};
    use crate::commands::handler::CommandHandler;
    use crate::features::settings::{GuildSettingsUpdate, MemorySettingsStore, SettingsStore};
    use crate::gateway::{ChannelId, GuildId, Permissions};
    use crate::test_support::{guild_message, interaction_from, MockGateway, MockResponder, BOT_ID};
    use anyhow::{anyhow, Result};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    const GUILD: GuildId = GuildId(1);
    const CHANNEL: ChannelId = ChannelId(10);
    const USER: UserId = UserId(100);

    #[derive(Default)]
    struct Probe {
        text_calls: AtomicUsize,
        structured_calls: AtomicUsize,
    }

    struct ProbeHandler {
        probe: Arc<Probe>,
        definition: CommandDefinition,
        fail: bool,
    }

    #[async_trait]
    impl CommandHandler for ProbeHandler {
        fn definition(&self) -> CommandDefinition {
            self.definition.clone()
        }

        async fn handle(&self, _ctx: Arc<CommandContext>, inv: &InvocationContext) -> Result<()> {
            self.probe.text_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(anyhow!("collaborator exploded"));
            }
            inv.reply(format!("echo {}", inv.args.get_str("word").unwrap_or("-"))).await?;
            Ok(())
        }

        async fn handle_structured(
            &self,
            _ctx: Arc<CommandContext>,
            inv: &InvocationContext,
        ) -> Result<()> {
            self.probe.structured_calls.fetch_add(1, Ordering::SeqCst);
            inv.reply("structured").await?;
            Ok(())
        }
    }

    struct PanicHandler;

    #[async_trait]
    impl CommandHandler for PanicHandler {
        fn definition(&self) -> CommandDefinition {
            CommandDefinition::new("boom", "test", "Panics")
        }

        async fn handle(&self, _ctx: Arc<CommandContext>, _inv: &InvocationContext) -> Result<()> {
            panic!("body bug");
        }
    }

    fn echo_definition() -> CommandDefinition {
        CommandDefinition::new("echo", "test", "Echo")
            .alias("say")
            .option(CommandOption::new("word", OptionKind::String, "Word"))
    }

    struct Harness {
        dispatcher: Dispatcher,
        gateway: Arc<MockGateway>,
        settings: Arc<MemorySettingsStore>,
        probe: Arc<Probe>,
    }

    fn harness_with(definition: CommandDefinition, fail: bool) -> Harness {
        let probe = Arc::new(Probe::default());
        let mut registry = CommandRegistry::new();
        registry
            .register(Arc::new(ProbeHandler {
                probe: probe.clone(),
                definition,
                fail,
            }))
            .unwrap();
        registry.register(Arc::new(PanicHandler)).unwrap();

        let gateway = Arc::new(MockGateway::new());
        let settings = Arc::new(MemorySettingsStore::new());
        let ctx = CommandContext::new(gateway.clone(), settings.clone(), Arc::new(registry), "!");
        Harness {
            dispatcher: Dispatcher::new(Arc::new(ctx)),
            gateway,
            settings,
            probe,
        }
    }

    fn harness() -> Harness {
        harness_with(echo_definition(), false)
    }

    #[test]
    fn test_strip_prefix() {
        assert_eq!(strip_prefix("!ping", "!", BOT_ID), Some("ping"));
        assert_eq!(strip_prefix("ping", "!", BOT_ID), None);
        assert_eq!(
            strip_prefix(&format!("<@{}> ping", BOT_ID.0), "!", BOT_ID),
            Some("ping")
        );
        assert_eq!(
            strip_prefix(&format!("<@!{}>ping", BOT_ID.0), "!", BOT_ID),
            Some("ping")
        );
        assert_eq!(strip_prefix("?ping", "?", BOT_ID), Some("ping"));
    }

    #[tokio::test]
    async fn test_text_command_runs_text_body_once() {
        let h = harness();
        let outcome = h
            .dispatcher
            .handle_event(InboundEvent::Message(guild_message(USER, CHANNEL, GUILD, "!SAY hello")))
            .await;

        assert_eq!(outcome, DispatchOutcome::Completed);
        assert_eq!(h.probe.text_calls.load(Ordering::SeqCst), 1);
        assert_eq!(h.probe.structured_calls.load(Ordering::SeqCst), 0);
        assert_eq!(h.gateway.sent_texts(), vec!["echo hello".to_string()]);
    }

    #[tokio::test]
    async fn test_unknown_and_unprefixed_messages_are_ignored() {
        let h = harness();
        for content in ["!nope", "hello there", "!", ""] {
            let outcome = h
                .dispatcher
                .handle_event(InboundEvent::Message(guild_message(USER, CHANNEL, GUILD, content)))
                .await;
            assert_eq!(outcome, DispatchOutcome::Ignored);
        }
        assert!(h.gateway.sent().is_empty());
    }

    #[tokio::test]
    async fn test_bot_authors_are_ignored() {
        let h = harness();
        let mut message = guild_message(USER, CHANNEL, GUILD, "!echo hi");
        message.author.bot = true;
        assert_eq!(
            h.dispatcher.handle_event(InboundEvent::Message(message)).await,
            DispatchOutcome::Ignored
        );
    }

    #[tokio::test]
    async fn test_guild_prefix_overrides_default() {
        let h = harness();
        h.settings
            .update_guild_settings(
                GUILD,
                GuildSettingsUpdate {
                    prefix: Some("?".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let ignored = h
            .dispatcher
            .handle_event(InboundEvent::Message(guild_message(USER, CHANNEL, GUILD, "!echo a")))
            .await;
        let handled = h
            .dispatcher
            .handle_event(InboundEvent::Message(guild_message(USER, CHANNEL, GUILD, "?echo a")))
            .await;

        assert_eq!(ignored, DispatchOutcome::Ignored);
        assert_eq!(handled, DispatchOutcome::Completed);
    }

    #[tokio::test]
    async fn test_structured_command_runs_structured_body() {
        let h = harness();
        let responder = Arc::new(MockResponder::new());
        let interaction = interaction_from(USER, CHANNEL, "echo", responder.clone());

        let outcome = h.dispatcher.handle_event(InboundEvent::Interaction(interaction)).await;

        assert_eq!(outcome, DispatchOutcome::Completed);
        assert_eq!(h.probe.structured_calls.load(Ordering::SeqCst), 1);
        assert_eq!(h.probe.text_calls.load(Ordering::SeqCst), 0);
        assert_eq!(responder.responses().len(), 1);
    }

    #[tokio::test]
    async fn test_rejection_sends_message_and_skips_body() {
        let def = echo_definition().member_permissions(Permissions::KICK_MEMBERS);
        let h = harness_with(def, false);

        let outcome = h
            .dispatcher
            .handle_event(InboundEvent::Message(guild_message(USER, CHANNEL, GUILD, "!echo hi")))
            .await;

        assert_eq!(
            outcome,
            DispatchOutcome::Rejected(Rejection::MissingPermissions(Permissions::KICK_MEMBERS))
        );
        assert_eq!(h.probe.text_calls.load(Ordering::SeqCst), 0);
        assert!(h.gateway.sent_texts()[0].contains("you don't have permission"));
    }

    #[tokio::test]
    async fn test_body_error_becomes_generic_reply() {
        let h = harness_with(echo_definition(), true);
        let outcome = h
            .dispatcher
            .handle_event(InboundEvent::Message(guild_message(USER, CHANNEL, GUILD, "!echo hi")))
            .await;

        assert_eq!(outcome, DispatchOutcome::Failed);
        assert_eq!(h.gateway.sent_texts(), vec![GENERIC_FAILURE.to_string()]);
    }

    #[tokio::test]
    async fn test_body_panic_is_contained() {
        let h = harness();
        let outcome = h
            .dispatcher
            .handle_event(InboundEvent::Message(guild_message(USER, CHANNEL, GUILD, "!boom")))
            .await;

        assert_eq!(outcome, DispatchOutcome::Failed);
        assert_eq!(h.gateway.sent_texts(), vec![GENERIC_FAILURE.to_string()]);

        // The dispatcher keeps working afterwards
        let outcome = h
            .dispatcher
            .handle_event(InboundEvent::Message(guild_message(USER, CHANNEL, GUILD, "!echo ok")))
            .await;
        assert_eq!(outcome, DispatchOutcome::Completed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cooldown_through_dispatch() {
        let def = echo_definition().cooldown(Duration::from_secs(3));
        let h = harness_with(def, false);
        let send = |content: &str| InboundEvent::Message(guild_message(USER, CHANNEL, GUILD, content));

        assert_eq!(h.dispatcher.handle_event(send("!echo 1")).await, DispatchOutcome::Completed);
        assert!(matches!(
            h.dispatcher.handle_event(send("!echo 2")).await,
            DispatchOutcome::Rejected(Rejection::Cooldown { .. })
        ));

        tokio::time::advance(Duration::from_secs(3)).await;
        assert_eq!(h.dispatcher.handle_event(send("!echo 3")).await, DispatchOutcome::Completed);
        assert_eq!(h.probe.text_calls.load(Ordering::SeqCst), 2);
    }
}
