use anyhow::Result;
use dotenvy::dotenv;
use log::{debug, error, info, warn};
use serenity::async_trait;
use serenity::model::application::interaction::Interaction;
use serenity::model::channel::{Message, Reaction};
use serenity::model::gateway::Ready;
use serenity::model::id::GuildId;
use serenity::prelude::*;
use std::sync::Arc;
use tokio::sync::OnceCell;

use steward::commands::{
    create_all_handlers, register_global_commands, register_guild_commands, CommandContext,
    CommandRegistry, DispatchOutcome, Dispatcher,
};
use steward::core::config::CommandOverrides;
use steward::core::Config;
use steward::features::guessing::{GuessingService, RemoteGuessingService};
use steward::features::settings::{SettingsStore, SqliteSettingsStore};
use steward::gateway::discord::{incoming_message, incoming_reaction, SerenityGateway};
use steward::gateway::InboundEvent;

/// Everything that needs the bot's own identity, built on the first Ready
struct Runtime {
    dispatcher: Arc<Dispatcher>,
    gateway: Arc<SerenityGateway>,
}

struct Handler {
    config: Config,
    registry: Arc<CommandRegistry>,
    settings: Arc<dyn SettingsStore>,
    guessing: Option<Arc<dyn GuessingService>>,
    guild_id: Option<GuildId>,
    runtime: OnceCell<Runtime>,
}

impl Handler {
    fn build_runtime(&self, ctx: &Context, ready: &Ready) -> Runtime {
        let gateway = Arc::new(SerenityGateway::new(
            ctx.http.clone(),
            ctx.cache.clone(),
            ready.user.id,
        ));

        let mut command_ctx = CommandContext::new(
            gateway.clone(),
            self.settings.clone(),
            self.registry.clone(),
            self.config.command_prefix.clone(),
        )
        .with_owners(self.config.owner_ids.clone());
        if let Some(service) = &self.guessing {
            command_ctx = command_ctx.with_guessing(service.clone());
        }

        Runtime {
            dispatcher: Arc::new(Dispatcher::new(Arc::new(command_ctx))),
            gateway,
        }
    }

    async fn dispatch(&self, event: InboundEvent) {
        let Some(runtime) = self.runtime.get() else {
            debug!("Event received before Ready; dropping it");
            return;
        };
        if let DispatchOutcome::Failed = runtime.dispatcher.handle_event(event).await {
            warn!("Command dispatch failed; the invoker was notified");
        }
    }
}

#[async_trait]
impl EventHandler for Handler {
    async fn message(&self, _ctx: Context, msg: Message) {
        if msg.author.bot {
            return;
        }
        self.dispatch(InboundEvent::Message(incoming_message(&msg))).await;
    }

    async fn reaction_add(&self, _ctx: Context, reaction: Reaction) {
        if let Some(reaction) = incoming_reaction(&reaction) {
            self.dispatch(InboundEvent::Reaction(reaction)).await;
        }
    }

    async fn ready(&self, ctx: Context, ready: Ready) {
        info!("🎉 {} is connected and ready!", ready.user.name);
        info!("📡 Connected to {} guilds", ready.guilds.len());
        info!("🤖 Bot ID: {}", ready.user.id);

        if let Some(shard) = ready.shard {
            info!("⚡ Shard: {}/{}", shard[0] + 1, shard[1]);
        }

        if self.runtime.get().is_some() {
            info!("🔄 Reconnected; keeping existing dispatcher");
            return;
        }
        if self.runtime.set(self.build_runtime(&ctx, &ready)).is_err() {
            warn!("Dispatcher was initialised concurrently");
        }

        let registered = match self.guild_id {
            Some(guild_id) => {
                info!("🔧 Development mode: registering commands for guild {}", guild_id);
                register_guild_commands(&ctx.http, guild_id, &self.registry).await
            }
            None => {
                info!("🌍 Registering global slash commands");
                register_global_commands(&ctx.http, &self.registry).await
            }
        };
        if let Err(e) = registered {
            error!("❌ Failed to register slash commands: {:#}", e);
        }
    }

    async fn interaction_create(&self, _ctx: Context, interaction: Interaction) {
        let Interaction::ApplicationCommand(command) = interaction else {
            return;
        };
        let Some(runtime) = self.runtime.get() else {
            debug!("Interaction received before Ready; dropping it");
            return;
        };
        let incoming = runtime.gateway.incoming_interaction(command).await;
        self.dispatch(InboundEvent::Interaction(incoming)).await;
    }
}

fn build_registry(config: &Config) -> Result<CommandRegistry> {
    let mut registry = CommandRegistry::new();
    for handler in create_all_handlers(config.guessing_service_url.is_some()) {
        registry.register(handler)?;
    }

    let overrides = CommandOverrides::load_optional(&config.commands_config_path)?;
    if !overrides.is_empty() {
        info!(
            "📄 Applying {} command override(s) from {}",
            overrides.commands.len(),
            config.commands_config_path
        );
        registry.apply_overrides(&overrides)?;
    }
    Ok(registry)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv().ok();

    let config = Config::from_env()?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.log_level))
        .init();

    info!("Starting Steward Discord Bot...");

    let settings: Arc<dyn SettingsStore> = Arc::new(SqliteSettingsStore::open(&config.database_path)?);
    info!("🗄️ Guild settings stored in {}", config.database_path);

    let guessing: Option<Arc<dyn GuessingService>> = match &config.guessing_service_url {
        Some(url) => {
            info!("🧠 Guessing game backed by {}", url);
            Some(Arc::new(RemoteGuessingService::new(url.clone(), config.guessing_region.clone())?))
        }
        None => {
            info!("🧠 GUESSING_SERVICE_URL not set - guessing game disabled");
            None
        }
    };

    let registry = Arc::new(build_registry(&config)?);
    info!("📋 {} command(s) registered", registry.len());

    // Parse guild ID if provided for development mode
    let guild_id = config
        .discord_guild_id
        .as_ref()
        .and_then(|id| id.parse::<u64>().ok())
        .map(GuildId);

    let intents = GatewayIntents::GUILDS
        | GatewayIntents::GUILD_MEMBERS
        | GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::GUILD_MESSAGE_REACTIONS
        | GatewayIntents::DIRECT_MESSAGES
        | GatewayIntents::DIRECT_MESSAGE_REACTIONS
        | GatewayIntents::MESSAGE_CONTENT;

    let token = config.discord_token.clone();
    let handler = Handler {
        config,
        registry,
        settings,
        guessing,
        guild_id,
        runtime: OnceCell::new(),
    };

    let mut client = Client::builder(&token, intents)
        .event_handler(handler)
        .await
        .map_err(|e| {
            error!("Failed to create Discord client: {e}");
            anyhow::anyhow!("Client creation failed: {}", e)
        })?;

    info!("Establishing WebSocket connection to Discord gateway...");
    info!("Gateway intents: {intents:?}");

    if let Err(why) = client.start().await {
        error!("❌ Client error: {why:?}");
        return Err(why.into());
    }

    Ok(())
}
