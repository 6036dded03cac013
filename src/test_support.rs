//! Recording doubles for the platform and the guessing service, plus event
//! builders shared by the unit tests.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{TimeZone, Utc};

use crate::commands::{CommandContext, CommandHandler, CommandRegistry, DispatchOutcome, Dispatcher, InvocationContext};
use crate::core::{GameError, Reply};
use crate::features::guessing::{Answer, Guess, GuessingService, SessionHandle, StepPrompt};
use crate::features::settings::MemorySettingsStore;
use crate::gateway::{
    parse_user_mention, ChannelId, ChatGateway, GuildId, InboundEvent, IncomingInteraction,
    IncomingMessage, IncomingReaction, InteractionResponder, MemberInfo, MessageHandle, MessageId,
    Permissions, UserId, UserInfo,
};

pub const BOT_ID: UserId = UserId(999000000000000001);

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

fn next_id() -> u64 {
    NEXT_ID.fetch_add(1, Ordering::SeqCst)
}

pub fn user(id: UserId, name: &str) -> UserInfo {
    UserInfo {
        id,
        name: name.to_string(),
        discriminator: 0,
        bot: false,
        avatar_url: None,
        created_at: Utc.timestamp_opt(1_600_000_000, 0).unwrap(),
    }
}

pub fn member(guild: GuildId, id: UserId, name: &str) -> MemberInfo {
    MemberInfo {
        user: user(id, name),
        guild_id: guild,
        display_name: name.to_string(),
        joined_at: Some(Utc.timestamp_opt(1_650_000_000, 0).unwrap()),
        roles: Vec::new(),
        color: None,
    }
}

/// A message outside any guild
pub fn message_from(author: UserId, channel: ChannelId, content: &str) -> IncomingMessage {
    IncomingMessage {
        id: MessageId(next_id()),
        channel_id: channel,
        guild_id: None,
        author: user(author, &format!("user{}", author.0)),
        author_nick: None,
        content: content.to_string(),
    }
}

pub fn guild_message(author: UserId, channel: ChannelId, guild: GuildId, content: &str) -> IncomingMessage {
    IncomingMessage {
        guild_id: Some(guild),
        ..message_from(author, channel, content)
    }
}

pub fn reaction_from(user_id: UserId, message_id: MessageId, emoji: &str) -> IncomingReaction {
    IncomingReaction {
        message_id,
        channel_id: ChannelId(0),
        guild_id: None,
        user_id,
        emoji: emoji.to_string(),
    }
}

pub fn interaction_from(
    author: UserId,
    channel: ChannelId,
    command: &str,
    responder: Arc<MockResponder>,
) -> IncomingInteraction {
    IncomingInteraction {
        id: next_id(),
        command_name: command.to_string(),
        guild_id: None,
        channel_id: channel,
        user: user(author, &format!("user{}", author.0)),
        user_nick: None,
        options: Vec::new(),
        responder,
    }
}

/// A text invocation of `command` typed with the `!` prefix
pub fn text_invocation(
    gateway: Arc<MockGateway>,
    author: UserId,
    channel: ChannelId,
    guild: Option<GuildId>,
    command: &str,
) -> InvocationContext {
    let mut message = message_from(author, channel, &format!("!{command}"));
    message.guild_id = guild;
    InvocationContext::from_message("test".to_string(), command, &message, "!", command, gateway)
}

#[derive(Default)]
struct Recorded {
    sent: Vec<(MessageHandle, Reply)>,
    edits: Vec<(MessageHandle, Reply)>,
    deleted: Vec<MessageHandle>,
    reactions: Vec<(MessageHandle, String)>,
    kicks: Vec<(GuildId, UserId, String)>,
    permissions: HashMap<UserId, Permissions>,
    permission_lookups: usize,
    fail_permissions: bool,
    members: HashMap<(GuildId, UserId), MemberInfo>,
    channels: HashSet<(GuildId, ChannelId)>,
    failing_channels: HashSet<ChannelId>,
    fail_channel_lookups: bool,
    protected: HashSet<UserId>,
}

/// In-memory platform that records every call
#[derive(Default)]
pub struct MockGateway {
    state: Mutex<Recorded>,
}

impl MockGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_permissions(&self, user: UserId, permissions: Permissions) {
        self.state.lock().unwrap().permissions.insert(user, permissions);
    }

    pub fn fail_permission_lookups(&self) {
        self.state.lock().unwrap().fail_permissions = true;
    }

    pub fn permission_lookups(&self) -> usize {
        self.state.lock().unwrap().permission_lookups
    }

    pub fn add_member(&self, member: MemberInfo) {
        self.state
            .lock()
            .unwrap()
            .members
            .insert((member.guild_id, member.id()), member);
    }

    pub fn add_channel(&self, guild: GuildId, channel: ChannelId) {
        self.state.lock().unwrap().channels.insert((guild, channel));
    }

    /// Sends to `channel` fail as if the bot lacked access
    pub fn fail_sends_to(&self, channel: ChannelId) {
        self.state.lock().unwrap().failing_channels.insert(channel);
    }

    /// Channel lookups fail as if the guild were not cached
    pub fn fail_channel_lookups(&self) {
        self.state.lock().unwrap().fail_channel_lookups = true;
    }

    /// `user` outranks the bot
    pub fn protect(&self, user: UserId) {
        self.state.lock().unwrap().protected.insert(user);
    }

    pub fn sent(&self) -> Vec<(ChannelId, Reply)> {
        self.state
            .lock()
            .unwrap()
            .sent
            .iter()
            .map(|(handle, reply)| (handle.channel_id, reply.clone()))
            .collect()
    }

    pub fn sent_handles(&self) -> Vec<MessageHandle> {
        self.state.lock().unwrap().sent.iter().map(|(h, _)| *h).collect()
    }

    pub fn sent_texts(&self) -> Vec<String> {
        self.state.lock().unwrap().sent.iter().map(|(_, r)| r.summary()).collect()
    }

    pub fn edits(&self) -> Vec<(MessageHandle, Reply)> {
        self.state.lock().unwrap().edits.clone()
    }

    pub fn deleted(&self) -> Vec<MessageHandle> {
        self.state.lock().unwrap().deleted.clone()
    }

    pub fn reactions_on(&self, message: MessageHandle) -> Vec<String> {
        self.state
            .lock()
            .unwrap()
            .reactions
            .iter()
            .filter(|(h, _)| *h == message)
            .map(|(_, emoji)| emoji.clone())
            .collect()
    }

    pub fn kicks(&self) -> Vec<(GuildId, UserId, String)> {
        self.state.lock().unwrap().kicks.clone()
    }
}

#[async_trait]
impl ChatGateway for MockGateway {
    fn bot_user_id(&self) -> UserId {
        BOT_ID
    }

    async fn send_message(&self, channel: ChannelId, reply: &Reply) -> Result<MessageHandle> {
        let mut state = self.state.lock().unwrap();
        if state.failing_channels.contains(&channel) {
            return Err(anyhow!("Missing Access"));
        }
        let handle = MessageHandle {
            channel_id: channel,
            message_id: MessageId(next_id()),
        };
        state.sent.push((handle, reply.clone()));
        Ok(handle)
    }

    async fn edit_message(&self, message: MessageHandle, reply: &Reply) -> Result<()> {
        self.state.lock().unwrap().edits.push((message, reply.clone()));
        Ok(())
    }

    async fn delete_message(&self, message: MessageHandle) -> Result<()> {
        self.state.lock().unwrap().deleted.push(message);
        Ok(())
    }

    async fn add_reaction(&self, message: MessageHandle, emoji: &str) -> Result<()> {
        self.state
            .lock()
            .unwrap()
            .reactions
            .push((message, emoji.to_string()));
        Ok(())
    }

    async fn permissions_in(&self, _guild: GuildId, _channel: ChannelId, user: UserId) -> Result<Permissions> {
        let mut state = self.state.lock().unwrap();
        state.permission_lookups += 1;
        if state.fail_permissions {
            return Err(anyhow!("permission lookup failed"));
        }
        Ok(state.permissions.get(&user).copied().unwrap_or_else(Permissions::empty))
    }

    async fn member(&self, guild: GuildId, user: UserId) -> Result<Option<MemberInfo>> {
        Ok(self.state.lock().unwrap().members.get(&(guild, user)).cloned())
    }

    async fn find_member(&self, guild: GuildId, query: &str) -> Result<Option<MemberInfo>> {
        if let Some(id) = parse_user_mention(query) {
            return self.member(guild, id).await;
        }
        let state = self.state.lock().unwrap();
        Ok(state
            .members
            .values()
            .find(|m| {
                m.guild_id == guild
                    && (m.user.name.eq_ignore_ascii_case(query)
                        || m.display_name.eq_ignore_ascii_case(query))
            })
            .cloned())
    }

    async fn channel_exists(&self, guild: GuildId, channel: ChannelId) -> Result<bool> {
        let state = self.state.lock().unwrap();
        if state.fail_channel_lookups {
            return Err(anyhow!("guild {} is not cached", guild.0));
        }
        Ok(state.channels.contains(&(guild, channel)))
    }

    async fn can_moderate(&self, _guild: GuildId, target: UserId) -> Result<bool> {
        Ok(!self.state.lock().unwrap().protected.contains(&target))
    }

    async fn kick_member(&self, guild: GuildId, user: UserId, reason: &str) -> Result<()> {
        self.state
            .lock()
            .unwrap()
            .kicks
            .push((guild, user, reason.to_string()));
        Ok(())
    }
}

/// Records structured responses instead of sending them
#[derive(Default)]
pub struct MockResponder {
    responses: Mutex<Vec<Reply>>,
    follow_ups: Mutex<Vec<Reply>>,
}

impl MockResponder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn responses(&self) -> Vec<Reply> {
        self.responses.lock().unwrap().clone()
    }

    pub fn follow_ups(&self) -> Vec<Reply> {
        self.follow_ups.lock().unwrap().clone()
    }
}

#[async_trait]
impl InteractionResponder for MockResponder {
    async fn respond(&self, reply: &Reply) -> Result<MessageHandle> {
        self.responses.lock().unwrap().push(reply.clone());
        Ok(MessageHandle {
            channel_id: ChannelId(0),
            message_id: MessageId(next_id()),
        })
    }

    async fn follow_up(&self, reply: &Reply) -> Result<MessageHandle> {
        self.follow_ups.lock().unwrap().push(reply.clone());
        Ok(MessageHandle {
            channel_id: ChannelId(0),
            message_id: MessageId(next_id()),
        })
    }
}

/// Guessing service that replays a fixed progress script.
///
/// `start` reports the first value; each step reports the next one and then
/// keeps repeating the last. The guess is always Mario at 97%.
pub struct ScriptedGuessingService {
    progress: Vec<f64>,
    position: AtomicUsize,
    answers: Mutex<Vec<Answer>>,
    win_calls: AtomicUsize,
    fail_start: bool,
    fail_win: bool,
}

impl ScriptedGuessingService {
    pub fn new(progress: &[f64]) -> Self {
        Self {
            progress: progress.to_vec(),
            position: AtomicUsize::new(0),
            answers: Mutex::new(Vec::new()),
            win_calls: AtomicUsize::new(0),
            fail_start: false,
            fail_win: false,
        }
    }

    pub fn failing_start() -> Self {
        Self {
            fail_start: true,
            ..Self::new(&[0.0])
        }
    }

    pub fn with_failing_win(mut self) -> Self {
        self.fail_win = true;
        self
    }

    pub fn win_calls(&self) -> usize {
        self.win_calls.load(Ordering::SeqCst)
    }

    pub fn answers(&self) -> Vec<Answer> {
        self.answers.lock().unwrap().clone()
    }

    fn prompt(&self, step: usize) -> StepPrompt {
        let last = self.progress.len().saturating_sub(1);
        StepPrompt {
            question: format!("Is your character question {}?", step + 1),
            answers: ["Yes", "No", "Don't know", "Probably", "Probably not"]
                .iter()
                .map(|a| a.to_string())
                .collect(),
            progress: self.progress.get(step.min(last)).copied().unwrap_or_default(),
            step: step as u32,
        }
    }
}

#[async_trait]
impl GuessingService for ScriptedGuessingService {
    async fn start(&self) -> Result<(SessionHandle, StepPrompt), GameError> {
        if self.fail_start {
            return Err(GameError::Unavailable(anyhow!("connection refused")));
        }
        Ok((SessionHandle("scripted".to_string()), self.prompt(0)))
    }

    async fn step(&self, _session: &SessionHandle, answer: Answer) -> Result<StepPrompt, GameError> {
        self.answers.lock().unwrap().push(answer);
        let step = self.position.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(self.prompt(step))
    }

    async fn win(&self, _session: &SessionHandle) -> Result<Guess, GameError> {
        self.win_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_win {
            return Err(GameError::Unavailable(anyhow!("service went away")));
        }
        Ok(Guess {
            name: "Mario".to_string(),
            description: "Video game character".to_string(),
            confidence: 0.97,
            image_url: Some("https://example.com/mario.png".to_string()),
        })
    }
}

/// A dispatcher wired to mocks, with `!` as the default prefix
pub struct TestBot {
    pub dispatcher: Arc<Dispatcher>,
    pub gateway: Arc<MockGateway>,
    pub settings: Arc<MemorySettingsStore>,
}

impl TestBot {
    pub fn new(handlers: Vec<Arc<dyn CommandHandler>>) -> Self {
        Self::build(handlers, None)
    }

    pub fn with_guessing(
        handlers: Vec<Arc<dyn CommandHandler>>,
        service: Arc<ScriptedGuessingService>,
    ) -> Self {
        Self::build(handlers, Some(service))
    }

    fn build(
        handlers: Vec<Arc<dyn CommandHandler>>,
        service: Option<Arc<ScriptedGuessingService>>,
    ) -> Self {
        let gateway = Arc::new(MockGateway::new());
        let settings = Arc::new(MemorySettingsStore::new());
        let mut registry = CommandRegistry::new();
        for handler in handlers {
            registry.register(handler).unwrap();
        }

        let mut ctx = CommandContext::new(gateway.clone(), settings.clone(), Arc::new(registry), "!");
        if let Some(service) = service {
            ctx = ctx.with_guessing(service);
        }

        Self {
            dispatcher: Arc::new(Dispatcher::new(Arc::new(ctx))),
            gateway,
            settings,
        }
    }

    /// Dispatch on a separate task, for flows that wait on later events
    pub fn spawn(&self, event: InboundEvent) -> tokio::task::JoinHandle<DispatchOutcome> {
        let dispatcher = self.dispatcher.clone();
        tokio::spawn(async move { dispatcher.handle_event(event).await })
    }
}
