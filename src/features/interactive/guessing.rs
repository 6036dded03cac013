//! Guessing game flow.
//!
//! ```text
//! Starting -> AwaitingAnswer -> Advancing -> AwaitingAnswer -> ... -> Concluding -> Done
//!                  |  \-> Retrying -> AwaitingAnswer
//!                  |-> Cancelled
//!                  \-> TimedOut
//! Starting | Advancing | Concluding -> Failed
//! ```
//!
//! The flow owns its [`ConversationState`]; nothing else mutates it. Each
//! turn opens exactly one wait and closes it before the next.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0

use std::time::Duration;

use anyhow::Result;
use log::{debug, error, info};

use super::waiter::ResponseWaiter;
use crate::commands::InvocationContext;
use crate::core::{colors, Embed};
use crate::features::guessing::{Answer, GuessingService, PlayerInput, SessionHandle, StepPrompt};
use crate::gateway::MessageHandle;

const TITLE: &str = "Akinator";
const INVALID_INPUT: &str = "That's not a valid input. Please try again.";
const UNAVAILABLE: &str =
    "Akinator is experiencing some issues right now sorry. Your game has been cancelled.";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GuessingConfig {
    pub turn_timeout: Duration,
    /// Progress (0 to 100) at which the service is asked for its guess
    pub confidence_threshold: f64,
    pub max_steps: u32,
}

impl Default for GuessingConfig {
    fn default() -> Self {
        Self {
            turn_timeout: Duration::from_secs(60),
            confidence_threshold: 95.0,
            max_steps: 80,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FlowState {
    Starting,
    AwaitingAnswer,
    Advancing(Answer),
    Retrying,
    Concluding,
    Done,
    Cancelled,
    TimedOut,
    Failed,
}

impl FlowState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            FlowState::Done | FlowState::Cancelled | FlowState::TimedOut | FlowState::Failed
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConversationState {
    /// Answers accepted so far
    pub step: u32,
    pub progress: f64,
    pub last_choice: Option<Answer>,
    pub finished: bool,
}

pub struct GuessingFlow<'a> {
    inv: &'a InvocationContext,
    waiter: &'a ResponseWaiter,
    service: &'a dyn GuessingService,
    config: GuessingConfig,
    state: ConversationState,
    session: Option<SessionHandle>,
    prompt: Option<StepPrompt>,
}

impl<'a> GuessingFlow<'a> {
    pub fn new(
        inv: &'a InvocationContext,
        waiter: &'a ResponseWaiter,
        service: &'a dyn GuessingService,
        config: GuessingConfig,
    ) -> Self {
        Self {
            inv,
            waiter,
            service,
            config,
            state: ConversationState::default(),
            session: None,
            prompt: None,
        }
    }

    pub fn conversation(&self) -> &ConversationState {
        &self.state
    }

    fn base_embed(&self) -> Embed {
        Embed::new()
            .title(TITLE)
            .color(colors::BLUE)
            .footer_with_icon(self.inv.author_name.clone(), self.inv.author.avatar_url.clone())
    }

    fn status_embed(&self, description: &str, color: u32) -> Embed {
        self.base_embed().color(color).description(description)
    }

    fn question_embed(&self, prompt: &StepPrompt) -> Embed {
        let options = if prompt.answers.is_empty() {
            "Cancel".to_string()
        } else {
            format!("{}, Cancel", prompt.answers.join(", "))
        };
        self.base_embed()
            .description(format!("**#{}**: {}", self.state.step + 1, prompt.question))
            .footer_with_icon(format!("Options: {options}"), self.inv.author.avatar_url.clone())
    }

    fn record(&mut self, prompt: StepPrompt) {
        self.state.progress = prompt.progress;
        self.prompt = Some(prompt);
    }

    fn should_conclude(&self) -> bool {
        self.state.progress >= self.config.confidence_threshold
            || self.state.step >= self.config.max_steps
    }

    /// Show the current question, reusing `message` when given
    async fn show_question(&self, message: Option<MessageHandle>) -> Result<()> {
        let Some(prompt) = &self.prompt else {
            return Ok(());
        };
        let embed = self.question_embed(prompt);
        match message {
            Some(handle) => self.inv.edit(handle, embed).await,
            None => self.inv.follow_up(embed).await.map(|_| ()),
        }
    }

    /// Drive the game to a terminal state
    pub async fn run(mut self) -> Result<(FlowState, ConversationState)> {
        let mut flow = FlowState::Starting;

        while !flow.is_terminal() {
            debug!("[{}] Guessing flow: {:?}", self.inv.request_id, flow);
            flow = match flow {
                FlowState::Starting => self.start().await?,
                FlowState::AwaitingAnswer => self.await_answer().await,
                FlowState::Retrying => {
                    self.inv.follow_up(INVALID_INPUT).await?;
                    self.show_question(None).await?;
                    FlowState::AwaitingAnswer
                }
                FlowState::Advancing(answer) => self.advance(answer).await?,
                FlowState::Concluding => self.conclude().await?,
                terminal => terminal,
            };
        }

        self.finish(flow).await?;
        Ok((flow, self.state))
    }

    async fn start(&mut self) -> Result<FlowState> {
        let starting = self
            .inv
            .reply(self.status_embed("🧠 Starting up...", colors::BLUE))
            .await?;

        match self.service.start().await {
            Ok((session, prompt)) => {
                info!("[{}] 🧠 Guessing game started", self.inv.request_id);
                self.session = Some(session);
                self.record(prompt);
                if self.should_conclude() {
                    return Ok(FlowState::Concluding);
                }
                self.show_question(Some(starting)).await?;
                Ok(FlowState::AwaitingAnswer)
            }
            Err(e) => {
                error!("[{}] ❌ Guessing game failed to start: {:#}", self.inv.request_id, e);
                Ok(FlowState::Failed)
            }
        }
    }

    async fn await_answer(&mut self) -> FlowState {
        let reply = self
            .waiter
            .await_message(self.inv.channel_id, self.inv.author.id, self.config.turn_timeout)
            .await;

        match reply {
            None => FlowState::TimedOut,
            Some(message) => match PlayerInput::parse(&message.content) {
                Some(PlayerInput::Cancel) => FlowState::Cancelled,
                Some(PlayerInput::Answer(answer)) => FlowState::Advancing(answer),
                None => FlowState::Retrying,
            },
        }
    }

    async fn advance(&mut self, answer: Answer) -> Result<FlowState> {
        self.state.last_choice = Some(answer);
        self.state.step += 1;

        let Some(session) = self.session.clone() else {
            return Ok(FlowState::Failed);
        };
        if self.state.step >= self.config.max_steps {
            return Ok(FlowState::Concluding);
        }

        let thinking = self
            .inv
            .follow_up(self.status_embed("🤔 Thinking...", colors::BLUE))
            .await?;

        match self.service.step(&session, answer).await {
            Ok(prompt) => {
                self.record(prompt);
                if self.should_conclude() {
                    if let Err(e) = self.inv.delete(thinking).await {
                        debug!("[{}] Thinking message already gone: {:#}", self.inv.request_id, e);
                    }
                    return Ok(FlowState::Concluding);
                }
                self.show_question(Some(thinking)).await?;
                Ok(FlowState::AwaitingAnswer)
            }
            Err(e) => {
                error!("[{}] ❌ Guessing game step failed: {:#}", self.inv.request_id, e);
                Ok(FlowState::Failed)
            }
        }
    }

    async fn conclude(&mut self) -> Result<FlowState> {
        let Some(session) = self.session.clone() else {
            return Ok(FlowState::Failed);
        };

        match self.service.win(&session).await {
            Ok(guess) => {
                let mut embed = self
                    .status_embed(
                        &format!(
                            "**I'm {}% sure it's...**\n\n{}\n*{}*",
                            guess.confidence_percent(),
                            guess.name,
                            guess.description
                        ),
                        colors::GREEN,
                    );
                if let Some(url) = &guess.image_url {
                    embed = embed.thumbnail(url.clone());
                }
                self.inv.follow_up(embed).await?;
                self.state.finished = true;
                info!(
                    "[{}] ✅ Guessing game finished after {} step(s): {}",
                    self.inv.request_id, self.state.step, guess.name
                );
                Ok(FlowState::Done)
            }
            Err(e) => {
                error!("[{}] ❌ Guessing game could not conclude: {:#}", self.inv.request_id, e);
                Ok(FlowState::Failed)
            }
        }
    }

    async fn finish(&self, terminal: FlowState) -> Result<()> {
        let notice = match terminal {
            FlowState::Cancelled => "Game cancelled!",
            FlowState::TimedOut => "Cancelling game due to inactivity.",
            FlowState::Failed => UNAVAILABLE,
            _ => return Ok(()),
        };
        self.inv.follow_up(self.status_embed(notice, colors::RED)).await?;
        Ok(())
    }
}
