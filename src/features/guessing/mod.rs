//! # Guessing Game Feature
//!
//! The twenty-questions style guessing game collaborator: the player thinks of
//! a character, the service asks yes/no style questions and eventually names
//! its guess. The flow that drives a game lives in
//! [`crate::features::interactive::guessing`].
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0
//! - **Toggleable**: true (registered only when `GUESSING_SERVICE_URL` is set)

pub mod remote;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::core::GameError;

pub use remote::RemoteGuessingService;

/// One of the five answers the service accepts, numbered as the service
/// expects them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "u8")]
pub enum Answer {
    Yes = 0,
    No = 1,
    DontKnow = 2,
    Probably = 3,
    ProbablyNot = 4,
}

impl Answer {
    pub fn index(self) -> u8 {
        self as u8
    }
}

impl From<Answer> for u8 {
    fn from(answer: Answer) -> Self {
        answer.index()
    }
}

/// What a player typed during a game
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerInput {
    Answer(Answer),
    Cancel,
}

impl PlayerInput {
    /// Case-insensitive; `None` for anything unrecognised
    pub fn parse(raw: &str) -> Option<Self> {
        let answer = match raw.trim().to_lowercase().as_str() {
            "yes" => Answer::Yes,
            "no" => Answer::No,
            "don't know" | "dont know" => Answer::DontKnow,
            "probably" => Answer::Probably,
            "probably not" => Answer::ProbablyNot,
            "cancel" => return Some(PlayerInput::Cancel),
            _ => return None,
        };
        Some(PlayerInput::Answer(answer))
    }
}

/// Opaque handle for one running game on the service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionHandle(pub String);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepPrompt {
    pub question: String,
    /// Answer labels as the service words them
    pub answers: Vec<String>,
    /// Service confidence, 0 to 100
    pub progress: f64,
    /// Zero-based step index on the service side
    pub step: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Guess {
    pub name: String,
    pub description: String,
    /// 0.0 to 1.0
    pub confidence: f64,
    pub image_url: Option<String>,
}

impl Guess {
    pub fn confidence_percent(&self) -> f64 {
        (self.confidence * 100.0 * 100.0).round() / 100.0
    }
}

#[async_trait]
pub trait GuessingService: Send + Sync {
    /// Open a new game and return its first question
    async fn start(&self) -> Result<(SessionHandle, StepPrompt), GameError>;

    async fn step(&self, session: &SessionHandle, answer: Answer) -> Result<StepPrompt, GameError>;

    async fn win(&self, session: &SessionHandle) -> Result<Guess, GameError>;
}
