//! HTTP client for a guessing-game proxy.
//!
//! The proxy exposes three JSON endpoints relative to its base URL:
//!
//! - `POST start` with `{"region"}` returns `{"session", "question", "answers", "progress", "step"}`
//! - `POST step` with `{"session", "answer"}` returns the next prompt
//! - `POST win` with `{"session"}` returns `{"name", "description", "confidence", "image_url"}`
//!
//! Every failure, whether transport, status, or body, collapses into
//! [`GameError::Unavailable`].

use std::time::Duration;

use anyhow::anyhow;
use async_trait::async_trait;
use log::debug;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::{Answer, Guess, GuessingService, SessionHandle, StepPrompt};
use crate::core::GameError;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

pub struct RemoteGuessingService {
    client: reqwest::Client,
    base_url: String,
    region: String,
}

#[derive(Serialize)]
struct StartRequest<'a> {
    region: &'a str,
}

#[derive(Deserialize)]
struct StartResponse {
    session: String,
    #[serde(flatten)]
    prompt: StepPrompt,
}

#[derive(Serialize)]
struct StepRequest<'a> {
    session: &'a str,
    answer: Answer,
}

#[derive(Serialize)]
struct SessionRequest<'a> {
    session: &'a str,
}

impl RemoteGuessingService {
    pub fn new(base_url: impl Into<String>, region: impl Into<String>) -> Result<Self, GameError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent("Mozilla/5.0 (compatible; StewardBot/1.0)")
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            region: region.into(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, GameError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.endpoint(path);
        debug!("Guessing service request: POST {}", url);

        let response = self.client.post(&url).json(body).send().await.map_err(|e| {
            if e.is_timeout() {
                anyhow!("Request timed out after {} seconds", REQUEST_TIMEOUT.as_secs())
            } else if e.is_connect() {
                anyhow!("Could not connect to the guessing service")
            } else {
                anyhow!("HTTP request failed: {e}")
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(anyhow!("Guessing service returned HTTP {status}").into());
        }

        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl GuessingService for RemoteGuessingService {
    async fn start(&self) -> Result<(SessionHandle, StepPrompt), GameError> {
        let started: StartResponse = self
            .post("start", &StartRequest { region: &self.region })
            .await?;
        Ok((SessionHandle(started.session), started.prompt))
    }

    async fn step(&self, session: &SessionHandle, answer: Answer) -> Result<StepPrompt, GameError> {
        self.post(
            "step",
            &StepRequest {
                session: &session.0,
                answer,
            },
        )
        .await
    }

    async fn win(&self, session: &SessionHandle) -> Result<Guess, GameError> {
        self.post("win", &SessionRequest { session: &session.0 }).await
    }
}
