//! `MessagingTransport` implementations for the bot side.

use std::time::Duration;

use async_trait::async_trait;
use quizroom_engine::{DeliveryError, Keyboard, MessagingTransport, Prompt};
use serde::Serialize;
use tracing::{debug, info};

use crate::error::AppError;

/// Body POSTed to the bot bridge for each prompt.
#[derive(Debug, Serialize)]
pub struct OutgoingMessage<'a> {
    pub participant_id: &'a str,
    pub text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keyboard: Option<&'a Keyboard>,
}

/// Delivers prompts by POSTing JSON to a bot bridge.
#[derive(Debug, Clone)]
pub struct WebhookTransport {
    client: reqwest::Client,
    url: String,
}

impl WebhookTransport {
    /// # Errors
    ///
    /// Returns `AppError::Transport` if the HTTP client cannot be built.
    pub fn new(url: impl Into<String>) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| AppError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl MessagingTransport for WebhookTransport {
    async fn send(&self, participant_id: &str, prompt: &Prompt) -> Result<(), DeliveryError> {
        let body = OutgoingMessage {
            participant_id,
            text: &prompt.text,
            keyboard: prompt.keyboard.as_ref(),
        };
        let response = self
            .client
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(|e| DeliveryError::Unavailable(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(DeliveryError::Rejected(format!(
                "bot bridge answered {status}"
            )));
        }
        debug!(participant_id, "Prompt posted to bot bridge");
        Ok(())
    }
}

/// Logs prompts instead of delivering them.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogTransport;

#[async_trait]
impl MessagingTransport for LogTransport {
    async fn send(&self, participant_id: &str, prompt: &Prompt) -> Result<(), DeliveryError> {
        info!(
            participant_id,
            text = %prompt.text,
            buttons = prompt.keyboard.as_ref().map_or(0, |k| k.buttons.len()),
            "Prompt (no bot bridge configured)"
        );
        Ok(())
    }
}
