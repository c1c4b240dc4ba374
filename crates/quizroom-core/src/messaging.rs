//! Outbound participant messaging.
//!
//! The chat-bot transport is an external system; the engine only sees this
//! narrow seam.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One inline keyboard button.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Button {
    pub label: String,
    /// Payload echoed back on selection, `"<routing key>:<value>"`.
    pub callback_data: String,
}

impl Button {
    #[must_use]
    pub fn new(label: impl Into<String>, callback_data: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            callback_data: callback_data.into(),
        }
    }
}

/// Inline keyboard, one button per row.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Keyboard {
    pub buttons: Vec<Button>,
}

/// A message addressed to one participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prompt {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keyboard: Option<Keyboard>,
}

impl Prompt {
    /// A plain text prompt.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            keyboard: None,
        }
    }

    /// A prompt with an inline keyboard. An empty button list yields no
    /// keyboard.
    #[must_use]
    pub fn with_buttons(text: impl Into<String>, buttons: Vec<Button>) -> Self {
        Self {
            text: text.into(),
            keyboard: (!buttons.is_empty()).then_some(Keyboard { buttons }),
        }
    }
}

/// Failure to deliver a prompt to one recipient.
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// The transport could not reach the bot bridge.
    #[error("transport unavailable: {0}")]
    Unavailable(String),

    /// The bot bridge refused the message.
    #[error("message rejected: {0}")]
    Rejected(String),
}

/// Sends prompts to participants.
#[async_trait]
pub trait MessagingTransport: Send + Sync {
    /// Delivers one prompt to one participant.
    async fn send(&self, participant_id: &str, prompt: &Prompt) -> Result<(), DeliveryError>;
}
