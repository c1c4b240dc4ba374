//! Test transports: `MessagingTransport` implementations for tests.

use std::sync::Mutex;

use async_trait::async_trait;
use quizroom_core::messaging::{DeliveryError, MessagingTransport, Prompt};

/// A transport that records every delivered prompt. Recipients listed in
/// `unreachable` fail with `DeliveryError::Unavailable` instead.
#[derive(Debug, Default)]
pub struct RecordingTransport {
    sent: Mutex<Vec<(String, Prompt)>>,
    unreachable: Vec<String>,
}

impl RecordingTransport {
    /// Create a transport that accepts every message.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a transport that fails for the given recipients.
    #[must_use]
    pub fn failing_for(unreachable: &[&str]) -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            unreachable: unreachable.iter().map(|s| (*s).to_string()).collect(),
        }
    }

    /// Returns a snapshot of all delivered messages in send order.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn sent(&self) -> Vec<(String, Prompt)> {
        self.sent.lock().unwrap().clone()
    }

    /// Returns the recipients that received a message, in send order.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn recipients(&self) -> Vec<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .map(|(id, _)| id.clone())
            .collect()
    }
}

#[async_trait]
impl MessagingTransport for RecordingTransport {
    async fn send(&self, participant_id: &str, prompt: &Prompt) -> Result<(), DeliveryError> {
        if self.unreachable.iter().any(|id| id == participant_id) {
            return Err(DeliveryError::Unavailable(format!(
                "{participant_id} is unreachable"
            )));
        }
        self.sent
            .lock()
            .unwrap()
            .push((participant_id.to_string(), prompt.clone()));
        Ok(())
    }
}

/// A transport that always fails. Useful for testing that delivery errors
/// never reach the moderator.
#[derive(Debug)]
pub struct FailingTransport;

#[async_trait]
impl MessagingTransport for FailingTransport {
    async fn send(&self, _participant_id: &str, _prompt: &Prompt) -> Result<(), DeliveryError> {
        Err(DeliveryError::Unavailable("connection refused".into()))
    }
}
