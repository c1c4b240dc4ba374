//! Display fan-out.
//!
//! Every display connection owns a bounded channel. Broadcasting never
//! waits: a connection whose channel is full or closed is evicted and the
//! remaining connections still receive the event.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::domain::events::DisplayEvent;

/// Per-connection buffer used when none is configured.
pub const DEFAULT_BUFFER: usize = 32;

/// Receiving half of one display connection.
#[derive(Debug)]
pub struct DisplaySubscription {
    pub id: Uuid,
    pub receiver: mpsc::Receiver<DisplayEvent>,
}

/// Registry of connected displays.
#[derive(Debug, Clone)]
pub struct DisplayHub {
    connections: Arc<Mutex<HashMap<Uuid, mpsc::Sender<DisplayEvent>>>>,
    buffer: usize,
}

impl Default for DisplayHub {
    fn default() -> Self {
        Self::new(DEFAULT_BUFFER)
    }
}

impl DisplayHub {
    /// A hub whose connections buffer up to `buffer` events.
    #[must_use]
    pub fn new(buffer: usize) -> Self {
        Self {
            connections: Arc::new(Mutex::new(HashMap::new())),
            buffer: buffer.max(1),
        }
    }

    fn connections(&self) -> MutexGuard<'_, HashMap<Uuid, mpsc::Sender<DisplayEvent>>> {
        self.connections
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Registers a new connection.
    #[must_use]
    pub fn subscribe(&self) -> DisplaySubscription {
        let (sender, receiver) = mpsc::channel(self.buffer);
        let id = Uuid::new_v4();
        self.connections().insert(id, sender);
        debug!(connection_id = %id, "Display connected");
        DisplaySubscription { id, receiver }
    }

    pub fn unsubscribe(&self, id: Uuid) {
        if self.connections().remove(&id).is_some() {
            debug!(connection_id = %id, "Display disconnected");
        }
    }

    /// Number of live connections.
    #[must_use]
    pub fn len(&self) -> usize {
        self.connections().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sends `event` to every connection without waiting. Returns how many
    /// connections accepted it.
    pub fn broadcast(&self, event: &DisplayEvent) -> usize {
        let mut connections = self.connections();
        let mut evicted = Vec::new();
        for (id, sender) in connections.iter() {
            match sender.try_send(event.clone()) {
                Ok(()) => {}
                Err(TrySendError::Full(_)) => {
                    warn!(connection_id = %id, event = event.name(), "Display lagging, dropping connection");
                    evicted.push(*id);
                }
                Err(TrySendError::Closed(_)) => {
                    debug!(connection_id = %id, "Display gone, dropping connection");
                    evicted.push(*id);
                }
            }
        }
        for id in &evicted {
            connections.remove(id);
        }
        connections.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_broadcast_reaches_every_subscriber() {
        // Arrange
        let hub = DisplayHub::new(4);
        let mut a = hub.subscribe();
        let mut b = hub.subscribe();

        // Act
        let delivered = hub.broadcast(&DisplayEvent::Reload);

        // Assert
        assert_eq!(delivered, 2);
        assert_eq!(a.receiver.recv().await, Some(DisplayEvent::Reload));
        assert_eq!(b.receiver.recv().await, Some(DisplayEvent::Reload));
    }

    #[tokio::test]
    async fn test_broken_connection_is_evicted_and_others_still_receive() {
        // Arrange
        let hub = DisplayHub::new(4);
        let broken = hub.subscribe();
        let mut healthy = hub.subscribe();
        drop(broken.receiver);

        // Act
        let delivered = hub.broadcast(&DisplayEvent::Reload);

        // Assert
        assert_eq!(delivered, 1);
        assert_eq!(hub.len(), 1);
        assert_eq!(healthy.receiver.recv().await, Some(DisplayEvent::Reload));
    }

    #[tokio::test]
    async fn test_full_connection_is_evicted_without_blocking() {
        // Arrange
        let hub = DisplayHub::new(1);
        let _stalled = hub.subscribe();
        let mut live = hub.subscribe();

        // Act
        hub.broadcast(&DisplayEvent::Reload);
        let _ = live.receiver.recv().await;
        let delivered = hub.broadcast(&DisplayEvent::Reload);

        // Assert
        assert_eq!(delivered, 1);
        assert_eq!(live.receiver.recv().await, Some(DisplayEvent::Reload));
    }

    #[test]
    fn test_unsubscribe_removes_connection() {
        let hub = DisplayHub::default();
        let sub = hub.subscribe();

        hub.unsubscribe(sub.id);

        assert!(hub.is_empty());
    }
}
