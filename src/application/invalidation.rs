//! InvalidationBus and the stop → clear → emit sequence.

use std::sync::Arc;

use tokio::sync::{broadcast, Mutex};

use super::poller::PollerSwitch;
use super::session_store::SessionStore;
use crate::domain::guest::{InvalidationEvent, InvalidationReason, SessionToken};

/// Buffered events per subscriber.
const INVALIDATION_CHANNEL_CAPACITY: usize = 8;

/// Broadcast point for terminal invalidation events.
#[derive(Debug, Clone)]
pub struct InvalidationBus {
    sender: broadcast::Sender<InvalidationEvent>,
}

impl Default for InvalidationBus {
    fn default() -> Self {
        let (sender, _) = broadcast::channel(INVALIDATION_CHANNEL_CAPACITY);
        Self { sender }
    }
}

impl InvalidationBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<InvalidationEvent> {
        self.sender.subscribe()
    }

    /// Returns the number of subscribers that received the event.
    fn emit(&self, event: InvalidationEvent) -> usize {
        self.sender.send(event).unwrap_or(0)
    }
}

/// Runs the invalidation sequence: stop every poller, clear the session,
/// then emit exactly one event.
///
/// Each sequence is about one session token. Sequences are serialized; one
/// whose session is gone or was replaced stops nothing and emits nothing.
pub struct SessionInvalidator {
    store: Arc<SessionStore>,
    bus: InvalidationBus,
    pollers: Vec<PollerSwitch>,
    sequence: Mutex<()>,
}

impl SessionInvalidator {
    pub fn new(store: Arc<SessionStore>, bus: InvalidationBus, pollers: Vec<PollerSwitch>) -> Self {
        Self {
            store,
            bus,
            pollers,
            sequence: Mutex::new(()),
        }
    }

    /// Ends the session identified by `token`. Returns whether an event was emitted.
    pub async fn invalidate(
        &self,
        token: &SessionToken,
        reason: InvalidationReason,
        message: Option<String>,
    ) -> bool {
        let _guard = self.sequence.lock().await;

        // 1. Stop polling and 2. clear, both only while `token` is current
        let cleared = self
            .store
            .clear_if_current_with(token, || {
                for poller in &self.pollers {
                    poller.stop();
                }
            })
            .await;
        match cleared {
            Ok(false) => {
                tracing::debug!(
                    reason = %reason,
                    "verdict for a session that is no longer current; ignored"
                );
                return false;
            }
            Ok(true) => {}
            Err(e) => {
                tracing::warn!(
                    reason = %reason,
                    error = %e,
                    "failed to remove stored guest session"
                );
            }
        }

        // 3. Emit
        let event = InvalidationEvent::new(reason, message.unwrap_or_default());
        let receivers = self.bus.emit(event);
        tracing::info!(reason = %reason, receivers, "guest session invalidated");
        true
    }
}
