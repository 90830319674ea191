//! Session invalidation events.
//!
//! A 401/403 response clears the stored token and emits
//! [`SessionEvent::Invalidated`]. The host decides what to do with it
//! (reload, prompt for login, exit).

use tokio::sync::broadcast;
use tracing::debug;

/// Capacity of the event channel. Lagging receivers skip old events.
const CHANNEL_CAPACITY: usize = 16;

/// Session lifecycle event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// The server rejected the session; the token has been removed.
    Invalidated {
        /// HTTP status that triggered it.
        status: u16,
    },
}

/// Broadcast channel for [`SessionEvent`]s.
#[derive(Debug, Clone)]
pub struct SessionSignal {
    sender: broadcast::Sender<SessionEvent>,
}

impl SessionSignal {
    /// Creates a signal with no subscribers.
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { sender }
    }

    /// Returns a receiver for events emitted from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.sender.subscribe()
    }

    /// Emits `event`. Returns the number of receivers that got it.
    pub fn emit(&self, event: SessionEvent) -> usize {
        match self.sender.send(event) {
            Ok(receivers) => receivers,
            Err(_) => {
                debug!(?event, "No session subscribers");
                0
            }
        }
    }
}

impl Default for SessionSignal {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_subscriber_receives_event() {
        let signal = SessionSignal::new();
        let mut rx = signal.subscribe();

        assert_eq!(signal.emit(SessionEvent::Invalidated { status: 401 }), 1);
        assert_eq!(
            rx.recv().await.unwrap(),
            SessionEvent::Invalidated { status: 401 }
        );
    }

    #[test]
    fn test_emit_without_subscribers() {
        let signal = SessionSignal::new();
        assert_eq!(signal.emit(SessionEvent::Invalidated { status: 403 }), 0);
    }
}
