//! Player event bus
//!
//! The playback controller emits these; the application coordinator
//! consumes them to register plays and advance the track ring.

use tokio::sync::broadcast;

/// Events raised by the playback controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerEvent {
    /// Playback of this song id started successfully
    PlayStarted(i64),
    /// User pressed "next"
    NextRequested,
    /// User pressed "previous"
    PreviousRequested,
    /// Current track reached its end
    Ended,
}

/// Broadcast channel for [`PlayerEvent`]s
///
/// # Examples
///
/// ```
/// use calico_client::events::{EventBus, PlayerEvent};
///
/// let bus = EventBus::new(16);
/// let mut rx = bus.subscribe();
/// bus.emit_lossy(PlayerEvent::NextRequested);
/// assert_eq!(rx.try_recv().unwrap(), PlayerEvent::NextRequested);
/// ```
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<PlayerEvent>,
}

impl EventBus {
    /// Create a bus buffering up to `capacity` events per subscriber
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Subscribe to all future events
    pub fn subscribe(&self) -> broadcast::Receiver<PlayerEvent> {
        self.tx.subscribe()
    }

    /// Emit an event, ignoring the no-subscriber case
    pub fn emit_lossy(&self, event: PlayerEvent) {
        if self.tx.send(event).is_err() {
            tracing::debug!(?event, "No subscribers for player event");
        }
    }
}
