//! Best-effort change notification fan-out.
//!
//! Connected clients (WebSocket handlers, in practice) subscribe to a
//! [`ChangeNotifier`] and receive a [`ChangeEvent`] whenever the active
//! version moves. Delivery is best-effort: a slow or vanished observer
//! never blocks the broadcaster or the other observers. Dropping a
//! receiver unsubscribes it; receivers that fall behind skip the events
//! they missed.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::debug;

/// Default capacity of the per-subscriber event buffer.
pub const DEFAULT_CAPACITY: usize = 64;

/// An observable change to the active version.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ChangeEvent {
    /// The active version moved (new generation, rollback, or restore).
    ActiveChanged { filename: String },
}

impl ChangeEvent {
    /// The event's wire form: one JSON text frame.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).expect("event serialization cannot fail")
    }
}

/// A receiver of change events, valid until dropped.
pub type ChangeStream = broadcast::Receiver<ChangeEvent>;

/// Fan-out broadcaster over the set of currently connected observers.
///
/// The subscriber registry is the broadcast channel's own; add, remove,
/// and broadcast are all safe under concurrent access without an
/// external lock.
pub struct ChangeNotifier {
    sender: broadcast::Sender<ChangeEvent>,
}

impl ChangeNotifier {
    /// Create a notifier with the default per-subscriber buffer.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create a notifier with a specific per-subscriber buffer capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Register a new observer. Dropping the returned stream
    /// unsubscribes it.
    pub fn subscribe(&self) -> ChangeStream {
        self.sender.subscribe()
    }

    /// Deliver `event` to every currently subscribed observer.
    ///
    /// Never fails: an empty observer set and per-observer delivery
    /// problems are both absorbed here. Returns the number of observers
    /// the event was handed to.
    pub fn broadcast(&self, event: ChangeEvent) -> usize {
        match self.sender.send(event) {
            Ok(delivered) => {
                debug!(delivered, "change event broadcast");
                delivered
            }
            Err(_) => 0,
        }
    }

    /// Number of currently subscribed observers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for ChangeNotifier {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::broadcast::error::TryRecvError;

    fn active_changed(name: &str) -> ChangeEvent {
        ChangeEvent::ActiveChanged {
            filename: name.to_string(),
        }
    }

    #[tokio::test]
    async fn broadcast_reaches_every_subscriber() {
        let notifier = ChangeNotifier::new();
        let mut a = notifier.subscribe();
        let mut b = notifier.subscribe();

        let delivered = notifier.broadcast(active_changed("tree_a.png"));
        assert_eq!(delivered, 2);
        assert_eq!(a.try_recv().unwrap(), active_changed("tree_a.png"));
        assert_eq!(b.try_recv().unwrap(), active_changed("tree_a.png"));
    }

    #[tokio::test]
    async fn broadcast_without_subscribers_does_not_fail() {
        let notifier = ChangeNotifier::new();
        assert_eq!(notifier.broadcast(active_changed("tree_a.png")), 0);
    }

    #[tokio::test]
    async fn dropped_subscriber_does_not_affect_others() {
        let notifier = ChangeNotifier::new();
        let mut alive = notifier.subscribe();
        let dropped = notifier.subscribe();
        drop(dropped);

        let delivered = notifier.broadcast(active_changed("tree_b.png"));
        assert_eq!(delivered, 1);
        assert_eq!(alive.try_recv().unwrap(), active_changed("tree_b.png"));
        assert_eq!(notifier.subscriber_count(), 1);
    }

    #[tokio::test]
    async fn lagged_subscriber_skips_but_keeps_receiving() {
        let notifier = ChangeNotifier::with_capacity(1);
        let mut slow = notifier.subscribe();
        let mut fast = notifier.subscribe();

        notifier.broadcast(active_changed("tree_1.png"));
        notifier.broadcast(active_changed("tree_2.png"));

        // The fast reader drained nothing either, but capacity 1 means
        // only the newest event is retained for both.
        assert!(matches!(slow.try_recv(), Err(TryRecvError::Lagged(_))));
        assert_eq!(slow.try_recv().unwrap(), active_changed("tree_2.png"));
        assert!(matches!(fast.try_recv(), Err(TryRecvError::Lagged(_))));
        assert_eq!(fast.try_recv().unwrap(), active_changed("tree_2.png"));
    }

    #[tokio::test]
    async fn subscriber_count_tracks_connections() {
        let notifier = ChangeNotifier::new();
        assert_eq!(notifier.subscriber_count(), 0);
        let a = notifier.subscribe();
        let b = notifier.subscribe();
        assert_eq!(notifier.subscriber_count(), 2);
        drop(a);
        drop(b);
        assert_eq!(notifier.subscriber_count(), 0);
    }

    #[test]
    fn event_wire_form_is_stable_json() {
        let event = active_changed("tree_20251201_103005_000042.png");
        assert_eq!(
            event.to_json(),
            r#"{"event":"active_changed","filename":"tree_20251201_103005_000042.png"}"#
        );
        let parsed: ChangeEvent = serde_json::from_str(&event.to_json()).unwrap();
        assert_eq!(parsed, event);
    }
}
