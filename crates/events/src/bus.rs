//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] fans out [`DisplayEvent`]s to any number of observers. It is
//! shared via `Arc<EventBus>` between the editor and background tasks.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use vox_core::assignments::StateChange;
use vox_core::types::EventId;

// ---------------------------------------------------------------------------
// DisplayEvent
// ---------------------------------------------------------------------------

/// Notification that the editor applied a change and republished.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayEvent {
    /// Dot-separated event name, e.g. `"assignment.assigned"`.
    pub event_type: String,

    /// The event instance that was selected when the change was applied.
    pub event_id: Option<EventId>,

    /// Number of entries in the snapshot that was published, if any.
    pub published_entries: Option<usize>,

    /// The change itself, serialized.
    pub payload: serde_json::Value,

    /// When the event was created (UTC).
    pub timestamp: DateTime<Utc>,
}

impl DisplayEvent {
    /// Create a new event with only the required `event_type`.
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            event_id: None,
            published_entries: None,
            payload: serde_json::Value::Object(Default::default()),
            timestamp: Utc::now(),
        }
    }

    /// Build the event describing an applied store change.
    pub fn from_change(change: &StateChange) -> Self {
        let mut payload = serde_json::to_value(&change.kind).unwrap_or_default();
        if let (Some(photo), Some(fields)) = (&change.released_photo, payload.as_object_mut()) {
            fields.insert("released_photo".into(), photo.clone().into());
        }
        Self::new(change.kind.name()).with_payload(payload)
    }

    /// Attach the selected event instance.
    pub fn with_event(mut self, event_id: Option<EventId>) -> Self {
        self.event_id = event_id;
        self
    }

    /// Record how many entries the published snapshot carried.
    pub fn with_published_entries(mut self, entries: Option<usize>) -> Self {
        self.published_entries = entries;
        self
    }

    /// Set the JSON payload for the event.
    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 256;

/// In-process fan-out event bus.
///
/// # Usage
///
/// ```rust
/// use vox_events::bus::{DisplayEvent, EventBus};
///
/// let bus = EventBus::default();
/// let mut rx = bus.subscribe();
///
/// bus.publish(DisplayEvent::new("position.added"));
/// ```
pub struct EventBus {
    sender: broadcast::Sender<DisplayEvent>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full, the oldest un-consumed messages are dropped
    /// and slow receivers will observe a `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    ///
    /// If there are no active subscribers the event is silently dropped.
    pub fn publish(&self, event: DisplayEvent) {
        // A SendError only means there are zero receivers.
        let _ = self.sender.send(event);
    }

    /// Subscribe to all events published on this bus.
    pub fn subscribe(&self) -> broadcast::Receiver<DisplayEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use vox_core::assignments::AssignmentStore;

    use super::*;

    #[tokio::test]
    async fn publish_and_receive_single_subscriber() {
        let bus = EventBus::default();
        let mut rx = bus.subscribe();
        let event_id = uuid::Uuid::new_v4();

        bus.publish(
            DisplayEvent::new("assignment.assigned")
                .with_event(Some(event_id))
                .with_published_entries(Some(5))
                .with_payload(serde_json::json!({"position_id": "x"})),
        );

        let received = rx.recv().await.expect("should receive the event");
        assert_eq!(received.event_type, "assignment.assigned");
        assert_eq!(received.event_id, Some(event_id));
        assert_eq!(received.published_entries, Some(5));
        assert_eq!(received.payload["position_id"], "x");
    }

    #[tokio::test]
    async fn multiple_subscribers_receive_same_event() {
        let bus = EventBus::default();
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        bus.publish(DisplayEvent::new("position.added"));

        let e1 = rx1.recv().await.expect("subscriber 1 should receive");
        let e2 = rx2.recv().await.expect("subscriber 2 should receive");
        assert_eq!(e1.event_type, "position.added");
        assert_eq!(e2.event_type, "position.added");
    }

    #[test]
    fn publish_with_no_subscribers_does_not_panic() {
        let bus = EventBus::default();
        bus.publish(DisplayEvent::new("orphan.event"));
    }

    #[test]
    fn from_change_uses_change_name_and_payload() {
        let mut store = AssignmentStore::new();
        let change = store.add_position();

        let event = DisplayEvent::from_change(&change);
        assert_eq!(event.event_type, "position.added");
        assert_eq!(event.payload["type"], "position_added");
        assert!(event.payload["position_id"].is_string());
        assert_eq!(event.payload["number"], 1);
        assert!(event.payload.get("released_photo").is_none());
    }

    #[test]
    fn from_change_records_released_photo() {
        let mut store = AssignmentStore::new();
        store.add_position();
        let id = store.positions()[0].id;
        store.set_position_photo(id, "old.png".into());

        let change = store.clear_position_photo(id).unwrap();
        let event = DisplayEvent::from_change(&change);
        assert_eq!(event.event_type, "position.updated");
        assert_eq!(event.payload["released_photo"], "old.png");
    }
}
