//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] is shared via `Arc<EventBus>` across the application.
//! Mutation handlers publish one [`TopicEvent`] per committed change.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::sync::broadcast;
use topichub_core::types::{TopicId, Version};
use topichub_core::TopicChange;

// ---------------------------------------------------------------------------
// Event types
// ---------------------------------------------------------------------------

pub const TOPIC_CREATED: &str = "topic.created";
pub const TOPIC_UPDATED: &str = "topic.updated";
pub const TOPIC_MOVED: &str = "topic.moved";
pub const TOPIC_DELETED: &str = "topic.deleted";

// ---------------------------------------------------------------------------
// TopicEvent
// ---------------------------------------------------------------------------

/// A change to a topic that collaborators may want to hear about.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopicEvent {
    /// Dot-separated event name, e.g. `"topic.moved"`.
    pub event_type: String,

    pub topic_id: TopicId,

    /// Version after the change (the removed version for deletes).
    pub version: Version,

    /// Event-specific data.
    pub payload: serde_json::Value,

    pub timestamp: DateTime<Utc>,
}

impl TopicEvent {
    /// Create an event with an empty payload.
    pub fn new(event_type: impl Into<String>, topic_id: TopicId, version: Version) -> Self {
        Self {
            event_type: event_type.into(),
            topic_id,
            version,
            payload: serde_json::Value::Object(Default::default()),
            timestamp: Utc::now(),
        }
    }

    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }
}

impl From<&TopicChange> for TopicEvent {
    fn from(change: &TopicChange) -> Self {
        let event = TopicEvent::new(event_type_for(change), change.topic_id(), change.version());
        match change {
            TopicChange::Created { topic } => event.with_payload(json!({
                "name": topic.name,
                "parent_id": topic.parent_id,
            })),
            TopicChange::Updated {
                topic,
                previous_version,
            } => event.with_payload(json!({
                "name": topic.name,
                "previous_version": previous_version,
            })),
            TopicChange::Moved { from, to, .. } => event.with_payload(json!({
                "from": from,
                "to": to,
            })),
            TopicChange::Deleted { .. } => event,
        }
    }
}

fn event_type_for(change: &TopicChange) -> &'static str {
    match change {
        TopicChange::Created { .. } => TOPIC_CREATED,
        TopicChange::Updated { .. } => TOPIC_UPDATED,
        TopicChange::Moved { .. } => TOPIC_MOVED,
        TopicChange::Deleted { .. } => TOPIC_DELETED,
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 1024;

/// In-process fan-out event bus.
///
/// When the buffer is full the oldest un-consumed messages are dropped and
/// slow receivers observe `RecvError::Lagged`.
pub struct EventBus {
    sender: broadcast::Sender<TopicEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers. Dropped silently when
    /// nobody is listening.
    pub fn publish(&self, event: TopicEvent) {
        // A SendError only means there are zero receivers.
        let _ = self.sender.send(event);
    }

    /// Publish one event per committed change, in order.
    pub fn publish_changes(&self, changes: &[TopicChange]) {
        for change in changes {
            self.publish(TopicEvent::from(change));
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<TopicEvent> {
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
    use super::*;
    use topichub_core::topic::{NewTopic, TopicUpdate};
    use topichub_core::TopicStore;

    #[tokio::test]
    async fn publish_and_receive_single_subscriber() {
        let bus = EventBus::default();
        let mut rx = bus.subscribe();
        let id = TopicId::new_v4();

        bus.publish(
            TopicEvent::new(TOPIC_UPDATED, id, 3).with_payload(json!({"key": "value"})),
        );

        let received = rx.recv().await.expect("should receive the event");
        assert_eq!(received.event_type, TOPIC_UPDATED);
        assert_eq!(received.topic_id, id);
        assert_eq!(received.version, 3);
        assert_eq!(received.payload["key"], "value");
    }

    #[tokio::test]
    async fn multiple_subscribers_receive_same_event() {
        let bus = EventBus::default();
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        bus.publish(TopicEvent::new(TOPIC_CREATED, TopicId::new_v4(), 1));

        let e1 = rx1.recv().await.expect("subscriber 1 should receive");
        let e2 = rx2.recv().await.expect("subscriber 2 should receive");
        assert_eq!(e1.event_type, TOPIC_CREATED);
        assert_eq!(e2.event_type, TOPIC_CREATED);
    }

    #[test]
    fn publish_with_no_subscribers_does_not_panic() {
        let bus = EventBus::default();
        bus.publish(TopicEvent::new(TOPIC_DELETED, TopicId::new_v4(), 1));
    }

    #[tokio::test]
    async fn committed_changes_become_events() {
        let store = TopicStore::new();
        let bus = EventBus::default();
        let mut rx = bus.subscribe();

        let parent = store.create(NewTopic::new("Parent", "p")).unwrap();
        bus.publish_changes(&parent.changes);
        let child = store
            .create(NewTopic::new("Child", "c").under(parent.value.id))
            .unwrap();
        bus.publish_changes(&child.changes);
        let updated = store
            .create_new_version(child.value.id, TopicUpdate::content("c2"))
            .unwrap();
        bus.publish_changes(&updated.changes);
        let moved = store.move_topic(child.value.id, None).unwrap();
        bus.publish_changes(&moved.changes);
        let deleted = store.delete(child.value.id).unwrap();
        bus.publish_changes(&deleted.changes);

        let mut types = Vec::new();
        for _ in 0..5 {
            types.push(rx.recv().await.unwrap());
        }
        assert_eq!(
            types.iter().map(|e| e.event_type.as_str()).collect::<Vec<_>>(),
            vec![TOPIC_CREATED, TOPIC_CREATED, TOPIC_UPDATED, TOPIC_MOVED, TOPIC_DELETED]
        );
        assert_eq!(types[1].payload["parent_id"], json!(parent.value.id));
        assert_eq!(types[2].payload["previous_version"], 1);
        assert_eq!(types[3].payload["from"], json!(parent.value.id));
        assert!(types[3].payload["to"].is_null());
        assert_eq!(types[4].version, 2);
    }

    #[test]
    fn new_event_has_empty_payload() {
        let event = TopicEvent::new(TOPIC_CREATED, TopicId::new_v4(), 1);
        assert!(event.payload.is_object());
        assert!(event.payload.as_object().unwrap().is_empty());
    }
}
