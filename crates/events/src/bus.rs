//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! Publishing never blocks and never fails: events sent while nobody is
//! subscribed are dropped, and slow subscribers observe `Lagged`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use vinco_core::types::DbId;

// ---------------------------------------------------------------------------
// ReviewEvent
// ---------------------------------------------------------------------------

/// Something that happened to a candidate or an image's edit history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewEvent {
    /// One of the names in [`crate::event_types`].
    pub event_type: String,
    pub entity_type: Option<String>,
    pub entity_id: Option<DbId>,
    /// The reviewer or editor that triggered the event.
    pub actor_id: Option<DbId>,
    pub payload: serde_json::Value,
    pub timestamp: DateTime<Utc>,
}

impl ReviewEvent {
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            entity_type: None,
            entity_id: None,
            actor_id: None,
            payload: serde_json::Value::Object(Default::default()),
            timestamp: Utc::now(),
        }
    }

    pub fn with_entity(mut self, entity_type: impl Into<String>, entity_id: DbId) -> Self {
        self.entity_type = Some(entity_type.into());
        self.entity_id = Some(entity_id);
        self
    }

    pub fn with_actor(mut self, actor_id: DbId) -> Self {
        self.actor_id = Some(actor_id);
        self
    }

    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

const DEFAULT_CAPACITY: usize = 1024;

/// Fan-out bus shared as `Arc<EventBus>`.
pub struct EventBus {
    sender: broadcast::Sender<ReviewEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish to every current subscriber.
    pub fn publish(&self, event: ReviewEvent) {
        // A send error only means there are no receivers.
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ReviewEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
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
