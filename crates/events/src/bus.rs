//! In-process change bus backed by a `tokio::sync::broadcast` channel.
//!
//! Every successful mutation publishes a [`ChangeEvent`] naming the
//! collection it touched. Shared via `Arc<EventBus>`.

use chrono::{DateTime, Utc};
use locker_core::store::Collection;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

// ---------------------------------------------------------------------------
// ChangeEvent
// ---------------------------------------------------------------------------

/// A write to one collection.
///
/// Carries no document contents; listeners re-read the collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeEvent {
    pub collection: Collection,

    /// The document written, when the change touched a single one.
    pub document_id: Option<String>,

    /// Subject of the principal that made the change.
    pub actor: Option<String>,

    pub timestamp: DateTime<Utc>,
}

impl ChangeEvent {
    pub fn new(collection: Collection) -> Self {
        Self {
            collection,
            document_id: None,
            actor: None,
            timestamp: Utc::now(),
        }
    }

    pub fn with_document(mut self, id: impl Into<String>) -> Self {
        self.document_id = Some(id.into());
        self
    }

    pub fn with_actor(mut self, actor: impl Into<String>) -> Self {
        self.actor = Some(actor.into());
        self
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 1024;

/// In-process fan-out change bus.
///
/// ```rust
/// use locker_core::store::Collection;
/// use locker_events::bus::{ChangeEvent, EventBus};
///
/// let bus = EventBus::default();
/// let mut rx = bus.subscribe();
///
/// bus.publish(ChangeEvent::new(Collection::Lockers).with_document("locker_1003"));
/// ```
pub struct EventBus {
    sender: broadcast::Sender<ChangeEvent>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full the oldest messages are dropped and slow
    /// receivers observe `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish to all current subscribers. Dropped silently when there are none.
    pub fn publish(&self, event: ChangeEvent) {
        let _ = self.sender.send(event);
    }

    /// Publish one event per collection in `collections`.
    pub fn publish_all(&self, collections: &[Collection], actor: Option<&str>) {
        for &collection in collections {
            let mut event = ChangeEvent::new(collection);
            if let Some(actor) = actor {
                event = event.with_actor(actor);
            }
            self.publish(event);
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.sender.subscribe()
    }

    pub fn receiver_count(&self) -> usize {
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
