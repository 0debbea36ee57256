use std::sync::Arc;

use locker_core::store::{Collection, Store};
use locker_events::{ChangeEvent, EventBus};

use crate::config::ServerConfig;
use crate::ws::WsManager;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable; everything inside is behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Document store (Postgres or in-memory).
    pub store: Arc<dyn Store>,
    pub config: Arc<ServerConfig>,
    /// WebSocket connection manager (live board clients).
    pub ws_manager: Arc<WsManager>,
    /// Change notifications that drive live subscriptions.
    pub event_bus: Arc<EventBus>,
}

impl AppState {
    /// Announce that `collection` changed, optionally naming the document
    /// and the principal responsible.
    pub fn notify(&self, collection: Collection, document_id: Option<&str>, actor: Option<&str>) {
        let mut event = ChangeEvent::new(collection);
        if let Some(id) = document_id {
            event = event.with_document(id);
        }
        if let Some(actor) = actor {
            event = event.with_actor(actor);
        }
        self.event_bus.publish(event);
    }
}
