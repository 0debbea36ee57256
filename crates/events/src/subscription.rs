//! Full-snapshot collection subscriptions.
//!
//! A [`Subscription`] delivers the complete current contents of one
//! collection on start and again after every [`ChangeEvent`] for that
//! collection. Listeners never see deltas. Dropping the subscription stops
//! its task, so no callback runs after teardown.

use std::sync::Arc;

use locker_core::error::StoreError;
use locker_core::store::{self, Collection, Snapshot, Store};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::bus::{ChangeEvent, EventBus};

pub struct Subscription {
    collection: Collection,
    handle: JoinHandle<()>,
}

impl Subscription {
    /// Start listening to `collection`.
    ///
    /// `on_snapshot` receives every snapshot; `on_error` receives read
    /// failures (permission denied, transport). A failed read does not end
    /// the subscription; the next change event triggers another read.
    pub fn spawn<S, E>(
        store: Arc<dyn Store>,
        bus: &EventBus,
        collection: Collection,
        mut on_snapshot: S,
        mut on_error: E,
    ) -> Self
    where
        S: FnMut(Snapshot) + Send + 'static,
        E: FnMut(StoreError) + Send + 'static,
    {
        // Subscribe before the first read so no change slips in between.
        let mut receiver = bus.subscribe();

        let handle = tokio::spawn(async move {
            match store::load_snapshot(store.as_ref(), collection).await {
                Ok(snapshot) => on_snapshot(snapshot),
                Err(e) => on_error(e),
            }

            loop {
                match receiver.recv().await {
                    Ok(ChangeEvent { collection: changed, .. }) if changed != collection => continue,
                    Ok(_) => {}
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(%collection, skipped, "Subscription lagged, reloading snapshot");
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        tracing::debug!(%collection, "Event bus closed, subscription ending");
                        break;
                    }
                }

                match store::load_snapshot(store.as_ref(), collection).await {
                    Ok(snapshot) => on_snapshot(snapshot),
                    Err(e) => {
                        tracing::error!(%collection, error = %e, "Failed to reload collection snapshot");
                        on_error(e);
                    }
                }
            }
        });

        Self { collection, handle }
    }

    pub fn collection(&self) -> Collection {
        self.collection
    }

    pub fn is_active(&self) -> bool {
        !self.handle.is_finished()
    }

    /// Stop listening. Equivalent to dropping the subscription.
    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
