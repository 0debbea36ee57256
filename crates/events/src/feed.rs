//! Live locker board.
//!
//! Three [`Subscription`]s (lockers, assignments, responses) push their
//! snapshots into one fan-in task that owns the [`LockerBoard`]. Each
//! snapshot replaces its slot and the view is recomputed from scratch, then
//! published on a `watch` channel when it differs from the last one.

use std::sync::Arc;

use locker_core::board::{BoardView, LockerBoard};
use locker_core::store::Store;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use crate::bus::EventBus;
use crate::subscription::Subscription;

pub struct BoardFeed {
    subscriptions: Vec<Subscription>,
    fan_in: JoinHandle<()>,
    view: watch::Receiver<BoardView>,
}

impl BoardFeed {
    pub fn start(store: Arc<dyn Store>, bus: &EventBus) -> Self {
        let (snapshot_tx, mut snapshot_rx) = mpsc::unbounded_channel();
        let (view_tx, view_rx) = watch::channel(BoardView::default());

        let subscriptions = LockerBoard::SOURCES
            .iter()
            .map(|&collection| {
                let tx = snapshot_tx.clone();
                Subscription::spawn(
                    store.clone(),
                    bus,
                    collection,
                    move |snapshot| {
                        let _ = tx.send(snapshot);
                    },
                    move |e| {
                        tracing::error!(%collection, error = %e, "Board subscription error");
                    },
                )
            })
            .collect();
        drop(snapshot_tx);

        let fan_in = tokio::spawn(async move {
            let mut board = LockerBoard::new();
            while let Some(snapshot) = snapshot_rx.recv().await {
                board.apply(snapshot);
                let view = board.view();
                view_tx.send_if_modified(|current| {
                    if *current == view {
                        false
                    } else {
                        *current = view;
                        true
                    }
                });
            }
        });

        Self {
            subscriptions,
            fan_in,
            view: view_rx,
        }
    }

    /// A receiver that observes every recomputed view.
    pub fn subscribe(&self) -> watch::Receiver<BoardView> {
        self.view.clone()
    }

    /// The most recent view.
    pub fn current(&self) -> BoardView {
        self.view.borrow().clone()
    }

    pub fn subscription_count(&self) -> usize {
        self.subscriptions.len()
    }
}

impl Drop for BoardFeed {
    fn drop(&mut self) {
        self.subscriptions.clear();
        self.fan_in.abort();
    }
}
