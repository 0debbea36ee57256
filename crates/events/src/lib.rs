//! Change notification and live views for the locker service.
//!
//! - [`EventBus`]: in-process publish/subscribe hub for [`ChangeEvent`]s,
//!   backed by `tokio::sync::broadcast`.
//! - [`Subscription`]: re-reads a full collection snapshot whenever that
//!   collection changes.
//! - [`BoardFeed`]: fans the lockers, assignments, and responses
//!   subscriptions into one recomputed [`BoardView`](locker_core::board::BoardView).

pub mod bus;
pub mod feed;
pub mod subscription;

pub use bus::{ChangeEvent, EventBus};
pub use feed::BoardFeed;
pub use subscription::Subscription;
