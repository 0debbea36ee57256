//! Route definitions for the admin dashboard.

use axum::routing::get;
use axum::Router;

use crate::handlers::dashboard;
use crate::state::AppState;

/// Dashboard routes mounted at `/dashboard`.
///
/// ```text
/// GET  /stats      -> get_stats
/// GET  /activity   -> get_activity
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/stats", get(dashboard::get_stats))
        .route("/activity", get(dashboard::get_activity))
}
