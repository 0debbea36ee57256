use axum::routing::{delete, get, post};
use axum::Router;

use crate::handlers::responses;
use crate::state::AppState;

/// Registration response routes mounted at `/responses`.
///
/// ```text
/// GET     /               -> list_responses
/// POST    /bulk-delete    -> bulk_delete_responses
/// GET     /export         -> export_responses
/// DELETE  /{id}           -> delete_response
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(responses::list_responses))
        .route("/bulk-delete", post(responses::bulk_delete_responses))
        .route("/export", get(responses::export_responses))
        .route("/{id}", delete(responses::delete_response))
}
