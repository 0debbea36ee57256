//! Public registration routes. These are the only `/api/v1` routes that do
//! not require a bearer token.

use axum::routing::get;
use axum::Router;

use crate::handlers::register;
use crate::state::AppState;

/// Mounted at `/register`.
///
/// ```text
/// GET   /{form_id}   -> get_public_form
/// POST  /{form_id}   -> submit_registration
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route(
        "/{form_id}",
        get(register::get_public_form).post(register::submit_registration),
    )
}
