//! Route definitions for the locker grid.
//!
//! All endpoints require authentication.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::lockers;
use crate::state::AppState;

/// Locker routes mounted at `/lockers`.
///
/// ```text
/// GET     /                    -> list_lockers
/// POST    /initialize          -> initialize
/// GET     /grid                -> get_grid
/// GET     /board               -> get_board
/// POST    /rows                -> add_row
/// DELETE  /rows                -> remove_row
/// POST    /columns             -> add_column
/// DELETE  /columns             -> remove_column
/// GET     /{id}/student        -> get_student
/// POST    /{id}/assignment     -> assign
/// DELETE  /{id}/assignment     -> unassign
/// PUT     /{id}/broken         -> mark_broken
/// DELETE  /{id}/broken         -> clear_broken
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(lockers::list_lockers))
        .route("/initialize", post(lockers::initialize))
        .route("/grid", get(lockers::get_grid))
        .route("/board", get(lockers::get_board))
        .route("/rows", post(lockers::add_row).delete(lockers::remove_row))
        .route(
            "/columns",
            post(lockers::add_column).delete(lockers::remove_column),
        )
        .route("/{id}/student", get(lockers::get_student))
        .route(
            "/{id}/assignment",
            post(lockers::assign).delete(lockers::unassign),
        )
        .route(
            "/{id}/broken",
            put(lockers::mark_broken).delete(lockers::clear_broken),
        )
}
