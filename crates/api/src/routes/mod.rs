pub mod dashboard;
pub mod forms;
pub mod health;
pub mod lockers;
pub mod register;
pub mod responses;

use axum::routing::{get, post};
use axum::Router;

use crate::handlers;
use crate::state::AppState;
use crate::ws;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /ws                                      live board (token in query)
///
/// /lockers                                 list
/// /lockers/initialize                      seed the initial grid (POST)
/// /lockers/grid                            grid layout
/// /lockers/board                           board view
/// /lockers/rows                            grow (POST), shrink (DELETE)
/// /lockers/columns                         grow (POST), shrink (DELETE)
/// /lockers/{id}/student                    assigned student
/// /lockers/{id}/assignment                 assign (POST), unassign (DELETE)
/// /lockers/{id}/broken                     mark (PUT), clear (DELETE)
///
/// /assignments                             list
/// /assignments/{id}/signature              capture signature (POST)
///
/// /signatures                              list
///
/// /forms                                   list, create
/// /forms/{id}                              get, update, delete
///
/// /responses                               list (?search=)
/// /responses/bulk-delete                   bulk delete (POST)
/// /responses/export                        CSV roster
/// /responses/{id}                          delete
///
/// /students                                search (?search=)
///
/// /dashboard/stats                         statistics
/// /dashboard/activity                      recent activity
///
/// /register/{form_id}                      public form, submit (no auth)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/ws", get(ws::ws_handler))
        .nest("/lockers", lockers::router())
        .route(
            "/assignments",
            get(handlers::assignments::list_assignments),
        )
        .route(
            "/assignments/{id}/signature",
            post(handlers::assignments::capture_signature),
        )
        .route("/signatures", get(handlers::signatures::list_signatures))
        .nest("/forms", forms::router())
        .nest("/responses", responses::router())
        .route("/students", get(handlers::students::search_students))
        .nest("/dashboard", dashboard::router())
        .nest("/register", register::router())
}
