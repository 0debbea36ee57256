use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::Json;
use locker_core::student;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::query::SearchParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/students?search=
///
/// Students projected from registrations, for the assign dialog.
pub async fn search_students(
    _user: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> AppResult<impl IntoResponse> {
    let students = student::search(state.store.as_ref(), params.term()).await?;
    Ok(Json(DataResponse { data: students }))
}
