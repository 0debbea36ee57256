use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use locker_core::signature::record;
use locker_core::signature::CaptureScript;
use locker_core::store::Collection;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/assignments
pub async fn list_assignments(
    _user: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let assignments = state.store.list_assignments().await?;
    Ok(Json(DataResponse { data: assignments }))
}

/// POST /api/v1/assignments/{id}/signature
///
/// Replay the submitted pointer events, export the pad as PNG, store the
/// signature record, and attach it to the assignment.
pub async fn capture_signature(
    user: AuthUser,
    State(state): State<AppState>,
    Path(assignment_id): Path<String>,
    Json(script): Json<CaptureScript>,
) -> AppResult<impl IntoResponse> {
    let captured = record::capture_for_assignment(
        state.store.as_ref(),
        &assignment_id,
        &script,
        chrono::Utc::now(),
    )
    .await?;

    state.notify(
        Collection::Signatures,
        Some(&captured.record.id),
        Some(user.id()),
    );
    state.notify(Collection::Assignments, Some(&assignment_id), Some(user.id()));

    Ok((StatusCode::CREATED, Json(DataResponse { data: captured })))
}
