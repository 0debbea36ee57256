//! Handlers for the locker grid and per-locker state changes.
//!
//! Every mutation publishes change events for the collections it touched so
//! live board subscribers reload.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use locker_core::assignment;
use locker_core::board;
use locker_core::error::CoreError;
use locker_core::grid::{self, GridLayout};
use locker_core::locker::Axis;
use locker_core::store::Collection;
use locker_core::student;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::{DataResponse, DataWithWarning};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AssignRequest {
    pub student_id: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct BrokenRequest {
    #[serde(default)]
    pub remarks: String,
}

// ---------------------------------------------------------------------------
// Grid
// ---------------------------------------------------------------------------

/// POST /api/v1/lockers/initialize
///
/// Seed the initial grid. Lockers that already exist are left untouched.
pub async fn initialize(
    user: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let report = grid::initialize(state.store.as_ref(), Some(&user.principal)).await?;

    if !report.created.is_empty() {
        state.notify(Collection::Lockers, None, Some(user.id()));
    }
    if !report.failed.is_empty() {
        tracing::warn!(failed = report.failed.len(), "Some lockers could not be seeded");
    }

    Ok(Json(DataResponse { data: report }))
}

/// GET /api/v1/lockers
pub async fn list_lockers(
    _user: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let lockers = state.store.list_lockers().await?;
    Ok(Json(DataResponse { data: lockers }))
}

/// GET /api/v1/lockers/grid
pub async fn get_grid(
    _user: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let lockers = state.store.list_lockers().await?;
    Ok(Json(DataResponse {
        data: GridLayout::compute(&lockers),
    }))
}

/// GET /api/v1/lockers/board
///
/// One-shot read of the same view the WebSocket feed pushes.
pub async fn get_board(
    _user: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let lockers = state.store.list_lockers().await?;
    let assignments = state.store.list_assignments().await?;
    let responses = state.store.list_responses().await?;
    Ok(Json(DataResponse {
        data: board::compute_view(true, &lockers, &assignments, &responses),
    }))
}

async fn grow_axis(state: &AppState, user: &AuthUser, axis: Axis) -> AppResult<impl IntoResponse> {
    let growth = grid::grow(state.store.as_ref(), axis).await?;
    let status = if growth.created {
        state.notify(Collection::Lockers, Some(&growth.locker.id), Some(user.id()));
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(DataResponse { data: growth })))
}

async fn shrink_axis(state: &AppState, user: &AuthUser, axis: Axis) -> AppResult<impl IntoResponse> {
    let removed = grid::shrink(state.store.as_ref(), axis).await?;
    state.notify(Collection::Lockers, Some(&removed.id), Some(user.id()));
    Ok(Json(DataResponse { data: removed }))
}

/// POST /api/v1/lockers/rows
pub async fn add_row(user: AuthUser, State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    grow_axis(&state, &user, Axis::Row).await
}

/// DELETE /api/v1/lockers/rows
pub async fn remove_row(
    user: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    shrink_axis(&state, &user, Axis::Row).await
}

/// POST /api/v1/lockers/columns
pub async fn add_column(
    user: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    grow_axis(&state, &user, Axis::Column).await
}

/// DELETE /api/v1/lockers/columns
pub async fn remove_column(
    user: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    shrink_axis(&state, &user, Axis::Column).await
}

// ---------------------------------------------------------------------------
// Assignment
// ---------------------------------------------------------------------------

/// GET /api/v1/lockers/{id}/student
///
/// `data` is `null` when the locker has no student.
pub async fn get_student(
    _user: AuthUser,
    State(state): State<AppState>,
    Path(locker_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let student = assignment::resolve_assigned_student(state.store.as_ref(), &locker_id).await?;
    Ok(Json(DataResponse { data: student }))
}

/// POST /api/v1/lockers/{id}/assignment
pub async fn assign(
    user: AuthUser,
    State(state): State<AppState>,
    Path(locker_id): Path<String>,
    Json(input): Json<AssignRequest>,
) -> AppResult<impl IntoResponse> {
    let student = student::find(state.store.as_ref(), &input.student_id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "Student",
                id: input.student_id.clone(),
            })
        })?;

    let outcome = assignment::assign(
        state.store.as_ref(),
        &locker_id,
        &student,
        chrono::Utc::now(),
    )
    .await?;

    state.notify(Collection::Lockers, Some(&locker_id), Some(user.id()));
    state.notify(
        Collection::Assignments,
        Some(&outcome.assignment.id),
        Some(user.id()),
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: outcome })))
}

/// DELETE /api/v1/lockers/{id}/assignment
///
/// Succeeds once the locker is released. A failed signature cleanup is
/// reported in `warning`.
pub async fn unassign(
    user: AuthUser,
    State(state): State<AppState>,
    Path(locker_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let outcome = match assignment::unassign_locker(state.store.as_ref(), &locker_id).await {
        Ok(outcome) => outcome,
        Err(e @ CoreError::PartialFailure { .. }) => {
            // The assignment is already deleted; live views must still see it go.
            state.notify(Collection::Assignments, None, Some(user.id()));
            state.notify(Collection::Lockers, Some(&locker_id), Some(user.id()));
            return Err(e.into());
        }
        Err(e) => return Err(e.into()),
    };

    state.notify(Collection::Lockers, Some(&locker_id), Some(user.id()));
    state.notify(
        Collection::Assignments,
        Some(&outcome.removed_assignment.id),
        Some(user.id()),
    );
    if outcome.signatures_removed > 0 {
        state.notify(Collection::Signatures, None, Some(user.id()));
    }

    let warning = outcome.warning().map(|w| w.to_string());
    Ok(Json(DataWithWarning {
        data: outcome,
        warning,
    }))
}

// ---------------------------------------------------------------------------
// Broken flag
// ---------------------------------------------------------------------------

/// PUT /api/v1/lockers/{id}/broken
pub async fn mark_broken(
    user: AuthUser,
    State(state): State<AppState>,
    Path(locker_id): Path<String>,
    Json(input): Json<BrokenRequest>,
) -> AppResult<impl IntoResponse> {
    let locker = assignment::mark_broken(state.store.as_ref(), &locker_id, &input.remarks).await?;
    state.notify(Collection::Lockers, Some(&locker_id), Some(user.id()));
    Ok(Json(DataResponse { data: locker }))
}

/// DELETE /api/v1/lockers/{id}/broken
pub async fn clear_broken(
    user: AuthUser,
    State(state): State<AppState>,
    Path(locker_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let locker = assignment::clear_broken(state.store.as_ref(), &locker_id).await?;
    state.notify(Collection::Lockers, Some(&locker_id), Some(user.id()));
    Ok(Json(DataResponse { data: locker }))
}
