//! Handlers for submitted registrations and the roster export.

use axum::extract::{Path, Query, State};
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use locker_core::error::CoreError;
use locker_core::roster;
use locker_core::store::Collection;
use locker_core::student::{self, Response};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::query::SearchParams;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct BulkDeleteRequest {
    pub ids: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct BulkDeleteResult {
    pub requested: usize,
    pub deleted: u64,
}

/// GET /api/v1/responses?search=
///
/// Newest first; `search` matches name, school number, or class.
pub async fn list_responses(
    _user: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> AppResult<impl IntoResponse> {
    let all = state.store.list_responses().await?;
    let matching: Vec<Response> = student::search_responses(&all, params.term())
        .into_iter()
        .cloned()
        .collect();
    Ok(Json(DataResponse { data: matching }))
}

/// DELETE /api/v1/responses/{id}
pub async fn delete_response(
    user: AuthUser,
    State(state): State<AppState>,
    Path(response_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let deleted = state
        .store
        .delete_responses(std::slice::from_ref(&response_id))
        .await?;
    if deleted == 0 {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Response",
            id: response_id,
        }));
    }

    tracing::info!(response_id = %response_id, principal = %user.id(), "Response deleted");
    state.notify(Collection::Responses, Some(&response_id), Some(user.id()));
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/responses/bulk-delete
pub async fn bulk_delete_responses(
    user: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<BulkDeleteRequest>,
) -> AppResult<impl IntoResponse> {
    if input.ids.is_empty() {
        return Err(AppError::BadRequest("No responses selected".into()));
    }

    let deleted = state.store.delete_responses(&input.ids).await?;
    tracing::info!(
        requested = input.ids.len(),
        deleted,
        principal = %user.id(),
        "Responses bulk deleted",
    );
    if deleted > 0 {
        state.notify(Collection::Responses, None, Some(user.id()));
    }

    Ok(Json(DataResponse {
        data: BulkDeleteResult {
            requested: input.ids.len(),
            deleted,
        },
    }))
}

/// GET /api/v1/responses/export
///
/// The roster as a CSV attachment.
pub async fn export_responses(
    _user: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let responses = state.store.list_responses().await?;
    let assignments = state.store.list_assignments().await?;

    let rows = roster::build_rows(&responses, &assignments);
    let csv = roster::to_csv(&rows);
    let disposition = format!(
        "attachment; filename=\"{}\"",
        roster::file_name(chrono::Utc::now())
    );

    tracing::info!(rows = rows.len(), "Roster exported");
    Ok((
        [
            (CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (CONTENT_DISPOSITION, disposition),
        ],
        csv,
    ))
}
