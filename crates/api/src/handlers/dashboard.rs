use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use locker_core::stats;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/dashboard/stats
pub async fn get_stats(
    _user: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let stats = stats::load(state.store.as_ref(), chrono::Utc::now()).await?;
    Ok(Json(DataResponse { data: stats }))
}

/// GET /api/v1/dashboard/activity
pub async fn get_activity(
    _user: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let activity = stats::load_activity(state.store.as_ref()).await?;
    Ok(Json(DataResponse { data: activity }))
}
