use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/signatures
///
/// Every stored signature, newest first.
pub async fn list_signatures(
    _user: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let signatures = state.store.list_signatures().await?;
    Ok(Json(DataResponse { data: signatures }))
}
