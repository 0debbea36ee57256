//! JWT-based authentication extractor for Axum handlers.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use locker_core::error::CoreError;
use locker_core::types::Principal;

use crate::auth::jwt::{validate_token, JwtConfig};
use crate::error::AppError;
use crate::state::AppState;

/// Authenticated administrator extracted from a JWT Bearer token in the
/// `Authorization` header.
///
/// ```ignore
/// async fn my_handler(user: AuthUser) -> AppResult<Json<()>> {
///     tracing::info!(principal = %user.principal.id, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub principal: Principal,
}

impl AuthUser {
    pub fn id(&self) -> &str {
        &self.principal.id
    }
}

/// Validate a raw token string into an [`AuthUser`].
pub fn authenticate(token: &str, config: &JwtConfig) -> Result<AuthUser, AppError> {
    let claims = validate_token(token, config)
        .map_err(|_| AppError::Core(CoreError::Unauthorized("Invalid or expired token".into())))?;
    Ok(AuthUser {
        principal: claims.principal(),
    })
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                AppError::Core(CoreError::Unauthorized(
                    "Missing Authorization header".into(),
                ))
            })?;

        let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "Invalid Authorization format. Expected: Bearer <token>".into(),
            ))
        })?;

        authenticate(token, &state.config.jwt)
    }
}
