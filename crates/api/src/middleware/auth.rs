//! Request authentication via the `Authorization` header.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use epm_core::error::CoreError;
use epm_core::types::DbId;

use crate::auth::jwt;
use crate::error::AppError;
use crate::state::AppState;

/// The caller behind a request, taken from a verified access token.
///
/// Listing this as a handler parameter is what makes a route protected:
/// requests without a valid `Bearer` token are rejected with 401 before
/// the handler body runs.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: DbId,
    /// Global role from the token (`"admin"` or `"member"`). Per-project
    /// roles live in `project_members` and are checked separately.
    pub role: String,
}

/// Pull the token out of `Authorization: Bearer <token>`.
fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get("authorization")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "A Bearer access token is required".into(),
            ))
        })?;

        let claims = jwt::validate_token(token, &state.config.jwt).map_err(|_| {
            AppError::Core(CoreError::Unauthorized("Invalid or expired token".into()))
        })?;

        Ok(AuthUser {
            user_id: claims.sub,
            role: claims.role,
        })
    }
}
