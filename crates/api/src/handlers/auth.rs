//! Handlers for the `/auth` resource: login, registration, token refresh,
//! and profile management.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use epm_core::error::CoreError;
use epm_core::roles;
use epm_db::models::user::{ChangePassword, CreateUser, UpdateUser, User};
use epm_db::repositories::{TokenRepo, UserRepo};
use serde::{Deserialize, Serialize};

use crate::auth::jwt;
use crate::auth::password;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub user: User,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// POST /api/v1/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginRequest>,
) -> AppResult<Json<TokenResponse>> {
    let user = UserRepo::find_by_username(&state.pool, &input.username)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "Invalid username or password".into(),
            ))
        })?;

    if !user.is_active {
        return Err(AppError::Core(CoreError::Forbidden(
            "This account has been deactivated".into(),
        )));
    }

    let verified = password::verify_password(&input.password, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification failed: {e}")))?;
    if !verified {
        return Err(AppError::Core(CoreError::Unauthorized(
            "Invalid username or password".into(),
        )));
    }

    let tokens = issue_tokens(&state, &user).await?;
    tracing::info!(user_id = user.id, "User logged in");
    Ok(Json(tokens))
}

/// POST /api/v1/auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(input): Json<CreateUser>,
) -> AppResult<(StatusCode, Json<User>)> {
    password::validate_password_strength(&input.password)
        .map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;

    let role = input.role.as_deref().unwrap_or(roles::ROLE_MEMBER);
    roles::validate_role(role).map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;

    let hash = password::hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing failed: {e}")))?;

    let user = UserRepo::create(
        &state.pool,
        &input.username,
        &input.email,
        &hash,
        input.full_name.as_deref(),
        role,
    )
    .await?;

    tracing::info!(user_id = user.id, username = %user.username, "User registered");
    Ok((StatusCode::CREATED, Json(user)))
}

/// POST /api/v1/auth/refresh
///
/// Rotates the refresh token: the presented token is revoked and a new
/// pair is issued.
pub async fn refresh(
    State(state): State<AppState>,
    Json(input): Json<RefreshRequest>,
) -> AppResult<Json<TokenResponse>> {
    let hash = jwt::hash_refresh_token(&input.refresh_token);
    let stored = TokenRepo::find_valid(&state.pool, &hash)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "Invalid or expired refresh token".into(),
            ))
        })?;

    let user = UserRepo::find_by_id(&state.pool, stored.user_id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::Unauthorized("Unknown user".into())))?;

    TokenRepo::revoke(&state.pool, &hash).await?;
    let tokens = issue_tokens(&state, &user).await?;
    Ok(Json(tokens))
}

/// POST /api/v1/auth/logout
pub async fn logout(
    State(state): State<AppState>,
    _user: AuthUser,
    Json(input): Json<RefreshRequest>,
) -> AppResult<StatusCode> {
    let hash = jwt::hash_refresh_token(&input.refresh_token);
    TokenRepo::revoke(&state.pool, &hash).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/auth/me
pub async fn me(State(state): State<AppState>, user: AuthUser) -> AppResult<Json<User>> {
    let profile = UserRepo::find_by_id(&state.pool, user.user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: user.user_id,
        }))?;
    Ok(Json(profile))
}

/// PUT /api/v1/auth/me
pub async fn update_me(
    State(state): State<AppState>,
    user: AuthUser,
    Json(input): Json<UpdateUser>,
) -> AppResult<Json<User>> {
    let profile = UserRepo::update(&state.pool, user.user_id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: user.user_id,
        }))?;
    Ok(Json(profile))
}

/// POST /api/v1/auth/change-password
///
/// Requires the current password and revokes all outstanding refresh tokens.
pub async fn change_password(
    State(state): State<AppState>,
    user: AuthUser,
    Json(input): Json<ChangePassword>,
) -> AppResult<StatusCode> {
    let profile = UserRepo::find_by_id(&state.pool, user.user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: user.user_id,
        }))?;

    let verified = password::verify_password(&input.old_password, &profile.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification failed: {e}")))?;
    if !verified {
        return Err(AppError::Core(CoreError::Unauthorized(
            "Current password is incorrect".into(),
        )));
    }

    password::validate_password_strength(&input.new_password)
        .map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;

    let hash = password::hash_password(&input.new_password)
        .map_err(|e| AppError::InternalError(format!("Password hashing failed: {e}")))?;
    UserRepo::update_password(&state.pool, user.user_id, &hash).await?;
    TokenRepo::revoke_all_for_user(&state.pool, user.user_id).await?;

    tracing::info!(user_id = user.user_id, "Password changed");
    Ok(StatusCode::NO_CONTENT)
}

/// Issue an access/refresh token pair and persist the refresh token hash.
async fn issue_tokens(state: &AppState, user: &User) -> Result<TokenResponse, AppError> {
    let access_token = jwt::generate_access_token(user.id, &user.role, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation failed: {e}")))?;
    let (refresh_token, refresh_hash) = jwt::generate_refresh_token();
    TokenRepo::create(
        &state.pool,
        user.id,
        &refresh_hash,
        state.config.jwt.refresh_token_expiry_days,
    )
    .await?;

    Ok(TokenResponse {
        access_token,
        refresh_token,
        user: user.clone(),
    })
}
