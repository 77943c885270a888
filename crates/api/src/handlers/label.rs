//! Handlers for project-scoped labels.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use epm_core::error::CoreError;
use epm_core::types::DbId;
use epm_db::models::label::{CreateLabel, Label, UpdateLabel};
use epm_db::repositories::LabelRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac;
use crate::state::AppState;

/// POST /api/v1/projects/{project_id}/labels
pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    Path(project_id): Path<DbId>,
    Json(input): Json<CreateLabel>,
) -> AppResult<(StatusCode, Json<Label>)> {
    rbac::require_member(&state.pool, project_id, user.user_id).await?;
    if input.name.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Label name must not be empty".into(),
        )));
    }
    let label = LabelRepo::create(&state.pool, project_id, &input).await?;
    Ok((StatusCode::CREATED, Json(label)))
}

/// GET /api/v1/projects/{project_id}/labels
pub async fn list(
    State(state): State<AppState>,
    user: AuthUser,
    Path(project_id): Path<DbId>,
) -> AppResult<Json<Vec<Label>>> {
    rbac::require_member(&state.pool, project_id, user.user_id).await?;
    let labels = LabelRepo::list(&state.pool, project_id).await?;
    Ok(Json(labels))
}

/// PUT /api/v1/projects/{project_id}/labels/{id}
pub async fn update(
    State(state): State<AppState>,
    user: AuthUser,
    Path((project_id, id)): Path<(DbId, DbId)>,
    Json(input): Json<UpdateLabel>,
) -> AppResult<Json<Label>> {
    rbac::require_member(&state.pool, project_id, user.user_id).await?;

    let label = LabelRepo::find_by_id(&state.pool, id)
        .await?
        .filter(|l| l.project_id == project_id)
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Label",
            id,
        }))?;

    let updated = LabelRepo::update(&state.pool, label.id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Label",
            id,
        }))?;
    Ok(Json(updated))
}

/// DELETE /api/v1/projects/{project_id}/labels/{id}
pub async fn delete(
    State(state): State<AppState>,
    user: AuthUser,
    Path((project_id, id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    rbac::require_manager(&state.pool, project_id, user.user_id).await?;

    let deleted = LabelRepo::find_by_id(&state.pool, id)
        .await?
        .filter(|l| l.project_id == project_id)
        .is_some()
        && LabelRepo::delete(&state.pool, id).await?;
    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound {
            entity: "Label",
            id,
        }))
    }
}
