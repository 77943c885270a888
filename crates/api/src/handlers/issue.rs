//! Handlers for project issues and their comments.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use epm_core::error::CoreError;
use epm_core::issue as issue_rules;
use epm_core::types::DbId;
use epm_db::models::issue::{
    CreateIssue, CreateIssueComment, Issue, IssueComment, IssueStats, UpdateIssue,
};
use epm_db::repositories::IssueRepo;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct IssueListParams {
    pub status: Option<String>,
    pub priority: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

fn validate_vocab(status: Option<&str>, priority: Option<&str>) -> Result<(), AppError> {
    if let Some(status) = status {
        issue_rules::validate_status(status)
            .map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;
    }
    if let Some(priority) = priority {
        issue_rules::validate_priority(priority)
            .map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;
    }
    Ok(())
}

/// POST /api/v1/projects/{project_id}/issues
pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    Path(project_id): Path<DbId>,
    Json(input): Json<CreateIssue>,
) -> AppResult<(StatusCode, Json<Issue>)> {
    rbac::require_member(&state.pool, project_id, user.user_id).await?;
    if input.title.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Issue title must not be empty".into(),
        )));
    }
    validate_vocab(input.status.as_deref(), input.priority.as_deref())?;

    let issue = IssueRepo::create(&state.pool, project_id, user.user_id, &input).await?;
    tracing::info!(issue_id = issue.id, project_id, "Issue reported");
    Ok((StatusCode::CREATED, Json(issue)))
}

/// GET /api/v1/projects/{project_id}/issues
pub async fn list(
    State(state): State<AppState>,
    user: AuthUser,
    Path(project_id): Path<DbId>,
    Query(params): Query<IssueListParams>,
) -> AppResult<Json<Vec<Issue>>> {
    rbac::require_member(&state.pool, project_id, user.user_id).await?;
    validate_vocab(params.status.as_deref(), params.priority.as_deref())?;

    let issues = IssueRepo::list(
        &state.pool,
        project_id,
        params.status.as_deref(),
        params.priority.as_deref(),
        epm_core::pagination::clamp_limit(params.limit),
        epm_core::pagination::clamp_offset(params.offset),
    )
    .await?;
    Ok(Json(issues))
}

/// GET /api/v1/projects/{project_id}/issues/stats
pub async fn stats(
    State(state): State<AppState>,
    user: AuthUser,
    Path(project_id): Path<DbId>,
) -> AppResult<Json<IssueStats>> {
    rbac::require_member(&state.pool, project_id, user.user_id).await?;
    let stats = IssueRepo::stats(&state.pool, project_id).await?;
    Ok(Json(stats))
}

/// GET /api/v1/projects/{project_id}/issues/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    user: AuthUser,
    Path((project_id, id)): Path<(DbId, DbId)>,
) -> AppResult<Json<Issue>> {
    rbac::require_member(&state.pool, project_id, user.user_id).await?;
    let issue = IssueRepo::find_by_id(&state.pool, project_id, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Issue",
            id,
        }))?;
    Ok(Json(issue))
}

/// PUT /api/v1/projects/{project_id}/issues/{id}
pub async fn update(
    State(state): State<AppState>,
    user: AuthUser,
    Path((project_id, id)): Path<(DbId, DbId)>,
    Json(input): Json<UpdateIssue>,
) -> AppResult<Json<Issue>> {
    rbac::require_member(&state.pool, project_id, user.user_id).await?;
    validate_vocab(input.status.as_deref(), input.priority.as_deref())?;

    let issue = IssueRepo::update(&state.pool, project_id, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Issue",
            id,
        }))?;
    Ok(Json(issue))
}

/// DELETE /api/v1/projects/{project_id}/issues/{id}
pub async fn delete(
    State(state): State<AppState>,
    user: AuthUser,
    Path((project_id, id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    rbac::require_manager(&state.pool, project_id, user.user_id).await?;

    if IssueRepo::delete(&state.pool, project_id, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound {
            entity: "Issue",
            id,
        }))
    }
}

/// POST /api/v1/projects/{project_id}/issues/{id}/comments
pub async fn add_comment(
    State(state): State<AppState>,
    user: AuthUser,
    Path((project_id, id)): Path<(DbId, DbId)>,
    Json(input): Json<CreateIssueComment>,
) -> AppResult<(StatusCode, Json<IssueComment>)> {
    rbac::require_member(&state.pool, project_id, user.user_id).await?;
    if input.content.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Comment content must not be empty".into(),
        )));
    }

    IssueRepo::find_by_id(&state.pool, project_id, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Issue",
            id,
        }))?;

    let comment = IssueRepo::add_comment(&state.pool, id, user.user_id, &input).await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

/// GET /api/v1/projects/{project_id}/issues/{id}/comments
pub async fn list_comments(
    State(state): State<AppState>,
    user: AuthUser,
    Path((project_id, id)): Path<(DbId, DbId)>,
) -> AppResult<Json<Vec<IssueComment>>> {
    rbac::require_member(&state.pool, project_id, user.user_id).await?;

    IssueRepo::find_by_id(&state.pool, project_id, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Issue",
            id,
        }))?;

    let comments = IssueRepo::comments(&state.pool, id).await?;
    Ok(Json(comments))
}
