//! Handlers for project risks and their response log.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use epm_core::error::CoreError;
use epm_core::risk as risk_rules;
use epm_core::types::DbId;
use epm_db::models::risk::{
    CreateRisk, CreateRiskResponse, Risk, RiskResponse, RiskStats, UpdateRisk,
};
use epm_db::repositories::RiskRepo;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RiskListParams {
    pub level: Option<String>,
    pub status: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

fn validate_vocab(
    level: Option<&str>,
    status: Option<&str>,
    probability: Option<i32>,
    impact: Option<i32>,
) -> Result<(), AppError> {
    if let Some(level) = level {
        risk_rules::validate_level(level)
            .map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;
    }
    if let Some(status) = status {
        risk_rules::validate_status(status)
            .map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;
    }
    if let Some(probability) = probability {
        risk_rules::validate_percent("probability", probability)
            .map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;
    }
    if let Some(impact) = impact {
        risk_rules::validate_percent("impact", impact)
            .map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;
    }
    Ok(())
}

/// POST /api/v1/projects/{project_id}/risks
pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    Path(project_id): Path<DbId>,
    Json(input): Json<CreateRisk>,
) -> AppResult<(StatusCode, Json<Risk>)> {
    rbac::require_member(&state.pool, project_id, user.user_id).await?;
    if input.title.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Risk title must not be empty".into(),
        )));
    }
    validate_vocab(
        input.level.as_deref(),
        input.status.as_deref(),
        input.probability,
        input.impact,
    )?;

    let risk = RiskRepo::create(&state.pool, project_id, &input).await?;
    tracing::info!(risk_id = risk.id, project_id, score = risk.score, "Risk recorded");
    Ok((StatusCode::CREATED, Json(risk)))
}

/// GET /api/v1/projects/{project_id}/risks
pub async fn list(
    State(state): State<AppState>,
    user: AuthUser,
    Path(project_id): Path<DbId>,
    Query(params): Query<RiskListParams>,
) -> AppResult<Json<Vec<Risk>>> {
    rbac::require_member(&state.pool, project_id, user.user_id).await?;
    validate_vocab(params.level.as_deref(), params.status.as_deref(), None, None)?;

    let risks = RiskRepo::list(
        &state.pool,
        project_id,
        params.level.as_deref(),
        params.status.as_deref(),
        epm_core::pagination::clamp_limit(params.limit),
        epm_core::pagination::clamp_offset(params.offset),
    )
    .await?;
    Ok(Json(risks))
}

/// GET /api/v1/projects/{project_id}/risks/stats
pub async fn stats(
    State(state): State<AppState>,
    user: AuthUser,
    Path(project_id): Path<DbId>,
) -> AppResult<Json<RiskStats>> {
    rbac::require_member(&state.pool, project_id, user.user_id).await?;
    let stats = RiskRepo::stats(&state.pool, project_id).await?;
    Ok(Json(stats))
}

/// GET /api/v1/projects/{project_id}/risks/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    user: AuthUser,
    Path((project_id, id)): Path<(DbId, DbId)>,
) -> AppResult<Json<Risk>> {
    rbac::require_member(&state.pool, project_id, user.user_id).await?;
    let risk = RiskRepo::find_by_id(&state.pool, project_id, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Risk", id }))?;
    Ok(Json(risk))
}

/// PUT /api/v1/projects/{project_id}/risks/{id}
pub async fn update(
    State(state): State<AppState>,
    user: AuthUser,
    Path((project_id, id)): Path<(DbId, DbId)>,
    Json(input): Json<UpdateRisk>,
) -> AppResult<Json<Risk>> {
    rbac::require_member(&state.pool, project_id, user.user_id).await?;
    validate_vocab(
        input.level.as_deref(),
        input.status.as_deref(),
        input.probability,
        input.impact,
    )?;

    let risk = RiskRepo::update(&state.pool, project_id, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Risk", id }))?;
    Ok(Json(risk))
}

/// DELETE /api/v1/projects/{project_id}/risks/{id}
pub async fn delete(
    State(state): State<AppState>,
    user: AuthUser,
    Path((project_id, id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    rbac::require_manager(&state.pool, project_id, user.user_id).await?;

    if RiskRepo::delete(&state.pool, project_id, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound { entity: "Risk", id }))
    }
}

/// POST /api/v1/projects/{project_id}/risks/{id}/responses
pub async fn add_response(
    State(state): State<AppState>,
    user: AuthUser,
    Path((project_id, id)): Path<(DbId, DbId)>,
    Json(input): Json<CreateRiskResponse>,
) -> AppResult<(StatusCode, Json<RiskResponse>)> {
    rbac::require_member(&state.pool, project_id, user.user_id).await?;
    if input.action.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Response action must not be empty".into(),
        )));
    }

    RiskRepo::find_by_id(&state.pool, project_id, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Risk", id }))?;

    let response = RiskRepo::add_response(&state.pool, id, user.user_id, &input).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// GET /api/v1/projects/{project_id}/risks/{id}/responses
pub async fn list_responses(
    State(state): State<AppState>,
    user: AuthUser,
    Path((project_id, id)): Path<(DbId, DbId)>,
) -> AppResult<Json<Vec<RiskResponse>>> {
    rbac::require_member(&state.pool, project_id, user.user_id).await?;

    RiskRepo::find_by_id(&state.pool, project_id, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Risk", id }))?;

    let responses = RiskRepo::responses(&state.pool, id).await?;
    Ok(Json(responses))
}
