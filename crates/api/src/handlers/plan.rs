//! Handlers for plans, WBS tasks, and plan milestones.
//!
//! Every WBS mutation ends with a roll-up of the owning plan's progress
//! so the stored percentage never drifts from the task counts.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use epm_core::error::CoreError;
use epm_core::plan as plan_rules;
use epm_core::task as task_rules;
use epm_core::types::DbId;
use epm_db::models::plan::{
    CreatePlan, CreatePlanMilestone, CreateWbsTask, Plan, PlanMilestone, UpdatePlan,
    UpdatePlanMilestone, UpdateWbsTask, WbsTask,
};
use epm_db::repositories::{PlanMilestoneRepo, PlanRepo, WbsTaskRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac;
use crate::state::AppState;

/// Load a plan and check the caller belongs to its project.
async fn load_plan_checked(state: &AppState, user: &AuthUser, id: DbId) -> AppResult<Plan> {
    let plan = PlanRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Plan", id }))?;
    rbac::require_member(&state.pool, plan.project_id, user.user_id).await?;
    Ok(plan)
}

/// POST /api/v1/projects/{project_id}/plans
pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    Path(project_id): Path<DbId>,
    Json(input): Json<CreatePlan>,
) -> AppResult<(StatusCode, Json<Plan>)> {
    rbac::require_manager(&state.pool, project_id, user.user_id).await?;
    if let Some(status) = input.status.as_deref() {
        plan_rules::validate_status(status)
            .map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;
    }
    let plan = PlanRepo::create(&state.pool, project_id, user.user_id, &input).await?;
    tracing::info!(plan_id = plan.id, project_id, "Plan created");
    Ok((StatusCode::CREATED, Json(plan)))
}

/// GET /api/v1/projects/{project_id}/plans
pub async fn list(
    State(state): State<AppState>,
    user: AuthUser,
    Path(project_id): Path<DbId>,
) -> AppResult<Json<Vec<Plan>>> {
    rbac::require_member(&state.pool, project_id, user.user_id).await?;
    let plans = PlanRepo::list(&state.pool, project_id).await?;
    Ok(Json(plans))
}

/// GET /api/v1/plans/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<Plan>> {
    let plan = load_plan_checked(&state, &user, id).await?;
    Ok(Json(plan))
}

/// PUT /api/v1/plans/{id}
pub async fn update(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<UpdatePlan>,
) -> AppResult<Json<Plan>> {
    let plan = load_plan_checked(&state, &user, id).await?;
    rbac::require_manager(&state.pool, plan.project_id, user.user_id).await?;
    if let Some(status) = input.status.as_deref() {
        plan_rules::validate_status(status)
            .map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;
    }
    let updated = PlanRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Plan", id }))?;
    Ok(Json(updated))
}

/// DELETE /api/v1/plans/{id}
pub async fn delete(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let plan = load_plan_checked(&state, &user, id).await?;
    rbac::require_manager(&state.pool, plan.project_id, user.user_id).await?;
    PlanRepo::soft_delete(&state.pool, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// WBS tasks
// ---------------------------------------------------------------------------

/// POST /api/v1/plans/{plan_id}/wbs
pub async fn create_wbs_task(
    State(state): State<AppState>,
    user: AuthUser,
    Path(plan_id): Path<DbId>,
    Json(input): Json<CreateWbsTask>,
) -> AppResult<(StatusCode, Json<WbsTask>)> {
    load_plan_checked(&state, &user, plan_id).await?;
    if let Some(status) = input.status.as_deref() {
        plan_rules::validate_wbs_status(status)
            .map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;
    }

    if let Some(parent_id) = input.parent_id {
        let parent = WbsTaskRepo::find_by_id(&state.pool, parent_id)
            .await?
            .ok_or(AppError::Core(CoreError::NotFound {
                entity: "WbsTask",
                id: parent_id,
            }))?;
        if parent.plan_id != plan_id {
            return Err(AppError::Core(CoreError::Validation(
                "Parent WBS task belongs to a different plan".into(),
            )));
        }
    }

    let duration = match (input.start_date, input.end_date) {
        (Some(start), Some(end)) => Some(task_rules::duration_days(start, end).ok_or_else(
            || {
                AppError::Core(CoreError::Validation(
                    "end_date must not be before start_date".into(),
                ))
            },
        )?),
        _ => None,
    };

    let task = WbsTaskRepo::create(&state.pool, plan_id, &input, duration).await?;
    PlanRepo::refresh_progress(&state.pool, plan_id).await?;
    Ok((StatusCode::CREATED, Json(task)))
}

/// GET /api/v1/plans/{plan_id}/wbs
pub async fn list_wbs_tasks(
    State(state): State<AppState>,
    user: AuthUser,
    Path(plan_id): Path<DbId>,
) -> AppResult<Json<Vec<WbsTask>>> {
    load_plan_checked(&state, &user, plan_id).await?;
    let tasks = WbsTaskRepo::list(&state.pool, plan_id).await?;
    Ok(Json(tasks))
}

/// PUT /api/v1/wbs/{id}
pub async fn update_wbs_task(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateWbsTask>,
) -> AppResult<Json<WbsTask>> {
    let existing = WbsTaskRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "WbsTask",
            id,
        }))?;
    load_plan_checked(&state, &user, existing.plan_id).await?;

    if let Some(status) = input.status.as_deref() {
        plan_rules::validate_wbs_status(status)
            .map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;
    }

    let mut progress = task_rules::clamp_progress(input.progress.unwrap_or(existing.progress));
    let mut status = input
        .status
        .clone()
        .unwrap_or_else(|| existing.status.clone());
    if task_rules::is_complete(progress) {
        status = plan_rules::WBS_COMPLETED.to_string();
    }
    if status == plan_rules::WBS_COMPLETED {
        progress = 100;
    }

    let start = input.start_date.or(existing.start_date);
    let end = input.end_date.or(existing.end_date);
    let duration = match (start, end) {
        (Some(start), Some(end)) => Some(task_rules::duration_days(start, end).ok_or_else(
            || {
                AppError::Core(CoreError::Validation(
                    "end_date must not be before start_date".into(),
                ))
            },
        )?),
        _ => existing.duration,
    };

    let task = WbsTaskRepo::update(&state.pool, id, &input, &status, progress, duration)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "WbsTask",
            id,
        }))?;
    PlanRepo::refresh_progress(&state.pool, task.plan_id).await?;
    Ok(Json(task))
}

/// DELETE /api/v1/wbs/{id}
pub async fn delete_wbs_task(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let existing = WbsTaskRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "WbsTask",
            id,
        }))?;
    load_plan_checked(&state, &user, existing.plan_id).await?;

    WbsTaskRepo::delete_tree(&state.pool, id).await?;
    PlanRepo::refresh_progress(&state.pool, existing.plan_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Plan milestones
// ---------------------------------------------------------------------------

/// POST /api/v1/plans/{plan_id}/milestones
pub async fn create_milestone(
    State(state): State<AppState>,
    user: AuthUser,
    Path(plan_id): Path<DbId>,
    Json(input): Json<CreatePlanMilestone>,
) -> AppResult<(StatusCode, Json<PlanMilestone>)> {
    load_plan_checked(&state, &user, plan_id).await?;

    if let Some(status) = input.status.as_deref() {
        if !plan_rules::VALID_MILESTONE_STATUSES.contains(&status) {
            return Err(AppError::Core(CoreError::Validation(format!(
                "Invalid milestone status '{status}'"
            ))));
        }
    }

    if let Some(task_id) = input.task_id {
        let task = WbsTaskRepo::find_by_id(&state.pool, task_id)
            .await?
            .ok_or(AppError::Core(CoreError::NotFound {
                entity: "WbsTask",
                id: task_id,
            }))?;
        if task.plan_id != plan_id {
            return Err(AppError::Core(CoreError::Validation(
                "Linked WBS task belongs to a different plan".into(),
            )));
        }
    }

    let milestone = PlanMilestoneRepo::create(&state.pool, plan_id, &input).await?;
    Ok((StatusCode::CREATED, Json(milestone)))
}

/// GET /api/v1/plans/{plan_id}/milestones
pub async fn list_milestones(
    State(state): State<AppState>,
    user: AuthUser,
    Path(plan_id): Path<DbId>,
) -> AppResult<Json<Vec<PlanMilestone>>> {
    load_plan_checked(&state, &user, plan_id).await?;
    let milestones = PlanMilestoneRepo::list(&state.pool, plan_id).await?;
    Ok(Json(milestones))
}

/// PUT /api/v1/plans/{plan_id}/milestones/{id}
pub async fn update_milestone(
    State(state): State<AppState>,
    user: AuthUser,
    Path((plan_id, id)): Path<(DbId, DbId)>,
    Json(input): Json<UpdatePlanMilestone>,
) -> AppResult<Json<PlanMilestone>> {
    load_plan_checked(&state, &user, plan_id).await?;

    if let Some(status) = input.status.as_deref() {
        if !plan_rules::VALID_MILESTONE_STATUSES.contains(&status) {
            return Err(AppError::Core(CoreError::Validation(format!(
                "Invalid milestone status '{status}'"
            ))));
        }
    }

    PlanMilestoneRepo::find_by_id(&state.pool, id)
        .await?
        .filter(|m| m.plan_id == plan_id)
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "PlanMilestone",
            id,
        }))?;

    let milestone = PlanMilestoneRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "PlanMilestone",
            id,
        }))?;
    Ok(Json(milestone))
}

/// DELETE /api/v1/plans/{plan_id}/milestones/{id}
pub async fn delete_milestone(
    State(state): State<AppState>,
    user: AuthUser,
    Path((plan_id, id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    load_plan_checked(&state, &user, plan_id).await?;

    let deleted = PlanMilestoneRepo::find_by_id(&state.pool, id)
        .await?
        .filter(|m| m.plan_id == plan_id)
        .is_some()
        && PlanMilestoneRepo::delete(&state.pool, id).await?;
    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound {
            entity: "PlanMilestone",
            id,
        }))
    }
}
