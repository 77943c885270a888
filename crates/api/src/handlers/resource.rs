//! Handlers for the `/resources` views: the user directory, per-user
//! workload, and per-project utilization.

use std::collections::HashMap;

use axum::extract::{Path, Query, State};
use axum::Json;
use epm_core::error::CoreError;
use epm_core::roles;
use epm_core::types::DbId;
use epm_db::models::project::Project;
use epm_db::models::task::{Task, TaskStatusCounts};
use epm_db::models::user::User;
use epm_db::repositories::{MemberRepo, ProjectRepo, TaskRepo, UserRepo};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac;
use crate::state::AppState;

const RECENT_TASK_LIMIT: i64 = 10;

#[derive(Debug, Deserialize)]
pub struct UserListParams {
    pub role: Option<String>,
    pub is_active: Option<bool>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Per-user workload summary derived from open task counts.
#[derive(Debug, Serialize)]
pub struct Workload {
    pub user_id: DbId,
    pub open_tasks: i64,
    /// 0 to 100, ten points per open task.
    pub score: i64,
    /// "low", "medium", or "high".
    pub level: &'static str,
}

impl Workload {
    fn from_open_count(user_id: DbId, open_tasks: i64) -> Self {
        let score = (open_tasks * 10).min(100);
        let level = if score > 70 {
            "high"
        } else if score > 30 {
            "medium"
        } else {
            "low"
        };
        Workload {
            user_id,
            open_tasks,
            score,
            level,
        }
    }
}

/// One member's workload within a project.
#[derive(Debug, Serialize)]
pub struct MemberUtilization {
    pub user_id: DbId,
    pub username: String,
    pub full_name: Option<String>,
    pub role: String,
    pub open_tasks: i64,
    pub score: i64,
    pub level: &'static str,
}

/// A user with their projects and task summary.
#[derive(Debug, Serialize)]
pub struct ResourceDetail {
    pub user: User,
    pub projects: Vec<Project>,
    pub task_counts: TaskStatusCounts,
    pub recent_open_tasks: Vec<Task>,
}

/// GET /api/v1/resources
pub async fn list(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(params): Query<UserListParams>,
) -> AppResult<Json<Vec<User>>> {
    if let Some(role) = params.role.as_deref() {
        roles::validate_role(role).map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;
    }
    let users = UserRepo::list(
        &state.pool,
        params.role.as_deref(),
        params.is_active,
        epm_core::pagination::clamp_limit(params.limit),
        epm_core::pagination::clamp_offset(params.offset),
    )
    .await?;
    Ok(Json(users))
}

/// GET /api/v1/resources/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<ResourceDetail>> {
    let user = UserRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "User", id }))?;

    let projects =
        ProjectRepo::list_for_user(&state.pool, id, epm_core::pagination::MAX_LIMIT, 0).await?;
    let task_counts = TaskRepo::status_counts_for_user(&state.pool, id).await?;
    let recent_open_tasks = TaskRepo::open_for_user(&state.pool, id, RECENT_TASK_LIMIT).await?;

    Ok(Json(ResourceDetail {
        user,
        projects,
        task_counts,
        recent_open_tasks,
    }))
}

/// GET /api/v1/resources/{id}/workload
pub async fn workload(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<Workload>> {
    UserRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "User", id }))?;

    let open = TaskRepo::count_open_for_user(&state.pool, id).await?;
    Ok(Json(Workload::from_open_count(id, open)))
}

/// GET /api/v1/projects/{project_id}/utilization
///
/// Workload of every project member, busiest first.
pub async fn project_utilization(
    State(state): State<AppState>,
    user: AuthUser,
    Path(project_id): Path<DbId>,
) -> AppResult<Json<Vec<MemberUtilization>>> {
    rbac::require_member(&state.pool, project_id, user.user_id).await?;

    let members = MemberRepo::list(&state.pool, project_id).await?;
    let counts: HashMap<DbId, i64> = TaskRepo::open_counts_by_member(&state.pool, project_id)
        .await?
        .into_iter()
        .collect();

    let mut utilization: Vec<MemberUtilization> = members
        .into_iter()
        .map(|m| {
            let open = counts.get(&m.user_id).copied().unwrap_or(0);
            let load = Workload::from_open_count(m.user_id, open);
            MemberUtilization {
                user_id: m.user_id,
                username: m.username,
                full_name: m.full_name,
                role: m.role,
                open_tasks: load.open_tasks,
                score: load.score,
                level: load.level,
            }
        })
        .collect();
    utilization.sort_by(|a, b| b.open_tasks.cmp(&a.open_tasks).then(a.user_id.cmp(&b.user_id)));

    Ok(Json(utilization))
}
