//! Handlers for the `/projects` resource: projects, members, and milestones.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use epm_core::error::CoreError;
use epm_core::types::DbId;
use epm_core::{plan, roles};
use epm_db::models::member::{AddProjectMember, ProjectMember, ProjectMemberDetail};
use epm_db::models::milestone::{CreateMilestone, Milestone, UpdateMilestone};
use epm_db::models::project::{CreateProject, Project, ProjectStats, UpdateProject};
use epm_db::repositories::{MemberRepo, MilestoneRepo, ProjectRepo, UserRepo};
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac;
use crate::query::PaginationParams;
use crate::state::AppState;

/// Project detail payload: the row plus aggregates and the caller's role.
#[derive(Debug, Serialize)]
pub struct ProjectDetail {
    #[serde(flatten)]
    pub project: Project,
    pub stats: ProjectStats,
    pub my_role: String,
}

/// POST /api/v1/projects
///
/// The creator is automatically added as a project admin.
pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    Json(input): Json<CreateProject>,
) -> AppResult<(StatusCode, Json<Project>)> {
    if input.key.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Project key must not be empty".into(),
        )));
    }
    if input.name.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Project name must not be empty".into(),
        )));
    }

    let project = ProjectRepo::create(&state.pool, user.user_id, &input).await?;

    tracing::info!(project_id = project.id, key = %project.key, "Project created");
    Ok((StatusCode::CREATED, Json(project)))
}

/// GET /api/v1/projects
///
/// Users see the projects they belong to; global admins see everything.
pub async fn list(
    State(state): State<AppState>,
    user: AuthUser,
    Query(pagination): Query<PaginationParams>,
) -> AppResult<Json<Vec<Project>>> {
    let projects = if user.role == roles::ROLE_ADMIN {
        ProjectRepo::list(&state.pool, pagination.limit(), pagination.offset()).await?
    } else {
        ProjectRepo::list_for_user(
            &state.pool,
            user.user_id,
            pagination.limit(),
            pagination.offset(),
        )
        .await?
    };
    Ok(Json(projects))
}

/// GET /api/v1/projects/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<ProjectDetail>> {
    let project = ProjectRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Project",
            id,
        }))?;
    let member = rbac::require_member(&state.pool, id, user.user_id).await?;
    let stats = ProjectRepo::stats(&state.pool, id).await?;

    Ok(Json(ProjectDetail {
        project,
        stats,
        my_role: member.role,
    }))
}

/// PUT /api/v1/projects/{id}
pub async fn update(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateProject>,
) -> AppResult<Json<Project>> {
    rbac::require_manager(&state.pool, id, user.user_id).await?;

    let project = ProjectRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Project",
            id,
        }))?;
    Ok(Json(project))
}

/// DELETE /api/v1/projects/{id}
pub async fn delete(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    rbac::require_admin(&state.pool, id, user.user_id).await?;

    let deleted = ProjectRepo::soft_delete(&state.pool, id).await?;
    if deleted {
        tracing::info!(project_id = id, "Project deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound {
            entity: "Project",
            id,
        }))
    }
}

// ---------------------------------------------------------------------------
// Members
// ---------------------------------------------------------------------------

/// GET /api/v1/projects/{project_id}/members
pub async fn list_members(
    State(state): State<AppState>,
    user: AuthUser,
    Path(project_id): Path<DbId>,
) -> AppResult<Json<Vec<ProjectMemberDetail>>> {
    rbac::require_member(&state.pool, project_id, user.user_id).await?;
    let members = MemberRepo::list(&state.pool, project_id).await?;
    Ok(Json(members))
}

/// POST /api/v1/projects/{project_id}/members
pub async fn add_member(
    State(state): State<AppState>,
    user: AuthUser,
    Path(project_id): Path<DbId>,
    Json(input): Json<AddProjectMember>,
) -> AppResult<(StatusCode, Json<ProjectMember>)> {
    rbac::require_manager(&state.pool, project_id, user.user_id).await?;

    let role = input.role.as_deref().unwrap_or(roles::ROLE_MEMBER);
    roles::validate_role(role).map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;

    UserRepo::find_by_id(&state.pool, input.user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: input.user_id,
        }))?;

    if MemberRepo::find(&state.pool, project_id, input.user_id)
        .await?
        .is_some()
    {
        return Err(AppError::Core(CoreError::Conflict(
            "User is already a member of this project".into(),
        )));
    }

    let member = MemberRepo::add(&state.pool, project_id, input.user_id, role).await?;
    Ok((StatusCode::CREATED, Json(member)))
}

/// PUT /api/v1/projects/{project_id}/members/{user_id}
pub async fn update_member_role(
    State(state): State<AppState>,
    user: AuthUser,
    Path((project_id, member_user_id)): Path<(DbId, DbId)>,
    Json(input): Json<AddProjectMember>,
) -> AppResult<Json<ProjectMember>> {
    rbac::require_admin(&state.pool, project_id, user.user_id).await?;

    let role = input.role.as_deref().unwrap_or(roles::ROLE_MEMBER);
    roles::validate_role(role).map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;

    let existing = rbac::require_member(&state.pool, project_id, member_user_id).await?;
    // Demoting the last admin would orphan the project.
    if existing.role == roles::ROLE_ADMIN
        && role != roles::ROLE_ADMIN
        && MemberRepo::count_admins(&state.pool, project_id).await? <= 1
    {
        return Err(AppError::Core(CoreError::Conflict(
            "Cannot demote the last admin of a project".into(),
        )));
    }

    let member = MemberRepo::update_role(&state.pool, project_id, member_user_id, role)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "ProjectMember",
            id: member_user_id,
        }))?;
    Ok(Json(member))
}

/// DELETE /api/v1/projects/{project_id}/members/{user_id}
pub async fn remove_member(
    State(state): State<AppState>,
    user: AuthUser,
    Path((project_id, member_user_id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    rbac::require_admin(&state.pool, project_id, user.user_id).await?;

    let existing = rbac::require_member(&state.pool, project_id, member_user_id).await?;
    if existing.role == roles::ROLE_ADMIN
        && MemberRepo::count_admins(&state.pool, project_id).await? <= 1
    {
        return Err(AppError::Core(CoreError::Conflict(
            "Cannot remove the last admin of a project".into(),
        )));
    }

    MemberRepo::remove(&state.pool, project_id, member_user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Milestones
// ---------------------------------------------------------------------------

/// GET /api/v1/projects/{project_id}/milestones
pub async fn list_milestones(
    State(state): State<AppState>,
    user: AuthUser,
    Path(project_id): Path<DbId>,
) -> AppResult<Json<Vec<Milestone>>> {
    rbac::require_member(&state.pool, project_id, user.user_id).await?;
    let milestones = MilestoneRepo::list(&state.pool, project_id).await?;
    Ok(Json(milestones))
}

/// POST /api/v1/projects/{project_id}/milestones
pub async fn create_milestone(
    State(state): State<AppState>,
    user: AuthUser,
    Path(project_id): Path<DbId>,
    Json(input): Json<CreateMilestone>,
) -> AppResult<(StatusCode, Json<Milestone>)> {
    rbac::require_manager(&state.pool, project_id, user.user_id).await?;

    if let Some(status) = &input.status {
        if !plan::VALID_MILESTONE_STATUSES.contains(&status.as_str()) {
            return Err(AppError::Core(CoreError::Validation(format!(
                "Invalid milestone status '{status}'"
            ))));
        }
    }

    let milestone = MilestoneRepo::create(&state.pool, project_id, &input).await?;
    Ok((StatusCode::CREATED, Json(milestone)))
}

/// PUT /api/v1/projects/{project_id}/milestones/{id}
pub async fn update_milestone(
    State(state): State<AppState>,
    user: AuthUser,
    Path((project_id, id)): Path<(DbId, DbId)>,
    Json(input): Json<UpdateMilestone>,
) -> AppResult<Json<Milestone>> {
    rbac::require_manager(&state.pool, project_id, user.user_id).await?;

    if let Some(status) = &input.status {
        if !plan::VALID_MILESTONE_STATUSES.contains(&status.as_str()) {
            return Err(AppError::Core(CoreError::Validation(format!(
                "Invalid milestone status '{status}'"
            ))));
        }
    }

    let milestone = MilestoneRepo::update(&state.pool, project_id, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Milestone",
            id,
        }))?;
    Ok(Json(milestone))
}

/// DELETE /api/v1/projects/{project_id}/milestones/{id}
pub async fn delete_milestone(
    State(state): State<AppState>,
    user: AuthUser,
    Path((project_id, id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    rbac::require_manager(&state.pool, project_id, user.user_id).await?;

    let deleted = MilestoneRepo::delete(&state.pool, project_id, id).await?;
    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound {
            entity: "Milestone",
            id,
        }))
    }
}
