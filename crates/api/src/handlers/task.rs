//! Handlers for the `/tasks` resource: tasks, subtasks, dependencies,
//! comments, and label assignments.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use epm_core::error::CoreError;
use epm_core::types::DbId;
use epm_core::{dependency, task as task_rules};
use epm_db::models::label::Label;
use epm_db::models::task::{
    CreateTask, CreateTaskComment, Task, TaskComment, TaskDependency, UpdateTask,
};
use epm_db::repositories::{DependencyRepo, LabelRepo, TaskCommentRepo, TaskRepo};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac;
use crate::state::AppState;

/// Query parameters for task listing.
#[derive(Debug, Default, Deserialize)]
pub struct TaskListParams {
    pub status: Option<String>,
    pub priority: Option<String>,
    pub assignee_id: Option<DbId>,
    pub parent_id: Option<DbId>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Load a task and check the caller belongs to its project.
async fn load_task_checked(state: &AppState, user: &AuthUser, id: DbId) -> AppResult<Task> {
    let task = TaskRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Task", id }))?;
    rbac::require_member(&state.pool, task.project_id, user.user_id).await?;
    Ok(task)
}

/// Validate the optional status and priority fields of a payload.
fn validate_vocab(status: Option<&str>, priority: Option<&str>) -> AppResult<()> {
    if let Some(status) = status {
        task_rules::validate_status(status)
            .map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;
    }
    if let Some(priority) = priority {
        task_rules::validate_priority(priority)
            .map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;
    }
    Ok(())
}

/// Derive the inclusive duration, rejecting reversed date ranges.
fn resolve_duration(
    start: Option<chrono::NaiveDate>,
    end: Option<chrono::NaiveDate>,
) -> AppResult<Option<i64>> {
    match (start, end) {
        (Some(start), Some(end)) => task_rules::duration_days(start, end)
            .map(Some)
            .ok_or_else(|| {
                AppError::Core(CoreError::Validation(
                    "end_date must not be before start_date".into(),
                ))
            }),
        _ => Ok(None),
    }
}

/// POST /api/v1/projects/{project_id}/tasks
pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    Path(project_id): Path<DbId>,
    Json(mut input): Json<CreateTask>,
) -> AppResult<(StatusCode, Json<Task>)> {
    rbac::require_member(&state.pool, project_id, user.user_id).await?;
    validate_vocab(input.status.as_deref(), input.priority.as_deref())?;

    if let Some(parent_id) = input.parent_id {
        let parent = TaskRepo::find_by_id(&state.pool, parent_id)
            .await?
            .ok_or(AppError::Core(CoreError::NotFound {
                entity: "Task",
                id: parent_id,
            }))?;
        if parent.project_id != project_id {
            return Err(AppError::Core(CoreError::Validation(
                "Parent task belongs to a different project".into(),
            )));
        }
    }

    input.progress = input.progress.map(task_rules::clamp_progress);
    let duration = resolve_duration(input.start_date, input.end_date)?;

    let task = TaskRepo::create(&state.pool, project_id, user.user_id, &input, duration).await?;
    tracing::info!(task_id = task.id, project_id, "Task created");
    Ok((StatusCode::CREATED, Json(task)))
}

/// GET /api/v1/projects/{project_id}/tasks
pub async fn list(
    State(state): State<AppState>,
    user: AuthUser,
    Path(project_id): Path<DbId>,
    Query(params): Query<TaskListParams>,
) -> AppResult<Json<Vec<Task>>> {
    rbac::require_member(&state.pool, project_id, user.user_id).await?;
    validate_vocab(params.status.as_deref(), params.priority.as_deref())?;
    let tasks = TaskRepo::list(
        &state.pool,
        project_id,
        params.status.as_deref(),
        params.priority.as_deref(),
        params.assignee_id,
        params.parent_id,
        epm_core::pagination::clamp_limit(params.limit),
        epm_core::pagination::clamp_offset(params.offset),
    )
    .await?;
    Ok(Json(tasks))
}

/// A task with its subtasks and dependency neighbourhood.
#[derive(Debug, Serialize)]
pub struct TaskDetail {
    #[serde(flatten)]
    pub task: Task,
    pub subtasks: Vec<Task>,
    pub dependencies: Vec<Task>,
    pub dependents: Vec<Task>,
}

/// GET /api/v1/tasks/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<TaskDetail>> {
    let task = load_task_checked(&state, &user, id).await?;
    let subtasks = TaskRepo::list_subtasks(&state.pool, id).await?;
    let dependencies = DependencyRepo::predecessors_of(&state.pool, id).await?;
    let dependents = DependencyRepo::dependents_of(&state.pool, id).await?;
    Ok(Json(TaskDetail {
        task,
        subtasks,
        dependencies,
        dependents,
    }))
}

/// GET /api/v1/tasks/{id}/subtasks
pub async fn list_subtasks(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<Vec<Task>>> {
    load_task_checked(&state, &user, id).await?;
    let subtasks = TaskRepo::list_subtasks(&state.pool, id).await?;
    Ok(Json(subtasks))
}

/// PUT /api/v1/tasks/{id}
///
/// Applies the progress rules: progress is clamped to 0..=100, and a task
/// reaching 100% is marked done with a completion timestamp.
pub async fn update(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateTask>,
) -> AppResult<Json<Task>> {
    let existing = load_task_checked(&state, &user, id).await?;
    validate_vocab(input.status.as_deref(), input.priority.as_deref())?;

    let mut progress =
        task_rules::clamp_progress(input.progress.unwrap_or(existing.progress));
    let mut status = input
        .status
        .clone()
        .unwrap_or_else(|| existing.status.clone());

    // Full progress marks the task done, but only when this request moved
    // the progress; an explicit status always wins.
    if input.status.is_none() && input.progress.is_some() && task_rules::is_complete(progress) {
        status = task_rules::STATUS_DONE.to_string();
    }
    let completed_at = if status == task_rules::STATUS_DONE {
        progress = 100;
        Some(existing.completed_at.unwrap_or_else(chrono::Utc::now))
    } else {
        None
    };

    let start = input.start_date.or(existing.start_date);
    let end = input.end_date.or(existing.end_date);
    let duration = resolve_duration(start, end)?;

    let task = TaskRepo::update(
        &state.pool,
        id,
        &input,
        &status,
        progress,
        duration,
        completed_at,
    )
    .await?
    .ok_or(AppError::Core(CoreError::NotFound { entity: "Task", id }))?;
    Ok(Json(task))
}

/// Body for the dedicated progress endpoint.
#[derive(Debug, Deserialize)]
pub struct ProgressInput {
    pub progress: i32,
}

/// PUT /api/v1/tasks/{id}/progress
///
/// Unlike the general update, an out-of-range value is rejected rather
/// than clamped.
pub async fn update_progress(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<ProgressInput>,
) -> AppResult<Json<Task>> {
    let existing = load_task_checked(&state, &user, id).await?;
    if !(0..=100).contains(&input.progress) {
        return Err(AppError::Core(CoreError::Validation(
            "progress must be between 0 and 100".into(),
        )));
    }

    let (status, completed_at) = if task_rules::is_complete(input.progress) {
        (
            task_rules::STATUS_DONE.to_string(),
            Some(existing.completed_at.unwrap_or_else(chrono::Utc::now)),
        )
    } else if existing.status == task_rules::STATUS_DONE {
        (task_rules::STATUS_IN_PROGRESS.to_string(), None)
    } else {
        (existing.status.clone(), None)
    };

    let task = TaskRepo::update(
        &state.pool,
        id,
        &UpdateTask::default(),
        &status,
        input.progress,
        existing.duration,
        completed_at,
    )
    .await?
    .ok_or(AppError::Core(CoreError::NotFound { entity: "Task", id }))?;
    Ok(Json(task))
}

/// Body for the dedicated dates endpoint.
#[derive(Debug, Deserialize)]
pub struct DatesInput {
    pub start_date: Option<chrono::NaiveDate>,
    pub end_date: Option<chrono::NaiveDate>,
}

/// PUT /api/v1/tasks/{id}/dates
///
/// Moves the task's date range and recomputes its duration.
pub async fn update_dates(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<DatesInput>,
) -> AppResult<Json<Task>> {
    let existing = load_task_checked(&state, &user, id).await?;

    let start = input.start_date.or(existing.start_date);
    let end = input.end_date.or(existing.end_date);
    let duration = resolve_duration(start, end)?;

    let patch = UpdateTask {
        start_date: input.start_date,
        end_date: input.end_date,
        ..UpdateTask::default()
    };
    let task = TaskRepo::update(
        &state.pool,
        id,
        &patch,
        &existing.status,
        existing.progress,
        duration,
        existing.completed_at,
    )
    .await?
    .ok_or(AppError::Core(CoreError::NotFound { entity: "Task", id }))?;
    Ok(Json(task))
}

/// DELETE /api/v1/tasks/{id}
///
/// Deletes the whole subtask tree and any dependency edges touching it.
pub async fn delete(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    load_task_checked(&state, &user, id).await?;
    let deleted = TaskRepo::soft_delete_tree(&state.pool, id).await?;
    tracing::info!(task_id = id, deleted, "Task tree deleted");
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Dependencies
// ---------------------------------------------------------------------------

/// Body for creating a dependency edge onto the path task.
#[derive(Debug, Deserialize)]
pub struct DependencyInput {
    pub predecessor_id: DbId,
    pub dependency_type: Option<String>,
}

/// POST /api/v1/tasks/{id}/dependencies
///
/// Links the path task as dependent on the given predecessor.
pub async fn add_dependency(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<DependencyInput>,
) -> AppResult<(StatusCode, Json<TaskDependency>)> {
    let dependent = load_task_checked(&state, &user, id).await?;

    dependency::validate_not_self_referential(input.predecessor_id, id)
        .map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;
    if let Some(dependency_type) = input.dependency_type.as_deref() {
        dependency::validate_dependency_type(dependency_type)
            .map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;
    }

    let predecessor = TaskRepo::find_by_id(&state.pool, input.predecessor_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Task",
            id: input.predecessor_id,
        }))?;
    if predecessor.project_id != dependent.project_id {
        return Err(AppError::Core(CoreError::Validation(
            "Dependencies must stay within one project".into(),
        )));
    }

    if DependencyRepo::exists(&state.pool, input.predecessor_id, id).await? {
        return Err(AppError::Core(CoreError::Conflict(
            "This dependency already exists".into(),
        )));
    }

    let edge = DependencyRepo::create(
        &state.pool,
        input.predecessor_id,
        id,
        input.dependency_type.as_deref(),
    )
    .await?;
    Ok((StatusCode::CREATED, Json(edge)))
}

/// GET /api/v1/tasks/{id}/dependencies
pub async fn list_dependencies(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<Vec<Task>>> {
    load_task_checked(&state, &user, id).await?;
    let predecessors = DependencyRepo::predecessors_of(&state.pool, id).await?;
    Ok(Json(predecessors))
}

/// GET /api/v1/tasks/{id}/dependents
pub async fn list_dependents(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<Vec<Task>>> {
    load_task_checked(&state, &user, id).await?;
    let dependents = DependencyRepo::dependents_of(&state.pool, id).await?;
    Ok(Json(dependents))
}

/// DELETE /api/v1/tasks/{id}/dependencies/{dependency_id}
pub async fn remove_dependency(
    State(state): State<AppState>,
    user: AuthUser,
    Path((id, dependency_id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    load_task_checked(&state, &user, id).await?;

    let edge = DependencyRepo::find_by_id(&state.pool, dependency_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "TaskDependency",
            id: dependency_id,
        }))?;
    if edge.dependent_id != id && edge.predecessor_id != id {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "TaskDependency",
            id: dependency_id,
        }));
    }

    DependencyRepo::delete(&state.pool, dependency_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Comments
// ---------------------------------------------------------------------------

/// POST /api/v1/tasks/{id}/comments
pub async fn add_comment(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<CreateTaskComment>,
) -> AppResult<(StatusCode, Json<TaskComment>)> {
    load_task_checked(&state, &user, id).await?;
    if input.content.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Comment content must not be empty".into(),
        )));
    }
    let comment = TaskCommentRepo::create(&state.pool, id, user.user_id, &input).await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

/// GET /api/v1/tasks/{id}/comments
pub async fn list_comments(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<Vec<TaskComment>>> {
    load_task_checked(&state, &user, id).await?;
    let comments = TaskCommentRepo::list(&state.pool, id).await?;
    Ok(Json(comments))
}

/// DELETE /api/v1/tasks/{id}/comments/{comment_id}
///
/// Only the comment's author may delete it.
pub async fn delete_comment(
    State(state): State<AppState>,
    user: AuthUser,
    Path((id, comment_id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    load_task_checked(&state, &user, id).await?;

    let comment = TaskCommentRepo::find_by_id(&state.pool, comment_id)
        .await?
        .filter(|c| c.task_id == id)
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "TaskComment",
            id: comment_id,
        }))?;
    if comment.author_id != user.user_id {
        return Err(AppError::Core(CoreError::Forbidden(
            "Only the author can delete a comment".into(),
        )));
    }

    TaskCommentRepo::delete(&state.pool, comment_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Labels on tasks
// ---------------------------------------------------------------------------

/// GET /api/v1/tasks/{id}/labels
pub async fn list_labels(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<Vec<Label>>> {
    load_task_checked(&state, &user, id).await?;
    let labels = LabelRepo::labels_for_task(&state.pool, id).await?;
    Ok(Json(labels))
}

/// PUT /api/v1/tasks/{id}/labels/{label_id}
pub async fn attach_label(
    State(state): State<AppState>,
    user: AuthUser,
    Path((id, label_id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    let task = load_task_checked(&state, &user, id).await?;

    let label = LabelRepo::find_by_id(&state.pool, label_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Label",
            id: label_id,
        }))?;
    if label.project_id != task.project_id {
        return Err(AppError::Core(CoreError::Validation(
            "Label belongs to a different project".into(),
        )));
    }

    LabelRepo::attach(&state.pool, id, label_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/v1/tasks/{id}/labels/{label_id}
pub async fn detach_label(
    State(state): State<AppState>,
    user: AuthUser,
    Path((id, label_id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    load_task_checked(&state, &user, id).await?;
    let detached = LabelRepo::detach(&state.pool, id, label_id).await?;
    if detached {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound {
            entity: "Label",
            id: label_id,
        }))
    }
}
