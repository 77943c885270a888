//! Task entity model, dependencies, comments, and DTOs.

use epm_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A task row from the `tasks` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Task {
    pub id: DbId,
    pub project_id: DbId,
    /// Parent task for subtasks; `None` for top-level tasks.
    pub parent_id: Option<DbId>,
    pub title: String,
    pub description: Option<String>,
    pub status: String,
    pub priority: String,
    pub assignee_id: Option<DbId>,
    pub reporter_id: DbId,
    pub start_date: Option<chrono::NaiveDate>,
    pub end_date: Option<chrono::NaiveDate>,
    /// Inclusive working duration in days, derived from the date range.
    pub duration: Option<i64>,
    pub estimated_hours: Option<f64>,
    pub actual_hours: Option<f64>,
    pub progress: i32,
    pub completed_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a task.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTask {
    pub parent_id: Option<DbId>,
    pub title: String,
    pub description: Option<String>,
    /// Defaults to "todo" if omitted.
    pub status: Option<String>,
    /// Defaults to "medium" if omitted.
    pub priority: Option<String>,
    pub assignee_id: Option<DbId>,
    pub start_date: Option<chrono::NaiveDate>,
    pub end_date: Option<chrono::NaiveDate>,
    pub estimated_hours: Option<f64>,
    pub progress: Option<i32>,
}

/// DTO for updating a task. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateTask {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub assignee_id: Option<DbId>,
    pub start_date: Option<chrono::NaiveDate>,
    pub end_date: Option<chrono::NaiveDate>,
    pub estimated_hours: Option<f64>,
    pub actual_hours: Option<f64>,
    pub progress: Option<i32>,
}

/// A dependency edge from the `task_dependencies` table.
///
/// `predecessor_id` must be satisfied before `dependent_id` per the
/// link type semantics.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TaskDependency {
    pub id: DbId,
    pub predecessor_id: DbId,
    pub dependent_id: DbId,
    pub dependency_type: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A comment row from the `task_comments` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TaskComment {
    pub id: DbId,
    pub task_id: DbId,
    pub author_id: DbId,
    pub content: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a task comment.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTaskComment {
    pub content: String,
}

/// Per-status task counts.
#[derive(Debug, Clone, Serialize)]
pub struct TaskStatusCounts {
    pub todo: i64,
    pub in_progress: i64,
    pub review: i64,
    pub done: i64,
}
