//! Issue models and DTOs.

use epm_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// An issue row from the `issues` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Issue {
    pub id: DbId,
    pub project_id: DbId,
    pub title: String,
    pub description: Option<String>,
    pub status: String,
    pub priority: String,
    pub assignee_id: Option<DbId>,
    pub reporter_id: DbId,
    pub due_date: Option<chrono::NaiveDate>,
    pub resolved_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating an issue.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateIssue {
    pub title: String,
    pub description: Option<String>,
    /// Defaults to "open" if omitted.
    pub status: Option<String>,
    /// Defaults to "medium" if omitted.
    pub priority: Option<String>,
    pub assignee_id: Option<DbId>,
    pub due_date: Option<chrono::NaiveDate>,
}

/// DTO for updating an issue. All fields are optional.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateIssue {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub assignee_id: Option<DbId>,
    pub due_date: Option<chrono::NaiveDate>,
}

/// A comment row from the `issue_comments` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct IssueComment {
    pub id: DbId,
    pub issue_id: DbId,
    pub author_id: DbId,
    pub content: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating an issue comment.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateIssueComment {
    pub content: String,
}

/// Issue counts for a project, by status and priority.
#[derive(Debug, Clone, Serialize)]
pub struct IssueStats {
    pub total: i64,
    pub open: i64,
    pub in_progress: i64,
    pub resolved: i64,
    pub closed: i64,
    pub critical: i64,
    pub overdue: i64,
}
