//! Repository for the `issues` and `issue_comments` tables.

use epm_core::types::DbId;
use sqlx::PgPool;

use crate::models::issue::{
    CreateIssue, CreateIssueComment, Issue, IssueComment, IssueStats, UpdateIssue,
};

const COLUMNS: &str = "id, project_id, title, description, status, priority, assignee_id, \
                       reporter_id, due_date, resolved_at, created_at, updated_at";

const COMMENT_COLUMNS: &str = "id, issue_id, author_id, content, created_at, updated_at";

/// Provides CRUD operations for issues and their comments.
pub struct IssueRepo;

impl IssueRepo {
    /// Insert an issue, returning the created row.
    pub async fn create(
        pool: &PgPool,
        project_id: DbId,
        reporter_id: DbId,
        input: &CreateIssue,
    ) -> Result<Issue, sqlx::Error> {
        let query = format!(
            "INSERT INTO issues (project_id, title, description, status, priority,
                                 assignee_id, reporter_id, due_date)
             VALUES ($1, $2, $3, COALESCE($4, 'open'), COALESCE($5, 'medium'), $6, $7, $8)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Issue>(&query)
            .bind(project_id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.status)
            .bind(&input.priority)
            .bind(input.assignee_id)
            .bind(reporter_id)
            .bind(input.due_date)
            .fetch_one(pool)
            .await
    }

    /// Find an issue by ID within a project.
    pub async fn find_by_id(
        pool: &PgPool,
        project_id: DbId,
        id: DbId,
    ) -> Result<Option<Issue>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM issues WHERE id = $1 AND project_id = $2");
        sqlx::query_as::<_, Issue>(&query)
            .bind(id)
            .bind(project_id)
            .fetch_optional(pool)
            .await
    }

    /// List a project's issues, newest first, optionally filtered.
    pub async fn list(
        pool: &PgPool,
        project_id: DbId,
        status: Option<&str>,
        priority: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Issue>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM issues
             WHERE project_id = $1
               AND ($2::text IS NULL OR status = $2)
               AND ($3::text IS NULL OR priority = $3)
             ORDER BY created_at DESC
             LIMIT $4 OFFSET $5"
        );
        sqlx::query_as::<_, Issue>(&query)
            .bind(project_id)
            .bind(status)
            .bind(priority)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Update an issue. Only non-`None` fields in `input` are applied.
    ///
    /// Moving to "resolved" or "closed" stamps `resolved_at`; moving back
    /// to an open status clears it.
    pub async fn update(
        pool: &PgPool,
        project_id: DbId,
        id: DbId,
        input: &UpdateIssue,
    ) -> Result<Option<Issue>, sqlx::Error> {
        let query = format!(
            "UPDATE issues SET
                title = COALESCE($3, title),
                description = COALESCE($4, description),
                status = COALESCE($5, status),
                priority = COALESCE($6, priority),
                assignee_id = COALESCE($7, assignee_id),
                due_date = COALESCE($8, due_date),
                resolved_at = CASE
                    WHEN COALESCE($5, status) IN ('resolved', 'closed')
                        THEN COALESCE(resolved_at, NOW())
                    ELSE NULL
                END,
                updated_at = NOW()
             WHERE id = $1 AND project_id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Issue>(&query)
            .bind(id)
            .bind(project_id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.status)
            .bind(&input.priority)
            .bind(input.assignee_id)
            .bind(input.due_date)
            .fetch_optional(pool)
            .await
    }

    /// Delete an issue. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, project_id: DbId, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM issues WHERE id = $1 AND project_id = $2")
            .bind(id)
            .bind(project_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Add a comment to an issue.
    pub async fn add_comment(
        pool: &PgPool,
        issue_id: DbId,
        author_id: DbId,
        input: &CreateIssueComment,
    ) -> Result<IssueComment, sqlx::Error> {
        let query = format!(
            "INSERT INTO issue_comments (issue_id, author_id, content)
             VALUES ($1, $2, $3)
             RETURNING {COMMENT_COLUMNS}"
        );
        sqlx::query_as::<_, IssueComment>(&query)
            .bind(issue_id)
            .bind(author_id)
            .bind(&input.content)
            .fetch_one(pool)
            .await
    }

    /// An issue's comments, oldest first.
    pub async fn comments(pool: &PgPool, issue_id: DbId) -> Result<Vec<IssueComment>, sqlx::Error> {
        let query = format!(
            "SELECT {COMMENT_COLUMNS} FROM issue_comments WHERE issue_id = $1 ORDER BY created_at"
        );
        sqlx::query_as::<_, IssueComment>(&query)
            .bind(issue_id)
            .fetch_all(pool)
            .await
    }

    /// Issue counts for a project, by status and priority, plus overdue.
    pub async fn stats(pool: &PgPool, project_id: DbId) -> Result<IssueStats, sqlx::Error> {
        let row: (i64, i64, i64, i64, i64, i64, i64) = sqlx::query_as(
            "SELECT COUNT(*),
                    COUNT(*) FILTER (WHERE status = 'open'),
                    COUNT(*) FILTER (WHERE status = 'in_progress'),
                    COUNT(*) FILTER (WHERE status = 'resolved'),
                    COUNT(*) FILTER (WHERE status = 'closed'),
                    COUNT(*) FILTER (WHERE priority = 'critical'),
                    COUNT(*) FILTER (WHERE due_date < CURRENT_DATE AND status != 'closed')
             FROM issues WHERE project_id = $1",
        )
        .bind(project_id)
        .fetch_one(pool)
        .await?;
        Ok(IssueStats {
            total: row.0,
            open: row.1,
            in_progress: row.2,
            resolved: row.3,
            closed: row.4,
            critical: row.5,
            overdue: row.6,
        })
    }
}
