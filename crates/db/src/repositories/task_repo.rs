//! Repositories for tasks, dependency edges, and task comments.

use epm_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::task::{
    CreateTask, CreateTaskComment, Task, TaskComment, TaskDependency, TaskStatusCounts, UpdateTask,
};

const COLUMNS: &str = "id, project_id, parent_id, title, description, status, priority, \
                       assignee_id, reporter_id, start_date, end_date, duration, \
                       estimated_hours, actual_hours, progress, completed_at, created_at, \
                       updated_at";

/// Provides CRUD operations for tasks.
pub struct TaskRepo;

impl TaskRepo {
    /// Insert a new task, returning the created row.
    ///
    /// `duration` is the caller-derived inclusive day count for the date range.
    pub async fn create(
        pool: &PgPool,
        project_id: DbId,
        reporter_id: DbId,
        input: &CreateTask,
        duration: Option<i64>,
    ) -> Result<Task, sqlx::Error> {
        let query = format!(
            "INSERT INTO tasks (project_id, parent_id, title, description, status, priority,
                                assignee_id, reporter_id, start_date, end_date, duration,
                                estimated_hours, progress)
             VALUES ($1, $2, $3, $4, COALESCE($5, 'todo'), COALESCE($6, 'medium'),
                     $7, $8, $9, $10, $11, $12, COALESCE($13, 0))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Task>(&query)
            .bind(project_id)
            .bind(input.parent_id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.status)
            .bind(&input.priority)
            .bind(input.assignee_id)
            .bind(reporter_id)
            .bind(input.start_date)
            .bind(input.end_date)
            .bind(duration)
            .bind(input.estimated_hours)
            .bind(input.progress)
            .fetch_one(pool)
            .await
    }

    /// Find a task by its internal ID. Excludes soft-deleted rows.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Task>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM tasks WHERE id = $1 AND deleted_at IS NULL");
        sqlx::query_as::<_, Task>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List a project's tasks, optionally filtered by status, assignee, or parent.
    pub async fn list(
        pool: &PgPool,
        project_id: DbId,
        status: Option<&str>,
        priority: Option<&str>,
        assignee_id: Option<DbId>,
        parent_id: Option<DbId>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Task>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM tasks
             WHERE project_id = $1 AND deleted_at IS NULL
               AND ($2::text IS NULL OR status = $2)
               AND ($3::text IS NULL OR priority = $3)
               AND ($4::bigint IS NULL OR assignee_id = $4)
               AND ($5::bigint IS NULL OR parent_id = $5)
             ORDER BY created_at DESC
             LIMIT $6 OFFSET $7"
        );
        sqlx::query_as::<_, Task>(&query)
            .bind(project_id)
            .bind(status)
            .bind(priority)
            .bind(assignee_id)
            .bind(parent_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// List the direct subtasks of a task.
    pub async fn list_subtasks(pool: &PgPool, parent_id: DbId) -> Result<Vec<Task>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM tasks WHERE parent_id = $1 AND deleted_at IS NULL
             ORDER BY created_at"
        );
        sqlx::query_as::<_, Task>(&query)
            .bind(parent_id)
            .fetch_all(pool)
            .await
    }

    /// Update a task with fully resolved derived fields.
    ///
    /// Plain fields use partial-update semantics; `status`, `progress`,
    /// `duration`, and `completed_at` are written as given since the caller
    /// has already applied the progress and completion rules.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateTask,
        status: &str,
        progress: i32,
        duration: Option<i64>,
        completed_at: Option<Timestamp>,
    ) -> Result<Option<Task>, sqlx::Error> {
        let query = format!(
            "UPDATE tasks SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                priority = COALESCE($4, priority),
                assignee_id = COALESCE($5, assignee_id),
                start_date = COALESCE($6, start_date),
                end_date = COALESCE($7, end_date),
                estimated_hours = COALESCE($8, estimated_hours),
                actual_hours = COALESCE($9, actual_hours),
                status = $10,
                progress = $11,
                duration = $12,
                completed_at = $13,
                updated_at = NOW()
             WHERE id = $1 AND deleted_at IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Task>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.priority)
            .bind(input.assignee_id)
            .bind(input.start_date)
            .bind(input.end_date)
            .bind(input.estimated_hours)
            .bind(input.actual_hours)
            .bind(status)
            .bind(progress)
            .bind(duration)
            .bind(completed_at)
            .fetch_optional(pool)
            .await
    }

    /// Soft-delete a task and its whole subtask tree, and remove dependency
    /// edges touching any of them. Returns the number of tasks deleted.
    pub async fn soft_delete_tree(pool: &PgPool, id: DbId) -> Result<u64, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let result = sqlx::query(
            "WITH RECURSIVE tree AS (
                SELECT id FROM tasks WHERE id = $1 AND deleted_at IS NULL
                UNION ALL
                SELECT t.id FROM tasks t JOIN tree ON t.parent_id = tree.id
                WHERE t.deleted_at IS NULL
             )
             UPDATE tasks SET deleted_at = NOW() WHERE id IN (SELECT id FROM tree)",
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            "DELETE FROM task_dependencies d
             USING tasks t
             WHERE (d.predecessor_id = t.id OR d.dependent_id = t.id)
               AND t.deleted_at IS NOT NULL",
        )
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(result.rows_affected())
    }

    /// Per-status task counts for a project.
    pub async fn status_counts_for_project(
        pool: &PgPool,
        project_id: DbId,
    ) -> Result<TaskStatusCounts, sqlx::Error> {
        let row: (i64, i64, i64, i64) = sqlx::query_as(
            "SELECT COUNT(*) FILTER (WHERE status = 'todo'),
                    COUNT(*) FILTER (WHERE status = 'in_progress'),
                    COUNT(*) FILTER (WHERE status = 'review'),
                    COUNT(*) FILTER (WHERE status = 'done')
             FROM tasks WHERE project_id = $1 AND deleted_at IS NULL",
        )
        .bind(project_id)
        .fetch_one(pool)
        .await?;
        Ok(TaskStatusCounts {
            todo: row.0,
            in_progress: row.1,
            review: row.2,
            done: row.3,
        })
    }

    /// Per-status task counts across everything assigned to a user.
    pub async fn status_counts_for_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<TaskStatusCounts, sqlx::Error> {
        let row: (i64, i64, i64, i64) = sqlx::query_as(
            "SELECT COUNT(*) FILTER (WHERE status = 'todo'),
                    COUNT(*) FILTER (WHERE status = 'in_progress'),
                    COUNT(*) FILTER (WHERE status = 'review'),
                    COUNT(*) FILTER (WHERE status = 'done')
             FROM tasks WHERE assignee_id = $1 AND deleted_at IS NULL",
        )
        .bind(user_id)
        .fetch_one(pool)
        .await?;
        Ok(TaskStatusCounts {
            todo: row.0,
            in_progress: row.1,
            review: row.2,
            done: row.3,
        })
    }

    /// A user's open tasks, oldest first, capped at `limit`.
    pub async fn open_for_user(
        pool: &PgPool,
        user_id: DbId,
        limit: i64,
    ) -> Result<Vec<Task>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM tasks
             WHERE assignee_id = $1 AND deleted_at IS NULL
               AND status IN ('todo', 'in_progress', 'review')
             ORDER BY created_at
             LIMIT $2"
        );
        sqlx::query_as::<_, Task>(&query)
            .bind(user_id)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// Count a user's open tasks across all projects.
    pub async fn count_open_for_user(pool: &PgPool, user_id: DbId) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM tasks
             WHERE assignee_id = $1 AND deleted_at IS NULL
               AND status IN ('todo', 'in_progress', 'review')",
        )
        .bind(user_id)
        .fetch_one(pool)
        .await?;
        Ok(count)
    }

    /// Open-task counts per member of a project. Members with no open
    /// tasks are included with a zero count.
    pub async fn open_counts_by_member(
        pool: &PgPool,
        project_id: DbId,
    ) -> Result<Vec<(DbId, i64)>, sqlx::Error> {
        sqlx::query_as(
            "SELECT m.user_id, COUNT(t.id)
             FROM project_members m
             LEFT JOIN tasks t ON t.assignee_id = m.user_id
               AND t.project_id = m.project_id
               AND t.deleted_at IS NULL
               AND t.status IN ('todo', 'in_progress', 'review')
             WHERE m.project_id = $1
             GROUP BY m.user_id
             ORDER BY m.user_id",
        )
        .bind(project_id)
        .fetch_all(pool)
        .await
    }
}

const DEPENDENCY_COLUMNS: &str =
    "id, predecessor_id, dependent_id, dependency_type, created_at, updated_at";

/// Provides operations on the task dependency graph.
pub struct DependencyRepo;

impl DependencyRepo {
    /// Insert a dependency edge, returning the created row.
    ///
    /// The type defaults to "fs" (finish-to-start) if omitted.
    pub async fn create(
        pool: &PgPool,
        predecessor_id: DbId,
        dependent_id: DbId,
        dependency_type: Option<&str>,
    ) -> Result<TaskDependency, sqlx::Error> {
        let query = format!(
            "INSERT INTO task_dependencies (predecessor_id, dependent_id, dependency_type)
             VALUES ($1, $2, COALESCE($3, 'fs'))
             RETURNING {DEPENDENCY_COLUMNS}"
        );
        sqlx::query_as::<_, TaskDependency>(&query)
            .bind(predecessor_id)
            .bind(dependent_id)
            .bind(dependency_type)
            .fetch_one(pool)
            .await
    }

    /// Find an edge by ID.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<TaskDependency>, sqlx::Error> {
        let query = format!("SELECT {DEPENDENCY_COLUMNS} FROM task_dependencies WHERE id = $1");
        sqlx::query_as::<_, TaskDependency>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Whether an edge already links this pair in this direction.
    pub async fn exists(
        pool: &PgPool,
        predecessor_id: DbId,
        dependent_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM task_dependencies
             WHERE predecessor_id = $1 AND dependent_id = $2",
        )
        .bind(predecessor_id)
        .bind(dependent_id)
        .fetch_one(pool)
        .await?;
        Ok(count > 0)
    }

    /// Tasks the given task depends on (its predecessors).
    pub async fn predecessors_of(pool: &PgPool, task_id: DbId) -> Result<Vec<Task>, sqlx::Error> {
        let query = format!(
            "SELECT t.{} FROM tasks t
             JOIN task_dependencies d ON d.predecessor_id = t.id
             WHERE d.dependent_id = $1 AND t.deleted_at IS NULL
             ORDER BY t.id",
            COLUMNS.replace(", ", ", t.")
        );
        sqlx::query_as::<_, Task>(&query)
            .bind(task_id)
            .fetch_all(pool)
            .await
    }

    /// Tasks that depend on the given task.
    pub async fn dependents_of(pool: &PgPool, task_id: DbId) -> Result<Vec<Task>, sqlx::Error> {
        let query = format!(
            "SELECT t.{} FROM tasks t
             JOIN task_dependencies d ON d.dependent_id = t.id
             WHERE d.predecessor_id = $1 AND t.deleted_at IS NULL
             ORDER BY t.id",
            COLUMNS.replace(", ", ", t.")
        );
        sqlx::query_as::<_, Task>(&query)
            .bind(task_id)
            .fetch_all(pool)
            .await
    }

    /// Delete an edge by ID. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM task_dependencies WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

const COMMENT_COLUMNS: &str = "id, task_id, author_id, content, created_at, updated_at";

/// Provides operations on task comments.
pub struct TaskCommentRepo;

impl TaskCommentRepo {
    /// Insert a comment, returning the created row.
    pub async fn create(
        pool: &PgPool,
        task_id: DbId,
        author_id: DbId,
        input: &CreateTaskComment,
    ) -> Result<TaskComment, sqlx::Error> {
        let query = format!(
            "INSERT INTO task_comments (task_id, author_id, content)
             VALUES ($1, $2, $3)
             RETURNING {COMMENT_COLUMNS}"
        );
        sqlx::query_as::<_, TaskComment>(&query)
            .bind(task_id)
            .bind(author_id)
            .bind(&input.content)
            .fetch_one(pool)
            .await
    }

    /// List a task's comments, oldest first.
    pub async fn list(pool: &PgPool, task_id: DbId) -> Result<Vec<TaskComment>, sqlx::Error> {
        let query = format!(
            "SELECT {COMMENT_COLUMNS} FROM task_comments WHERE task_id = $1 ORDER BY created_at"
        );
        sqlx::query_as::<_, TaskComment>(&query)
            .bind(task_id)
            .fetch_all(pool)
            .await
    }

    /// Find a comment by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<TaskComment>, sqlx::Error> {
        let query = format!("SELECT {COMMENT_COLUMNS} FROM task_comments WHERE id = $1");
        sqlx::query_as::<_, TaskComment>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Delete a comment. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM task_comments WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
