//! Repository for the `projects` table.

use epm_core::types::DbId;
use sqlx::PgPool;

use crate::models::project::{CreateProject, Project, ProjectStats, UpdateProject};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, key, name, description, status, owner_id, start_date, end_date, \
                       created_at, updated_at";

/// Provides CRUD operations for projects.
pub struct ProjectRepo;

impl ProjectRepo {
    /// Insert a new project and its owner's admin membership in one
    /// transaction, returning the created row.
    ///
    /// A project must never exist without an admin member, so both rows
    /// commit or neither does. The key is stored upper-case. If `status`
    /// is `None`, defaults to "active".
    pub async fn create(
        pool: &PgPool,
        owner_id: DbId,
        input: &CreateProject,
    ) -> Result<Project, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO projects (key, name, description, status, owner_id, start_date, end_date)
             VALUES (UPPER($1), $2, $3, COALESCE($4, 'active'), $5, $6, $7)
             RETURNING {COLUMNS}"
        );
        let project = sqlx::query_as::<_, Project>(&query)
            .bind(&input.key)
            .bind(&input.name)
            .bind(&input.description)
            .bind(&input.status)
            .bind(owner_id)
            .bind(input.start_date)
            .bind(input.end_date)
            .fetch_one(&mut *tx)
            .await?;

        sqlx::query("INSERT INTO project_members (project_id, user_id, role) VALUES ($1, $2, $3)")
            .bind(project.id)
            .bind(owner_id)
            .bind(epm_core::roles::ROLE_ADMIN)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(project)
    }

    /// Find a project by its internal ID. Excludes soft-deleted rows.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Project>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM projects WHERE id = $1 AND deleted_at IS NULL");
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a project by its key, case-insensitively.
    pub async fn find_by_key(pool: &PgPool, key: &str) -> Result<Option<Project>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM projects WHERE key = UPPER($1) AND deleted_at IS NULL");
        sqlx::query_as::<_, Project>(&query)
            .bind(key)
            .fetch_optional(pool)
            .await
    }

    /// List projects the given user is a member of, newest first.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: DbId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Project>, sqlx::Error> {
        let query = format!(
            "SELECT p.{} FROM projects p
             JOIN project_members m ON m.project_id = p.id
             WHERE m.user_id = $1 AND p.deleted_at IS NULL
             ORDER BY p.created_at DESC
             LIMIT $2 OFFSET $3",
            COLUMNS.replace(", ", ", p.")
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(user_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// List all projects, newest first. Excludes soft-deleted rows.
    pub async fn list(pool: &PgPool, limit: i64, offset: i64) -> Result<Vec<Project>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM projects WHERE deleted_at IS NULL
             ORDER BY created_at DESC
             LIMIT $1 OFFSET $2"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Update a project. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateProject,
    ) -> Result<Option<Project>, sqlx::Error> {
        let query = format!(
            "UPDATE projects SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                status = COALESCE($4, status),
                start_date = COALESCE($5, start_date),
                end_date = COALESCE($6, end_date),
                updated_at = NOW()
             WHERE id = $1 AND deleted_at IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(&input.status)
            .bind(input.start_date)
            .bind(input.end_date)
            .fetch_optional(pool)
            .await
    }

    /// Soft-delete a project by ID. Returns `true` if a row was marked deleted.
    pub async fn soft_delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE projects SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Aggregate counts for the project detail view.
    pub async fn stats(pool: &PgPool, id: DbId) -> Result<ProjectStats, sqlx::Error> {
        let (total_tasks, completed_tasks): (i64, i64) = sqlx::query_as(
            "SELECT COUNT(*), COUNT(*) FILTER (WHERE status = 'done')
             FROM tasks WHERE project_id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .fetch_one(pool)
        .await?;

        let (total_milestones,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM milestones WHERE project_id = $1")
                .bind(id)
                .fetch_one(pool)
                .await?;

        let (member_count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM project_members WHERE project_id = $1")
                .bind(id)
                .fetch_one(pool)
                .await?;

        Ok(ProjectStats {
            total_tasks,
            completed_tasks,
            total_milestones,
            member_count,
        })
    }
}
