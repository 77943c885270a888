//! Repository for the `labels` and `task_labels` tables.

use epm_core::types::DbId;
use sqlx::PgPool;

use crate::models::label::{CreateLabel, Label, UpdateLabel};

const COLUMNS: &str = "id, project_id, name, color, created_at, updated_at";

/// Provides CRUD operations for labels and their task assignments.
pub struct LabelRepo;

impl LabelRepo {
    /// Insert a label, returning the created row.
    pub async fn create(
        pool: &PgPool,
        project_id: DbId,
        input: &CreateLabel,
    ) -> Result<Label, sqlx::Error> {
        let query = format!(
            "INSERT INTO labels (project_id, name, color)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Label>(&query)
            .bind(project_id)
            .bind(&input.name)
            .bind(&input.color)
            .fetch_one(pool)
            .await
    }

    /// Find a label by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Label>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM labels WHERE id = $1");
        sqlx::query_as::<_, Label>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List a project's labels by name.
    pub async fn list(pool: &PgPool, project_id: DbId) -> Result<Vec<Label>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM labels WHERE project_id = $1 ORDER BY name");
        sqlx::query_as::<_, Label>(&query)
            .bind(project_id)
            .fetch_all(pool)
            .await
    }

    /// Update a label. Only non-`None` fields in `input` are applied.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateLabel,
    ) -> Result<Option<Label>, sqlx::Error> {
        let query = format!(
            "UPDATE labels SET
                name = COALESCE($2, name),
                color = COALESCE($3, color),
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Label>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.color)
            .fetch_optional(pool)
            .await
    }

    /// Delete a label and its assignments. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM labels WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Attach a label to a task. Returns `false` if already attached.
    pub async fn attach(pool: &PgPool, task_id: DbId, label_id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO task_labels (task_id, label_id)
             VALUES ($1, $2)
             ON CONFLICT ON CONSTRAINT uq_task_labels_pair DO NOTHING",
        )
        .bind(task_id)
        .bind(label_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Detach a label from a task. Returns `true` if a row was removed.
    pub async fn detach(pool: &PgPool, task_id: DbId, label_id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM task_labels WHERE task_id = $1 AND label_id = $2")
            .bind(task_id)
            .bind(label_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Labels attached to a task.
    pub async fn labels_for_task(pool: &PgPool, task_id: DbId) -> Result<Vec<Label>, sqlx::Error> {
        let query = format!(
            "SELECT l.{} FROM labels l
             JOIN task_labels tl ON tl.label_id = l.id
             WHERE tl.task_id = $1
             ORDER BY l.name",
            COLUMNS.replace(", ", ", l.")
        );
        sqlx::query_as::<_, Label>(&query)
            .bind(task_id)
            .fetch_all(pool)
            .await
    }
}
