//! Repository for the `project_members` table.

use epm_core::types::DbId;
use sqlx::PgPool;

use crate::models::member::{ProjectMember, ProjectMemberDetail};

const COLUMNS: &str = "id, project_id, user_id, role, created_at, updated_at";

/// Provides membership operations for projects.
pub struct MemberRepo;

impl MemberRepo {
    /// Add a user to a project, returning the created row.
    pub async fn add(
        pool: &PgPool,
        project_id: DbId,
        user_id: DbId,
        role: &str,
    ) -> Result<ProjectMember, sqlx::Error> {
        let query = format!(
            "INSERT INTO project_members (project_id, user_id, role)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ProjectMember>(&query)
            .bind(project_id)
            .bind(user_id)
            .bind(role)
            .fetch_one(pool)
            .await
    }

    /// Find a user's membership in a project.
    pub async fn find(
        pool: &PgPool,
        project_id: DbId,
        user_id: DbId,
    ) -> Result<Option<ProjectMember>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM project_members WHERE project_id = $1 AND user_id = $2"
        );
        sqlx::query_as::<_, ProjectMember>(&query)
            .bind(project_id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// List a project's members with user display fields.
    pub async fn list(
        pool: &PgPool,
        project_id: DbId,
    ) -> Result<Vec<ProjectMemberDetail>, sqlx::Error> {
        sqlx::query_as::<_, ProjectMemberDetail>(
            "SELECT m.id, m.project_id, m.user_id, m.role, u.username, u.full_name, m.created_at
             FROM project_members m
             JOIN users u ON u.id = m.user_id
             WHERE m.project_id = $1
             ORDER BY m.created_at",
        )
        .bind(project_id)
        .fetch_all(pool)
        .await
    }

    /// Change a member's role. Returns the updated row, or `None` if the
    /// user is not a member.
    pub async fn update_role(
        pool: &PgPool,
        project_id: DbId,
        user_id: DbId,
        role: &str,
    ) -> Result<Option<ProjectMember>, sqlx::Error> {
        let query = format!(
            "UPDATE project_members SET role = $3, updated_at = NOW()
             WHERE project_id = $1 AND user_id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ProjectMember>(&query)
            .bind(project_id)
            .bind(user_id)
            .bind(role)
            .fetch_optional(pool)
            .await
    }

    /// Remove a user from a project. Returns `true` if a row was removed.
    pub async fn remove(
        pool: &PgPool,
        project_id: DbId,
        user_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("DELETE FROM project_members WHERE project_id = $1 AND user_id = $2")
                .bind(project_id)
                .bind(user_id)
                .execute(pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Count members of a project holding the admin role.
    pub async fn count_admins(pool: &PgPool, project_id: DbId) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM project_members WHERE project_id = $1 AND role = 'admin'",
        )
        .bind(project_id)
        .fetch_one(pool)
        .await?;
        Ok(count)
    }
}
