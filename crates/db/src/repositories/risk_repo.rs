//! Repository for the `risks` and `risk_responses` tables.

use epm_core::types::DbId;
use sqlx::PgPool;

use crate::models::risk::{
    CreateRisk, CreateRiskResponse, Risk, RiskResponse, RiskStats, UpdateRisk,
};

const COLUMNS: &str = "id, project_id, title, description, level, status, probability, impact, \
                       score, owner_id, mitigation, created_at, updated_at";

const RESPONSE_COLUMNS: &str = "id, risk_id, action, result, performed_by, created_at, updated_at";

/// Provides CRUD operations for risks and their response log.
pub struct RiskRepo;

impl RiskRepo {
    /// Insert a risk, returning the created row.
    ///
    /// The score is derived in SQL from probability and impact.
    pub async fn create(
        pool: &PgPool,
        project_id: DbId,
        input: &CreateRisk,
    ) -> Result<Risk, sqlx::Error> {
        let query = format!(
            "INSERT INTO risks (project_id, title, description, level, status, probability,
                                impact, score, owner_id, mitigation)
             VALUES ($1, $2, $3, COALESCE($4, 'medium'), COALESCE($5, 'identified'),
                     COALESCE($6, 0), COALESCE($7, 0),
                     COALESCE($6, 0) * COALESCE($7, 0) / 100, $8, $9)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Risk>(&query)
            .bind(project_id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.level)
            .bind(&input.status)
            .bind(input.probability)
            .bind(input.impact)
            .bind(input.owner_id)
            .bind(&input.mitigation)
            .fetch_one(pool)
            .await
    }

    /// Find a risk by ID within a project.
    pub async fn find_by_id(
        pool: &PgPool,
        project_id: DbId,
        id: DbId,
    ) -> Result<Option<Risk>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM risks WHERE id = $1 AND project_id = $2");
        sqlx::query_as::<_, Risk>(&query)
            .bind(id)
            .bind(project_id)
            .fetch_optional(pool)
            .await
    }

    /// List a project's risks, highest score first, optionally filtered.
    pub async fn list(
        pool: &PgPool,
        project_id: DbId,
        level: Option<&str>,
        status: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Risk>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM risks
             WHERE project_id = $1
               AND ($2::text IS NULL OR level = $2)
               AND ($3::text IS NULL OR status = $3)
             ORDER BY score DESC, id
             LIMIT $4 OFFSET $5"
        );
        sqlx::query_as::<_, Risk>(&query)
            .bind(project_id)
            .bind(level)
            .bind(status)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Update a risk. Only non-`None` fields in `input` are applied; the
    /// score is recomputed from the effective probability and impact.
    pub async fn update(
        pool: &PgPool,
        project_id: DbId,
        id: DbId,
        input: &UpdateRisk,
    ) -> Result<Option<Risk>, sqlx::Error> {
        let query = format!(
            "UPDATE risks SET
                title = COALESCE($3, title),
                description = COALESCE($4, description),
                level = COALESCE($5, level),
                status = COALESCE($6, status),
                probability = COALESCE($7, probability),
                impact = COALESCE($8, impact),
                score = COALESCE($7, probability) * COALESCE($8, impact) / 100,
                owner_id = COALESCE($9, owner_id),
                mitigation = COALESCE($10, mitigation),
                updated_at = NOW()
             WHERE id = $1 AND project_id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Risk>(&query)
            .bind(id)
            .bind(project_id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.level)
            .bind(&input.status)
            .bind(input.probability)
            .bind(input.impact)
            .bind(input.owner_id)
            .bind(&input.mitigation)
            .fetch_optional(pool)
            .await
    }

    /// Delete a risk. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, project_id: DbId, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM risks WHERE id = $1 AND project_id = $2")
            .bind(id)
            .bind(project_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Record a response action against a risk.
    pub async fn add_response(
        pool: &PgPool,
        risk_id: DbId,
        performed_by: DbId,
        input: &CreateRiskResponse,
    ) -> Result<RiskResponse, sqlx::Error> {
        let query = format!(
            "INSERT INTO risk_responses (risk_id, action, result, performed_by)
             VALUES ($1, $2, $3, $4)
             RETURNING {RESPONSE_COLUMNS}"
        );
        sqlx::query_as::<_, RiskResponse>(&query)
            .bind(risk_id)
            .bind(&input.action)
            .bind(&input.result)
            .bind(performed_by)
            .fetch_one(pool)
            .await
    }

    /// A risk's response log, oldest first.
    pub async fn responses(pool: &PgPool, risk_id: DbId) -> Result<Vec<RiskResponse>, sqlx::Error> {
        let query = format!(
            "SELECT {RESPONSE_COLUMNS} FROM risk_responses WHERE risk_id = $1 ORDER BY created_at"
        );
        sqlx::query_as::<_, RiskResponse>(&query)
            .bind(risk_id)
            .fetch_all(pool)
            .await
    }

    /// Per-level and per-status counts for a project's risks.
    pub async fn stats(pool: &PgPool, project_id: DbId) -> Result<RiskStats, sqlx::Error> {
        let row: (i64, i64, i64, i64, i64, i64) = sqlx::query_as(
            "SELECT COUNT(*),
                    COUNT(*) FILTER (WHERE level = 'low'),
                    COUNT(*) FILTER (WHERE level = 'medium'),
                    COUNT(*) FILTER (WHERE level = 'high'),
                    COUNT(*) FILTER (WHERE level = 'critical'),
                    COUNT(*) FILTER (WHERE status = 'closed')
             FROM risks WHERE project_id = $1",
        )
        .bind(project_id)
        .fetch_one(pool)
        .await?;
        Ok(RiskStats {
            total: row.0,
            low: row.1,
            medium: row.2,
            high: row.3,
            critical: row.4,
            high_priority: row.3 + row.4,
            open: row.0 - row.5,
            closed: row.5,
        })
    }
}
