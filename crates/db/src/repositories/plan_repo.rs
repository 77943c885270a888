//! Repositories for plans, WBS tasks, and plan milestones.

use epm_core::types::DbId;
use sqlx::PgPool;

use crate::models::plan::{
    CreatePlan, CreatePlanMilestone, CreateWbsTask, Plan, PlanMilestone, UpdatePlan,
    UpdatePlanMilestone, UpdateWbsTask, WbsTask,
};

const PLAN_COLUMNS: &str = "id, project_id, name, description, status, progress, start_date, \
                            end_date, created_by, created_at, updated_at";

/// Provides CRUD operations for plans.
pub struct PlanRepo;

impl PlanRepo {
    /// Insert a plan, returning the created row.
    pub async fn create(
        pool: &PgPool,
        project_id: DbId,
        created_by: DbId,
        input: &CreatePlan,
    ) -> Result<Plan, sqlx::Error> {
        let query = format!(
            "INSERT INTO plans (project_id, name, description, status, start_date, end_date, created_by)
             VALUES ($1, $2, $3, COALESCE($4, 'draft'), $5, $6, $7)
             RETURNING {PLAN_COLUMNS}"
        );
        sqlx::query_as::<_, Plan>(&query)
            .bind(project_id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(&input.status)
            .bind(input.start_date)
            .bind(input.end_date)
            .bind(created_by)
            .fetch_one(pool)
            .await
    }

    /// Find a plan by ID. Excludes soft-deleted rows.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Plan>, sqlx::Error> {
        let query = format!("SELECT {PLAN_COLUMNS} FROM plans WHERE id = $1 AND deleted_at IS NULL");
        sqlx::query_as::<_, Plan>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List a project's plans, newest first.
    pub async fn list(pool: &PgPool, project_id: DbId) -> Result<Vec<Plan>, sqlx::Error> {
        let query = format!(
            "SELECT {PLAN_COLUMNS} FROM plans
             WHERE project_id = $1 AND deleted_at IS NULL
             ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, Plan>(&query)
            .bind(project_id)
            .fetch_all(pool)
            .await
    }

    /// Update a plan. Only non-`None` fields in `input` are applied.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdatePlan,
    ) -> Result<Option<Plan>, sqlx::Error> {
        let query = format!(
            "UPDATE plans SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                status = COALESCE($4, status),
                start_date = COALESCE($5, start_date),
                end_date = COALESCE($6, end_date),
                updated_at = NOW()
             WHERE id = $1 AND deleted_at IS NULL
             RETURNING {PLAN_COLUMNS}"
        );
        sqlx::query_as::<_, Plan>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(&input.status)
            .bind(input.start_date)
            .bind(input.end_date)
            .fetch_optional(pool)
            .await
    }

    /// Soft-delete a plan. Returns `true` if a row was marked deleted.
    pub async fn soft_delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("UPDATE plans SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL")
                .bind(id)
                .execute(pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Recompute and store the plan's progress from its WBS task counts.
    /// Returns the new progress value.
    pub async fn refresh_progress(pool: &PgPool, id: DbId) -> Result<i32, sqlx::Error> {
        let (completed, total): (i64, i64) = sqlx::query_as(
            "SELECT COUNT(*) FILTER (WHERE status = 'completed'), COUNT(*)
             FROM wbs_tasks WHERE plan_id = $1",
        )
        .bind(id)
        .fetch_one(pool)
        .await?;

        let progress = epm_core::plan::rollup_progress(completed, total);
        sqlx::query("UPDATE plans SET progress = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(progress)
            .execute(pool)
            .await?;
        Ok(progress)
    }
}

const WBS_COLUMNS: &str = "id, plan_id, parent_id, name, level, sort_order, status, progress, \
                           is_milestone, owner_id, start_date, end_date, duration, created_at, \
                           updated_at";

/// Provides CRUD operations for WBS tasks.
pub struct WbsTaskRepo;

impl WbsTaskRepo {
    /// Insert a WBS task, returning the created row.
    ///
    /// Level is derived from the parent and sort order is appended after
    /// the last sibling.
    pub async fn create(
        pool: &PgPool,
        plan_id: DbId,
        input: &CreateWbsTask,
        duration: Option<i64>,
    ) -> Result<WbsTask, sqlx::Error> {
        let query = format!(
            "INSERT INTO wbs_tasks (plan_id, parent_id, name, level, sort_order, status,
                                    is_milestone, owner_id, start_date, end_date, duration)
             VALUES ($1, $2, $3,
                     COALESCE((SELECT level + 1 FROM wbs_tasks WHERE id = $2), 1),
                     COALESCE((SELECT MAX(sort_order) + 1 FROM wbs_tasks
                               WHERE plan_id = $1 AND parent_id IS NOT DISTINCT FROM $2), 1),
                     COALESCE($4, 'pending'), COALESCE($5, FALSE), $6, $7, $8, $9)
             RETURNING {WBS_COLUMNS}"
        );
        sqlx::query_as::<_, WbsTask>(&query)
            .bind(plan_id)
            .bind(input.parent_id)
            .bind(&input.name)
            .bind(&input.status)
            .bind(input.is_milestone)
            .bind(input.owner_id)
            .bind(input.start_date)
            .bind(input.end_date)
            .bind(duration)
            .fetch_one(pool)
            .await
    }

    /// Find a WBS task by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<WbsTask>, sqlx::Error> {
        let query = format!("SELECT {WBS_COLUMNS} FROM wbs_tasks WHERE id = $1");
        sqlx::query_as::<_, WbsTask>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List a plan's WBS tasks in tree display order.
    pub async fn list(pool: &PgPool, plan_id: DbId) -> Result<Vec<WbsTask>, sqlx::Error> {
        let query = format!(
            "SELECT {WBS_COLUMNS} FROM wbs_tasks WHERE plan_id = $1
             ORDER BY level, sort_order, id"
        );
        sqlx::query_as::<_, WbsTask>(&query)
            .bind(plan_id)
            .fetch_all(pool)
            .await
    }

    /// Update a WBS task with resolved derived fields.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateWbsTask,
        status: &str,
        progress: i32,
        duration: Option<i64>,
    ) -> Result<Option<WbsTask>, sqlx::Error> {
        let query = format!(
            "UPDATE wbs_tasks SET
                name = COALESCE($2, name),
                is_milestone = COALESCE($3, is_milestone),
                owner_id = COALESCE($4, owner_id),
                start_date = COALESCE($5, start_date),
                end_date = COALESCE($6, end_date),
                status = $7,
                progress = $8,
                duration = $9,
                updated_at = NOW()
             WHERE id = $1
             RETURNING {WBS_COLUMNS}"
        );
        sqlx::query_as::<_, WbsTask>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(input.is_milestone)
            .bind(input.owner_id)
            .bind(input.start_date)
            .bind(input.end_date)
            .bind(status)
            .bind(progress)
            .bind(duration)
            .fetch_optional(pool)
            .await
    }

    /// Delete a WBS task and its subtree. Returns the number of rows removed.
    pub async fn delete_tree(pool: &PgPool, id: DbId) -> Result<u64, sqlx::Error> {
        // Children cascade via the parent_id foreign key.
        let result = sqlx::query("DELETE FROM wbs_tasks WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}

const MILESTONE_COLUMNS: &str = "id, plan_id, task_id, name, description, plan_date, status, \
                                 created_at, updated_at";

/// Provides CRUD operations for plan milestones.
pub struct PlanMilestoneRepo;

impl PlanMilestoneRepo {
    /// Insert a plan milestone, returning the created row.
    pub async fn create(
        pool: &PgPool,
        plan_id: DbId,
        input: &CreatePlanMilestone,
    ) -> Result<PlanMilestone, sqlx::Error> {
        let query = format!(
            "INSERT INTO plan_milestones (plan_id, task_id, name, description, plan_date, status)
             VALUES ($1, $2, $3, $4, $5, COALESCE($6, 'pending'))
             RETURNING {MILESTONE_COLUMNS}"
        );
        sqlx::query_as::<_, PlanMilestone>(&query)
            .bind(plan_id)
            .bind(input.task_id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(input.plan_date)
            .bind(&input.status)
            .fetch_one(pool)
            .await
    }

    /// Find a plan milestone by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<PlanMilestone>, sqlx::Error> {
        let query = format!("SELECT {MILESTONE_COLUMNS} FROM plan_milestones WHERE id = $1");
        sqlx::query_as::<_, PlanMilestone>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List a plan's milestones by planned date.
    pub async fn list(pool: &PgPool, plan_id: DbId) -> Result<Vec<PlanMilestone>, sqlx::Error> {
        let query = format!(
            "SELECT {MILESTONE_COLUMNS} FROM plan_milestones WHERE plan_id = $1
             ORDER BY plan_date NULLS LAST, id"
        );
        sqlx::query_as::<_, PlanMilestone>(&query)
            .bind(plan_id)
            .fetch_all(pool)
            .await
    }

    /// Update a plan milestone. Only non-`None` fields in `input` are applied.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdatePlanMilestone,
    ) -> Result<Option<PlanMilestone>, sqlx::Error> {
        let query = format!(
            "UPDATE plan_milestones SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                plan_date = COALESCE($4, plan_date),
                status = COALESCE($5, status),
                updated_at = NOW()
             WHERE id = $1
             RETURNING {MILESTONE_COLUMNS}"
        );
        sqlx::query_as::<_, PlanMilestone>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(input.plan_date)
            .bind(&input.status)
            .fetch_optional(pool)
            .await
    }

    /// Delete a plan milestone. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM plan_milestones WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
