//! Plan, WBS task, and plan milestone models.

use epm_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A plan row from the `plans` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Plan {
    pub id: DbId,
    pub project_id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub status: String,
    /// Whole percent derived from completed WBS tasks.
    pub progress: i32,
    pub start_date: Option<chrono::NaiveDate>,
    pub end_date: Option<chrono::NaiveDate>,
    pub created_by: DbId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a plan.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePlan {
    pub name: String,
    pub description: Option<String>,
    /// Defaults to "draft" if omitted.
    pub status: Option<String>,
    pub start_date: Option<chrono::NaiveDate>,
    pub end_date: Option<chrono::NaiveDate>,
}

/// DTO for updating a plan. All fields are optional.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdatePlan {
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub start_date: Option<chrono::NaiveDate>,
    pub end_date: Option<chrono::NaiveDate>,
}

/// A WBS task row from the `wbs_tasks` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct WbsTask {
    pub id: DbId,
    pub plan_id: DbId,
    pub parent_id: Option<DbId>,
    pub name: String,
    /// Depth in the breakdown tree; roots are level 1.
    pub level: i32,
    /// Position among siblings, assigned on insert.
    pub sort_order: i32,
    pub status: String,
    pub progress: i32,
    pub is_milestone: bool,
    pub owner_id: Option<DbId>,
    pub start_date: Option<chrono::NaiveDate>,
    pub end_date: Option<chrono::NaiveDate>,
    pub duration: Option<i64>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a WBS task. Level and sort order are derived.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateWbsTask {
    pub parent_id: Option<DbId>,
    pub name: String,
    /// Defaults to "pending" if omitted.
    pub status: Option<String>,
    pub is_milestone: Option<bool>,
    pub owner_id: Option<DbId>,
    pub start_date: Option<chrono::NaiveDate>,
    pub end_date: Option<chrono::NaiveDate>,
}

/// DTO for updating a WBS task. All fields are optional.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateWbsTask {
    pub name: Option<String>,
    pub status: Option<String>,
    pub progress: Option<i32>,
    pub is_milestone: Option<bool>,
    pub owner_id: Option<DbId>,
    pub start_date: Option<chrono::NaiveDate>,
    pub end_date: Option<chrono::NaiveDate>,
}

/// A plan milestone row from the `plan_milestones` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PlanMilestone {
    pub id: DbId,
    pub plan_id: DbId,
    /// Optional link to the WBS task this milestone marks.
    pub task_id: Option<DbId>,
    pub name: String,
    pub description: Option<String>,
    pub plan_date: Option<chrono::NaiveDate>,
    pub status: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a plan milestone.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePlanMilestone {
    pub task_id: Option<DbId>,
    pub name: String,
    pub description: Option<String>,
    pub plan_date: Option<chrono::NaiveDate>,
    /// Defaults to "pending" if omitted.
    pub status: Option<String>,
}

/// DTO for updating a plan milestone. All fields are optional.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdatePlanMilestone {
    pub name: Option<String>,
    pub description: Option<String>,
    pub plan_date: Option<chrono::NaiveDate>,
    pub status: Option<String>,
}
