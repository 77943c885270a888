//! Project membership model and DTOs.

use epm_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A membership row from the `project_members` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ProjectMember {
    pub id: DbId,
    pub project_id: DbId,
    pub user_id: DbId,
    pub role: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A membership row joined with the user's display fields.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ProjectMemberDetail {
    pub id: DbId,
    pub project_id: DbId,
    pub user_id: DbId,
    pub role: String,
    pub username: String,
    pub full_name: Option<String>,
    pub created_at: Timestamp,
}

/// DTO for adding a member to a project.
#[derive(Debug, Clone, Deserialize)]
pub struct AddProjectMember {
    pub user_id: DbId,
    /// Defaults to "member" if omitted.
    pub role: Option<String>,
}
