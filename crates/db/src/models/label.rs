//! Task label model and DTOs.

use epm_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A label row from the `labels` table. Labels are project-scoped.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Label {
    pub id: DbId,
    pub project_id: DbId,
    pub name: String,
    /// Hex color, e.g. "#1f77b4".
    pub color: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a label.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateLabel {
    pub name: String,
    pub color: Option<String>,
}

/// DTO for updating a label. All fields are optional.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateLabel {
    pub name: Option<String>,
    pub color: Option<String>,
}
