//! Risk models and DTOs.

use epm_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A risk row from the `risks` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Risk {
    pub id: DbId,
    pub project_id: DbId,
    pub title: String,
    pub description: Option<String>,
    pub level: String,
    pub status: String,
    /// Likelihood percent, 0..=100.
    pub probability: i32,
    /// Severity percent, 0..=100.
    pub impact: i32,
    /// Derived: probability * impact / 100. Never set by callers.
    pub score: i32,
    pub owner_id: Option<DbId>,
    pub mitigation: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a risk.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateRisk {
    pub title: String,
    pub description: Option<String>,
    /// Defaults to "medium" if omitted.
    pub level: Option<String>,
    /// Defaults to "identified" if omitted.
    pub status: Option<String>,
    pub probability: Option<i32>,
    pub impact: Option<i32>,
    pub owner_id: Option<DbId>,
    pub mitigation: Option<String>,
}

/// DTO for updating a risk. All fields are optional.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateRisk {
    pub title: Option<String>,
    pub description: Option<String>,
    pub level: Option<String>,
    pub status: Option<String>,
    pub probability: Option<i32>,
    pub impact: Option<i32>,
    pub owner_id: Option<DbId>,
    pub mitigation: Option<String>,
}

/// A response action row from the `risk_responses` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct RiskResponse {
    pub id: DbId,
    pub risk_id: DbId,
    pub action: String,
    pub result: Option<String>,
    pub performed_by: DbId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for recording a response action against a risk.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateRiskResponse {
    pub action: String,
    pub result: Option<String>,
}

/// Per-level and per-status risk counts for a project.
#[derive(Debug, Clone, Serialize)]
pub struct RiskStats {
    pub total: i64,
    pub low: i64,
    pub medium: i64,
    pub high: i64,
    pub critical: i64,
    /// Combined high and critical count.
    pub high_priority: i64,
    pub open: i64,
    pub closed: i64,
}
