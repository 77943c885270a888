//! Approval workflow models and DTOs.

use epm_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// An approval row from the `approvals` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Approval {
    pub id: DbId,
    pub approval_type: String,
    pub title: String,
    pub content: Option<String>,
    pub status: String,
    /// Name of the flow node currently waiting on a decision.
    pub current_node: Option<String>,
    pub applicant_id: DbId,
    pub project_id: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A flow node row from the `approval_nodes` table.
///
/// Nodes are processed in `sort_order`; the first pending node is the
/// one the next decision applies to.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ApprovalNode {
    pub id: DbId,
    pub approval_id: DbId,
    pub name: String,
    pub approver_id: DbId,
    pub status: String,
    pub comment: Option<String>,
    pub approved_at: Option<Timestamp>,
    pub sort_order: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for submitting a new approval with its flow.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateApproval {
    pub approval_type: String,
    pub title: String,
    pub content: Option<String>,
    pub project_id: Option<DbId>,
    /// Flow nodes in decision order. At least one is required.
    pub nodes: Vec<CreateApprovalNode>,
}

/// One flow node in a new approval.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateApprovalNode {
    pub name: String,
    pub approver_id: DbId,
}

/// DTO for an approve or reject decision on the current node.
#[derive(Debug, Clone, Deserialize)]
pub struct ApprovalDecision {
    pub comment: Option<String>,
}

/// An approval together with its flow nodes.
#[derive(Debug, Clone, Serialize)]
pub struct ApprovalDetail {
    #[serde(flatten)]
    pub approval: Approval,
    pub nodes: Vec<ApprovalNode>,
}

/// Per-status approval counts.
#[derive(Debug, Clone, Serialize)]
pub struct ApprovalStats {
    pub pending: i64,
    pub processing: i64,
    pub approved: i64,
    pub rejected: i64,
    pub cancelled: i64,
}
