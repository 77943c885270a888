//! Approval workflow constants and state-transition rules.
//!
//! An approval moves through a chain of flow nodes. The approval's own
//! status tracks where it is in the chain; each node records its own
//! decision. The transition predicates here are enforced by the API
//! layer before any database write happens.

/// Waiting for the first approver to act.
pub const STATUS_PENDING: &str = "pending";

/// At least one node decided, more nodes still waiting.
pub const STATUS_PROCESSING: &str = "processing";

/// Every node approved.
pub const STATUS_APPROVED: &str = "approved";

/// Some node rejected; the chain stops.
pub const STATUS_REJECTED: &str = "rejected";

/// Withdrawn by the applicant before completion.
pub const STATUS_CANCELLED: &str = "cancelled";

/// All valid approval statuses.
pub const VALID_STATUSES: &[&str] = &[
    STATUS_PENDING,
    STATUS_PROCESSING,
    STATUS_APPROVED,
    STATUS_REJECTED,
    STATUS_CANCELLED,
];

/// Statuses that count as "still in flight" for inbox queries.
pub const ACTIVE_STATUSES: &[&str] = &[STATUS_PENDING, STATUS_PROCESSING];

/// Statuses that count as "already handled" for history queries.
pub const PROCESSED_STATUSES: &[&str] = &[STATUS_APPROVED, STATUS_REJECTED, STATUS_CANCELLED];

pub const TYPE_LEAVE: &str = "leave";
pub const TYPE_EXPENSE: &str = "expense";
pub const TYPE_TRIP: &str = "trip";
pub const TYPE_PURCHASE: &str = "purchase";
pub const TYPE_PROJECT_INIT: &str = "project_init";
pub const TYPE_PROJECT_CHANGE: &str = "project_change";

/// All valid approval types.
pub const VALID_TYPES: &[&str] = &[
    TYPE_LEAVE,
    TYPE_EXPENSE,
    TYPE_TRIP,
    TYPE_PURCHASE,
    TYPE_PROJECT_INIT,
    TYPE_PROJECT_CHANGE,
];

/// Node decision: waiting for this approver.
pub const NODE_PENDING: &str = "pending";

/// Node decision: this approver approved.
pub const NODE_APPROVED: &str = "approved";

/// Node decision: this approver rejected.
pub const NODE_REJECTED: &str = "rejected";

/// Validate that an approval status string is one of the accepted values.
pub fn validate_status(status: &str) -> Result<(), String> {
    if VALID_STATUSES.contains(&status) {
        Ok(())
    } else {
        Err(format!(
            "Invalid approval status '{status}'. Must be one of: {}",
            VALID_STATUSES.join(", ")
        ))
    }
}

/// Validate that an approval type string is one of the accepted values.
pub fn validate_approval_type(approval_type: &str) -> Result<(), String> {
    if VALID_TYPES.contains(&approval_type) {
        Ok(())
    } else {
        Err(format!(
            "Invalid approval type '{approval_type}'. Must be one of: {}",
            VALID_TYPES.join(", ")
        ))
    }
}

/// Whether an approve or reject decision may be made on an approval in
/// the given status. Decisions are only valid while the chain is open.
pub fn can_decide(status: &str) -> bool {
    status == STATUS_PENDING || status == STATUS_PROCESSING
}

/// Whether the applicant may cancel an approval in the given status.
/// Completed approvals cannot be withdrawn.
pub fn can_cancel(status: &str) -> bool {
    status == STATUS_PENDING || status == STATUS_PROCESSING
}

/// Compute the approval's next status after one node approves.
///
/// If another node is still waiting the chain keeps going; otherwise the
/// approval is fully approved.
pub fn status_after_node_approval(has_remaining_pending_nodes: bool) -> &'static str {
    if has_remaining_pending_nodes {
        STATUS_PROCESSING
    } else {
        STATUS_APPROVED
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_statuses_accepted() {
        for status in VALID_STATUSES {
            assert!(validate_status(status).is_ok());
        }
    }

    #[test]
    fn test_invalid_status_rejected() {
        let result = validate_status("done");
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("Invalid approval status"));
    }

    #[test]
    fn test_valid_types_accepted() {
        for approval_type in VALID_TYPES {
            assert!(validate_approval_type(approval_type).is_ok());
        }
    }

    #[test]
    fn test_invalid_type_rejected() {
        assert!(validate_approval_type("vacation").is_err());
    }

    #[test]
    fn test_decisions_only_while_open() {
        assert!(can_decide(STATUS_PENDING));
        assert!(can_decide(STATUS_PROCESSING));
        assert!(!can_decide(STATUS_APPROVED));
        assert!(!can_decide(STATUS_REJECTED));
        assert!(!can_decide(STATUS_CANCELLED));
    }

    #[test]
    fn test_cancel_only_while_open() {
        assert!(can_cancel(STATUS_PENDING));
        assert!(can_cancel(STATUS_PROCESSING));
        assert!(!can_cancel(STATUS_APPROVED));
        assert!(!can_cancel(STATUS_REJECTED));
    }

    #[test]
    fn test_status_advances_while_nodes_remain() {
        assert_eq!(status_after_node_approval(true), STATUS_PROCESSING);
        assert_eq!(status_after_node_approval(false), STATUS_APPROVED);
    }

    #[test]
    fn test_active_and_processed_cover_all_statuses() {
        for status in VALID_STATUSES {
            assert!(ACTIVE_STATUSES.contains(status) || PROCESSED_STATUSES.contains(status));
        }
    }
}
