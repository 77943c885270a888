//! Plan and WBS task vocabularies plus the progress roll-up.

pub const STATUS_DRAFT: &str = "draft";
pub const STATUS_ACTIVE: &str = "active";
pub const STATUS_COMPLETED: &str = "completed";
pub const STATUS_ARCHIVED: &str = "archived";

/// All valid plan statuses.
pub const VALID_STATUSES: &[&str] = &[
    STATUS_DRAFT,
    STATUS_ACTIVE,
    STATUS_COMPLETED,
    STATUS_ARCHIVED,
];

/// WBS task: not started yet.
pub const WBS_PENDING: &str = "pending";

/// WBS task: work underway.
pub const WBS_IN_PROGRESS: &str = "in_progress";

/// WBS task: finished.
pub const WBS_COMPLETED: &str = "completed";

/// All valid WBS task statuses.
pub const VALID_WBS_STATUSES: &[&str] = &[WBS_PENDING, WBS_IN_PROGRESS, WBS_COMPLETED];

/// Milestone statuses share the WBS vocabulary.
pub const VALID_MILESTONE_STATUSES: &[&str] = &[WBS_PENDING, WBS_IN_PROGRESS, WBS_COMPLETED];

/// Validate that a plan status string is one of the accepted values.
pub fn validate_status(status: &str) -> Result<(), String> {
    if VALID_STATUSES.contains(&status) {
        Ok(())
    } else {
        Err(format!(
            "Invalid plan status '{status}'. Must be one of: {}",
            VALID_STATUSES.join(", ")
        ))
    }
}

/// Validate that a WBS task status string is one of the accepted values.
pub fn validate_wbs_status(status: &str) -> Result<(), String> {
    if VALID_WBS_STATUSES.contains(&status) {
        Ok(())
    } else {
        Err(format!(
            "Invalid WBS task status '{status}'. Must be one of: {}",
            VALID_WBS_STATUSES.join(", ")
        ))
    }
}

/// Plan progress is the share of completed WBS tasks, as a whole percent.
///
/// A plan with no tasks reads as zero percent.
pub fn rollup_progress(completed_tasks: i64, total_tasks: i64) -> i32 {
    if total_tasks <= 0 {
        return 0;
    }
    ((completed_tasks * 100) / total_tasks) as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_statuses_accepted() {
        for status in VALID_STATUSES {
            assert!(validate_status(status).is_ok());
        }
        for status in VALID_WBS_STATUSES {
            assert!(validate_wbs_status(status).is_ok());
        }
    }

    #[test]
    fn test_invalid_statuses_rejected() {
        assert!(validate_status("open").is_err());
        assert!(validate_wbs_status("done").is_err());
    }

    #[test]
    fn test_rollup_empty_plan_is_zero() {
        assert_eq!(rollup_progress(0, 0), 0);
    }

    #[test]
    fn test_rollup_is_whole_percent() {
        assert_eq!(rollup_progress(1, 3), 33);
        assert_eq!(rollup_progress(2, 4), 50);
        assert_eq!(rollup_progress(4, 4), 100);
    }

}
