//! Task status and priority vocabularies plus progress rules.

pub const STATUS_TODO: &str = "todo";
pub const STATUS_IN_PROGRESS: &str = "in_progress";
pub const STATUS_REVIEW: &str = "review";
pub const STATUS_DONE: &str = "done";
pub const STATUS_ARCHIVED: &str = "archived";

/// All valid task statuses.
pub const VALID_STATUSES: &[&str] = &[
    STATUS_TODO,
    STATUS_IN_PROGRESS,
    STATUS_REVIEW,
    STATUS_DONE,
    STATUS_ARCHIVED,
];

/// Statuses that count as open for workload and overdue queries.
pub const OPEN_STATUSES: &[&str] = &[STATUS_TODO, STATUS_IN_PROGRESS, STATUS_REVIEW];

pub const PRIORITY_LOW: &str = "low";
pub const PRIORITY_MEDIUM: &str = "medium";
pub const PRIORITY_HIGH: &str = "high";
pub const PRIORITY_URGENT: &str = "urgent";

/// All valid task priorities.
pub const VALID_PRIORITIES: &[&str] = &[
    PRIORITY_LOW,
    PRIORITY_MEDIUM,
    PRIORITY_HIGH,
    PRIORITY_URGENT,
];

/// Validate that a task status string is one of the accepted values.
pub fn validate_status(status: &str) -> Result<(), String> {
    if VALID_STATUSES.contains(&status) {
        Ok(())
    } else {
        Err(format!(
            "Invalid task status '{status}'. Must be one of: {}",
            VALID_STATUSES.join(", ")
        ))
    }
}

/// Validate that a task priority string is one of the accepted values.
pub fn validate_priority(priority: &str) -> Result<(), String> {
    if VALID_PRIORITIES.contains(&priority) {
        Ok(())
    } else {
        Err(format!(
            "Invalid task priority '{priority}'. Must be one of: {}",
            VALID_PRIORITIES.join(", ")
        ))
    }
}

/// Clamp a progress value to the 0..=100 range.
pub fn clamp_progress(progress: i32) -> i32 {
    progress.clamp(0, 100)
}

/// Reaching 100% progress completes the task regardless of the status
/// the caller supplied.
pub fn is_complete(progress: i32) -> bool {
    progress >= 100
}

/// Inclusive duration in days between a start and end date.
///
/// A task that starts and ends the same day has a duration of one day.
pub fn duration_days(start: chrono::NaiveDate, end: chrono::NaiveDate) -> Option<i64> {
    let days = (end - start).num_days();
    if days < 0 {
        None
    } else {
        Some(days + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_valid_statuses_accepted() {
        for status in VALID_STATUSES {
            assert!(validate_status(status).is_ok());
        }
    }

    #[test]
    fn test_invalid_status_rejected() {
        assert!(validate_status("blocked").is_err());
    }

    #[test]
    fn test_valid_priorities_accepted() {
        for priority in VALID_PRIORITIES {
            assert!(validate_priority(priority).is_ok());
        }
    }

    #[test]
    fn test_invalid_priority_rejected() {
        let result = validate_priority("critical");
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("Invalid task priority"));
    }

    #[test]
    fn test_progress_clamped_to_percent_range() {
        assert_eq!(clamp_progress(-5), 0);
        assert_eq!(clamp_progress(0), 0);
        assert_eq!(clamp_progress(42), 42);
        assert_eq!(clamp_progress(100), 100);
        assert_eq!(clamp_progress(250), 100);
    }

    #[test]
    fn test_full_progress_completes() {
        assert!(is_complete(100));
        assert!(!is_complete(99));
    }

    #[test]
    fn test_duration_is_inclusive() {
        let start = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        let end = NaiveDate::from_ymd_opt(2025, 3, 14).unwrap();
        assert_eq!(duration_days(start, end), Some(5));
        assert_eq!(duration_days(start, start), Some(1));
    }

    #[test]
    fn test_duration_rejects_reversed_dates() {
        let start = NaiveDate::from_ymd_opt(2025, 3, 14).unwrap();
        let end = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        assert_eq!(duration_days(start, end), None);
    }
}
