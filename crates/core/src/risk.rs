//! Risk vocabularies and the probability-impact score.

pub const LEVEL_LOW: &str = "low";
pub const LEVEL_MEDIUM: &str = "medium";
pub const LEVEL_HIGH: &str = "high";
pub const LEVEL_CRITICAL: &str = "critical";

/// All valid risk levels.
pub const VALID_LEVELS: &[&str] = &[LEVEL_LOW, LEVEL_MEDIUM, LEVEL_HIGH, LEVEL_CRITICAL];

pub const STATUS_IDENTIFIED: &str = "identified";
pub const STATUS_MONITORING: &str = "monitoring";
pub const STATUS_MITIGATED: &str = "mitigated";
pub const STATUS_ACCEPTED: &str = "accepted";
pub const STATUS_CLOSED: &str = "closed";

/// All valid risk statuses.
pub const VALID_STATUSES: &[&str] = &[
    STATUS_IDENTIFIED,
    STATUS_MONITORING,
    STATUS_MITIGATED,
    STATUS_ACCEPTED,
    STATUS_CLOSED,
];

/// Validate that a risk level string is one of the accepted values.
pub fn validate_level(level: &str) -> Result<(), String> {
    if VALID_LEVELS.contains(&level) {
        Ok(())
    } else {
        Err(format!(
            "Invalid risk level '{level}'. Must be one of: {}",
            VALID_LEVELS.join(", ")
        ))
    }
}

/// Validate that a risk status string is one of the accepted values.
pub fn validate_status(status: &str) -> Result<(), String> {
    if VALID_STATUSES.contains(&status) {
        Ok(())
    } else {
        Err(format!(
            "Invalid risk status '{status}'. Must be one of: {}",
            VALID_STATUSES.join(", ")
        ))
    }
}

/// Validate that probability and impact sit in the 0..=100 percent range.
pub fn validate_percent(name: &str, value: i32) -> Result<(), String> {
    if (0..=100).contains(&value) {
        Ok(())
    } else {
        Err(format!("{name} must be between 0 and 100, got {value}"))
    }
}

/// Risk score: probability times impact, scaled back to 0..=100.
///
/// Recomputed whenever either input changes.
pub fn score(probability: i32, impact: i32) -> i32 {
    probability * impact / 100
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_levels_and_statuses_accepted() {
        for level in VALID_LEVELS {
            assert!(validate_level(level).is_ok());
        }
        for status in VALID_STATUSES {
            assert!(validate_status(status).is_ok());
        }
    }

    #[test]
    fn test_invalid_level_rejected() {
        let result = validate_level("severe");
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("Invalid risk level"));
    }

    #[test]
    fn test_invalid_status_rejected() {
        assert!(validate_status("open").is_err());
    }

    #[test]
    fn test_percent_range_enforced() {
        assert!(validate_percent("probability", 0).is_ok());
        assert!(validate_percent("probability", 100).is_ok());
        assert!(validate_percent("probability", -1).is_err());
        assert!(validate_percent("impact", 101).is_err());
    }

    #[test]
    fn test_score_scales_to_percent() {
        assert_eq!(score(0, 100), 0);
        assert_eq!(score(50, 50), 25);
        assert_eq!(score(80, 90), 72);
        assert_eq!(score(100, 100), 100);
    }
}
