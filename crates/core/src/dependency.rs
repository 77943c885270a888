//! Task dependency link types.
//!
//! A dependency edge points from a predecessor task to the task that
//! depends on it. The link type follows standard scheduling notation.

/// Finish-to-start: the dependent starts after the predecessor finishes.
pub const TYPE_FINISH_START: &str = "fs";

/// Start-to-start: both tasks start together.
pub const TYPE_START_START: &str = "ss";

/// Finish-to-finish: both tasks finish together.
pub const TYPE_FINISH_FINISH: &str = "ff";

/// Start-to-finish: the dependent finishes after the predecessor starts.
pub const TYPE_START_FINISH: &str = "sf";

/// All valid dependency link types.
pub const VALID_TYPES: &[&str] = &[
    TYPE_FINISH_START,
    TYPE_START_START,
    TYPE_FINISH_FINISH,
    TYPE_START_FINISH,
];

/// Validate that a dependency type string is one of the accepted values.
pub fn validate_dependency_type(dependency_type: &str) -> Result<(), String> {
    if VALID_TYPES.contains(&dependency_type) {
        Ok(())
    } else {
        Err(format!(
            "Invalid dependency type '{dependency_type}'. Must be one of: {}",
            VALID_TYPES.join(", ")
        ))
    }
}

/// A task can never depend on itself.
pub fn validate_not_self_referential(predecessor_id: i64, dependent_id: i64) -> Result<(), String> {
    if predecessor_id == dependent_id {
        Err("A task cannot depend on itself".to_string())
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_types_accepted() {
        for dependency_type in VALID_TYPES {
            assert!(validate_dependency_type(dependency_type).is_ok());
        }
    }

    #[test]
    fn test_invalid_type_rejected() {
        let result = validate_dependency_type("blocks");
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("Invalid dependency type"));
    }

    #[test]
    fn test_self_dependency_rejected() {
        assert!(validate_not_self_referential(7, 7).is_err());
        assert!(validate_not_self_referential(7, 8).is_ok());
    }
}
