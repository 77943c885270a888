//! Pagination bounds applied to every list endpoint.

/// Page size used when the caller does not supply one.
pub const DEFAULT_LIMIT: i64 = 50;

/// Hard ceiling on page size.
pub const MAX_LIMIT: i64 = 200;

/// Clamp a requested page size into the 1..=MAX_LIMIT range.
pub fn clamp_limit(limit: Option<i64>) -> i64 {
    match limit {
        Some(value) => value.clamp(1, MAX_LIMIT),
        None => DEFAULT_LIMIT,
    }
}

/// Negative offsets read as zero.
pub fn clamp_offset(offset: Option<i64>) -> i64 {
    offset.unwrap_or(0).max(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_limit_uses_default() {
        assert_eq!(clamp_limit(None), DEFAULT_LIMIT);
    }

    #[test]
    fn test_limit_clamped_to_bounds() {
        assert_eq!(clamp_limit(Some(0)), 1);
        assert_eq!(clamp_limit(Some(-10)), 1);
        assert_eq!(clamp_limit(Some(25)), 25);
        assert_eq!(clamp_limit(Some(10_000)), MAX_LIMIT);
    }

    #[test]
    fn test_offset_never_negative() {
        assert_eq!(clamp_offset(None), 0);
        assert_eq!(clamp_offset(Some(-5)), 0);
        assert_eq!(clamp_offset(Some(120)), 120);
    }
}
