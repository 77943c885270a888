use serde::Deserialize;

/// Shared pagination query parameters.
///
/// Values are clamped by the handlers; callers can never exceed the
/// pagination ceiling.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PaginationParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl PaginationParams {
    /// Effective page size after clamping.
    pub fn limit(&self) -> i64 {
        epm_core::pagination::clamp_limit(self.limit)
    }

    /// Effective offset after clamping.
    pub fn offset(&self) -> i64 {
        epm_core::pagination::clamp_offset(self.offset)
    }
}
