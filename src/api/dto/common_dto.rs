//! Shared pagination types.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Query parameters for paginated listings.
#[derive(Debug, Clone, Copy, Deserialize, IntoParams)]
pub struct PaginationParams {
    /// 1-based page number.
    pub page: Option<u32>,
    /// Items per page, capped at 100.
    pub per_page: Option<u32>,
}

impl PaginationParams {
    /// Resolves defaults and clamps to sane bounds.
    #[must_use]
    pub fn clamped(&self) -> (u32, u32) {
        let page = self.page.unwrap_or(1).max(1);
        let per_page = self.per_page.unwrap_or(20).clamp(1, 100);
        (page, per_page)
    }

    /// Zero-based item offset of the clamped page. Widens to `u64` first
    /// so absurd page numbers saturate instead of overflowing.
    #[must_use]
    pub fn offset(&self) -> usize {
        let (page, per_page) = self.clamped();
        let start = u64::from(page - 1) * u64::from(per_page);
        usize::try_from(start).unwrap_or(usize::MAX)
    }
}

/// Pagination metadata attached to list responses.
#[derive(Debug, Clone, Copy, Serialize, ToSchema)]
pub struct PaginationMeta {
    /// 1-based page number.
    pub page: u32,
    /// Items per page.
    pub per_page: u32,
    /// Total items across all pages.
    pub total: u64,
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn clamped_applies_defaults_and_bounds() {
        let defaults = PaginationParams {
            page: None,
            per_page: None,
        };
        assert_eq!(defaults.clamped(), (1, 20));

        let out_of_range = PaginationParams {
            page: Some(0),
            per_page: Some(5000),
        };
        assert_eq!(out_of_range.clamped(), (1, 100));
    }

    #[test]
    fn offset_skips_previous_pages() {
        let params = PaginationParams {
            page: Some(3),
            per_page: Some(20),
        };
        assert_eq!(params.offset(), 40);
    }

    #[test]
    fn offset_saturates_instead_of_overflowing() {
        let params = PaginationParams {
            page: Some(u32::MAX),
            per_page: Some(100),
        };
        let expected = (u64::from(u32::MAX) - 1) * 100;
        assert_eq!(params.offset() as u64, expected);
    }
}
