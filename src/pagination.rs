// ABOUTME: Page-based pagination helpers for list endpoints
// ABOUTME: Parses page/per_page query parameters and builds list metadata

//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 TrainTrack contributors

//! Page-based pagination for list endpoints

use serde::{Deserialize, Serialize};

/// Default page size when `per_page` is unset
const DEFAULT_PER_PAGE: i64 = 20;

/// Hard cap on page size
const MAX_PER_PAGE: i64 = 100;

/// Query parameters for paginated list endpoints
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PaginationParams {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

impl PaginationParams {
    /// 1-based page number
    #[must_use]
    pub fn page(&self) -> i64 {
        self.page.unwrap_or(1).max(1)
    }

    /// Effective page size, clamped to [1, 100]
    #[must_use]
    pub fn limit(&self) -> i64 {
        self.per_page.unwrap_or(DEFAULT_PER_PAGE).clamp(1, MAX_PER_PAGE)
    }

    /// Row offset for the current page
    #[must_use]
    pub fn offset(&self) -> i64 {
        (self.page() - 1) * self.limit()
    }

    /// Build list metadata for a known total row count
    #[must_use]
    pub fn meta(&self, total: i64) -> PageMeta {
        PageMeta {
            page: self.page(),
            per_page: self.limit(),
            total,
        }
    }
}

/// List metadata returned alongside paginated data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageMeta {
    pub page: i64,
    pub per_page: i64,
    pub total: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let params = PaginationParams::default();
        assert_eq!(params.page(), 1);
        assert_eq!(params.limit(), 20);
        assert_eq!(params.offset(), 0);
    }

    #[test]
    fn test_clamping() {
        let params = PaginationParams {
            page: Some(0),
            per_page: Some(1000),
        };
        assert_eq!(params.page(), 1);
        assert_eq!(params.limit(), 100);
    }

    #[test]
    fn test_offset() {
        let params = PaginationParams {
            page: Some(3),
            per_page: Some(10),
        };
        assert_eq!(params.offset(), 20);
        assert_eq!(params.meta(45).total, 45);
    }
}
