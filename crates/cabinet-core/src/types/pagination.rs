//! Pagination types for list endpoints.

use serde::{Deserialize, Serialize};

/// Fixed number of records returned per page.
pub const PAGE_SIZE: u64 = 20;

/// Zero-based page of a listing with a fixed page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PageRequest {
    /// Page number (0-based).
    pub page: u64,
}

impl PageRequest {
    /// Create a new page request.
    pub fn new(page: u64) -> Self {
        Self { page }
    }

    /// Parse a page number from a query string value.
    ///
    /// Anything that is not a non-negative integer falls back to page 0.
    pub fn parse(raw: Option<&str>) -> Self {
        let page = raw
            .and_then(|value| value.trim().parse::<u64>().ok())
            .unwrap_or(0);
        Self { page }
    }

    /// Calculate the SQL `OFFSET` value.
    pub fn offset(&self) -> u64 {
        self.page.saturating_mul(PAGE_SIZE)
    }

    /// Return the SQL `LIMIT` value.
    pub fn limit(&self) -> u64 {
        PAGE_SIZE
    }
}
