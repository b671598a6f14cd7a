//! Common types used across the platform

use serde::{Deserialize, Serialize};

/// Pagination parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Pagination {
    pub page: u32,
    pub per_page: u32,
}

impl Pagination {
    pub const MAX_PER_PAGE: u32 = 100;

    /// Page and page size with out-of-range values pulled back in
    pub fn normalized(&self) -> (u32, u32) {
        (self.page.max(1), self.per_page.clamp(1, Self::MAX_PER_PAGE))
    }

    /// SQL `LIMIT` and `OFFSET` for this page
    pub fn limit_offset(&self) -> (i64, i64) {
        let (page, per_page) = self.normalized();
        (per_page as i64, (page as i64 - 1) * per_page as i64)
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: 20,
        }
    }
}

/// Paginated response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub pagination: PaginationMeta,
}

/// Pagination metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginationMeta {
    pub page: u32,
    pub per_page: u32,
    pub total_items: u64,
    pub total_pages: u32,
}

impl PaginationMeta {
    pub fn new(pagination: &Pagination, total_items: u64) -> Self {
        let (page, per_page) = pagination.normalized();
        let total_pages = total_items.div_ceil(per_page as u64) as u32;
        Self {
            page,
            per_page,
            total_items,
            total_pages,
        }
    }
}
