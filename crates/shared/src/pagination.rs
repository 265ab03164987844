//! Offset pagination utilities.

use serde::{Deserialize, Serialize};

/// Default page size when none is requested.
pub const DEFAULT_PER_PAGE: i64 = 50;

/// Largest page size a caller may request.
pub const MAX_PER_PAGE: i64 = 100;

/// Page request as received in query strings (`?page=2&per_page=25`).
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct PageRequest {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

impl PageRequest {
    pub fn new(page: i64, per_page: i64) -> Self {
        Self {
            page: Some(page),
            per_page: Some(per_page),
        }
    }

    /// Get the page number (1-indexed).
    pub fn page(&self) -> i64 {
        self.page.unwrap_or(1).max(1)
    }

    /// Get items per page (clamped to 1-100).
    pub fn per_page(&self) -> i64 {
        self.per_page.unwrap_or(DEFAULT_PER_PAGE).clamp(1, MAX_PER_PAGE)
    }

    /// Get the offset for pagination.
    pub fn offset(&self) -> i64 {
        (self.page() - 1) * self.per_page()
    }

    /// Alias of `per_page` for SQL `LIMIT` clauses.
    pub fn limit(&self) -> i64 {
        self.per_page()
    }
}

/// Pagination metadata returned alongside list responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct Pagination {
    pub page: i64,
    pub per_page: i64,
    pub total: i64,
    pub total_pages: i64,
}

impl Pagination {
    pub fn new(request: &PageRequest, total: i64) -> Self {
        let per_page = request.per_page();
        let total_pages = (total + per_page - 1) / per_page;
        Self {
            page: request.page(),
            per_page,
            total,
            total_pages,
        }
    }
}

/// Slice an in-memory collection the same way `LIMIT/OFFSET` would.
pub fn paginate<T: Clone>(items: &[T], request: &PageRequest) -> Vec<T> {
    let offset = request.offset() as usize;
    if offset >= items.len() {
        return Vec::new();
    }
    let end = (offset + request.per_page() as usize).min(items.len());
    items[offset..end].to_vec()
}
