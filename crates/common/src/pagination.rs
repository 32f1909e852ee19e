//! Pagination utilities.
//!
//! This module provides the page request and page result types shared by the
//! query services, the stores, and the HTTP layer.

use serde::{Deserialize, Serialize};

/// Default page number (1-indexed)
const DEFAULT_PAGE: u32 = 1;

/// Default items per page
const DEFAULT_PER_PAGE: u32 = 10;

/// Maximum items per page
const MAX_PER_PAGE: u32 = 100;

/// Pagination parameters for list operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationParams {
    /// Page number (1-indexed)
    #[serde(default = "default_page")]
    pub page: u32,

    /// Items per page
    #[serde(default = "default_per_page", alias = "limit")]
    pub per_page: u32,
}

fn default_page() -> u32 {
    DEFAULT_PAGE
}

fn default_per_page() -> u32 {
    DEFAULT_PER_PAGE
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

impl PaginationParams {
    /// Create new pagination parameters, normalising zero values.
    pub fn new(page: u32, per_page: u32) -> Self {
        let page = if page == 0 { DEFAULT_PAGE } else { page };
        let per_page = if per_page == 0 {
            DEFAULT_PER_PAGE
        } else {
            per_page.min(MAX_PER_PAGE)
        };

        Self { page, per_page }
    }

    /// Clamp the page size to `max`.
    pub fn clamped(self, max: u32) -> Self {
        Self::new(self.page, self.per_page.min(max.max(1)))
    }

    /// Calculate the offset for store queries (0-indexed).
    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.per_page)
    }

    /// Get the limit for store queries.
    pub fn limit(&self) -> u32 {
        self.per_page
    }

    /// Validate pagination parameters.
    pub fn validate(&self) -> Result<(), String> {
        if self.page == 0 {
            return Err("Page number must be greater than 0".to_string());
        }
        if self.per_page == 0 {
            return Err("Items per page must be greater than 0".to_string());
        }
        if self.per_page > MAX_PER_PAGE {
            return Err(format!("Items per page cannot exceed {}", MAX_PER_PAGE));
        }
        Ok(())
    }

    /// Slice an already ordered in-memory collection.
    pub fn slice<T: Clone>(&self, items: &[T]) -> Vec<T> {
        let start = usize::try_from(self.offset()).unwrap_or(usize::MAX);
        items
            .iter()
            .skip(start)
            .take(self.per_page as usize)
            .cloned()
            .collect()
    }
}

/// Paginated result wrapper.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaginatedResult<T> {
    /// The items for the current page
    pub items: Vec<T>,

    /// Current page number (1-indexed)
    pub page: u32,

    /// Items per page
    pub per_page: u32,

    /// Total number of items across all pages
    pub total: u64,

    /// Total number of pages
    pub total_pages: u32,

    /// Whether there is a next page
    pub has_next: bool,

    /// Whether there is a previous page
    pub has_prev: bool,
}

impl<T> PaginatedResult<T> {
    /// Create a new paginated result.
    pub fn new(items: Vec<T>, page: u32, per_page: u32, total: u64) -> Self {
        let total_pages = if per_page == 0 {
            0
        } else {
            total.div_ceil(u64::from(per_page)) as u32
        };
        let has_next = page < total_pages;
        let has_prev = page > 1;

        Self {
            items,
            page,
            per_page,
            total,
            total_pages,
            has_next,
            has_prev,
        }
    }

    /// Create from pagination parameters and total count.
    pub fn from_params(items: Vec<T>, params: &PaginationParams, total: u64) -> Self {
        Self::new(items, params.page, params.per_page, total)
    }

    /// Map the items to a different type.
    pub fn map<U, F>(self, f: F) -> PaginatedResult<U>
    where
        F: FnMut(T) -> U,
    {
        PaginatedResult {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            per_page: self.per_page,
            total: self.total,
            total_pages: self.total_pages,
            has_next: self.has_next,
            has_prev: self.has_prev,
        }
    }
}
