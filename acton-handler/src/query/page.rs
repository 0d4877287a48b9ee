//! Shaped query output: paginated pages or full result sets
//!
//! ```rust
//! use acton_handler::query::{Fetched, Page, PaginationMeta};
//!
//! let page = Page::new(vec!["a", "b"], PaginationMeta::new(1, 2, 5));
//! let fetched = Fetched::Paged(page);
//! assert!(fetched.is_paginated());
//! assert_eq!(fetched.items(), &["a", "b"]);
//! assert_eq!(fetched.pagination().map(|p| p.total_pages), Some(3));
//! ```

use serde::{Deserialize, Serialize};

/// Pagination metadata for a page of results
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PaginationMeta {
    /// Current page number (1-indexed)
    pub page: u32,
    /// Number of items per page
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

impl PaginationMeta {
    /// Create pagination metadata, deriving page count and navigation flags
    #[must_use]
    pub fn new(page: u32, per_page: u32, total: u64) -> Self {
        let per_page = per_page.max(1);
        let total_pages = calculate_total_pages(total, per_page);

        Self {
            page,
            per_page,
            total,
            total_pages,
            has_next: page < total_pages,
            has_prev: page > 1,
        }
    }

    /// Offset of the first item on this page
    #[must_use]
    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.per_page)
    }
}

/// Ceiling division, clamped to `u32`
fn calculate_total_pages(total: u64, per_page: u32) -> u32 {
    let per_page = u64::from(per_page);
    let pages = total.saturating_add(per_page).saturating_sub(1) / per_page;
    pages.min(u64::from(u32::MAX)) as u32
}

/// One page of items plus its metadata
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Page<T> {
    /// Items on this page
    pub data: Vec<T>,
    /// Pagination metadata
    pub pagination: PaginationMeta,
}

impl<T> Page<T> {
    /// Create a page
    pub fn new(data: Vec<T>, pagination: PaginationMeta) -> Self {
        Self { data, pagination }
    }

    /// Map each item to a new type
    pub fn map<U, F>(self, f: F) -> Page<U>
    where
        F: FnMut(T) -> U,
    {
        Page {
            data: self.data.into_iter().map(f).collect(),
            pagination: self.pagination,
        }
    }
}

/// Result of a shaped fetch
///
/// Serializes as the page object when paginated and as a bare array otherwise.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Fetched<T> {
    /// A single page with metadata
    Paged(Page<T>),
    /// The full, unpaginated result set
    All(Vec<T>),
}

impl<T> Fetched<T> {
    /// Items in this result
    #[must_use]
    pub fn items(&self) -> &[T] {
        match self {
            Self::Paged(page) => &page.data,
            Self::All(items) => items,
        }
    }

    /// Take ownership of the items, dropping any page metadata
    #[must_use]
    pub fn into_items(self) -> Vec<T> {
        match self {
            Self::Paged(page) => page.data,
            Self::All(items) => items,
        }
    }

    /// Page metadata, when paginated
    #[must_use]
    pub fn pagination(&self) -> Option<&PaginationMeta> {
        match self {
            Self::Paged(page) => Some(&page.pagination),
            Self::All(_) => None,
        }
    }

    /// Whether this is a paginated result
    #[must_use]
    pub fn is_paginated(&self) -> bool {
        matches!(self, Self::Paged(_))
    }

    /// Number of items in this result
    #[must_use]
    pub fn len(&self) -> usize {
        self.items().len()
    }

    /// Whether this result has no items
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items().is_empty()
    }

    /// Map each item to a new type, preserving the shape
    pub fn map<U, F>(self, f: F) -> Fetched<U>
    where
        F: FnMut(T) -> U,
    {
        match self {
            Self::Paged(page) => Fetched::Paged(page.map(f)),
            Self::All(items) => Fetched::All(items.into_iter().map(f).collect()),
        }
    }
}
