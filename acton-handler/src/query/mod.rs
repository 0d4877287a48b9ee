//! Searchable, sortable, paginated result sets
//!
//! This module turns a data source plus request parameters into a shaped
//! result, applying the same search, ordering and pagination rules to every
//! listing endpoint.
//!
//! # Features
//!
//! - **Three source shapes**: [`QuerySource`] is a named entity, a prebuilt
//!   [`QueryHandle`], or a [`Supplier`] closure that bypasses shaping
//! - **Keyword search**: the `s` parameter becomes one grouped
//!   `(a LIKE '%s%' OR b LIKE '%s%')` filter via [`FilterGroup::search`]
//! - **Ordering**: `order`/`sort` with per-column fallbacks; unknown columns are skipped
//! - **Date range**: `start_date`/`end_date` bound the `created_at` column
//! - **Pagination**: explicit size, then `pagination`, then the configured
//!   default, capped by [`PaginationConfig`](crate::config::PaginationConfig);
//!   `0` returns the full set
//!
//! # Example
//!
//! ```rust
//! use acton_handler::config::PaginationConfig;
//! use acton_handler::query::{Fetched, MemoryDataSource, QueryShaper, QuerySpec, RequestParams};
//! use serde_json::json;
//!
//! let source = MemoryDataSource::new().with_table(
//!     "posts",
//!     ["id", "title", "body"],
//!     vec![
//!         json!({"id": 1, "title": "Borrowing", "body": "rust"}),
//!         json!({"id": 2, "title": "Rust traits", "body": "generics"}),
//!         json!({"id": 3, "title": "Goroutines", "body": "go"}),
//!     ],
//! );
//! let config = PaginationConfig::default();
//! let shaper = QueryShaper::new(&source, &config);
//!
//! let params = RequestParams::from_pairs([("s", "rust"), ("order", "id"), ("sort", "asc")]);
//! let spec = QuerySpec::entity("posts").search_columns(["title", "body"]).paginate(0);
//!
//! let Fetched::All(rows) = shaper.fetch(spec, &params).unwrap() else {
//!     unreachable!()
//! };
//! assert_eq!(rows.len(), 2);
//! ```

mod error;
mod filter;
mod memory;
mod page;
mod params;
mod shaper;
mod source;

pub use error::{QueryError, QueryErrorKind, QueryOperation};
pub use filter::{
    Connective, FilterCondition, FilterGroup, FilterOperator, ParseOperatorError, Projection,
    SearchColumn, SortDirection,
};
pub use memory::{MemoryDataSource, MemoryQuery};
pub use page::{Fetched, Page, PaginationMeta};
pub use params::{
    RequestParams, END_DATE_PARAM, ORDER_PARAM, PAGE_PARAM, PAGINATION_PARAM, SEARCH_PARAM,
    SORT_PARAM, START_DATE_PARAM,
};
pub use shaper::{QueryShaper, DEFAULT_ORDER_COLUMN};
pub use source::{DataSource, QueryHandle, QuerySource, QuerySpec, Supplier};
