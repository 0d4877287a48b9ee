//! Data source abstractions and the query source descriptor
//!
//! The shaper never talks to a database directly. It needs a [`DataSource`]
//! that can open a fresh [`QueryHandle`] for a named entity and answer schema
//! questions, and a handle that can be narrowed (select, filter, order) and
//! finally executed (paginate or fetch everything).

use std::fmt;

use super::error::QueryError;
use super::filter::{FilterGroup, Projection, SearchColumn, SortDirection};
use super::page::{Fetched, Page};

/// A query under construction for one entity
///
/// Narrowing methods consume and return the handle so call sites chain them.
pub trait QueryHandle: Sized {
    /// Row type produced when the query executes
    type Row;

    /// Entity (table) this handle queries
    fn entity(&self) -> &str;

    /// Restrict the selected columns
    fn select(self, projection: &Projection) -> Self;

    /// AND a parenthesized group of conditions onto the existing filters
    fn where_group(self, group: FilterGroup) -> Self;

    /// Append an ORDER BY term
    fn order_by(self, column: &str, direction: SortDirection) -> Self;

    /// Execute and return one page
    fn paginate(self, per_page: u32, page: u32) -> Result<Page<Self::Row>, QueryError>;

    /// Execute and return every matching row
    fn all(self) -> Result<Vec<Self::Row>, QueryError>;
}

/// Something that can open queries and describe entity schemas
pub trait DataSource {
    /// Handle type produced for each entity
    type Handle: QueryHandle;

    /// Open a fresh default query over `entity`
    ///
    /// # Errors
    ///
    /// Returns an `InvalidInput` [`QueryError`] when `entity` is not known.
    fn query(&self, entity: &str) -> Result<Self::Handle, QueryError>;

    /// Whether `entity` has a column named `column`
    fn has_column(&self, entity: &str, column: &str) -> bool;
}

/// Caller-supplied producer that bypasses all shaping
pub type Supplier<R> = Box<dyn FnOnce() -> Result<Fetched<R>, QueryError>>;

/// Where the shaper gets its data from
pub enum QuerySource<H: QueryHandle> {
    /// Lazily evaluated producer; its result is returned verbatim
    Supplier(Supplier<H::Row>),
    /// A prebuilt query handle, used as-is
    Handle(H),
    /// A named entity; a fresh default query is opened for it
    Entity(String),
}

impl<H: QueryHandle> QuerySource<H> {
    /// Wrap a supplier closure
    pub fn supplier<F>(f: F) -> Self
    where
        F: FnOnce() -> Result<Fetched<H::Row>, QueryError> + 'static,
    {
        Self::Supplier(Box::new(f))
    }
}

impl<H: QueryHandle> fmt::Debug for QuerySource<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Supplier(_) => f.write_str("QuerySource::Supplier(..)"),
            Self::Handle(handle) => write!(f, "QuerySource::Handle({})", handle.entity()),
            Self::Entity(entity) => write!(f, "QuerySource::Entity({entity})"),
        }
    }
}

/// Everything the shaper needs for one fetch besides request parameters
///
/// ```rust
/// use acton_handler::query::{MemoryQuery, QuerySpec, SearchColumn};
///
/// let spec: QuerySpec<MemoryQuery> = QuerySpec::entity("posts")
///     .search_columns(["title", "body"])
///     .select(["id", "title"])
///     .paginate(10);
/// assert_eq!(spec.search_columns.len(), 2);
/// assert_eq!(spec.pagination, Some(10));
/// ```
#[derive(Debug)]
pub struct QuerySpec<H: QueryHandle> {
    /// Data origin
    pub source: QuerySource<H>,
    /// Columns searched by the `s` keyword; defaults to `["title"]`
    pub search_columns: Vec<SearchColumn>,
    /// Columns to select
    pub projection: Projection,
    /// Explicit page size; `Some(0)` returns the unpaginated set
    pub pagination: Option<u32>,
    /// Use the client-facing default page size instead of the general one
    pub client: bool,
    /// Column filtered by `start_date`/`end_date`; `None` disables the date range
    pub date_column: Option<String>,
}

impl<H: QueryHandle> QuerySpec<H> {
    /// Spec over an arbitrary source with default settings
    pub fn new(source: QuerySource<H>) -> Self {
        Self {
            source,
            search_columns: vec![SearchColumn::from("title")],
            projection: Projection::All,
            pagination: None,
            client: false,
            date_column: Some("created_at".to_string()),
        }
    }

    /// Spec over a named entity
    pub fn entity(entity: impl Into<String>) -> Self {
        Self::new(QuerySource::Entity(entity.into()))
    }

    /// Spec over a prebuilt handle
    pub fn handle(handle: H) -> Self {
        Self::new(QuerySource::Handle(handle))
    }

    /// Spec over a supplier closure
    pub fn supplier<F>(f: F) -> Self
    where
        F: FnOnce() -> Result<Fetched<H::Row>, QueryError> + 'static,
    {
        Self::new(QuerySource::supplier(f))
    }

    /// Replace the searched columns; an empty list disables search
    #[must_use]
    pub fn search_columns<I, C>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<SearchColumn>,
    {
        self.search_columns = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Restrict the selected columns
    #[must_use]
    pub fn select<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.projection = Projection::columns(columns);
        self
    }

    /// Set an explicit page size; `0` returns everything
    #[must_use]
    pub fn paginate(mut self, per_page: u32) -> Self {
        self.pagination = Some(per_page);
        self
    }

    /// Fall back to the client-facing page size
    #[must_use]
    pub fn client(mut self) -> Self {
        self.client = true;
        self
    }

    /// Change the column used by the date range filter
    #[must_use]
    pub fn date_column(mut self, column: impl Into<String>) -> Self {
        self.date_column = Some(column.into());
        self
    }

    /// Ignore `start_date`/`end_date`
    #[must_use]
    pub fn without_date_range(mut self) -> Self {
        self.date_column = None;
        self
    }
}
