//! Search, order, date-range and paginate a query from request parameters

use chrono::NaiveDate;
use tracing::debug;

use super::error::QueryError;
use super::filter::{FilterGroup, FilterOperator, SortDirection};
use super::page::Fetched;
use super::params::{
    RequestParams, END_DATE_PARAM, ORDER_PARAM, PAGINATION_PARAM, SORT_PARAM, START_DATE_PARAM,
};
use super::source::{DataSource, QueryHandle, QuerySource, QuerySpec};
use crate::config::PaginationConfig;

/// Column ordered by when the request names none
pub const DEFAULT_ORDER_COLUMN: &str = "created_at";

/// Shapes queries against one data source
///
/// The shaper is cheap to build and holds only borrowed, read-only state, so
/// handlers usually create one per request.
///
/// ```rust
/// use acton_handler::config::PaginationConfig;
/// use acton_handler::query::{MemoryDataSource, QueryShaper, QuerySpec, RequestParams};
/// use serde_json::json;
///
/// let source = MemoryDataSource::new().with_table(
///     "posts",
///     ["id", "title", "created_at"],
///     vec![
///         json!({"id": 1, "title": "Rust", "created_at": "2024-01-01 00:00:00"}),
///         json!({"id": 2, "title": "Go", "created_at": "2024-02-01 00:00:00"}),
///     ],
/// );
/// let config = PaginationConfig::default();
/// let shaper = QueryShaper::new(&source, &config);
///
/// let params = RequestParams::from_pairs([("s", "rust")]);
/// let fetched = shaper.fetch(QuerySpec::entity("posts"), &params).unwrap();
/// assert_eq!(fetched.len(), 1);
/// assert_eq!(fetched.pagination().map(|p| p.per_page), Some(50));
/// ```
#[derive(Debug)]
pub struct QueryShaper<'a, D> {
    source: &'a D,
    config: &'a PaginationConfig,
}

impl<'a, D: DataSource> QueryShaper<'a, D> {
    /// Create a shaper over `source` using `config` for page sizes
    pub fn new(source: &'a D, config: &'a PaginationConfig) -> Self {
        Self { source, config }
    }

    /// Resolve `spec` against the request and execute it
    ///
    /// Supplier sources bypass shaping and are returned as produced.
    ///
    /// # Errors
    ///
    /// Returns an `InvalidInput` [`QueryError`] when a named entity cannot be
    /// resolved, and propagates any error the data source or supplier reports.
    pub fn fetch(
        &self,
        spec: QuerySpec<D::Handle>,
        params: &RequestParams,
    ) -> Result<Fetched<<D::Handle as QueryHandle>::Row>, QueryError> {
        let handle = match spec.source {
            QuerySource::Supplier(supplier) => return supplier(),
            QuerySource::Handle(handle) => handle,
            QuerySource::Entity(ref entity) => self.source.query(entity)?,
        };

        let mut handle = handle.select(&spec.projection);

        if let Some(keyword) = params.keyword() {
            if let Some(group) = FilterGroup::search(&spec.search_columns, keyword) {
                debug!(entity = handle.entity(), filter = %group, "applying keyword search");
                handle = handle.where_group(group);
            }
        }

        if let Some(column) = spec.date_column.as_deref() {
            handle = self.apply_date_range(handle, column, params);
        }

        handle = self.apply_ordering(handle, params);

        match self.resolve_page_size(spec.pagination, spec.client, params) {
            Some(per_page) => {
                let page = params.page();
                debug!(entity = handle.entity(), per_page, page, "paginating");
                handle.paginate(per_page, page).map(Fetched::Paged)
            }
            None => {
                debug!(entity = handle.entity(), "fetching unpaginated set");
                handle.all().map(Fetched::All)
            }
        }
    }

    fn apply_ordering(&self, handle: D::Handle, params: &RequestParams) -> D::Handle {
        let column = params.get_or(ORDER_PARAM, DEFAULT_ORDER_COLUMN).trim();
        if column.is_empty() {
            return handle;
        }

        if !self.source.has_column(handle.entity(), column) {
            debug!(entity = handle.entity(), column, "skipping order on unknown column");
            return handle;
        }

        let direction = sort_direction(column, params.get(SORT_PARAM));
        handle.order_by(column, direction)
    }

    fn apply_date_range(
        &self,
        handle: D::Handle,
        column: &str,
        params: &RequestParams,
    ) -> D::Handle {
        let start = params.non_empty(START_DATE_PARAM).and_then(parse_date);
        let end = params.non_empty(END_DATE_PARAM).and_then(parse_date);
        if start.is_none() && end.is_none() {
            return handle;
        }

        if !self.source.has_column(handle.entity(), column) {
            debug!(entity = handle.entity(), column, "skipping date range on unknown column");
            return handle;
        }

        let mut group = FilterGroup::new();
        if let Some(start) = start {
            group = group.and_where(
                column,
                FilterOperator::GreaterThanOrEqual,
                format!("{} 00:00:00", start.format("%Y-%m-%d")),
            );
        }
        if let Some(end) = end {
            group = group.and_where(
                column,
                FilterOperator::LessThanOrEqual,
                format!("{} 23:59:59", end.format("%Y-%m-%d")),
            );
        }

        debug!(entity = handle.entity(), filter = %group, "applying date range");
        handle.where_group(group)
    }

    /// `None` means the full set; otherwise the capped page size
    fn resolve_page_size(
        &self,
        explicit: Option<u32>,
        client: bool,
        params: &RequestParams,
    ) -> Option<u32> {
        let fallback = if client {
            self.config.client_default()
        } else {
            self.config.default_per_page
        };

        let requested = explicit
            .map(i64::from)
            .or_else(|| params.integer(PAGINATION_PARAM))
            .unwrap_or_else(|| i64::from(fallback));

        if requested <= 0 {
            return None;
        }

        let requested = u32::try_from(requested).unwrap_or(u32::MAX);
        Some(self.config.clamp(requested))
    }
}

/// Direction for `column`; unrecognized values fall back per column
fn sort_direction(column: &str, sort: Option<&str>) -> SortDirection {
    let sort = sort.map(str::trim).unwrap_or("desc");
    if column == DEFAULT_ORDER_COLUMN {
        if sort.eq_ignore_ascii_case("asc") {
            SortDirection::Asc
        } else {
            SortDirection::Desc
        }
    } else if sort.eq_ignore_ascii_case("desc") {
        SortDirection::Desc
    } else {
        SortDirection::Asc
    }
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::error::QueryOperation;
    use crate::query::filter::{Connective, SearchColumn};
    use crate::query::memory::{MemoryDataSource, MemoryQuery};
    use crate::query::page::{Page, PaginationMeta};
    use serde_json::{json, Value};

    fn fixture() -> MemoryDataSource {
        let rows = (1..=300)
            .map(|id| {
                json!({
                    "id": id,
                    "title": format!("post {id}"),
                    "body": if id % 2 == 0 { "even" } else { "odd" },
                    "tag": "general",
                    "created_at": format!("2024-01-{:02} 12:00:00", (id % 28) + 1),
                })
            })
            .collect();

        MemoryDataSource::new()
            .with_table("posts", ["id", "title", "body", "tag", "created_at"], rows)
            .with_table(
                "notes",
                ["id", "title"],
                vec![json!({"id": 3, "title": "c"}), json!({"id": 1, "title": "a"}), json!({"id": 2, "title": "b"})],
            )
    }

    fn ids(fetched: &Fetched<Value>) -> Vec<i64> {
        fetched
            .items()
            .iter()
            .map(|row| row["id"].as_i64().unwrap())
            .collect()
    }

    #[test]
    fn test_supplier_bypasses_shaping() {
        let source = fixture();
        let config = PaginationConfig::default();
        let shaper = QueryShaper::new(&source, &config);

        let spec: QuerySpec<MemoryQuery> =
            QuerySpec::supplier(|| Ok(Fetched::All(vec![json!("raw")]))).paginate(10);
        let params = RequestParams::from_pairs([("s", "zzz"), ("order", "id")]);

        let fetched = shaper.fetch(spec, &params).unwrap();
        assert_eq!(fetched, Fetched::All(vec![json!("raw")]));
    }

    #[test]
    fn test_supplier_error_is_returned() {
        let source = fixture();
        let config = PaginationConfig::default();
        let shaper = QueryShaper::new(&source, &config);

        let spec: QuerySpec<MemoryQuery> = QuerySpec::supplier(|| {
            Err(QueryError::data_source(QueryOperation::Supply, "upstream down"))
        });
        let err = shaper.fetch(spec, &RequestParams::new()).unwrap_err();
        assert!(!err.is_invalid_input());
    }

    #[test]
    fn test_unknown_entity_is_invalid_input() {
        let source = fixture();
        let config = PaginationConfig::default();
        let shaper = QueryShaper::new(&source, &config);

        let err = shaper
            .fetch(QuerySpec::entity("ghosts"), &RequestParams::new())
            .unwrap_err();
        assert!(err.is_invalid_input());
        assert_eq!(err.entity.as_deref(), Some("ghosts"));
    }

    #[test]
    fn test_search_groups_columns_with_or() {
        let source = fixture();
        let spec: QuerySpec<MemoryQuery> = QuerySpec::entity("posts");
        let group = FilterGroup::search(
            &[SearchColumn::from("title"), SearchColumn::from("body"), SearchColumn::from("tag")],
            "x",
        )
        .unwrap();

        assert_eq!(
            group.to_string(),
            "(title LIKE '%x%' OR body LIKE '%x%' OR tag LIKE '%x%')"
        );
        let connectives: Vec<Connective> = group.conditions().iter().map(|c| c.connective).collect();
        assert_eq!(connectives, vec![Connective::And, Connective::Or, Connective::Or]);
        assert_eq!(spec.search_columns, vec![SearchColumn::from("title")]);
        assert!(source.has_column("posts", "tag"));
    }

    #[test]
    fn test_search_matches_any_column() {
        let source = fixture();
        let config = PaginationConfig::default();
        let shaper = QueryShaper::new(&source, &config);

        let spec = QuerySpec::entity("posts")
            .search_columns(["title", "body"])
            .paginate(0);
        let params = RequestParams::from_pairs([("s", "EVEN"), ("order", "id"), ("sort", "asc")]);

        let fetched = shaper.fetch(spec, &params).unwrap();
        assert_eq!(fetched.len(), 150);
        assert!(ids(&fetched).iter().all(|id| id % 2 == 0));
    }

    #[test]
    fn test_structured_search_column_uses_raw_keyword() {
        let source = fixture();
        let config = PaginationConfig::default();
        let shaper = QueryShaper::new(&source, &config);

        let spec = QuerySpec::entity("posts")
            .search_columns([("id", FilterOperator::Equal), ("title", FilterOperator::Like)])
            .paginate(0);
        let params = RequestParams::from_pairs([("s", "7"), ("order", "id"), ("sort", "asc")]);

        let fetched = shaper.fetch(spec, &params).unwrap();
        // id = 7, plus every title containing a 7
        let found = ids(&fetched);
        assert!(found.contains(&7));
        assert!(found.contains(&17));
        assert!(found.contains(&170));
        assert!(!found.contains(&8));
    }

    #[test]
    fn test_search_is_anded_with_prebuilt_filters() {
        let source = fixture();
        let config = PaginationConfig::default();
        let shaper = QueryShaper::new(&source, &config);

        let prebuilt = source
            .query("posts")
            .unwrap()
            .where_group(FilterGroup::new().and_where("id", FilterOperator::LessThanOrEqual, "10"));
        let spec = QuerySpec::handle(prebuilt)
            .search_columns(["body", "tag"])
            .paginate(0);
        let params = RequestParams::from_pairs([("s", "odd"), ("order", "id"), ("sort", "asc")]);

        let fetched = shaper.fetch(spec, &params).unwrap();
        assert_eq!(ids(&fetched), vec![1, 3, 5, 7, 9]);
    }

    #[test]
    fn test_empty_keyword_does_not_filter() {
        let source = fixture();
        let config = PaginationConfig::default();
        let shaper = QueryShaper::new(&source, &config);

        let params = RequestParams::from_pairs([("s", "")]);
        let fetched = shaper.fetch(QuerySpec::entity("posts").paginate(0), &params).unwrap();
        assert_eq!(fetched.len(), 300);
    }

    #[test]
    fn test_sort_direction_fallbacks() {
        assert_eq!(sort_direction("created_at", None), SortDirection::Desc);
        assert_eq!(sort_direction("created_at", Some("ASC")), SortDirection::Asc);
        assert_eq!(sort_direction("created_at", Some("sideways")), SortDirection::Desc);
        assert_eq!(sort_direction("title", Some("sideways")), SortDirection::Asc);
        assert_eq!(sort_direction("title", Some("Desc")), SortDirection::Desc);
        // The default sort of `desc` applies to any column
        assert_eq!(sort_direction("title", None), SortDirection::Desc);
    }

    #[test]
    fn test_default_order_is_created_at_desc() {
        let source = fixture();
        let config = PaginationConfig::default();
        let shaper = QueryShaper::new(&source, &config);

        let fetched = shaper
            .fetch(QuerySpec::entity("posts").paginate(5), &RequestParams::new())
            .unwrap();
        let first = &fetched.items()[0]["created_at"];
        assert_eq!(first, &json!("2024-01-28 12:00:00"));
    }

    #[test]
    fn test_ordering_by_other_column() {
        let source = fixture();
        let config = PaginationConfig::default();
        let shaper = QueryShaper::new(&source, &config);

        let params = RequestParams::from_pairs([("order", "id"), ("sort", "bogus")]);
        let fetched = shaper.fetch(QuerySpec::entity("notes"), &params).unwrap();
        assert_eq!(ids(&fetched), vec![1, 2, 3]);
    }

    #[test]
    fn test_unknown_order_column_is_noop() {
        let source = fixture();
        let config = PaginationConfig::default();
        let shaper = QueryShaper::new(&source, &config);

        let params = RequestParams::from_pairs([("order", "password; DROP TABLE notes")]);
        let fetched = shaper.fetch(QuerySpec::entity("notes"), &params).unwrap();
        // notes has no created_at, so the default order is skipped too
        let unordered = shaper
            .fetch(QuerySpec::entity("notes"), &RequestParams::new())
            .unwrap();
        assert_eq!(ids(&fetched), ids(&unordered));
        assert_eq!(ids(&fetched), vec![3, 1, 2]);
    }

    #[test]
    fn test_page_size_clamped_to_cap() {
        let source = fixture();
        let config = PaginationConfig::default();
        let shaper = QueryShaper::new(&source, &config);

        let params = RequestParams::from_pairs([("pagination", "1000")]);
        let fetched = shaper.fetch(QuerySpec::entity("posts"), &params).unwrap();
        assert_eq!(fetched.pagination().map(|p| p.per_page), Some(250));
        assert_eq!(fetched.len(), 250);

        let fetched = shaper
            .fetch(QuerySpec::entity("posts").paginate(1000), &RequestParams::new())
            .unwrap();
        assert_eq!(fetched.pagination().map(|p| p.per_page), Some(250));
    }

    #[test]
    fn test_cap_disabled_allows_large_pages() {
        let source = fixture();
        let config = PaginationConfig {
            limit_enabled: false,
            ..PaginationConfig::default()
        };
        let shaper = QueryShaper::new(&source, &config);

        let params = RequestParams::from_pairs([("pagination", "1000")]);
        let fetched = shaper.fetch(QuerySpec::entity("posts"), &params).unwrap();
        assert_eq!(fetched.pagination().map(|p| p.per_page), Some(1000));
        assert_eq!(fetched.len(), 300);
    }

    #[test]
    fn test_zero_page_size_returns_full_set() {
        let source = fixture();
        let config = PaginationConfig::default();
        let shaper = QueryShaper::new(&source, &config);

        let explicit = shaper
            .fetch(
                QuerySpec::entity("posts").paginate(0),
                &RequestParams::from_pairs([("pagination", "10")]),
            )
            .unwrap();
        assert!(!explicit.is_paginated());
        assert_eq!(explicit.len(), 300);

        let requested = shaper
            .fetch(QuerySpec::entity("posts"), &RequestParams::from_pairs([("pagination", "0")]))
            .unwrap();
        assert!(!requested.is_paginated());
        assert_eq!(requested.len(), 300);
    }

    #[test]
    fn test_page_size_precedence() {
        let source = fixture();
        let config = PaginationConfig::default();
        let shaper = QueryShaper::new(&source, &config);
        let per_page = |fetched: Fetched<Value>| fetched.pagination().map(|p| p.per_page);

        let params = RequestParams::from_pairs([("pagination", "20")]);
        assert_eq!(per_page(shaper.fetch(QuerySpec::entity("posts").paginate(5), &params).unwrap()), Some(5));
        assert_eq!(per_page(shaper.fetch(QuerySpec::entity("posts"), &params).unwrap()), Some(20));
        assert_eq!(per_page(shaper.fetch(QuerySpec::entity("posts"), &RequestParams::new()).unwrap()), Some(50));
        assert_eq!(per_page(shaper.fetch(QuerySpec::entity("posts").client(), &RequestParams::new()).unwrap()), Some(25));

        let garbage = RequestParams::from_pairs([("pagination", "lots")]);
        assert_eq!(per_page(shaper.fetch(QuerySpec::entity("posts"), &garbage).unwrap()), Some(50));
    }

    #[test]
    fn test_page_param_selects_page() {
        let source = fixture();
        let config = PaginationConfig::default();
        let shaper = QueryShaper::new(&source, &config);

        let params = RequestParams::from_pairs([("order", "id"), ("sort", "asc"), ("page", "3"), ("pagination", "10")]);
        let fetched = shaper.fetch(QuerySpec::entity("posts"), &params).unwrap();
        assert_eq!(ids(&fetched), (21..=30).collect::<Vec<_>>());

        let meta = fetched.pagination().unwrap();
        assert_eq!(meta.page, 3);
        assert_eq!(meta.total, 300);
        assert_eq!(meta.total_pages, 30);
    }

    #[test]
    fn test_date_range_filters_inclusively() {
        let source = fixture();
        let config = PaginationConfig::default();
        let shaper = QueryShaper::new(&source, &config);

        let params = RequestParams::from_pairs([("start_date", "2024-01-02"), ("end_date", "2024-01-02")]);
        let fetched = shaper.fetch(QuerySpec::entity("posts").paginate(0), &params).unwrap();
        assert!(!fetched.is_empty());
        assert!(fetched
            .items()
            .iter()
            .all(|row| row["created_at"] == json!("2024-01-02 12:00:00")));
    }

    #[test]
    fn test_invalid_or_inapplicable_dates_are_ignored() {
        let source = fixture();
        let config = PaginationConfig::default();
        let shaper = QueryShaper::new(&source, &config);

        let params = RequestParams::from_pairs([("start_date", "yesterday")]);
        let fetched = shaper.fetch(QuerySpec::entity("posts").paginate(0), &params).unwrap();
        assert_eq!(fetched.len(), 300);

        let params = RequestParams::from_pairs([("start_date", "2024-01-02")]);
        let notes = shaper.fetch(QuerySpec::entity("notes"), &params).unwrap();
        assert_eq!(notes.len(), 3);

        let disabled = shaper
            .fetch(QuerySpec::entity("posts").without_date_range().paginate(0), &params)
            .unwrap();
        assert_eq!(disabled.len(), 300);
    }

    #[test]
    fn test_projection_limits_columns() {
        let source = fixture();
        let config = PaginationConfig::default();
        let shaper = QueryShaper::new(&source, &config);

        let params = RequestParams::from_pairs([("order", "id"), ("sort", "asc")]);
        let fetched = shaper
            .fetch(QuerySpec::entity("notes").select(["title"]), &params)
            .unwrap();
        assert_eq!(fetched.items()[0], json!({"title": "a"}));
    }

    #[test]
    fn test_paged_result_shape() {
        let source = fixture();
        let config = PaginationConfig::default();
        let shaper = QueryShaper::new(&source, &config);

        let params = RequestParams::from_pairs([("order", "id"), ("sort", "asc")]);
        let fetched = shaper.fetch(QuerySpec::entity("notes").paginate(2), &params).unwrap();
        assert_eq!(
            fetched,
            Fetched::Paged(Page::new(
                vec![json!({"id": 1, "title": "a"}), json!({"id": 2, "title": "b"})],
                PaginationMeta::new(1, 2, 3),
            ))
        );
    }
}
