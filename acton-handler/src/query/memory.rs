//! In-memory data source over JSON rows
//!
//! Useful as a test fixture and for small static datasets. Semantics follow
//! what a typical SQL backend does: `LIKE` is case-insensitive with `%` and `_`
//! wildcards, NULL never matches a comparison, numeric and date values compare
//! by value, and NULLs sort first in ascending order.
//!
//! ```rust
//! use acton_handler::query::{DataSource, MemoryDataSource, QueryHandle};
//! use serde_json::json;
//!
//! let source = MemoryDataSource::new().with_table(
//!     "posts",
//!     ["id", "title"],
//!     vec![json!({"id": 1, "title": "Hello"}), json!({"id": 2, "title": "World"})],
//! );
//! assert!(source.has_column("posts", "title"));
//! assert_eq!(source.query("posts").unwrap().all().unwrap().len(), 2);
//! ```

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::{Map, Value};

use super::error::{QueryError, QueryOperation};
use super::filter::{FilterCondition, FilterGroup, FilterOperator, Projection, SortDirection};
use super::page::{Page, PaginationMeta};
use super::source::{DataSource, QueryHandle};

type Row = Map<String, Value>;

#[derive(Debug, Default)]
struct MemoryTable {
    columns: Vec<String>,
    rows: Vec<Row>,
}

/// A set of named in-memory tables
#[derive(Debug, Clone, Default)]
pub struct MemoryDataSource {
    tables: Arc<HashMap<String, Arc<MemoryTable>>>,
}

impl MemoryDataSource {
    /// Empty data source
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a table with its declared columns; non-object rows are skipped
    #[must_use]
    pub fn with_table<I, S>(self, name: impl Into<String>, columns: I, rows: Vec<Value>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let table = MemoryTable {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: rows
                .into_iter()
                .filter_map(|row| match row {
                    Value::Object(map) => Some(map),
                    _ => None,
                })
                .collect(),
        };

        let mut tables: HashMap<String, Arc<MemoryTable>> = self.tables.as_ref().clone();
        tables.insert(name.into(), Arc::new(table));
        Self {
            tables: Arc::new(tables),
        }
    }
}

impl DataSource for MemoryDataSource {
    type Handle = MemoryQuery;

    fn query(&self, entity: &str) -> Result<MemoryQuery, QueryError> {
        if entity.trim().is_empty() {
            return Err(QueryError::invalid_input(
                QueryOperation::Resolve,
                "entity name must not be empty",
            ));
        }

        let table = self.tables.get(entity).cloned().ok_or_else(|| {
            QueryError::invalid_input(QueryOperation::Resolve, "unknown entity").with_entity(entity)
        })?;

        Ok(MemoryQuery {
            entity: entity.to_string(),
            table,
            projection: Projection::All,
            filters: Vec::new(),
            ordering: Vec::new(),
        })
    }

    fn has_column(&self, entity: &str, column: &str) -> bool {
        self.tables
            .get(entity)
            .is_some_and(|table| table.columns.iter().any(|c| c == column))
    }
}

/// Query handle over one in-memory table
#[derive(Debug, Clone)]
pub struct MemoryQuery {
    entity: String,
    table: Arc<MemoryTable>,
    projection: Projection,
    filters: Vec<FilterGroup>,
    ordering: Vec<(String, SortDirection)>,
}

impl MemoryQuery {
    /// Filter groups applied so far
    #[must_use]
    pub fn filters(&self) -> &[FilterGroup] {
        &self.filters
    }

    /// ORDER BY terms applied so far
    #[must_use]
    pub fn ordering(&self) -> &[(String, SortDirection)] {
        &self.ordering
    }

    /// Current projection
    #[must_use]
    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    fn matching_rows(&self) -> Vec<&Row> {
        let mut rows: Vec<&Row> = self
            .table
            .rows
            .iter()
            .filter(|row| {
                self.filters
                    .iter()
                    .all(|group| group.evaluate(|condition| condition_matches(row, condition)))
            })
            .collect();

        if !self.ordering.is_empty() {
            rows.sort_by(|a, b| {
                for (column, direction) in &self.ordering {
                    let ordering = compare_fields(a.get(column), b.get(column));
                    let ordering = match direction {
                        SortDirection::Asc => ordering,
                        SortDirection::Desc => ordering.reverse(),
                    };
                    if ordering != Ordering::Equal {
                        return ordering;
                    }
                }
                Ordering::Equal
            });
        }

        rows
    }

    fn project(&self, row: &Row) -> Value {
        let projected = match &self.projection {
            Projection::All => row.clone(),
            Projection::Columns(_) => row
                .iter()
                .filter(|(key, _)| self.projection.includes(key))
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect(),
        };
        Value::Object(projected)
    }
}

impl QueryHandle for MemoryQuery {
    type Row = Value;

    fn entity(&self) -> &str {
        &self.entity
    }

    fn select(mut self, projection: &Projection) -> Self {
        self.projection = projection.clone();
        self
    }

    fn where_group(mut self, group: FilterGroup) -> Self {
        if !group.is_empty() {
            self.filters.push(group);
        }
        self
    }

    fn order_by(mut self, column: &str, direction: SortDirection) -> Self {
        self.ordering.push((column.to_string(), direction));
        self
    }

    fn paginate(self, per_page: u32, page: u32) -> Result<Page<Value>, QueryError> {
        let rows = self.matching_rows();
        let meta = PaginationMeta::new(page.max(1), per_page, rows.len() as u64);

        let offset = usize::try_from(meta.offset()).unwrap_or(usize::MAX);
        let data = rows
            .into_iter()
            .skip(offset)
            .take(meta.per_page as usize)
            .map(|row| self.project(row))
            .collect();

        Ok(Page::new(data, meta))
    }

    fn all(self) -> Result<Vec<Value>, QueryError> {
        Ok(self
            .matching_rows()
            .into_iter()
            .map(|row| self.project(row))
            .collect())
    }
}

fn condition_matches(row: &Row, condition: &FilterCondition) -> bool {
    let Some(text) = row.get(&condition.column).and_then(value_text) else {
        return false;
    };

    let ordering = || compare_text(&text, &condition.value);
    match condition.operator {
        FilterOperator::Like => like_matches(&condition.value, &text),
        FilterOperator::NotLike => !like_matches(&condition.value, &text),
        FilterOperator::Equal => ordering() == Ordering::Equal,
        FilterOperator::NotEqual => ordering() != Ordering::Equal,
        FilterOperator::GreaterThan => ordering() == Ordering::Greater,
        FilterOperator::GreaterThanOrEqual => ordering() != Ordering::Less,
        FilterOperator::LessThan => ordering() == Ordering::Less,
        FilterOperator::LessThanOrEqual => ordering() != Ordering::Greater,
    }
}

/// Scalar text of a JSON value; NULL and composite values have none
fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(if *b { "1" } else { "0" }.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

fn compare_fields(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a.and_then(value_text), b.and_then(value_text)) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => compare_text(&a, &b),
    }
}

/// Scalar text classified for comparison; variants are ranked in declaration order
#[derive(Debug)]
enum Scalar<'a> {
    Number(f64),
    Timestamp(NaiveDateTime),
    Text(&'a str),
}

impl<'a> Scalar<'a> {
    /// Only finite numbers count, so `nan` and `inf` compare as text
    fn classify(s: &'a str) -> Self {
        if let Some(n) = s.parse::<f64>().ok().filter(|n| n.is_finite()) {
            return Self::Number(n);
        }
        match parse_timestamp(s) {
            Some(ts) => Self::Timestamp(ts),
            None => Self::Text(s),
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Self::Number(_) => 0,
            Self::Timestamp(_) => 1,
            Self::Text(_) => 2,
        }
    }
}

/// Total order: numbers, then timestamps, then plain text
fn compare_text(a: &str, b: &str) -> Ordering {
    match (Scalar::classify(a), Scalar::classify(b)) {
        (Scalar::Number(x), Scalar::Number(y)) => x.total_cmp(&y),
        (Scalar::Timestamp(x), Scalar::Timestamp(y)) => x.cmp(&y),
        (Scalar::Text(x), Scalar::Text(y)) => x.cmp(y),
        (x, y) => x.rank().cmp(&y.rank()),
    }
}

fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.naive_utc())
        .ok()
        .or_else(|| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").ok())
        .or_else(|| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S").ok())
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Case-insensitive SQL `LIKE` with `%` and `_` wildcards
fn like_matches(pattern: &str, text: &str) -> bool {
    let pattern: Vec<char> = pattern.to_lowercase().chars().collect();
    let text: Vec<char> = text.to_lowercase().chars().collect();

    // Greedy matcher with single-star backtracking
    let (mut p, mut t) = (0, 0);
    let mut star: Option<usize> = None;
    let mut resume = 0;

    while t < text.len() {
        if p < pattern.len() && (pattern[p] == '_' || pattern[p] == text[t]) {
            p += 1;
            t += 1;
        } else if p < pattern.len() && pattern[p] == '%' {
            star = Some(p);
            resume = t;
            p += 1;
        } else if let Some(star_at) = star {
            p = star_at + 1;
            resume += 1;
            t = resume;
        } else {
            return false;
        }
    }

    pattern[p..].iter().all(|c| *c == '%')
}
