//! Search columns, filter groups, projections and sort direction
//!
//! A [`FilterGroup`] is one parenthesized predicate. Its first condition joins
//! with AND and later ones carry their own connective, so a search over three
//! columns reads `(title LIKE '%x%' OR body LIKE '%x%' OR tag LIKE '%x%')` and
//! is ANDed with whatever filters the handle already carries.
//!
//! ```rust
//! use acton_handler::query::{FilterGroup, SearchColumn};
//!
//! let columns: Vec<SearchColumn> = vec!["title".into(), "body".into(), "tag".into()];
//! let group = FilterGroup::search(&columns, "x").expect("non-empty search");
//! assert_eq!(
//!     group.to_string(),
//!     "(title LIKE '%x%' OR body LIKE '%x%' OR tag LIKE '%x%')"
//! );
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Sort direction for ordered queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// Ascending (A-Z, 0-9, oldest first)
    #[default]
    Asc,
    /// Descending (Z-A, 9-0, newest first)
    Desc,
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Asc => write!(f, "asc"),
            Self::Desc => write!(f, "desc"),
        }
    }
}

impl SortDirection {
    /// SQL ORDER BY fragment
    #[must_use]
    pub const fn as_sql(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// Comparison operators usable in search columns and filters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterOperator {
    /// `=`
    Equal,
    /// `!=`
    NotEqual,
    /// `>`
    GreaterThan,
    /// `>=`
    GreaterThanOrEqual,
    /// `<`
    LessThan,
    /// `<=`
    LessThanOrEqual,
    /// `LIKE`; search keywords are wrapped in `%` wildcards
    Like,
    /// `NOT LIKE`; the keyword is used as given
    NotLike,
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Equal => write!(f, "="),
            Self::NotEqual => write!(f, "!="),
            Self::GreaterThan => write!(f, ">"),
            Self::GreaterThanOrEqual => write!(f, ">="),
            Self::LessThan => write!(f, "<"),
            Self::LessThanOrEqual => write!(f, "<="),
            Self::Like => write!(f, "LIKE"),
            Self::NotLike => write!(f, "NOT LIKE"),
        }
    }
}

/// Error returned when an operator string is not recognized
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported filter operator `{0}`")]
pub struct ParseOperatorError(pub String);

impl FromStr for FilterOperator {
    type Err = ParseOperatorError;

    /// Parse an operator; an empty string means `=`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.split_whitespace().collect::<Vec<_>>().join(" ").to_uppercase();
        match normalized.as_str() {
            "" | "=" | "==" => Ok(Self::Equal),
            "!=" | "<>" => Ok(Self::NotEqual),
            ">" => Ok(Self::GreaterThan),
            ">=" => Ok(Self::GreaterThanOrEqual),
            "<" => Ok(Self::LessThan),
            "<=" => Ok(Self::LessThanOrEqual),
            "LIKE" => Ok(Self::Like),
            "NOT LIKE" => Ok(Self::NotLike),
            _ => Err(ParseOperatorError(s.to_string())),
        }
    }
}

/// How a condition joins the conditions before it inside a group
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connective {
    /// `AND`
    And,
    /// `OR`
    Or,
}

impl fmt::Display for Connective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::And => write!(f, "AND"),
            Self::Or => write!(f, "OR"),
        }
    }
}

/// One `column operator value` predicate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterCondition {
    /// How this condition joins the previous ones (ignored for the first)
    pub connective: Connective,
    /// Column name
    pub column: String,
    /// Comparison operator
    pub operator: FilterOperator,
    /// Comparison value, already wildcard-wrapped for `LIKE` searches
    pub value: String,
}

impl fmt::Display for FilterCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} '{}'",
            self.column,
            self.operator,
            self.value.replace('\'', "''")
        )
    }
}

/// A parenthesized group of conditions
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterGroup {
    conditions: Vec<FilterCondition>,
}

impl FilterGroup {
    /// Create an empty group
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a condition joined with AND
    #[must_use]
    pub fn and_where(
        mut self,
        column: impl Into<String>,
        operator: FilterOperator,
        value: impl Into<String>,
    ) -> Self {
        self.conditions.push(FilterCondition {
            connective: Connective::And,
            column: column.into(),
            operator,
            value: value.into(),
        });
        self
    }

    /// Append a condition joined with OR
    #[must_use]
    pub fn or_where(
        mut self,
        column: impl Into<String>,
        operator: FilterOperator,
        value: impl Into<String>,
    ) -> Self {
        self.conditions.push(FilterCondition {
            connective: Connective::Or,
            column: column.into(),
            operator,
            value: value.into(),
        });
        self
    }

    /// Build the disjunctive keyword search over `columns`
    ///
    /// Returns `None` for an empty keyword or an empty column list.
    #[must_use]
    pub fn search(columns: &[SearchColumn], keyword: &str) -> Option<Self> {
        if keyword.is_empty() || columns.is_empty() {
            return None;
        }

        let group = columns
            .iter()
            .enumerate()
            .fold(Self::new(), |group, (index, column)| {
                let value = column.value_for(keyword);
                if index == 0 {
                    group.and_where(column.column(), column.operator(), value)
                } else {
                    group.or_where(column.column(), column.operator(), value)
                }
            });
        Some(group)
    }

    /// Conditions in insertion order
    #[must_use]
    pub fn conditions(&self) -> &[FilterCondition] {
        &self.conditions
    }

    /// Whether the group has no conditions
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Evaluate the group left to right with `check` deciding each condition
    ///
    /// AND binds tighter than OR, matching SQL precedence. An empty group matches.
    pub fn evaluate<F>(&self, mut check: F) -> bool
    where
        F: FnMut(&FilterCondition) -> bool,
    {
        if self.conditions.is_empty() {
            return true;
        }

        let mut any_clause = false;
        let mut clause = true;
        for (index, condition) in self.conditions.iter().enumerate() {
            if index > 0 && condition.connective == Connective::Or {
                any_clause |= clause;
                clause = true;
            }
            clause = clause && check(condition);
        }
        any_clause || clause
    }
}

impl fmt::Display for FilterGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (index, condition) in self.conditions.iter().enumerate() {
            if index > 0 {
                write!(f, " {} ", condition.connective)?;
            }
            write!(f, "{}", condition)?;
        }
        write!(f, ")")
    }
}

/// A column participating in keyword search
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchColumn {
    /// Bare column name, searched with `LIKE '%keyword%'`
    Column(String),
    /// Column with an explicit operator
    WithOperator {
        /// Column name
        column: String,
        /// Operator applied to the keyword
        operator: FilterOperator,
    },
}

impl SearchColumn {
    /// Search a column with an explicit operator
    pub fn with_operator(column: impl Into<String>, operator: FilterOperator) -> Self {
        Self::WithOperator {
            column: column.into(),
            operator,
        }
    }

    /// Build from a `(column, operator)` string pair; an empty operator means `=`
    ///
    /// ```rust
    /// use acton_handler::query::{FilterOperator, SearchColumn};
    ///
    /// let column = SearchColumn::parse_pair("status", "").unwrap();
    /// assert_eq!(column.operator(), FilterOperator::Equal);
    /// assert!(SearchColumn::parse_pair("status", "~=").is_err());
    /// ```
    pub fn parse_pair(column: impl Into<String>, operator: &str) -> Result<Self, ParseOperatorError> {
        Ok(Self::with_operator(column, operator.parse()?))
    }

    /// The column name
    #[must_use]
    pub fn column(&self) -> &str {
        match self {
            Self::Column(column) | Self::WithOperator { column, .. } => column,
        }
    }

    /// The operator used for this column
    #[must_use]
    pub fn operator(&self) -> FilterOperator {
        match self {
            Self::Column(_) => FilterOperator::Like,
            Self::WithOperator { operator, .. } => *operator,
        }
    }

    /// The comparison value for `keyword`
    ///
    /// Only `LIKE` wraps the keyword in wildcards; other operators use it raw.
    #[must_use]
    pub fn value_for(&self, keyword: &str) -> String {
        match self.operator() {
            FilterOperator::Like => format!("%{keyword}%"),
            _ => keyword.to_string(),
        }
    }
}

impl From<&str> for SearchColumn {
    fn from(column: &str) -> Self {
        Self::Column(column.to_string())
    }
}

impl From<String> for SearchColumn {
    fn from(column: String) -> Self {
        Self::Column(column)
    }
}

impl From<(&str, FilterOperator)> for SearchColumn {
    fn from((column, operator): (&str, FilterOperator)) -> Self {
        Self::with_operator(column, operator)
    }
}

/// Columns to select
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Projection {
    /// `*`
    #[default]
    All,
    /// Only the named columns
    Columns(Vec<String>),
}

impl Projection {
    /// Select the given columns; a `*` anywhere in the list selects everything
    pub fn columns<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let columns: Vec<String> = columns.into_iter().map(Into::into).collect();
        if columns.is_empty() || columns.iter().any(|c| c == "*") {
            Self::All
        } else {
            Self::Columns(columns)
        }
    }

    /// Whether `column` is part of the projection
    #[must_use]
    pub fn includes(&self, column: &str) -> bool {
        match self {
            Self::All => true,
            Self::Columns(columns) => columns.iter().any(|c| c == column),
        }
    }
}
