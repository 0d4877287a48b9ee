//! Query shaping error types
//!
//! # Example
//!
//! ```rust
//! use acton_handler::query::{QueryError, QueryErrorKind, QueryOperation};
//!
//! let error = QueryError::invalid_input(QueryOperation::Resolve, "unknown entity")
//!     .with_entity("ghosts");
//! assert!(matches!(error.kind, QueryErrorKind::InvalidInput));
//! assert_eq!(error.entity.as_deref(), Some("ghosts"));
//! ```

use std::fmt;

/// Step of the shaping pipeline that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryOperation {
    /// Turning a source into a query handle
    Resolve,
    /// Invoking a caller-supplied data supplier
    Supply,
    /// Fetching one page of results
    Paginate,
    /// Fetching the full result set
    Fetch,
}

impl fmt::Display for QueryOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Resolve => write!(f, "resolve"),
            Self::Supply => write!(f, "supply"),
            Self::Paginate => write!(f, "paginate"),
            Self::Fetch => write!(f, "fetch"),
        }
    }
}

/// Category of query error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryErrorKind {
    /// The source descriptor is not something the data source recognizes.
    /// Raised before any data-source call.
    InvalidInput,
    /// The data source failed while executing the query
    DataSource,
}

impl fmt::Display for QueryErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidInput => write!(f, "invalid_input"),
            Self::DataSource => write!(f, "data_source"),
        }
    }
}

impl QueryErrorKind {
    /// Error code string used in JSON error bodies
    #[must_use]
    pub fn error_code(&self) -> String {
        format!("{}", self).to_uppercase()
    }
}

/// Structured query error with operation context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryError {
    /// The pipeline step being performed when the error occurred
    pub operation: QueryOperation,
    /// The category of error
    pub kind: QueryErrorKind,
    /// Human-readable error message
    pub message: String,
    /// The entity type involved, when known
    pub entity: Option<String>,
}

impl QueryError {
    /// Create a new query error
    pub fn new(operation: QueryOperation, kind: QueryErrorKind, message: impl Into<String>) -> Self {
        Self {
            operation,
            kind,
            message: message.into(),
            entity: None,
        }
    }

    /// Create an invalid input error
    pub fn invalid_input(operation: QueryOperation, message: impl Into<String>) -> Self {
        Self::new(operation, QueryErrorKind::InvalidInput, message)
    }

    /// Create a data source error
    ///
    /// ```rust
    /// use acton_handler::query::{QueryError, QueryOperation};
    ///
    /// let error = QueryError::data_source(QueryOperation::Paginate, "connection reset");
    /// assert_eq!(
    ///     error.to_string(),
    ///     "Query data_source error during paginate: connection reset"
    /// );
    /// ```
    pub fn data_source(operation: QueryOperation, message: impl Into<String>) -> Self {
        Self::new(operation, QueryErrorKind::DataSource, message)
    }

    /// Attach the entity type involved
    #[must_use]
    pub fn with_entity(mut self, entity: impl Into<String>) -> Self {
        self.entity = Some(entity.into());
        self
    }

    /// Whether this error points at a programming error at the call site
    #[must_use]
    pub fn is_invalid_input(&self) -> bool {
        self.kind == QueryErrorKind::InvalidInput
    }
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Query {} error during {}: {}",
            self.kind, self.operation, self.message
        )?;
        if let Some(ref entity) = self.entity {
            write!(f, " [{}]", entity)?;
        }
        Ok(())
    }
}

impl std::error::Error for QueryError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_operation_display() {
        assert_eq!(QueryOperation::Resolve.to_string(), "resolve");
        assert_eq!(QueryOperation::Supply.to_string(), "supply");
        assert_eq!(QueryOperation::Paginate.to_string(), "paginate");
        assert_eq!(QueryOperation::Fetch.to_string(), "fetch");
    }

    #[test]
    fn test_error_code() {
        assert_eq!(QueryErrorKind::InvalidInput.error_code(), "INVALID_INPUT");
        assert_eq!(QueryErrorKind::DataSource.error_code(), "DATA_SOURCE");
    }

    #[test]
    fn test_display_with_entity() {
        let error = QueryError::invalid_input(QueryOperation::Resolve, "unknown entity").with_entity("ghosts");
        assert_eq!(
            error.to_string(),
            "Query invalid_input error during resolve: unknown entity [ghosts]"
        );
        assert!(error.is_invalid_input());
    }

    #[test]
    fn test_data_source_is_not_invalid_input() {
        let error = QueryError::data_source(QueryOperation::Fetch, "timeout");
        assert!(!error.is_invalid_input());
        assert!(error.entity.is_none());
    }
}
