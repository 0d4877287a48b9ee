//! Error types and HTTP response conversion

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::executor::ExecutionError;
use crate::query::{QueryError, QueryErrorKind};

/// Result type alias using the crate error
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the crate
///
/// Large error variants are boxed to reduce stack size
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(Box<figment::Error>),

    /// Query shaping error (invalid source or data source failure)
    #[error("{0}")]
    Query(QueryError),

    /// Fault that escaped the action executor
    #[error("{0}")]
    Execution(#[from] ExecutionError),

    /// Session error
    #[cfg(feature = "session")]
    #[error("Session error: {0}")]
    Session(String),
}

/// Error response body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,

    /// Optional error code
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    /// HTTP status code
    pub status: u16,
}

impl ErrorResponse {
    /// Create a new error response
    pub fn new(status: StatusCode, error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code: None,
            status: status.as_u16(),
        }
    }

    /// Create error response with a code
    pub fn with_code(
        status: StatusCode,
        code: impl Into<String>,
        error: impl Into<String>,
    ) -> Self {
        Self {
            error: error.into(),
            code: Some(code.into()),
            status: status.as_u16(),
        }
    }
}

impl fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)
    }
}

impl Error {
    /// HTTP status and body for this error
    fn to_error_response(&self) -> ErrorResponse {
        match self {
            Error::Config(e) => ErrorResponse::with_code(
                StatusCode::INTERNAL_SERVER_ERROR,
                "CONFIG_ERROR",
                e.to_string(),
            ),
            Error::Query(e) => {
                let status = match e.kind {
                    QueryErrorKind::InvalidInput => StatusCode::BAD_REQUEST,
                    QueryErrorKind::DataSource => StatusCode::INTERNAL_SERVER_ERROR,
                };
                ErrorResponse::with_code(status, e.kind.error_code(), e.message.clone())
            }
            // Raw fault details stay in the logs.
            Error::Execution(_) => ErrorResponse::with_code(
                StatusCode::INTERNAL_SERVER_ERROR,
                "EXECUTION_ERROR",
                "Internal server error",
            ),
            #[cfg(feature = "session")]
            Error::Session(msg) => ErrorResponse::with_code(
                StatusCode::INTERNAL_SERVER_ERROR,
                "SESSION_ERROR",
                msg.clone(),
            ),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let error_response = self.to_error_response();

        if error_response.status >= 500 {
            tracing::error!(error = %self, "Request failed");
        } else {
            tracing::debug!(error = %self, "Request rejected");
        }

        let status =
            StatusCode::from_u16(error_response.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(error_response)).into_response()
    }
}

// Manual From implementations for boxed errors
impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Error::Config(Box::new(err))
    }
}

impl From<QueryError> for Error {
    fn from(err: QueryError) -> Self {
        Error::Query(err)
    }
}
