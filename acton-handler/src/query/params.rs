//! Request-scoped query parameters
//!
//! [`RequestParams`] is the read-only key/value view the shaper consults for
//! `s`, `order`, `sort`, `pagination`, `page`, `start_date` and `end_date`.
//! In axum handlers it is extracted straight from the query string.
//!
//! ```rust
//! use acton_handler::query::RequestParams;
//!
//! let params = RequestParams::from_pairs([("s", "rust"), ("pagination", "10")]);
//! assert_eq!(params.keyword(), Some("rust"));
//! assert_eq!(params.get_or("order", "created_at"), "created_at");
//! assert_eq!(params.integer("pagination"), Some(10));
//! ```

use std::collections::HashMap;

use axum::{
    extract::{FromRequestParts, Query},
    http::request::Parts,
};

/// Keyword search parameter
pub const SEARCH_PARAM: &str = "s";
/// Order column parameter
pub const ORDER_PARAM: &str = "order";
/// Sort direction parameter
pub const SORT_PARAM: &str = "sort";
/// Page size parameter
pub const PAGINATION_PARAM: &str = "pagination";
/// Page number parameter
pub const PAGE_PARAM: &str = "page";
/// Inclusive lower date bound parameter
pub const START_DATE_PARAM: &str = "start_date";
/// Inclusive upper date bound parameter
pub const END_DATE_PARAM: &str = "end_date";

/// Read-only request parameters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestParams {
    values: HashMap<String, String>,
}

impl RequestParams {
    /// Empty parameter set
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from key/value pairs
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            values: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Raw value for `key`
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Value for `key`, or `default` when absent
    #[must_use]
    pub fn get_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.get(key).unwrap_or(default)
    }

    /// Non-empty value for `key`
    #[must_use]
    pub fn non_empty(&self, key: &str) -> Option<&str> {
        self.get(key).map(str::trim).filter(|v| !v.is_empty())
    }

    /// Integer value for `key`; absent or non-numeric values yield `None`
    #[must_use]
    pub fn integer(&self, key: &str) -> Option<i64> {
        self.non_empty(key).and_then(|v| v.parse().ok())
    }

    /// The search keyword, when present and non-empty
    #[must_use]
    pub fn keyword(&self) -> Option<&str> {
        self.get(SEARCH_PARAM).filter(|v| !v.is_empty())
    }

    /// Requested 1-indexed page number, defaulting to 1
    #[must_use]
    pub fn page(&self) -> u32 {
        self.integer(PAGE_PARAM)
            .map(|p| p.clamp(1, i64::from(u32::MAX)) as u32)
            .unwrap_or(1)
    }
}

impl From<HashMap<String, String>> for RequestParams {
    fn from(values: HashMap<String, String>) -> Self {
        Self { values }
    }
}

impl<S> FromRequestParts<S> for RequestParams
where
    S: Send + Sync,
{
    type Rejection = axum::extract::rejection::QueryRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Query(values) = Query::<HashMap<String, String>>::try_from_uri(&parts.uri)?;
        Ok(Self { values })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    #[test]
    fn test_keyword_ignores_empty() {
        assert_eq!(RequestParams::from_pairs([("s", "")]).keyword(), None);
        assert_eq!(RequestParams::new().keyword(), None);
        assert_eq!(RequestParams::from_pairs([("s", "x")]).keyword(), Some("x"));
    }

    #[test]
    fn test_integer_parsing() {
        let params = RequestParams::from_pairs([("a", "12"), ("b", "abc"), ("c", " 0 ")]);
        assert_eq!(params.integer("a"), Some(12));
        assert_eq!(params.integer("b"), None);
        assert_eq!(params.integer("c"), Some(0));
        assert_eq!(params.integer("missing"), None);
    }

    #[test]
    fn test_page_defaults_and_floor() {
        assert_eq!(RequestParams::new().page(), 1);
        assert_eq!(RequestParams::from_pairs([("page", "0")]).page(), 1);
        assert_eq!(RequestParams::from_pairs([("page", "-3")]).page(), 1);
        assert_eq!(RequestParams::from_pairs([("page", "4")]).page(), 4);
    }

    #[tokio::test]
    async fn test_extract_from_query_string() {
        let request = Request::builder()
            .uri("/posts?s=hello%20world&order=title&sort=asc")
            .body(())
            .unwrap();
        let (mut parts, _) = request.into_parts();

        let params = RequestParams::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(params.keyword(), Some("hello world"));
        assert_eq!(params.get("order"), Some("title"));
        assert_eq!(params.get("sort"), Some("asc"));
    }

    #[tokio::test]
    async fn test_extract_without_query_string() {
        let request = Request::builder().uri("/posts").body(()).unwrap();
        let (mut parts, _) = request.into_parts();

        let params = RequestParams::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(params, RequestParams::new());
    }
}
