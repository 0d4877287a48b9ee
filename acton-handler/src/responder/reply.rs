//! Rendered responses: JSON bodies and redirects carrying flash state

use axum::{
    response::{IntoResponse, Response},
    Json,
};
use http::{header, HeaderValue, StatusCode};
use tracing::warn;

use super::envelope::ResponseEnvelope;

/// Location used when a "back" redirect has no known previous page
pub const FALLBACK_LOCATION: &str = "/";

/// Where a redirect goes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RedirectTarget {
    /// An explicit route
    Route(String),
    /// The page the request came from
    Back,
}

/// Envelope to flash into the session for the next request
///
/// Placed in the response extensions by [`RedirectReply`] and persisted by
/// the flash middleware.
#[derive(Debug, Clone, PartialEq)]
pub struct FlashEnvelope(pub ResponseEnvelope);

/// Envelope rendered as a JSON body
#[derive(Debug, Clone, PartialEq)]
pub struct JsonReply {
    status: StatusCode,
    envelope: ResponseEnvelope,
}

impl JsonReply {
    /// Render `envelope` with its own status; 200 when unset, 500 when not a valid status
    #[must_use]
    pub fn new(envelope: ResponseEnvelope) -> Self {
        let status = match envelope.status_code {
            None => StatusCode::OK,
            Some(code) => StatusCode::from_u16(code).unwrap_or_else(|_| {
                warn!(status = code, "Envelope status is not a valid HTTP status");
                StatusCode::INTERNAL_SERVER_ERROR
            }),
        };
        Self { status, envelope }
    }

    /// Transport status
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Rendered envelope
    #[must_use]
    pub fn envelope(&self) -> &ResponseEnvelope {
        &self.envelope
    }
}

impl IntoResponse for JsonReply {
    fn into_response(self) -> Response {
        (self.status, Json(self.envelope)).into_response()
    }
}

/// `303 See Other` redirect that flashes the envelope
#[derive(Debug, Clone, PartialEq)]
pub struct RedirectReply {
    target: RedirectTarget,
    envelope: ResponseEnvelope,
}

impl RedirectReply {
    /// Redirect to the envelope's route, or back when it has none
    #[must_use]
    pub fn new(envelope: ResponseEnvelope) -> Self {
        let target = match envelope.route.as_deref() {
            Some(route) if !route.is_empty() => RedirectTarget::Route(route.to_string()),
            _ => RedirectTarget::Back,
        };
        Self { target, envelope }
    }

    /// Redirect destination
    #[must_use]
    pub fn target(&self) -> &RedirectTarget {
        &self.target
    }

    /// Envelope that will be flashed
    #[must_use]
    pub fn envelope(&self) -> &ResponseEnvelope {
        &self.envelope
    }
}

impl IntoResponse for RedirectReply {
    fn into_response(self) -> Response {
        let location = match &self.target {
            RedirectTarget::Route(route) => HeaderValue::try_from(route.as_str()).unwrap_or_else(|_| {
                warn!(route = %route, "Redirect route is not a valid header value");
                HeaderValue::from_static(FALLBACK_LOCATION)
            }),
            RedirectTarget::Back => HeaderValue::from_static(FALLBACK_LOCATION),
        };

        let mut response = (StatusCode::SEE_OTHER, [(header::LOCATION, location)]).into_response();
        let extensions = response.extensions_mut();
        extensions.insert(FlashEnvelope(self.envelope));
        extensions.insert(self.target);
        response
    }
}

/// Either rendering of an envelope
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// JSON body
    Json(JsonReply),
    /// Redirect with flash state
    Redirect(RedirectReply),
}

impl Reply {
    /// Whether this renders as a redirect
    #[must_use]
    pub fn is_redirect(&self) -> bool {
        matches!(self, Self::Redirect(_))
    }

    /// Envelope carried by either rendering
    #[must_use]
    pub fn envelope(&self) -> &ResponseEnvelope {
        match self {
            Self::Json(reply) => reply.envelope(),
            Self::Redirect(reply) => reply.envelope(),
        }
    }
}

impl IntoResponse for Reply {
    fn into_response(self) -> Response {
        match self {
            Self::Json(reply) => reply.into_response(),
            Self::Redirect(reply) => reply.into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use serde_json::{json, Value};

    fn envelope(status: Option<u16>, route: Option<&str>) -> ResponseEnvelope {
        ResponseEnvelope {
            messages: vec!["ok".into()],
            status_code: status,
            route: route.map(String::from),
            ..ResponseEnvelope::default()
        }
    }

    #[test]
    fn test_json_status_mapping() {
        assert_eq!(JsonReply::new(envelope(None, None)).status(), StatusCode::OK);
        assert_eq!(JsonReply::new(envelope(Some(201), None)).status(), StatusCode::CREATED);
        assert_eq!(
            JsonReply::new(envelope(Some(42), None)).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_json_reply_body() {
        let response = JsonReply::new(envelope(Some(403), None)).into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value, json!({"message": ["ok"], "statusCode": 403}));
    }

    #[test]
    fn test_redirect_to_route_carries_flash() {
        let response = RedirectReply::new(envelope(Some(200), Some("/posts"))).into_response();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/posts");
        let flashed = response.extensions().get::<FlashEnvelope>().unwrap();
        assert_eq!(flashed.0.messages, vec!["ok"]);
        assert_eq!(
            response.extensions().get::<RedirectTarget>(),
            Some(&RedirectTarget::Route("/posts".into()))
        );
    }

    #[test]
    fn test_redirect_back_without_route() {
        let reply = RedirectReply::new(envelope(None, Some("")));
        assert_eq!(reply.target(), &RedirectTarget::Back);

        let response = reply.into_response();
        assert_eq!(response.headers()[header::LOCATION], FALLBACK_LOCATION);
    }

    #[test]
    fn test_invalid_route_falls_back() {
        let response = RedirectReply::new(envelope(None, Some("/bad\nroute"))).into_response();
        assert_eq!(response.headers()[header::LOCATION], FALLBACK_LOCATION);
    }
}
