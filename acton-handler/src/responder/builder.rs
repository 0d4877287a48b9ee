//! Fluent response builder

use serde::Serialize;
use serde_json::Value;
use tracing::warn;

use super::envelope::{IntoMessages, ResponseEnvelope, ResponseKind};
use super::reply::{JsonReply, RedirectReply, Reply};
use super::result::{Dispatch, ResultMapping};
use crate::executor::{ActionResult, DEFAULT_FAILURE_STATUS, DEFAULT_SUCCESS_STATUS};

/// Status used by [`ResponseBuilder::failed`] when none is given
pub const DEFAULT_FAILED_STATUS: u16 = 403;

/// Message used for successful results without a caller-supplied one
pub const DEFAULT_SUCCESS_MESSAGE: &str = "successfully done";

/// Message used for failed results without a caller-supplied one
pub const DEFAULT_FAILED_MESSAGE: &str = "something went wrong";

/// Request-scoped accumulator of response fields
///
/// Setters consume and return the builder. `message` and `error` append;
/// every other setter replaces.
///
/// ```rust
/// use acton_handler::responder::{ResponseBuilder, ResponseKind};
/// use serde_json::json;
///
/// let reply = ResponseBuilder::new()
///     .title("Posts")
///     .message("created")
///     .message(None::<&str>)
///     .success(["and published"], Some(json!({"id": 7})), Some(201))
///     .reply();
///
/// assert_eq!(reply.status().as_u16(), 201);
/// assert_eq!(reply.envelope().messages, vec!["created", "and published"]);
/// assert_eq!(reply.envelope().kind, Some(ResponseKind::Success));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
#[must_use]
pub struct ResponseBuilder {
    envelope: ResponseEnvelope,
}

impl ResponseBuilder {
    /// Empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the title
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.envelope.title = Some(title.into());
        self
    }

    /// Remove the title so it is omitted from the envelope
    pub fn clear_title(mut self) -> Self {
        self.envelope.title = None;
        self
    }

    /// Append messages
    pub fn message(mut self, message: impl IntoMessages) -> Self {
        self.envelope.messages.extend(message.into_messages());
        self
    }

    /// Append errors
    pub fn error(mut self, error: impl IntoMessages) -> Self {
        self.envelope.errors.extend(error.into_messages());
        self
    }

    /// Set the outcome tag
    pub fn kind(mut self, kind: ResponseKind) -> Self {
        self.envelope.kind = Some(kind);
        self
    }

    /// Set the status code
    pub fn status_code(mut self, status: u16) -> Self {
        self.envelope.status_code = Some(status);
        self
    }

    /// Set the payload; `null` clears it
    pub fn data(mut self, data: impl Into<Value>) -> Self {
        self.envelope.data = match data.into() {
            Value::Null => None,
            value => Some(value),
        };
        self
    }

    /// Set the redirect route
    pub fn route(mut self, route: impl Into<String>) -> Self {
        self.envelope.route = Some(route.into());
        self
    }

    /// Drop the redirect route so [`render`](Self::render) produces JSON
    pub fn clear_route(mut self) -> Self {
        self.envelope.route = None;
        self
    }

    /// Mark as successful with `data` and `status` (default 200), appending `message`
    pub fn success(self, message: impl IntoMessages, data: Option<Value>, status: Option<u16>) -> Self {
        self.outcome(ResponseKind::Success, message, data, status.unwrap_or(DEFAULT_SUCCESS_STATUS))
    }

    /// Mark as failed with `data` and `status` (default 403), appending `message`
    pub fn failed(self, message: impl IntoMessages, data: Option<Value>, status: Option<u16>) -> Self {
        self.outcome(ResponseKind::Failed, message, data, status.unwrap_or(DEFAULT_FAILED_STATUS))
    }

    fn outcome(
        self,
        kind: ResponseKind,
        message: impl IntoMessages,
        data: Option<Value>,
        status: u16,
    ) -> Self {
        self.kind(kind)
            .status_code(status)
            .data(data.unwrap_or(Value::Null))
            .message(message)
    }

    /// Populate the builder from an executor result
    ///
    /// Success applies [`success`](Self::success) with the mapping's success
    /// message (default "successfully done"), the payload and the result's
    /// status (default 200), then routes to `success_route`. Failure does the
    /// same through [`failed`](Self::failed) with "something went wrong" and a
    /// default status of 500.
    #[allow(clippy::wrong_self_convention)]
    pub fn from_result<T: Serialize>(self, result: ActionResult<T>, mapping: ResultMapping) -> Dispatch {
        let success = result.is_success();
        let status = result.status_code();
        let data = result.into_payload().and_then(|payload| {
            serde_json::to_value(payload)
                .map_err(|e| warn!(error = %e, "Result payload could not be serialized"))
                .ok()
        });

        let mut builder = if success {
            self.success(
                mapping.success_message.unwrap_or_else(|| vec![DEFAULT_SUCCESS_MESSAGE.to_string()]),
                data,
                Some(status.unwrap_or(DEFAULT_SUCCESS_STATUS)),
            )
        } else {
            self.failed(
                mapping.failed_message.unwrap_or_else(|| vec![DEFAULT_FAILED_MESSAGE.to_string()]),
                data,
                Some(status.unwrap_or(DEFAULT_FAILURE_STATUS)),
            )
        };

        builder.envelope.route = if success {
            mapping.success_route
        } else {
            mapping.failed_route
        };

        if mapping.auto_render {
            Dispatch::Rendered(builder.render())
        } else {
            Dispatch::Pending(builder)
        }
    }

    /// Accumulated fields
    #[must_use]
    pub fn envelope(&self) -> &ResponseEnvelope {
        &self.envelope
    }

    /// Take the accumulated fields
    #[must_use]
    pub fn into_envelope(self) -> ResponseEnvelope {
        self.envelope
    }

    /// Redirect when a route is set, JSON otherwise
    #[must_use]
    pub fn render(self) -> Reply {
        if self.envelope.route.is_some() {
            Reply::Redirect(self.go())
        } else {
            Reply::Json(self.reply())
        }
    }

    /// Render as JSON
    #[must_use]
    pub fn reply(self) -> JsonReply {
        JsonReply::new(self.envelope)
    }

    /// Render as a redirect to the route, or back
    #[must_use]
    pub fn go(self) -> RedirectReply {
        RedirectReply::new(self.envelope)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::responder::reply::RedirectTarget;
    use serde_json::json;

    #[test]
    fn test_messages_and_errors_accumulate_independently() {
        let builder = ResponseBuilder::new()
            .message("one")
            .error(None::<String>)
            .message(None::<&str>)
            .error("bad")
            .message(vec!["two", "three"])
            .error(["worse"]);

        assert_eq!(builder.envelope().messages, vec!["one", "two", "three"]);
        assert_eq!(builder.envelope().errors, vec!["bad", "worse"]);
    }

    #[test]
    fn test_scalar_setters_replace() {
        let builder = ResponseBuilder::new()
            .title("a")
            .title("b")
            .status_code(201)
            .status_code(202)
            .data(json!(1))
            .data(json!({"x": 2}))
            .kind(ResponseKind::Info)
            .kind(ResponseKind::Warning)
            .route("/a")
            .route("/b");

        let envelope = builder.envelope();
        assert_eq!(envelope.title.as_deref(), Some("b"));
        assert_eq!(envelope.status_code, Some(202));
        assert_eq!(envelope.data, Some(json!({"x": 2})));
        assert_eq!(envelope.kind, Some(ResponseKind::Warning));
        assert_eq!(envelope.route.as_deref(), Some("/b"));
    }

    #[test]
    fn test_clearing_title_and_route() {
        let builder = ResponseBuilder::new()
            .title("Saved")
            .route("/posts")
            .clear_title()
            .clear_route();

        let envelope = builder.envelope();
        assert!(envelope.title.is_none());
        assert!(envelope.route.is_none());
        assert!(serde_json::to_value(envelope).unwrap().get("title").is_none());
        assert!(!builder.render().is_redirect());
    }

    #[test]
    fn test_null_data_is_omitted() {
        let builder = ResponseBuilder::new().data(json!(1)).data(Value::Null);
        assert_eq!(builder.envelope().data, None);
    }

    #[test]
    fn test_success_and_failed_defaults() {
        let ok = ResponseBuilder::new().success("yay", None, None);
        assert_eq!(ok.envelope().status_code, Some(200));
        assert_eq!(ok.envelope().kind, Some(ResponseKind::Success));

        let failed = ResponseBuilder::new().failed("nope", None, None);
        assert_eq!(failed.envelope().status_code, Some(403));
        assert_eq!(failed.envelope().kind, Some(ResponseKind::Failed));
        assert_eq!(failed.envelope().messages, vec!["nope"]);
    }

    #[test]
    fn test_from_successful_result_defaults() {
        let dispatch = ResponseBuilder::new()
            .from_result(ActionResult::unguarded(json!({"id": 1})), ResultMapping::new());
        let builder = dispatch.into_builder().unwrap();
        let envelope = builder.envelope();

        assert_eq!(envelope.messages, vec![DEFAULT_SUCCESS_MESSAGE]);
        assert_eq!(envelope.status_code, Some(200));
        assert_eq!(envelope.kind, Some(ResponseKind::Success));
        assert_eq!(envelope.data, Some(json!({"id": 1})));
        assert_eq!(envelope.route, None);
    }

    #[test]
    fn test_from_successful_result_keeps_status() {
        let dispatch = ResponseBuilder::new().from_result(
            ActionResult::succeeded("made", 201),
            ResultMapping::new().success_message("Post created"),
        );
        let envelope = dispatch.into_builder().unwrap().into_envelope();
        assert_eq!(envelope.status_code, Some(201));
        assert_eq!(envelope.messages, vec!["Post created"]);
        assert_eq!(envelope.data, Some(json!("made")));
    }

    #[test]
    fn test_from_failed_result_defaults() {
        let dispatch = ResponseBuilder::new()
            .from_result(ActionResult::<()>::new(false, None, None), ResultMapping::new());
        let envelope = dispatch.into_builder().unwrap().into_envelope();

        assert_eq!(envelope.messages, vec![DEFAULT_FAILED_MESSAGE]);
        assert_eq!(envelope.status_code, Some(500));
        assert_eq!(envelope.kind, Some(ResponseKind::Failed));
        assert_eq!(envelope.data, None);
    }

    #[test]
    fn test_from_result_picks_route_by_outcome() {
        let mapping = || {
            ResultMapping::new()
                .success_route("/posts")
                .failed_route("/posts/new")
        };

        let ok = ResponseBuilder::new().from_result(ActionResult::succeeded(1, 200), mapping());
        assert_eq!(ok.into_builder().unwrap().envelope().route.as_deref(), Some("/posts"));

        let failed = ResponseBuilder::new().from_result(ActionResult::<i32>::failed(500), mapping());
        assert_eq!(failed.into_builder().unwrap().envelope().route.as_deref(), Some("/posts/new"));
    }

    #[test]
    fn test_auto_render_selects_redirect_or_json() {
        let redirect = ResponseBuilder::new().from_result(
            ActionResult::succeeded(1, 200),
            ResultMapping::new().success_route("/done").auto_render(true),
        );
        match redirect {
            Dispatch::Rendered(Reply::Redirect(reply)) => {
                assert_eq!(reply.target(), &RedirectTarget::Route("/done".into()));
            }
            other => panic!("expected redirect, got {other:?}"),
        }

        let json = ResponseBuilder::new().from_result(
            ActionResult::<i32>::failed(500),
            ResultMapping::new().success_route("/done").auto_render(true),
        );
        match json {
            Dispatch::Rendered(Reply::Json(reply)) => assert_eq!(reply.status().as_u16(), 500),
            other => panic!("expected json, got {other:?}"),
        }
    }

    #[test]
    fn test_from_result_appends_to_existing_messages() {
        let dispatch = ResponseBuilder::new()
            .title("Import")
            .message("step one")
            .from_result(ActionResult::succeeded((), 200), ResultMapping::new());
        let envelope = dispatch.into_builder().unwrap().into_envelope();
        assert_eq!(envelope.title.as_deref(), Some("Import"));
        assert_eq!(envelope.messages, vec!["step one", DEFAULT_SUCCESS_MESSAGE]);
    }
}
