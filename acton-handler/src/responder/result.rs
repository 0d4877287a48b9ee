//! Mapping executor results onto responses

use axum::response::{IntoResponse, Response};

use super::builder::ResponseBuilder;
use super::envelope::IntoMessages;
use super::reply::Reply;

/// Per-call options for [`ResponseBuilder::from_result`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultMapping {
    /// Messages for a successful result; `None` uses the default
    pub success_message: Option<Vec<String>>,
    /// Messages for a failed result; `None` uses the default
    pub failed_message: Option<Vec<String>>,
    /// Redirect target after success
    pub success_route: Option<String>,
    /// Redirect target after failure
    pub failed_route: Option<String>,
    /// Render immediately instead of returning the builder
    pub auto_render: bool,
}

impl ResultMapping {
    /// Mapping with every option at its default
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages for a successful result
    #[must_use]
    pub fn success_message(mut self, message: impl IntoMessages) -> Self {
        self.success_message = Some(message.into_messages());
        self
    }

    /// Messages for a failed result
    #[must_use]
    pub fn failed_message(mut self, message: impl IntoMessages) -> Self {
        self.failed_message = Some(message.into_messages());
        self
    }

    /// Redirect here after success
    #[must_use]
    pub fn success_route(mut self, route: impl Into<String>) -> Self {
        self.success_route = Some(route.into());
        self
    }

    /// Redirect here after failure
    #[must_use]
    pub fn failed_route(mut self, route: impl Into<String>) -> Self {
        self.failed_route = Some(route.into());
        self
    }

    /// Render immediately
    #[must_use]
    pub fn auto_render(mut self, enabled: bool) -> Self {
        self.auto_render = enabled;
        self
    }
}

/// Outcome of [`ResponseBuilder::from_result`]
#[derive(Debug, Clone, PartialEq)]
pub enum Dispatch {
    /// Builder returned for further chaining
    Pending(ResponseBuilder),
    /// Already rendered
    Rendered(Reply),
}

impl Dispatch {
    /// The builder, unless the result was rendered
    #[must_use]
    pub fn into_builder(self) -> Option<ResponseBuilder> {
        match self {
            Self::Pending(builder) => Some(builder),
            Self::Rendered(_) => None,
        }
    }

    /// Render now if not already rendered
    #[must_use]
    pub fn render(self) -> Reply {
        match self {
            Self::Pending(builder) => builder.render(),
            Self::Rendered(reply) => reply,
        }
    }
}

impl IntoResponse for Dispatch {
    fn into_response(self) -> Response {
        self.render().into_response()
    }
}
