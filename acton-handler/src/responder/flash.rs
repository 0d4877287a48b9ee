//! Flash-scoped envelopes for the post-redirect-get pattern
//!
//! A [`RedirectReply`](super::RedirectReply) puts its envelope in the response
//! extensions. [`persist_flash`] moves it into the session and resolves "back"
//! redirects against the `Referer` header; [`FlashedReply`] reads it on the
//! next request and removes it.
//!
//! # Example
//!
//! ```rust,ignore
//! use acton_handler::responder::{persist_flash, FlashedReply, ResponseBuilder};
//! use axum::{middleware, routing::{get, post}, Router};
//! use tower_sessions::{MemoryStore, SessionManagerLayer};
//!
//! async fn create() -> impl IntoResponse {
//!     ResponseBuilder::new().success("Post created", None, None).route("/posts").go()
//! }
//!
//! async fn list(flash: FlashedReply) -> impl IntoResponse {
//!     // render flash.envelope() above the listing
//! }
//!
//! let app = Router::new()
//!     .route("/posts", get(list).post(create))
//!     .layer(middleware::from_fn(persist_flash))
//!     .layer(SessionManagerLayer::new(MemoryStore::default()));
//! ```

use axum::{
    extract::{FromRequestParts, Request},
    http::{header, request::Parts},
    middleware::Next,
    response::Response,
};
use tower_sessions::Session;
use tracing::warn;

use super::envelope::ResponseEnvelope;
use super::reply::{FlashEnvelope, RedirectTarget};
use crate::error::Error;

/// Session key holding the flashed envelope
pub const FLASH_SESSION_KEY: &str = "reply";

/// Middleware persisting flashed envelopes into the session
///
/// Must run inside a `SessionManagerLayer`. Without a session the envelope is
/// dropped with a warning and the redirect itself is unaffected.
pub async fn persist_flash(request: Request, next: Next) -> Response {
    let session = request.extensions().get::<Session>().cloned();
    let referer = request.headers().get(header::REFERER).cloned();

    let mut response = next.run(request).await;

    if response.extensions().get::<RedirectTarget>() == Some(&RedirectTarget::Back) {
        if let Some(referer) = referer {
            response.headers_mut().insert(header::LOCATION, referer);
        }
    }

    if let Some(FlashEnvelope(envelope)) = response.extensions_mut().remove::<FlashEnvelope>() {
        match session {
            Some(session) => {
                if let Err(e) = session.insert(FLASH_SESSION_KEY, &envelope).await {
                    warn!(error = %e, "Failed to flash reply into session");
                }
            }
            None => warn!("Session not found in request extensions; flashed reply dropped"),
        }
    }

    response
}

/// Envelope flashed by the previous request, consumed on extraction
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlashedReply(Option<ResponseEnvelope>);

impl FlashedReply {
    /// The flashed envelope, if any
    #[must_use]
    pub fn envelope(&self) -> Option<&ResponseEnvelope> {
        self.0.as_ref()
    }

    /// Take the flashed envelope
    #[must_use]
    pub fn into_envelope(self) -> Option<ResponseEnvelope> {
        self.0
    }

    /// Whether nothing was flashed
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_none()
    }
}

impl<S> FromRequestParts<S> for FlashedReply
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let session = parts.extensions.get::<Session>().cloned().ok_or_else(|| {
            Error::Session("Session not found in request extensions for flashed reply".to_string())
        })?;

        let envelope = session
            .remove::<ResponseEnvelope>(FLASH_SESSION_KEY)
            .await
            .map_err(|e| Error::Session(format!("Failed to read flashed reply: {e}")))?;

        Ok(Self(envelope))
    }
}
