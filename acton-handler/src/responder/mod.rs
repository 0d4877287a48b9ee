//! Uniform response envelopes rendered as JSON or redirects
//!
//! [`ResponseBuilder`] accumulates a [`ResponseEnvelope`] and renders it either
//! as a [`JsonReply`] or as a [`RedirectReply`] that flashes the envelope for
//! the next request. [`ResponseBuilder::from_result`] maps an
//! [`ActionResult`](crate::executor::ActionResult) onto the builder.
//!
//! # Example
//!
//! ```rust
//! use acton_handler::executor::ActionResult;
//! use acton_handler::responder::{Reply, ResponseBuilder, ResultMapping};
//!
//! let result = ActionResult::succeeded(vec![1, 2, 3], 200);
//! let reply = ResponseBuilder::new()
//!     .title("Import")
//!     .from_result(result, ResultMapping::new().success_message("3 rows imported"))
//!     .render();
//!
//! let Reply::Json(json) = reply else { unreachable!() };
//! assert_eq!(json.status().as_u16(), 200);
//! assert_eq!(json.envelope().messages, vec!["3 rows imported"]);
//! ```

mod builder;
mod envelope;
#[cfg(feature = "session")]
mod flash;
mod reply;
mod result;

pub use builder::{
    ResponseBuilder, DEFAULT_FAILED_MESSAGE, DEFAULT_FAILED_STATUS, DEFAULT_SUCCESS_MESSAGE,
};
pub use envelope::{IntoMessages, ResponseEnvelope, ResponseKind};
#[cfg(feature = "session")]
pub use flash::{persist_flash, FlashedReply, FLASH_SESSION_KEY};
pub use reply::{FlashEnvelope, JsonReply, RedirectReply, RedirectTarget, Reply, FALLBACK_LOCATION};
pub use result::{Dispatch, ResultMapping};
