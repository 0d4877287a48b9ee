//! Outcome of one executor invocation

use serde::Serialize;

/// Status assumed for a successful result without its own status
pub const DEFAULT_SUCCESS_STATUS: u16 = 200;

/// Status assumed for a failed result without its own status
pub const DEFAULT_FAILURE_STATUS: u16 = 500;

/// Immutable success/payload/status envelope
///
/// ```rust
/// use acton_handler::executor::ActionResult;
///
/// let ok = ActionResult::succeeded("saved", 201);
/// assert!(ok.is_success());
/// assert_eq!(ok.effective_status(), 201);
///
/// let failed: ActionResult<()> = ActionResult::failed(500);
/// assert!(failed.payload().is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionResult<T> {
    success: bool,
    payload: Option<T>,
    status_code: Option<u16>,
}

impl<T> ActionResult<T> {
    /// Build a result from its parts
    pub fn new(success: bool, payload: Option<T>, status_code: Option<u16>) -> Self {
        Self {
            success,
            payload,
            status_code,
        }
    }

    /// Successful guarded outcome
    pub fn succeeded(payload: T, status_code: u16) -> Self {
        Self::new(true, Some(payload), Some(status_code))
    }

    /// Recovered fault; failures never carry a payload
    pub fn failed(status_code: u16) -> Self {
        Self::new(false, None, Some(status_code))
    }

    /// Successful outcome of an unguarded run, which sets no status
    pub fn unguarded(payload: T) -> Self {
        Self::new(true, Some(payload), None)
    }

    /// Whether the work succeeded
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.success
    }

    /// Payload, present only on success
    #[must_use]
    pub fn payload(&self) -> Option<&T> {
        self.payload.as_ref()
    }

    /// Status suggested by the executor, if any
    #[must_use]
    pub fn status_code(&self) -> Option<u16> {
        self.status_code
    }

    /// Suggested status, defaulting to 200 on success and 500 on failure
    #[must_use]
    pub fn effective_status(&self) -> u16 {
        self.status_code.unwrap_or(if self.success {
            DEFAULT_SUCCESS_STATUS
        } else {
            DEFAULT_FAILURE_STATUS
        })
    }

    /// Take the payload
    pub fn into_payload(self) -> Option<T> {
        self.payload
    }

    /// Map the payload, keeping outcome and status
    pub fn map<U, F>(self, f: F) -> ActionResult<U>
    where
        F: FnOnce(T) -> U,
    {
        ActionResult {
            success: self.success,
            payload: self.payload.map(f),
            status_code: self.status_code,
        }
    }
}
