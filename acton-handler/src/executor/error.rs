//! Errors that escape the action executor

use thiserror::Error;

use super::transaction::TransactionError;

/// Faults the executor does not recover
///
/// Everything raised by guarded work is normalized into a failed
/// [`ActionResult`](super::ActionResult); only these three paths reach the caller.
#[derive(Debug, Error)]
pub enum ExecutionError {
    /// Work failed while guarded execution was disabled
    #[error("Unguarded action failed: {0:#}")]
    Unguarded(anyhow::Error),

    /// The `on_error` callback itself failed
    #[error("Error callback failed: {0:#}")]
    ErrorCallback(anyhow::Error),

    /// The transaction could not be started or rolled back
    #[error("Transaction error: {0}")]
    Transaction(#[from] TransactionError),
}

impl ExecutionError {
    /// The underlying fault, when there is one
    #[must_use]
    pub fn fault(&self) -> Option<&anyhow::Error> {
        match self {
            Self::Unguarded(e) | Self::ErrorCallback(e) => Some(e),
            Self::Transaction(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    #[test]
    fn test_display_includes_context_chain() {
        let err = ExecutionError::Unguarded(anyhow!("disk full").context("saving post"));
        assert_eq!(err.to_string(), "Unguarded action failed: saving post: disk full");
    }

    #[test]
    fn test_transaction_errors_convert() {
        let err: ExecutionError = TransactionError::NotActive.into();
        assert!(matches!(err, ExecutionError::Transaction(_)));
        assert!(err.fault().is_none());
    }
}
