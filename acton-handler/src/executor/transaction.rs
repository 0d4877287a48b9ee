//! Transaction scope injected into the executor

use thiserror::Error;

/// Transaction control failures
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransactionError {
    /// The data source refused to open a transaction
    #[error("failed to begin transaction: {0}")]
    Begin(String),

    /// Commit was rejected; the work's changes are not durable
    #[error("failed to commit transaction: {0}")]
    Commit(String),

    /// Rollback failed
    #[error("failed to roll back transaction: {0}")]
    Rollback(String),

    /// Commit or rollback without a matching begin
    #[error("no active transaction")]
    NotActive,
}

/// Begin/commit/rollback over the caller's data-source connection
///
/// One scope serves one logical call context at a time; the executor never
/// nests transactions on the same scope.
pub trait TransactionScope: Send + Sync {
    /// Open a transaction
    fn begin(&self) -> Result<(), TransactionError>;

    /// Make the open transaction durable
    fn commit(&self) -> Result<(), TransactionError>;

    /// Discard the open transaction
    fn rollback(&self) -> Result<(), TransactionError>;
}

/// Scope for data sources without transactions
#[derive(Debug, Clone, Copy, Default)]
pub struct NoTransaction;

impl TransactionScope for NoTransaction {
    fn begin(&self) -> Result<(), TransactionError> {
        Ok(())
    }

    fn commit(&self) -> Result<(), TransactionError> {
        Ok(())
    }

    fn rollback(&self) -> Result<(), TransactionError> {
        Ok(())
    }
}
