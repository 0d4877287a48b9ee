//! Transactional action executor
//!
//! Runs a unit of work under one success/failure contract. In guarded mode
//! (the default) every fault, including a panic, is rolled back, handed to the
//! optional `on_error` callback, recorded to the [`FaultSink`] and converted
//! into a failed [`ActionResult`]. Callers never branch on whether a
//! transaction was used.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use acton_handler::config::ExecutorConfig;
//! use acton_handler::executor::{ActionExecutor, NoTransaction, TracingFaultSink};
//!
//! let executor = ActionExecutor::new(
//!     ExecutorConfig::default(),
//!     Arc::new(NoTransaction),
//!     Arc::new(TracingFaultSink),
//! );
//!
//! let ok = executor.action(|| Ok(42)).success_status(201).run().unwrap();
//! assert!(ok.is_success());
//! assert_eq!(ok.status_code(), Some(201));
//!
//! let failed = executor
//!     .action(|| -> anyhow::Result<i32> { anyhow::bail!("boom") })
//!     .run()
//!     .unwrap();
//! assert!(!failed.is_success());
//! assert_eq!(failed.status_code(), Some(500));
//! ```

mod error;
mod result;
mod sink;
mod transaction;

use std::any::Any;
use std::fmt;
use std::marker::PhantomData;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use anyhow::anyhow;
use tracing::{trace, warn};

use crate::config::ExecutorConfig;

pub use error::ExecutionError;
pub use result::{ActionResult, DEFAULT_FAILURE_STATUS, DEFAULT_SUCCESS_STATUS};
pub use sink::{FaultSink, TracingFaultSink};
pub use transaction::{NoTransaction, TransactionError, TransactionScope};

/// Lifecycle of one action, reported in trace logs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionState {
    /// Built but not started
    Pending,
    /// Work is executing
    Running,
    /// Work returned and any transaction committed
    Committed,
    /// Work faulted and was recovered
    RolledBack,
    /// Work faulted with guarding disabled; the fault propagates
    UnguardedFault,
}

impl fmt::Display for ActionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Running => write!(f, "running"),
            Self::Committed => write!(f, "committed"),
            Self::RolledBack => write!(f, "rolled_back"),
            Self::UnguardedFault => write!(f, "unguarded_fault"),
        }
    }
}

/// Runs actions with injected configuration, transactions and fault sink
#[derive(Clone)]
pub struct ActionExecutor {
    config: ExecutorConfig,
    transactions: Arc<dyn TransactionScope>,
    sink: Arc<dyn FaultSink>,
}

impl fmt::Debug for ActionExecutor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionExecutor")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl ActionExecutor {
    /// Create an executor
    pub fn new(
        config: ExecutorConfig,
        transactions: Arc<dyn TransactionScope>,
        sink: Arc<dyn FaultSink>,
    ) -> Self {
        Self {
            config,
            transactions,
            sink,
        }
    }

    /// Executor without transactions that logs faults through `tracing`
    #[must_use]
    pub fn untransacted(config: ExecutorConfig) -> Self {
        Self::new(config, Arc::new(NoTransaction), Arc::new(TracingFaultSink))
    }

    /// Configuration in effect
    #[must_use]
    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    /// Start building an action around `work`
    pub fn action<T, F>(&self, work: F) -> Action<'_, T, F>
    where
        F: FnOnce() -> anyhow::Result<T>,
    {
        Action {
            executor: self,
            work,
            on_error: None,
            use_transaction: true,
            guarded: true,
            success_status: None,
            _payload: PhantomData,
        }
    }

    /// Run `work` with every option at its default
    ///
    /// # Errors
    ///
    /// See [`Action::run`].
    pub fn run<T, F>(&self, work: F) -> Result<ActionResult<T>, ExecutionError>
    where
        F: FnOnce() -> anyhow::Result<T>,
    {
        self.action(work).run()
    }
}

type ErrorCallback<'a> = Box<dyn FnOnce(&anyhow::Error) -> anyhow::Result<()> + 'a>;

/// One pending invocation of the executor
#[must_use = "actions do nothing until `run` is called"]
pub struct Action<'a, T, F> {
    executor: &'a ActionExecutor,
    work: F,
    on_error: Option<ErrorCallback<'a>>,
    use_transaction: bool,
    guarded: bool,
    success_status: Option<u16>,
    _payload: PhantomData<fn() -> T>,
}

impl<'a, T, F> Action<'a, T, F>
where
    F: FnOnce() -> anyhow::Result<T>,
{
    /// Callback invoked with the fault before it is recorded
    ///
    /// A failing callback is not recovered; see [`ExecutionError::ErrorCallback`].
    pub fn on_error<C>(mut self, callback: C) -> Self
    where
        C: FnOnce(&anyhow::Error) -> anyhow::Result<()> + 'a,
    {
        self.on_error = Some(Box::new(callback));
        self
    }

    /// Skip begin/commit/rollback
    pub fn without_transaction(self) -> Self {
        self.with_transaction(false)
    }

    /// Choose whether the work runs inside a transaction (default `true`)
    pub fn with_transaction(mut self, enabled: bool) -> Self {
        self.use_transaction = enabled;
        self
    }

    /// Let faults propagate instead of recovering them
    pub fn unguarded(self) -> Self {
        self.guarded(false)
    }

    /// Choose guarded execution (default `true`); the global switch can still force it off
    pub fn guarded(mut self, enabled: bool) -> Self {
        self.guarded = enabled;
        self
    }

    /// Status attached to a successful guarded result
    pub fn success_status(mut self, status: u16) -> Self {
        self.success_status = Some(status);
        self
    }

    /// Execute the action
    ///
    /// # Errors
    ///
    /// - [`ExecutionError::Unguarded`] when unguarded work fails
    /// - [`ExecutionError::ErrorCallback`] when the `on_error` callback fails
    /// - [`ExecutionError::Transaction`] when begin or rollback fails
    ///
    /// Any other fault yields `Ok` with a failed [`ActionResult`].
    pub fn run(self) -> Result<ActionResult<T>, ExecutionError> {
        let config = &self.executor.config;
        let guarded = self.guarded && config.guard_enabled;
        trace!(state = %ActionState::Pending, guarded, transaction = self.use_transaction, "Action");

        if !guarded {
            trace!(state = %ActionState::Running, "Action");
            return match (self.work)() {
                Ok(payload) => {
                    trace!(state = %ActionState::Committed, "Action");
                    Ok(ActionResult::unguarded(payload))
                }
                Err(fault) => {
                    trace!(state = %ActionState::UnguardedFault, "Action");
                    Err(ExecutionError::Unguarded(fault))
                }
            };
        }

        let transactions = self.executor.transactions.as_ref();
        if self.use_transaction {
            transactions.begin()?;
        }

        trace!(state = %ActionState::Running, "Action");
        let fault = match run_caught(self.work) {
            Ok(payload) => {
                let committed = if self.use_transaction {
                    transactions.commit()
                } else {
                    Ok(())
                };
                match committed {
                    Ok(()) => {
                        trace!(state = %ActionState::Committed, "Action");
                        let status = self.success_status.unwrap_or(config.success_status);
                        return Ok(ActionResult::succeeded(payload, status));
                    }
                    Err(e) => {
                        // Some backends leave the transaction open after a failed commit
                        if let Err(rollback) = transactions.rollback() {
                            warn!(error = %rollback, "Rollback after failed commit did not succeed");
                        }
                        anyhow::Error::new(e)
                    }
                }
            }
            Err(fault) => {
                if self.use_transaction {
                    transactions.rollback()?;
                }
                fault
            }
        };

        trace!(state = %ActionState::RolledBack, "Action");
        if let Some(callback) = self.on_error {
            callback(&fault).map_err(ExecutionError::ErrorCallback)?;
        }
        self.executor.sink.record(&fault);

        Ok(ActionResult::failed(config.failure_status))
    }
}

/// Run `work`, turning a panic into a fault
fn run_caught<T, F>(work: F) -> anyhow::Result<T>
where
    F: FnOnce() -> anyhow::Result<T>,
{
    panic::catch_unwind(AssertUnwindSafe(work)).unwrap_or_else(|payload| Err(panic_fault(payload)))
}

fn panic_fault(payload: Box<dyn Any + Send>) -> anyhow::Error {
    let message = payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "non-string panic payload".to_string());
    anyhow!("action panicked: {message}")
}
