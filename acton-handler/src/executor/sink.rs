//! Destination for recovered faults

use tracing::error;

/// Write-only sink for faults the executor recovered from
pub trait FaultSink: Send + Sync {
    /// Record a fault; must not fail
    fn record(&self, fault: &anyhow::Error);
}

/// Logs recovered faults at `ERROR` level
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingFaultSink;

impl FaultSink for TracingFaultSink {
    fn record(&self, fault: &anyhow::Error) {
        error!(error = %format!("{fault:#}"), details = ?fault, "Action failed");
    }
}
