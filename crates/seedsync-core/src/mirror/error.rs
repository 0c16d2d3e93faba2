use thiserror::Error;

use crate::ledger::LedgerError;

/// Run-scoped failures. Anything file-scoped is absorbed into the run summary.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("configuration error: {reason}")]
    Configuration { reason: String },
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

impl SyncError {
    pub fn configuration(reason: impl Into<String>) -> Self {
        SyncError::Configuration {
            reason: reason.into(),
        }
    }

    /// Process exit status for this failure.
    pub fn exit_code(&self) -> i32 {
        match self {
            SyncError::Configuration { .. } => 2,
            SyncError::Ledger(_) => 1,
        }
    }
}
