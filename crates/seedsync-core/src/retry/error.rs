//! Transfer attempt error type for retry classification.

use crate::transport::TransportError;

/// Error returned by one whole-file transfer attempt.
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    /// The request itself failed (network, timeout, HTTP status).
    #[error(transparent)]
    Transport(#[from] TransportError),
    /// Request completed but fewer or more bytes arrived than the range length
    /// (e.g. server closed early or ignored the Range header).
    #[error("partial transfer: expected {expected} bytes, got {received}")]
    PartialTransfer { expected: u64, received: u64 },
    /// Local file could not be opened or written. Not retried.
    #[error("storage: {0}")]
    Storage(#[source] std::io::Error),
}
