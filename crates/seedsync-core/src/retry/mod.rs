//! Retry budget and error classification for whole-file transfers.
//!
//! A transfer attempt that fails with a transient error (timeout, dropped
//! connection, bad HTTP status, short body) restarts the whole file; local
//! storage failures are not retried.

mod classify;
mod error;
mod policy;
mod run;

pub use classify::{classify, classify_curl_error};
pub use error::TransferError;
pub use policy::{ErrorKind, RetryDecision, RetryPolicy};
pub use run::{run_with_retry, RetryExhausted};
