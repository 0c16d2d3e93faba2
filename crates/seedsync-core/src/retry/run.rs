//! Retry loop: run an attempt until success or the policy says stop.

use super::classify;
use super::error::TransferError;
use super::policy::{RetryDecision, RetryPolicy};

/// Last error of a retry loop that gave up, with the number of attempts made.
#[derive(Debug)]
pub struct RetryExhausted {
    pub attempts: u32,
    pub error: TransferError,
}

/// Runs `f` (given the 1-based attempt number) until it succeeds or the retry
/// policy says to stop. On retryable failure, sleeps for the backoff duration
/// then tries again.
pub fn run_with_retry<T, F>(policy: &RetryPolicy, mut f: F) -> Result<T, RetryExhausted>
where
    F: FnMut(u32) -> Result<T, TransferError>,
{
    let mut attempt = 1u32;
    loop {
        match f(attempt) {
            Ok(v) => return Ok(v),
            Err(e) => {
                let kind = classify::classify(&e);
                match policy.decide(attempt, kind) {
                    RetryDecision::NoRetry => {
                        return Err(RetryExhausted {
                            attempts: attempt,
                            error: e,
                        })
                    }
                    RetryDecision::RetryAfter(d) => {
                        tracing::warn!(attempt, error = %e, "transfer attempt failed, retrying");
                        if !d.is_zero() {
                            std::thread::sleep(d);
                        }
                        attempt += 1;
                    }
                }
            }
        }
    }
}
