use std::time::Duration;

/// High-level classification of a failed transfer attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Operation timed out (connect/read stall).
    Timeout,
    /// Network-level failure (connection refused/reset, DNS, etc.).
    Connection,
    /// Response status other than 200/206. Counted like a transient error.
    Http(u32),
    /// Body shorter or longer than the requested range.
    PartialTransfer,
    /// Local disk failure; retrying would not help.
    Storage,
    /// Anything else (malformed URL, curl misuse).
    Other,
}

/// Whether a failed file transfer gets another attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Give up on this file for the run.
    NoRetry,
    /// Restart the file from its first byte after sleeping this long.
    RetryAfter(Duration),
}

/// Per-file attempt budget with exponential backoff between attempts.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Whole-file attempts per run, the first one included.
    pub max_attempts: u32,
    /// Sleep before the second attempt; doubles for each later one.
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    /// Policy with the given budget and no delay between attempts.
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
        }
    }

    /// Decide what to do after `attempt` (1-based) failed with `kind`.
    pub fn decide(&self, attempt: u32, kind: ErrorKind) -> RetryDecision {
        let retryable = !matches!(kind, ErrorKind::Storage | ErrorKind::Other);
        if !retryable || attempt >= self.max_attempts {
            return RetryDecision::NoRetry;
        }
        // base * 2^(attempt-1), capped.
        let factor = 1u32 << attempt.saturating_sub(1).min(8);
        RetryDecision::RetryAfter(self.base_delay.saturating_mul(factor).min(self.max_delay))
    }
}
