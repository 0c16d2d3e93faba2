//! Transport error type.

/// Failure of a single HTTP request.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Curl reported an error (timeout, connection, etc.).
    #[error("{0}")]
    Curl(#[from] curl::Error),
    /// Response status outside the accepted set.
    #[error("HTTP {0}")]
    Http(u32),
    /// Writing the response body to the local sink failed.
    #[error("sink write failed: {0}")]
    Sink(#[source] std::io::Error),
}
