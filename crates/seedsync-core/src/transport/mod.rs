//! HTTP transport abstraction.
//!
//! Every remote interaction of the mirror (index listings, ranged file GETs,
//! the panel's form endpoint, the checksum artifact) goes through
//! [`HttpTransport`]. [`CurlTransport`] is the libcurl-backed implementation;
//! tests substitute a scripted transport.

mod curl_client;
mod error;
mod headers;
#[cfg(test)]
pub(crate) mod mock;

pub use curl_client::CurlTransport;
pub use error::TransportError;

use std::fmt;
use std::io::Write;

use crate::transfer::ByteRange;

/// The single basic-auth credential pair used for every request.
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Blocking HTTP operations needed by the mirror. All requests are authenticated.
pub trait HttpTransport {
    /// GET `url` and return its `Content-Length` without downloading the body
    /// (0 when the header is absent).
    fn probe_length(&self, url: &str) -> Result<u64, TransportError>;

    /// GET `url` (optionally restricted to `range`) and stream the body into `sink`.
    /// Only 200 and 206 count as success. Returns the number of bytes written.
    fn fetch(
        &self,
        url: &str,
        range: Option<ByteRange>,
        sink: &mut dyn Write,
    ) -> Result<u64, TransportError>;

    /// GET a small text body (listing page, checksum artifact). Only 200 counts as success.
    fn get_text(&self, url: &str) -> Result<String, TransportError>;

    /// POST an `application/x-www-form-urlencoded` body and return the response text.
    fn post_form(&self, url: &str, body: &str) -> Result<String, TransportError>;
}
