//! Remote path identity and URL handling.
//!
//! A [`RemotePath`] is the full URL of one remote file or directory. Equality
//! and hashing use the percent-decoded form so `a%20b.mkv` and `a b.mkv` are
//! the same entry.

mod path;
mod sanitize;

pub use path::{local_destination, relative_dir};
pub use sanitize::is_safe_entry_name;

use percent_encoding::percent_decode_str;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Percent-decode a URL or URL fragment. Invalid UTF-8 is replaced, never rejected.
pub fn percent_decode(s: &str) -> String {
    percent_decode_str(s).decode_utf8_lossy().into_owned()
}

/// A fully qualified remote URL, kept in its raw (as listed) form for requests.
#[derive(Debug, Clone)]
pub struct RemotePath {
    raw: String,
    decoded: String,
}

impl RemotePath {
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let decoded = percent_decode(&raw);
        Self { raw, decoded }
    }

    /// Parse and normalize the traversal root: must be an absolute http(s) URL;
    /// a trailing `/` is appended when missing.
    pub fn parse_root(url: &str) -> Result<Self, url::ParseError> {
        let parsed = url::Url::parse(url)?;
        if parsed.cannot_be_a_base() {
            return Err(url::ParseError::RelativeUrlWithCannotBeABaseBase);
        }
        let mut raw = url.to_string();
        if !raw.ends_with('/') {
            raw.push('/');
        }
        Ok(Self::new(raw))
    }

    /// URL as listed, used for HTTP requests.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Percent-decoded form; the identity used by the ledger.
    pub fn decoded(&self) -> &str {
        &self.decoded
    }

    /// Append a listing href to this directory URL.
    pub fn join(&self, href: &str) -> RemotePath {
        if self.raw.ends_with('/') {
            RemotePath::new(format!("{}{}", self.raw, href))
        } else {
            RemotePath::new(format!("{}/{}", self.raw, href))
        }
    }
}

impl PartialEq for RemotePath {
    fn eq(&self, other: &Self) -> bool {
        self.decoded == other.decoded
    }
}

impl Eq for RemotePath {}

impl Hash for RemotePath {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.decoded.hash(state);
    }
}

impl fmt::Display for RemotePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
