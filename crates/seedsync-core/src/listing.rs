//! Directory index parsing.
//!
//! Turns an "index of" page into entries in document order. Only rows shaped
//! like `<a href="LINK">TEXT</a>  DD-Mon-YYYY HH:MM  SIZE` count; a size of
//! `-` marks a directory. Header, footer and parent-link rows don't match and
//! are ignored.

use regex::Regex;
use std::sync::OnceLock;

/// One row of a directory listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteEntry {
    /// The href as listed (percent-encoded; directories end with `/`).
    pub name: String,
    pub is_directory: bool,
}

fn row_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r#"<a href="(.+?)">(.+?)</a>\s+(\d{2}-[A-Za-z]{3}-\d{4} \d{2}:\d{2})\s+(\S+)\s*$"#,
        )
        .expect("static listing pattern")
    })
}

/// Parse a listing body. An empty result is valid (empty directory).
pub fn parse_listing(body: &str) -> Vec<RemoteEntry> {
    body.lines()
        .filter_map(|line| {
            let caps = row_pattern().captures(line.trim_end_matches('\r'))?;
            Some(RemoteEntry {
                name: caps[1].to_string(),
                is_directory: &caps[4] == "-",
            })
        })
        .collect()
}
