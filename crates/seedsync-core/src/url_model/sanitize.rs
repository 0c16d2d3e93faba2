//! Reject listing hrefs that would escape the local mirror directory.

use super::percent_decode;

/// True if `href` (as listed, possibly with a trailing `/`) names a plain child entry:
/// not absolute, no scheme, query or fragment, and no `.`/`..` segment once decoded.
pub fn is_safe_entry_name(href: &str) -> bool {
    let trimmed = href.trim_end_matches('/');
    if trimmed.is_empty() || href.starts_with('/') {
        return false;
    }
    if href.contains("://") || href.contains('?') || href.contains('#') {
        return false;
    }
    let decoded = percent_decode(trimmed);
    if decoded.contains('\0') || decoded.starts_with('/') {
        return false;
    }
    decoded
        .split('/')
        .all(|seg| !seg.is_empty() && seg != "." && seg != "..")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_names() {
        assert!(is_safe_entry_name("movie.mkv"));
        assert!(is_safe_entry_name("Some%20Dir/"));
        assert!(is_safe_entry_name("..hidden"));
    }

    #[test]
    fn escapes_and_links() {
        assert!(!is_safe_entry_name("../"));
        assert!(!is_safe_entry_name("%2E%2E/"));
        assert!(!is_safe_entry_name("/etc/passwd"));
        assert!(!is_safe_entry_name("https://evil/x"));
        assert!(!is_safe_entry_name("?C=N;O=D"));
        assert!(!is_safe_entry_name("a%2F..%2Fb"));
        assert!(!is_safe_entry_name(""));
    }
}
