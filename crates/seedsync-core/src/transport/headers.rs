//! Response header parsing.

/// `Content-Length` of the final response in a header stream.
///
/// When redirects are followed curl reports one header block per response;
/// a status line starts a new block so only the last response's length counts.
pub(crate) fn parse_content_length(lines: &[String]) -> Option<u64> {
    let mut content_length = None;
    for line in lines {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line.starts_with("HTTP/") {
            content_length = None;
            continue;
        }
        if let Some((name, value)) = line.split_once(':') {
            if name.trim().eq_ignore_ascii_case("content-length") {
                if let Ok(n) = value.trim().parse::<u64>() {
                    content_length = Some(n);
                }
            }
        }
    }
    content_length
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn content_length_present() {
        let h = lines(&["HTTP/1.1 200 OK", "Content-Length: 12345", "Accept-Ranges: bytes"]);
        assert_eq!(parse_content_length(&h), Some(12345));
    }

    #[test]
    fn content_length_missing() {
        let h = lines(&["HTTP/1.1 200 OK", "Transfer-Encoding: chunked"]);
        assert_eq!(parse_content_length(&h), None);
    }

    #[test]
    fn redirect_uses_final_block() {
        let h = lines(&[
            "HTTP/1.1 301 Moved Permanently",
            "Content-Length: 162",
            "Location: /files/",
            "",
            "HTTP/1.1 200 OK",
            "content-length: 999",
        ]);
        assert_eq!(parse_content_length(&h), Some(999));
    }
}
