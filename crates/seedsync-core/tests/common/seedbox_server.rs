//! Minimal HTTP/1.1 seedbox stand-in for integration tests.
//!
//! Serves "index of" pages and files (full and `Range: bytes=a-b`) under
//! `/files/`, the panel's form endpoint with `rm`/`sfvcr`/`getlog`, and the
//! checksum artifact. Every request must carry the fixed basic-auth
//! credentials. One request per connection (`Connection: close`).

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use seedsync_core::url_model::percent_decode;

pub const USER: &str = "alice";
pub const PASSWORD: &str = "s3cret";
/// `Basic base64("alice:s3cret")`.
const AUTH: &str = "Basic YWxpY2U6czNjcmV0";

pub const PANEL_PATH: &str = "/rutorrent/plugins/filemanager/flm.php";
pub const ARTIFACT_PATH: &str = "/files/checksum.sfv";

#[derive(Debug, Clone, Default)]
pub struct Site {
    pages: HashMap<String, String>,
    files: HashMap<String, Vec<u8>>,
    /// Hash reported by the panel per bare file name; defaults to the real CRC-32.
    hash_overrides: HashMap<String, String>,
    /// When false, `getlog` never returns a `status` field.
    report_status: bool,
    artifact: Option<String>,
    /// Bodyless status answered for a path instead of its content.
    statuses: HashMap<String, String>,
}

impl Site {
    pub fn new() -> Self {
        Self {
            report_status: true,
            ..Self::default()
        }
    }

    /// Directory page at `path` (e.g. `/files/`) listing `(href, size)` rows.
    pub fn dir(mut self, path: &str, rows: &[(&str, &str)]) -> Self {
        let mut html = format!(
            "<html>\n<head><title>Index of {0}</title></head>\n<body>\n<h1>Index of {0}</h1><hr><pre><a href=\"../\">../</a>\n",
            path
        );
        for (href, size) in rows {
            html.push_str(&format!(
                "<a href=\"{0}\">{0}</a>                                    14-Mar-2024 21:07    {1}\n",
                href, size
            ));
        }
        html.push_str("</pre><hr></body>\n</html>\n");
        self.pages.insert(path.to_string(), html);
        self
    }

    pub fn file(mut self, path: &str, body: Vec<u8>) -> Self {
        self.files.insert(path.to_string(), body);
        self
    }

    pub fn report_hash(mut self, name: &str, hash: &str) -> Self {
        self.hash_overrides.insert(name.to_string(), hash.to_string());
        self
    }

    pub fn without_job_status(mut self) -> Self {
        self.report_status = false;
        self
    }

    pub fn status(mut self, path: &str, status: &str) -> Self {
        self.statuses.insert(path.to_string(), status.to_string());
        self
    }

    pub fn artifact(mut self, text: &str) -> Self {
        self.artifact = Some(text.to_string());
        self
    }

    fn hash_of(&self, name: &str) -> Option<String> {
        if let Some(h) = self.hash_overrides.get(name) {
            return Some(h.clone());
        }
        self.files
            .iter()
            .find(|(path, _)| percent_decode(path).rsplit('/').next() == Some(name))
            .map(|(_, body)| format!("{:08x}", crc32fast::hash(body)))
    }
}

#[derive(Default)]
struct State {
    current_file: Option<String>,
    log: Vec<String>,
}

pub struct SeedboxServer {
    pub base: String,
    state: Arc<Mutex<State>>,
}

impl SeedboxServer {
    /// Start serving `site` on an ephemeral port until the process exits.
    pub fn start(site: Site) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let port = listener.local_addr().unwrap().port();
        let site = Arc::new(site);
        let state = Arc::new(Mutex::new(State::default()));
        let shared = Arc::clone(&state);
        thread::spawn(move || {
            for stream in listener.incoming().flatten() {
                // Sequential on purpose: the client never has two requests in flight.
                handle(stream, &site, &shared);
            }
        });
        Self {
            base: format!("http://127.0.0.1:{}", port),
            state,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    /// Request log: `GET <path>`, `GET <path> bytes=a-b` or `POST <action>`.
    pub fn requests(&self) -> Vec<String> {
        self.state.lock().unwrap().log.clone()
    }

    pub fn clear_requests(&self) {
        self.state.lock().unwrap().log.clear();
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.requests().iter().filter(|r| r.starts_with(prefix)).count()
    }
}

struct Request {
    method: String,
    path: String,
    headers: HashMap<String, String>,
    body: Vec<u8>,
}

fn read_request(stream: &mut TcpStream) -> Option<Request> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    let header_end = loop {
        let n = stream.read(&mut chunk).ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };
    let head = std::str::from_utf8(&buf[..header_end]).ok()?;
    let mut lines = head.lines();
    let mut request_line = lines.next()?.split_whitespace();
    let method = request_line.next()?.to_string();
    let path = request_line.next()?.to_string();
    let headers: HashMap<String, String> = lines
        .filter_map(|l| l.split_once(':'))
        .map(|(k, v)| (k.trim().to_ascii_lowercase(), v.trim().to_string()))
        .collect();

    let length: usize = headers
        .get("content-length")
        .and_then(|v| v.parse().ok())
        .unwrap_or(0);
    let mut body = buf[header_end..].to_vec();
    while body.len() < length {
        let n = stream.read(&mut chunk).ok()?;
        if n == 0 {
            break;
        }
        body.extend_from_slice(&chunk[..n]);
    }
    Some(Request {
        method,
        path,
        headers,
        body,
    })
}

fn respond(stream: &mut TcpStream, status: &str, extra: &str, body: &[u8]) {
    let head = format!(
        "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n{}\r\n",
        status,
        body.len(),
        extra
    );
    let _ = stream.write_all(head.as_bytes());
    let _ = stream.write_all(body);
    let _ = stream.flush();
}

fn parse_range(value: &str) -> Option<(usize, usize)> {
    let (start, end) = value.strip_prefix("bytes=")?.split_once('-')?;
    Some((start.parse().ok()?, end.parse().ok()?))
}

fn parse_form(body: &[u8]) -> HashMap<String, String> {
    String::from_utf8_lossy(body)
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .map(|(k, v)| (percent_decode(k), percent_decode(v)))
        .collect()
}

fn handle(mut stream: TcpStream, site: &Site, state: &Mutex<State>) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(5)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(5)));
    let Some(req) = read_request(&mut stream) else {
        return;
    };

    if req.headers.get("authorization").map(String::as_str) != Some(AUTH) {
        state.lock().unwrap().log.push(format!("{} {} unauthorized", req.method, req.path));
        respond(
            &mut stream,
            "401 Unauthorized",
            "WWW-Authenticate: Basic realm=\"seedbox\"\r\n",
            b"",
        );
        return;
    }

    if req.method == "POST" && req.path == PANEL_PATH {
        let fields = parse_form(&req.body);
        let action = fields.get("action").cloned().unwrap_or_default();
        let answer = {
            let mut st = state.lock().unwrap();
            st.log.push(format!("POST {}", action));
            panel(site, &mut st, &action, &fields)
        };
        respond(&mut stream, "200 OK", "Content-Type: application/json\r\n", answer.as_bytes());
        return;
    }

    if req.method != "GET" {
        respond(&mut stream, "405 Method Not Allowed", "", b"");
        return;
    }

    let range = req.headers.get("range").and_then(|v| parse_range(v));
    {
        let mut st = state.lock().unwrap();
        match (range, req.headers.get("range")) {
            (Some(_), Some(v)) => st.log.push(format!("GET {} {}", req.path, v)),
            _ => st.log.push(format!("GET {}", req.path)),
        }
    }

    if let Some(status) = site.statuses.get(&req.path) {
        respond(&mut stream, status, "", b"");
        return;
    }
    if req.path == ARTIFACT_PATH {
        match &site.artifact {
            Some(text) => respond(&mut stream, "200 OK", "", text.as_bytes()),
            None => respond(&mut stream, "404 Not Found", "", b""),
        }
        return;
    }
    if let Some(page) = site.pages.get(&req.path) {
        respond(&mut stream, "200 OK", "Content-Type: text/html\r\n", page.as_bytes());
        return;
    }
    let Some(body) = site.files.get(&req.path) else {
        respond(&mut stream, "404 Not Found", "", b"");
        return;
    };
    match range {
        Some((start, end_incl)) if start < body.len() => {
            let end = (end_incl + 1).min(body.len());
            let content_range = format!(
                "Content-Range: bytes {}-{}/{}\r\n",
                start,
                end - 1,
                body.len()
            );
            respond(&mut stream, "206 Partial Content", &content_range, &body[start..end]);
        }
        Some(_) => respond(&mut stream, "416 Range Not Satisfiable", "", b""),
        None => respond(&mut stream, "200 OK", "", body),
    }
}

fn panel(site: &Site, st: &mut State, action: &str, fields: &HashMap<String, String>) -> String {
    match action {
        "rm" => r#"{"errcode":0}"#.to_string(),
        "sfvcr" => {
            st.current_file = fields
                .get("fls")
                .and_then(|f| serde_json::from_str::<HashMap<String, String>>(f).ok())
                .and_then(|m| m.get("0").cloned());
            r#"{"errcode":0,"tmpdir":"/tmp/sfv-1"}"#.to_string()
        }
        "getlog" => {
            let name = st.current_file.clone().unwrap_or_default();
            match site.hash_of(&name) {
                Some(hash) if site.report_status => serde_json::json!({
                    "errcode": 0,
                    "status": 1,
                    "lines": format!("Checking: {}\nHash: {}\nDone\n", name, hash),
                })
                .to_string(),
                _ => r#"{"errcode":0}"#.to_string(),
            }
        }
        _ => r#"{"errcode":1}"#.to_string(),
    }
}
