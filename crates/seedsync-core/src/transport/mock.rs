//! Scripted in-memory transport for unit tests.
//!
//! Serves listing pages and file bodies from maps, fakes the panel's checksum
//! job protocol (`rm`, `sfvcr`, `getlog`) from a table of per-file hashes, and
//! records every request so tests can assert on counts, ranges and bodies.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};
use std::io::Write;

use super::{HttpTransport, TransportError};
use crate::transfer::ByteRange;
use crate::url_model::percent_decode;

pub(crate) const PANEL_URL: &str = "mock://panel/flm.php";
pub(crate) const ARTIFACT_URL: &str = "mock://panel/files/checksum.sfv";

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Request {
    Probe(String),
    Fetch(String, Option<ByteRange>),
    GetText(String),
    Post { action: String, fields: HashMap<String, String> },
}

#[derive(Default)]
pub(crate) struct MockTransport {
    pub(crate) pages: HashMap<String, String>,
    pub(crate) files: HashMap<String, Vec<u8>>,
    /// Hash reported by the fake panel, keyed by bare file name.
    pub(crate) hashes: HashMap<String, String>,
    /// Scripted panel answers per action; consumed before the fake panel logic.
    panel_script: RefCell<HashMap<String, VecDeque<String>>>,
    /// Number of upcoming `fetch` calls that fail with a timeout.
    pub(crate) failing_fetches: Cell<u32>,
    /// Body served for the checksum artifact, if any.
    pub(crate) artifact: Option<String>,
    current_file: RefCell<Option<String>>,
    requests: RefCell<Vec<Request>>,
}

pub(crate) fn timeout_error() -> TransportError {
    // CURLE_OPERATION_TIMEDOUT
    TransportError::Curl(curl::Error::new(28))
}

pub(crate) fn parse_form(body: &str) -> HashMap<String, String> {
    body.split('&')
        .filter_map(|pair| pair.split_once('='))
        .map(|(k, v)| (percent_decode(k), percent_decode(v)))
        .collect()
}

impl MockTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn page(mut self, url: &str, body: &str) -> Self {
        self.pages.insert(url.to_string(), body.to_string());
        self
    }

    pub(crate) fn file(mut self, url: &str, body: Vec<u8>) -> Self {
        self.files.insert(url.to_string(), body);
        self
    }

    pub(crate) fn hash(mut self, name: &str, hash: &str) -> Self {
        self.hashes.insert(name.to_string(), hash.to_string());
        self
    }

    pub(crate) fn script_panel(&self, action: &str, response: &str) {
        self.panel_script
            .borrow_mut()
            .entry(action.to_string())
            .or_default()
            .push_back(response.to_string());
    }

    pub(crate) fn requests(&self) -> Vec<Request> {
        self.requests.borrow().clone()
    }

    pub(crate) fn clear_requests(&self) {
        self.requests.borrow_mut().clear();
    }

    pub(crate) fn fetches(&self) -> Vec<(String, Option<ByteRange>)> {
        self.requests()
            .into_iter()
            .filter_map(|r| match r {
                Request::Fetch(url, range) => Some((url, range)),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn posts(&self, action: &str) -> Vec<HashMap<String, String>> {
        self.requests()
            .into_iter()
            .filter_map(|r| match r {
                Request::Post { action: a, fields } if a == action => Some(fields),
                _ => None,
            })
            .collect()
    }

    fn panel(&self, action: &str, fields: &HashMap<String, String>) -> String {
        if let Some(scripted) = self
            .panel_script
            .borrow_mut()
            .get_mut(action)
            .and_then(|q| q.pop_front())
        {
            return scripted;
        }
        match action {
            "sfvcr" => {
                let file = fields
                    .get("fls")
                    .and_then(|f| serde_json::from_str::<HashMap<String, String>>(f).ok())
                    .and_then(|m| m.get("0").cloned());
                *self.current_file.borrow_mut() = file;
                r#"{"errcode":0,"tmpdir":"/tmp/job1"}"#.to_string()
            }
            "getlog" => {
                let current = self.current_file.borrow().clone().unwrap_or_default();
                match self.hashes.get(&current) {
                    Some(h) => serde_json::json!({
                        "errcode": 0,
                        "status": 1,
                        "lines": format!("Checking {}\nHash: {}\nDone\n", current, h),
                    })
                    .to_string(),
                    None => r#"{"errcode":0}"#.to_string(),
                }
            }
            _ => r#"{"errcode":0}"#.to_string(),
        }
    }
}

impl HttpTransport for MockTransport {
    fn probe_length(&self, url: &str) -> Result<u64, TransportError> {
        self.requests.borrow_mut().push(Request::Probe(url.to_string()));
        self.files
            .get(url)
            .map(|b| b.len() as u64)
            .ok_or(TransportError::Http(404))
    }

    fn fetch(
        &self,
        url: &str,
        range: Option<ByteRange>,
        sink: &mut dyn Write,
    ) -> Result<u64, TransportError> {
        self.requests
            .borrow_mut()
            .push(Request::Fetch(url.to_string(), range));
        if self.failing_fetches.get() > 0 {
            self.failing_fetches.set(self.failing_fetches.get() - 1);
            return Err(timeout_error());
        }
        let body = self.files.get(url).ok_or(TransportError::Http(404))?;
        let slice = match range {
            Some(r) => &body[r.start as usize..(r.end as usize).min(body.len())],
            None => &body[..],
        };
        sink.write_all(slice).map_err(TransportError::Sink)?;
        Ok(slice.len() as u64)
    }

    fn get_text(&self, url: &str) -> Result<String, TransportError> {
        self.requests.borrow_mut().push(Request::GetText(url.to_string()));
        if url == ARTIFACT_URL {
            return self.artifact.clone().ok_or(TransportError::Http(404));
        }
        self.pages.get(url).cloned().ok_or(TransportError::Http(404))
    }

    fn post_form(&self, url: &str, body: &str) -> Result<String, TransportError> {
        let fields = parse_form(body);
        let action = fields.get("action").cloned().unwrap_or_default();
        self.requests.borrow_mut().push(Request::Post {
            action: action.clone(),
            fields: fields.clone(),
        });
        if url != PANEL_URL {
            return Err(TransportError::Http(404));
        }
        Ok(self.panel(&action, &fields))
    }
}
