//! Panel wire format: form bodies out, JSON objects back.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::Deserialize;
use serde_json::Value;

/// Everything except ASCII alphanumerics and `_ . - ~` is escaped.
const FORM_VALUE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'_')
    .remove(b'.')
    .remove(b'-')
    .remove(b'~');

/// Build a form body from key/value pairs, in order.
pub(crate) fn form_body(pairs: &[(&str, &str)]) -> String {
    pairs
        .iter()
        .map(|(k, v)| format!("{}={}", k, utf8_percent_encode(v, FORM_VALUE)))
        .collect::<Vec<_>>()
        .join("&")
}

/// The panel's file list parameter: `{"0":"<name>"}`.
pub(crate) fn file_list(name: &str) -> String {
    serde_json::json!({ "0": name }).to_string()
}

/// Subset of the panel's JSON response fields we use.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct PanelResponse {
    #[serde(default)]
    pub errcode: Option<i64>,
    #[serde(default)]
    pub tmpdir: Option<String>,
    #[serde(default)]
    pub status: Option<Value>,
    #[serde(default)]
    pub lines: Option<Value>,
}

impl PanelResponse {
    pub(crate) fn parse(body: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(body)
    }

    /// `None` when the response carries no `status` field at all.
    pub(crate) fn job_finished(&self) -> Option<bool> {
        let status = self.status.as_ref()?;
        Some(match status {
            Value::Null => return None,
            Value::Bool(b) => *b,
            Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
            Value::String(s) => {
                let s = s.trim();
                !s.is_empty() && s != "0"
            }
            Value::Array(_) | Value::Object(_) => true,
        })
    }

    /// Job log text; a list of lines is joined with `\n`.
    pub(crate) fn log_text(&self) -> Option<String> {
        match self.lines.as_ref()? {
            Value::String(s) => Some(s.clone()),
            Value::Array(items) => Some(
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .collect::<Vec<_>>()
                    .join("\n"),
            ),
            _ => None,
        }
    }
}

fn normalize_hash(token: &str) -> Option<String> {
    let token = token.trim();
    if token.is_empty() || !token.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    Some(token.to_ascii_uppercase())
}

/// Hash from a job log: the text after the `Hash: ` marker up to the end of that line.
pub(crate) fn hash_from_log(log: &str) -> Option<String> {
    let (_, rest) = log.split_once("Hash: ")?;
    normalize_hash(rest.lines().next().unwrap_or(""))
}

/// Hash from the SFV artifact: the last space-separated token of its third line.
pub(crate) fn hash_from_artifact(text: &str) -> Option<String> {
    let line = text.split('\n').nth(2)?.trim_end_matches('\r');
    normalize_hash(line.rsplit(' ').next()?)
}
