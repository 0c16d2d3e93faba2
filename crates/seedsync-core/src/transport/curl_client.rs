//! libcurl-backed transport.

use curl::easy::{Auth, Easy, List};
use std::io::Write;
use std::str;
use std::time::Duration;

use super::headers::parse_content_length;
use super::{Credentials, HttpTransport, TransportError};
use crate::transfer::ByteRange;

/// Blocking transport using one curl easy handle per request.
#[derive(Debug, Clone)]
pub struct CurlTransport {
    credentials: Credentials,
    timeout: Duration,
    buffer_size: usize,
}

impl CurlTransport {
    /// `timeout` bounds connecting and any stall in the body stream; `buffer_size`
    /// is the receive block size handed to the sink per write.
    pub fn new(credentials: Credentials, timeout: Duration, buffer_size: usize) -> Self {
        Self {
            credentials,
            timeout,
            buffer_size,
        }
    }

    fn easy(&self, url: &str) -> Result<Easy, TransportError> {
        let mut easy = Easy::new();
        easy.url(url)?;
        easy.follow_location(true)?;
        easy.max_redirections(10)?;
        // 4xx/5xx end the transfer before any body reaches the sink.
        easy.fail_on_error(true)?;
        let mut auth = Auth::new();
        auth.basic(true);
        easy.http_auth(&auth)?;
        easy.username(&self.credentials.username)?;
        easy.password(&self.credentials.password)?;
        easy.connect_timeout(self.timeout)?;
        // No wall-clock limit: large bodies are fine as long as bytes keep arriving.
        easy.low_speed_limit(1)?;
        easy.low_speed_time(self.timeout)?;
        easy.buffer_size(self.buffer_size)?;
        Ok(easy)
    }

    /// Run the request, writing the body into `sink`. Returns bytes written.
    fn perform_into(&self, easy: &mut Easy, sink: &mut dyn Write) -> Result<u64, TransportError> {
        let mut written = 0u64;
        let mut sink_error: Option<std::io::Error> = None;
        let result = {
            let mut transfer = easy.transfer();
            transfer.write_function(|data| match sink.write_all(data) {
                Ok(()) => {
                    written += data.len() as u64;
                    Ok(data.len())
                }
                Err(e) => {
                    sink_error = Some(e);
                    Ok(0) // abort transfer
                }
            })?;
            transfer.perform()
        };
        if let Err(e) = result {
            if let Some(io_err) = sink_error {
                return Err(TransportError::Sink(io_err));
            }
            return Err(perform_error(easy, e));
        }
        Ok(written)
    }
}

fn perform_error(easy: &mut Easy, e: curl::Error) -> TransportError {
    if e.is_http_returned_error() {
        if let Ok(code) = easy.response_code() {
            return TransportError::Http(code);
        }
    }
    TransportError::Curl(e)
}

fn require_status(easy: &mut Easy, accept: impl Fn(u32) -> bool) -> Result<u32, TransportError> {
    let code = easy.response_code()?;
    if accept(code) {
        Ok(code)
    } else {
        Err(TransportError::Http(code))
    }
}

fn is_ok(code: u32) -> bool {
    code == 200
}

fn is_success(code: u32) -> bool {
    (200..300).contains(&code)
}

fn is_full_or_partial(code: u32) -> bool {
    code == 200 || code == 206
}


impl HttpTransport for CurlTransport {
    fn probe_length(&self, url: &str) -> Result<u64, TransportError> {
        let mut easy = self.easy(url)?;
        let mut headers: Vec<String> = Vec::new();
        let result = {
            let mut transfer = easy.transfer();
            transfer.header_function(|data| {
                if let Ok(s) = str::from_utf8(data) {
                    headers.push(s.trim_end().to_string());
                }
                true
            })?;
            // Headers are all we need; refusing the first body block drops the connection.
            transfer.write_function(|_| Ok(0))?;
            transfer.perform()
        };
        if let Err(e) = result {
            if !e.is_write_error() {
                return Err(perform_error(&mut easy, e));
            }
        }
        require_status(&mut easy, is_full_or_partial)?;
        Ok(parse_content_length(&headers).unwrap_or(0))
    }

    fn fetch(
        &self,
        url: &str,
        range: Option<ByteRange>,
        sink: &mut dyn Write,
    ) -> Result<u64, TransportError> {
        let mut easy = self.easy(url)?;
        if let Some(r) = range {
            easy.range(&r.curl_range())?;
        }
        let written = self.perform_into(&mut easy, sink)?;
        require_status(&mut easy, is_full_or_partial)?;
        Ok(written)
    }

    fn get_text(&self, url: &str) -> Result<String, TransportError> {
        let mut easy = self.easy(url)?;
        let mut body = Vec::new();
        self.perform_into(&mut easy, &mut body)?;
        require_status(&mut easy, is_ok)?;
        Ok(String::from_utf8_lossy(&body).into_owned())
    }

    fn post_form(&self, url: &str, body: &str) -> Result<String, TransportError> {
        let mut easy = self.easy(url)?;
        easy.post(true)?;
        easy.post_fields_copy(body.as_bytes())?;
        let mut list = List::new();
        list.append("Content-Type: application/x-www-form-urlencoded; charset=UTF-8")?;
        easy.http_headers(list)?;
        let mut out = Vec::new();
        self.perform_into(&mut easy, &mut out)?;
        require_status(&mut easy, is_success)?;
        Ok(String::from_utf8_lossy(&out).into_owned())
    }
}
