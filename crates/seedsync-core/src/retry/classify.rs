//! Classify transfer errors into retry policy error kinds.

use super::error::TransferError;
use super::policy::ErrorKind;
use crate::transport::TransportError;

/// Classify a curl error for retry decisions.
pub fn classify_curl_error(e: &curl::Error) -> ErrorKind {
    if e.is_operation_timedout() {
        return ErrorKind::Timeout;
    }
    if e.is_couldnt_connect()
        || e.is_couldnt_resolve_host()
        || e.is_couldnt_resolve_proxy()
        || e.is_read_error()
        || e.is_recv_error()
        || e.is_send_error()
        || e.is_got_nothing()
        || e.is_partial_file()
        || e.is_ssl_connect_error()
        || e.is_http2_error()
        || e.is_http2_stream_error()
    {
        return ErrorKind::Connection;
    }
    ErrorKind::Other
}

/// Classify a transfer error into an ErrorKind.
pub fn classify(e: &TransferError) -> ErrorKind {
    match e {
        TransferError::Transport(TransportError::Curl(ce)) => classify_curl_error(ce),
        TransferError::Transport(TransportError::Http(code)) => ErrorKind::Http(*code),
        TransferError::Transport(TransportError::Sink(_)) | TransferError::Storage(_) => {
            ErrorKind::Storage
        }
        TransferError::PartialTransfer { .. } => ErrorKind::PartialTransfer,
    }
}
