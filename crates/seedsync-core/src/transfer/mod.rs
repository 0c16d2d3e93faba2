//! Chunked transfer engine.
//!
//! Fetches one remote file to a local path. Files above the chunk threshold
//! are fetched as sequential ranged GETs so no single connection lives long
//! enough to hit the seedbox's silent session timeouts. Any failed attempt
//! restarts the file from its first byte; the whole file is verified against
//! the remote checksum afterwards, so no partial state is trusted.

mod chunk;

pub use chunk::{plan_transfer, ByteRange, TransferPlan};

use std::io::Write;
use std::path::{Path, PathBuf};

use crate::retry::{run_with_retry, RetryPolicy, TransferError};
use crate::storage;
use crate::transport::HttpTransport;
use crate::url_model::RemotePath;

/// Engine tunables.
#[derive(Debug, Clone, Copy)]
pub struct TransferSettings {
    /// Files larger than this are fetched in ranges of this many bytes.
    pub chunk_threshold: u64,
    /// Block size for streaming bodies to disk.
    pub write_block: usize,
    /// Whole-file attempt budget.
    pub retry: RetryPolicy,
}

impl Default for TransferSettings {
    fn default() -> Self {
        Self {
            chunk_threshold: 1_000_000_000,
            write_block: 8192,
            retry: RetryPolicy::default(),
        }
    }
}

/// One file selected for download, sized by the metadata probe of the current attempt.
#[derive(Debug, Clone)]
pub struct TransferJob {
    pub remote: RemotePath,
    pub local: PathBuf,
    pub total_size: u64,
    pub chunk_size: u64,
}

impl TransferJob {
    pub fn plan(&self) -> TransferPlan {
        plan_transfer(self.total_size, self.chunk_size)
    }
}

/// Result of [`TransferEngine::download`].
#[derive(Debug)]
pub enum TransferOutcome {
    Completed { bytes: u64 },
    /// Attempt budget exhausted (or a non-retryable failure); skip this file for the run.
    Skipped { attempts: u32, error: TransferError },
}

impl TransferOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, TransferOutcome::Completed { .. })
    }
}

pub struct TransferEngine<'a, T: HttpTransport + ?Sized> {
    transport: &'a T,
    settings: TransferSettings,
}

impl<'a, T: HttpTransport + ?Sized> TransferEngine<'a, T> {
    pub fn new(transport: &'a T, settings: TransferSettings) -> Self {
        Self {
            transport,
            settings,
        }
    }

    /// Download `remote` to `local`, truncating whatever is there.
    pub fn download(&self, remote: &RemotePath, local: &Path) -> TransferOutcome {
        tracing::info!(url = %remote, "starting download");
        let result = run_with_retry(&self.settings.retry, |attempt| {
            if attempt > 1 {
                tracing::info!(url = %remote, attempt, "restarting download from the first byte");
            }
            self.attempt(remote, local)
        });
        match result {
            Ok(bytes) => {
                tracing::info!(url = %remote, bytes, "download finished");
                TransferOutcome::Completed { bytes }
            }
            Err(exhausted) => {
                tracing::warn!(
                    url = %remote,
                    attempts = exhausted.attempts,
                    error = %exhausted.error,
                    "download unsuccessful, skipping this file"
                );
                TransferOutcome::Skipped {
                    attempts: exhausted.attempts,
                    error: exhausted.error,
                }
            }
        }
    }

    fn attempt(&self, remote: &RemotePath, local: &Path) -> Result<u64, TransferError> {
        let total_size = self.transport.probe_length(remote.as_str())?;
        let job = TransferJob {
            remote: remote.clone(),
            local: local.to_path_buf(),
            total_size,
            chunk_size: self.settings.chunk_threshold,
        };

        match job.plan() {
            TransferPlan::Whole => {
                tracing::debug!(
                    size = total_size,
                    threshold = job.chunk_size,
                    "file fits in one request"
                );
                self.fetch_range(&job, None, true)
            }
            TransferPlan::Ranged(ranges) => {
                tracing::debug!(
                    size = total_size,
                    threshold = job.chunk_size,
                    chunks = ranges.len(),
                    "file exceeds threshold, downloading in chunks"
                );
                let count = ranges.len();
                let mut total = 0u64;
                for (i, range) in ranges.into_iter().enumerate() {
                    tracing::info!(chunk = i + 1, of = count, range = %range.range_header_value(), "downloading chunk");
                    total += self.fetch_range(&job, Some(range), i == 0)?;
                }
                Ok(total)
            }
        }
    }

    /// Fetch one range (or the whole body) into the local file.
    fn fetch_range(
        &self,
        job: &TransferJob,
        range: Option<ByteRange>,
        truncate: bool,
    ) -> Result<u64, TransferError> {
        let mut out = storage::open_chunk_file(&job.local, truncate, self.settings.write_block)
            .map_err(TransferError::Storage)?;
        let received = self
            .transport
            .fetch(job.remote.as_str(), range, &mut out)?;
        out.flush().map_err(TransferError::Storage)?;

        // An unknown length (no Content-Length) is accepted as-is for whole-file GETs.
        let expected = match range {
            Some(r) => Some(r.len()),
            None if job.total_size > 0 => Some(job.total_size),
            None => None,
        };
        if let Some(expected) = expected {
            if received != expected {
                return Err(TransferError::PartialTransfer { expected, received });
            }
        }
        Ok(received)
    }
}
