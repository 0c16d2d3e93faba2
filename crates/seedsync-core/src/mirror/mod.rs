//! Mirror orchestrator.
//!
//! Walks the remote tree depth-first in listing order. Each file not in the
//! ledger is downloaded, checked against the panel's checksum and recorded on
//! a match. Failures are scoped to the file: the walk goes on and the file is
//! tried again next run. Only ledger I/O aborts a run.

mod error;
mod summary;

pub use error::SyncError;
pub use summary::{FileOutcome, RunSummary};

use std::fs;
use std::path::{Path, PathBuf};

use crate::ledger::Ledger;
use crate::listing::parse_listing;
use crate::oracle::{ChecksumOracle, OracleSettings};
use crate::transfer::{TransferEngine, TransferOutcome, TransferSettings};
use crate::transport::HttpTransport;
use crate::url_model::{is_safe_entry_name, local_destination, RemotePath};
use crate::verify;

pub struct Mirror<'a, T: HttpTransport + ?Sized> {
    transport: &'a T,
    root: RemotePath,
    local_root: PathBuf,
    engine: TransferEngine<'a, T>,
    oracle: ChecksumOracle<'a, T>,
}

impl<'a, T: HttpTransport + ?Sized> Mirror<'a, T> {
    pub fn new(
        transport: &'a T,
        root: RemotePath,
        local_root: impl Into<PathBuf>,
        transfer: TransferSettings,
        oracle: OracleSettings,
    ) -> Self {
        Self {
            transport,
            root,
            local_root: local_root.into(),
            engine: TransferEngine::new(transport, transfer),
            oracle: ChecksumOracle::new(transport, oracle),
        }
    }

    /// Fetch the root listing once; an unreachable root or rejected credentials
    /// fail before any state is touched.
    pub fn check_remote(&self) -> Result<(), SyncError> {
        self.transport
            .get_text(self.root.as_str())
            .map(|_| ())
            .map_err(|e| SyncError::configuration(format!("remote root {} unreachable: {}", self.root, e)))
    }

    /// Mirror the whole tree, then prune the ledger if every listing was read.
    pub fn run(&self, ledger: &mut Ledger) -> Result<RunSummary, SyncError> {
        tracing::info!(root = %self.root, local = %self.local_root.display(), "mirror run starting");
        let mut summary = RunSummary::default();
        self.mirror_directory(&self.root, ledger, &mut summary)?;

        if summary.traversal_complete() {
            summary.pruned = ledger.finalize()?;
        } else {
            tracing::warn!(
                listing_failures = summary.listing_failures,
                "traversal incomplete, ledger not pruned"
            );
        }
        tracing::info!(%summary, "mirror run finished");
        Ok(summary)
    }

    fn mirror_directory(
        &self,
        dir: &RemotePath,
        ledger: &mut Ledger,
        summary: &mut RunSummary,
    ) -> Result<(), SyncError> {
        let body = match self.transport.get_text(dir.as_str()) {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!(url = %dir, error = %e, "could not list directory");
                summary.listing_failures += 1;
                return Ok(());
            }
        };

        for entry in parse_listing(&body) {
            if !entry.is_directory {
                summary.files_seen += 1;
            }
            if !is_safe_entry_name(&entry.name) {
                tracing::warn!(dir = %dir, name = %entry.name, "skipping unsafe entry name");
                summary.unsafe_names += 1;
                continue;
            }
            if entry.is_directory {
                tracing::debug!(dir = %dir, name = %entry.name, "entering directory");
                self.mirror_directory(&dir.join(&entry.name), ledger, summary)?;
            } else {
                let outcome = self.process_file(dir, &entry.name, ledger)?;
                summary.record(&outcome);
            }
        }
        Ok(())
    }

    fn process_file(
        &self,
        dir: &RemotePath,
        name: &str,
        ledger: &mut Ledger,
    ) -> Result<FileOutcome, SyncError> {
        let remote = dir.join(name);
        if ledger.contains(&remote) {
            tracing::debug!(url = %remote, "already mirrored");
            return Ok(FileOutcome::AlreadyMirrored);
        }

        let Some(local) = local_destination(&self.local_root, &self.root, dir, name) else {
            tracing::warn!(url = %remote, "no safe local path, skipping");
            return Ok(FileOutcome::UnsafeName);
        };
        if let Err(e) = ensure_parent(&local) {
            tracing::warn!(path = %local.display(), error = %e, "could not create local directory");
            return Ok(FileOutcome::TransferFailed);
        }

        let bytes = match self.engine.download(&remote, &local) {
            TransferOutcome::Completed { bytes } => bytes,
            TransferOutcome::Skipped { .. } => return Ok(FileOutcome::TransferFailed),
        };

        let remote_hash = match self.oracle.remote_hash(&remote, &self.root) {
            Ok(hash) => hash,
            Err(e) => {
                tracing::warn!(url = %remote, error = %e, "skipping file without remote checksum");
                return Ok(FileOutcome::ChecksumUnavailable);
            }
        };
        let local_hash = match verify::local_digest(&local) {
            Ok(hash) => hash,
            Err(e) => {
                tracing::warn!(path = %local.display(), error = %format!("{:#}", e), "could not checksum local file");
                return Ok(FileOutcome::VerifyFailed);
            }
        };

        if local_hash != remote_hash {
            tracing::warn!(
                url = %remote,
                local = %local_hash,
                remote = %remote_hash,
                "checksum mismatch, file will be downloaded again next run"
            );
            return Ok(FileOutcome::Mismatch {
                local: local_hash,
                remote: remote_hash,
            });
        }

        ledger.add(&remote)?;
        tracing::info!(url = %remote, hash = %local_hash, "checksum ok, file recorded");
        Ok(FileOutcome::Downloaded { bytes })
    }
}

fn ensure_parent(path: &Path) -> std::io::Result<()> {
    match path.parent() {
        Some(parent) => fs::create_dir_all(parent),
        None => Ok(()),
    }
}
