//! Completion ledger.
//!
//! Durable record of remote files already downloaded and verified, kept
//! independently of the local files so mirrored files may be moved or deleted
//! locally without being fetched again. Entries are decoded remote URLs, one
//! per line, in `<working_dir>/remotefiles_downloaded`.
//!
//! Two working lists drive reconciliation:
//! - `carried`: entries loaded at start and not yet seen during this run;
//! - `confirmed`: entries seen again in a listing plus files verified this run.
//!
//! [`Ledger::add`] persists `confirmed + carried` immediately so a crash
//! mid-run loses nothing; [`Ledger::finalize`] persists only `confirmed`,
//! dropping files that disappeared from the remote.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::storage;
use crate::url_model::RemotePath;

/// Ledger file name inside the working directory.
pub const LEDGER_FILE_NAME: &str = "remotefiles_downloaded";

#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("read ledger {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("write ledger {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug)]
pub struct Ledger {
    path: PathBuf,
    carried: Vec<String>,
    confirmed: Vec<String>,
}

impl Ledger {
    /// Path of the ledger file for a working directory.
    pub fn path_in(working_dir: &Path) -> PathBuf {
        working_dir.join(LEDGER_FILE_NAME)
    }

    /// Load the ledger of a working directory. A missing file is an empty ledger.
    pub fn load(working_dir: &Path) -> Result<Self, LedgerError> {
        Self::load_at(&Self::path_in(working_dir))
    }

    pub fn load_at(path: &Path) -> Result<Self, LedgerError> {
        let carried = match fs::read_to_string(path) {
            Ok(s) => s
                .lines()
                .map(|l| l.trim_end_matches('\r'))
                .filter(|l| !l.trim().is_empty())
                .map(str::to_string)
                .collect(),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::info!(path = %path.display(), "no ledger yet, starting empty");
                Vec::new()
            }
            Err(source) => {
                return Err(LedgerError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        tracing::debug!(entries = carried.len(), "ledger loaded");
        Ok(Self {
            path: path.to_path_buf(),
            carried,
            confirmed: Vec::new(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of entries the ledger would persist right now.
    pub fn len(&self) -> usize {
        self.carried.len() + self.confirmed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All entries, confirmed first.
    pub fn entries(&self) -> impl Iterator<Item = &str> {
        self.confirmed.iter().chain(self.carried.iter()).map(String::as_str)
    }

    /// True if `remote` was recorded before. Moves the entry from carried to
    /// confirmed so it survives [`finalize`](Self::finalize).
    pub fn contains(&mut self, remote: &RemotePath) -> bool {
        let key = remote.decoded();
        if let Some(pos) = self.carried.iter().position(|e| e == key) {
            let entry = self.carried.remove(pos);
            self.confirmed.push(entry);
            return true;
        }
        self.confirmed.iter().any(|e| e == key)
    }

    /// Record a verified download and persist right away, keeping carried entries.
    pub fn add(&mut self, remote: &RemotePath) -> Result<(), LedgerError> {
        let key = remote.decoded();
        if !self.confirmed.iter().any(|e| e == key) {
            self.carried.retain(|e| e != key);
            self.confirmed.push(key.to_string());
        }
        self.persist(true)
    }

    /// Persist only confirmed entries; returns how many carried entries were pruned.
    /// Call once after a complete traversal.
    pub fn finalize(&mut self) -> Result<usize, LedgerError> {
        let pruned = self.carried.len();
        for entry in &self.carried {
            tracing::info!(entry = %entry, "no longer present remotely, dropping from ledger");
        }
        self.persist(false)?;
        self.carried.clear();
        Ok(pruned)
    }

    fn persist(&self, keep_carried: bool) -> Result<(), LedgerError> {
        let mut out = String::new();
        let carried: &[String] = if keep_carried { &self.carried } else { &[] };
        for entry in self.confirmed.iter().chain(carried.iter()) {
            out.push_str(entry);
            out.push('\n');
        }
        storage::write_atomically(&self.path, out.as_bytes()).map_err(|source| LedgerError::Write {
            path: self.path.clone(),
            source,
        })
    }
}
