//! Single-instance lockfile in the working directory.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

pub const LOCK_FILE_NAME: &str = "lockfile";

#[derive(Debug, Error)]
pub enum LockError {
    #[error("lockfile already exists: {}", .0.display())]
    Held(PathBuf),
    #[error("lockfile {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Holds `<working_dir>/lockfile` until released or dropped.
#[derive(Debug)]
pub struct InstanceLock {
    path: PathBuf,
    released: bool,
}

impl InstanceLock {
    pub fn acquire(working_dir: &Path) -> Result<Self, LockError> {
        let path = working_dir.join(LOCK_FILE_NAME);
        let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(f) => f,
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                return Err(LockError::Held(path));
            }
            Err(source) => return Err(LockError::Io { path, source }),
        };
        let lock = Self {
            path,
            released: false,
        };
        writeln!(file, "{}", std::process::id()).map_err(|source| LockError::Io {
            path: lock.path.clone(),
            source,
        })?;
        tracing::debug!(path = %lock.path.display(), "lock acquired");
        Ok(lock)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn release(mut self) -> Result<(), LockError> {
        self.released = true;
        remove_lock_file(&self.path).map_err(|source| LockError::Io {
            path: self.path.clone(),
            source,
        })
    }
}

impl Drop for InstanceLock {
    fn drop(&mut self) {
        if !self.released {
            if let Err(e) = remove_lock_file(&self.path) {
                tracing::warn!(path = %self.path.display(), error = %e, "could not remove lockfile");
            }
        }
    }
}

/// Remove a lockfile by path; a missing file is fine. Used from the interrupt handler.
pub fn remove_lock_file(path: &Path) -> io::Result<()> {
    match fs::remove_file(path) {
        Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
        _ => Ok(()),
    }
}
