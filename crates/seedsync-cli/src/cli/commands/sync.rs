//! `seedsync sync` – one mirror run.
//!
//! Order matters: the remote root is checked before the lock is taken or the
//! ledger is read, and the lock is released on every exit path, including
//! Ctrl-C (exit status 130).

use anyhow::{Context, Result};
use seedsync_core::config::{self, SyncConfig};
use seedsync_core::ledger::Ledger;
use seedsync_core::lock::{self, InstanceLock, LockError};
use seedsync_core::logging;
use seedsync_core::mirror::{Mirror, SyncError};
use seedsync_core::transport::{Credentials, CurlTransport};
use seedsync_core::url_model::RemotePath;
use std::fs;
use std::path::{Path, PathBuf};

pub struct SyncArgs {
    pub url: String,
    pub user: String,
    pub password: String,
    pub local_dir: PathBuf,
    pub working_dir: Option<PathBuf>,
    pub config: Option<PathBuf>,
}

impl SyncArgs {
    fn working_dir(&self) -> &Path {
        self.working_dir.as_deref().unwrap_or(&self.local_dir)
    }
}

pub fn run_sync(args: SyncArgs) -> Result<()> {
    let working_dir = args.working_dir().to_path_buf();
    fs::create_dir_all(&working_dir)
        .map_err(|e| SyncError::configuration(format!("working dir {}: {}", working_dir.display(), e)))?;
    if let Err(e) = logging::init_logging(&working_dir) {
        logging::init_logging_stderr();
        tracing::warn!(error = %format!("{:#}", e), "log file unavailable, logging to stderr only");
    }

    let cfg = load_config(args.config.as_deref())?;
    tracing::debug!("loaded config: {:?}", cfg);

    let root = RemotePath::parse_root(&args.url)
        .map_err(|e| SyncError::configuration(format!("invalid remote root {}: {}", args.url, e)))?;
    let transfer = cfg.transfer_settings();
    let transport = CurlTransport::new(
        Credentials::new(args.user.as_str(), args.password.as_str()),
        cfg.request_timeout(),
        transfer.write_block,
    );
    let mirror = Mirror::new(
        &transport,
        root,
        args.local_dir.clone(),
        transfer,
        cfg.oracle_settings(&args.user),
    );
    mirror.check_remote()?;
    fs::create_dir_all(&args.local_dir).map_err(|e| {
        SyncError::configuration(format!("local dir {}: {}", args.local_dir.display(), e))
    })?;

    let lock = match InstanceLock::acquire(&working_dir) {
        Ok(lock) => lock,
        Err(LockError::Held(path)) => {
            tracing::info!(path = %path.display(), "lockfile already exists, another run is in progress");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };
    install_interrupt_handler(lock.path().to_path_buf())?;

    let mut ledger = Ledger::load(&working_dir).map_err(SyncError::from)?;
    tracing::info!(entries = ledger.len(), path = %ledger.path().display(), "ledger loaded");
    let summary = mirror.run(&mut ledger)?;
    lock.release()?;

    println!("{}", summary);
    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<SyncConfig> {
    let loaded = match path {
        Some(p) => config::load_or_init_at(p),
        None => config::load_or_init(),
    };
    loaded.map_err(|e| SyncError::configuration(format!("{:#}", e)).into())
}

fn install_interrupt_handler(lock_path: PathBuf) -> Result<()> {
    ctrlc::set_handler(move || {
        tracing::warn!("interrupted, releasing lock");
        if let Err(e) = lock::remove_lock_file(&lock_path) {
            eprintln!("could not remove {}: {}", lock_path.display(), e);
        }
        // 128 + SIGINT
        std::process::exit(130);
    })
    .context("install Ctrl-C handler")
}
