use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::oracle::OracleSettings;
use crate::retry::RetryPolicy;
use crate::transfer::TransferSettings;

/// Retry policy parameters (optional section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of whole-file attempts (including the first).
    pub max_attempts: u32,
    /// Base delay in seconds between attempts (doubles per attempt).
    pub base_delay_secs: f64,
    /// Maximum delay between attempts.
    pub max_delay_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay_secs: 1.0,
            max_delay_secs: 30,
        }
    }
}

impl RetryConfig {
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts.max(1),
            base_delay: Duration::from_secs_f64(self.base_delay_secs.max(0.0)),
            max_delay: Duration::from_secs(self.max_delay_secs),
        }
    }
}

/// Remote checksum panel parameters (optional section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChecksumConfig {
    /// Seconds between two status polls of a checksum job.
    pub poll_interval_secs: u64,
    /// Consecutive polls without a `status` field before giving up on the job log.
    pub max_missing_status: u32,
    /// Upper bound on status polls per job, pending or not.
    #[serde(default = "default_max_polls")]
    pub max_polls: u32,
    /// Name of the artifact the panel writes into the account root.
    pub artifact_name: String,
    /// Panel form endpoint; `{user}` is replaced by the account name.
    pub panel_url: String,
    /// Plain HTTP location of the artifact; `{user}` and `{artifact}` are replaced.
    pub artifact_url: String,
}

impl Default for ChecksumConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: 20,
            max_missing_status: 5,
            max_polls: default_max_polls(),
            artifact_name: "checksum.sfv".to_string(),
            panel_url: "https://{user}.seedbox.io/rutorrent/plugins/filemanager/flm.php".to_string(),
            artifact_url: "https://{user}.seedbox.io/files/{artifact}".to_string(),
        }
    }
}

/// 30 minutes at the default poll interval.
fn default_max_polls() -> u32 {
    90
}

impl ChecksumConfig {
    /// Resolve the URL templates for one account.
    pub fn settings_for(&self, username: &str) -> OracleSettings {
        let panel_url = self.panel_url.replace("{user}", username);
        let artifact_url = self
            .artifact_url
            .replace("{user}", username)
            .replace("{artifact}", &self.artifact_name);
        OracleSettings {
            panel_url,
            artifact_url,
            artifact_name: self.artifact_name.clone(),
            poll_interval: Duration::from_secs(self.poll_interval_secs),
            max_missing_status: self.max_missing_status.max(1),
            max_polls: self.max_polls.max(1),
        }
    }
}

/// Tunables loaded from `~/.config/seedsync/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Files larger than this are fetched as ranged chunks of this size.
    pub chunk_threshold_bytes: u64,
    /// Block size for streaming response bodies to disk.
    pub write_block_bytes: usize,
    /// Connect timeout and read-stall timeout for every request.
    pub request_timeout_secs: u64,
    #[serde(default)]
    pub retry: Option<RetryConfig>,
    #[serde(default)]
    pub checksum: Option<ChecksumConfig>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            chunk_threshold_bytes: 1_000_000_000,
            write_block_bytes: 8192,
            request_timeout_secs: 60,
            retry: None,
            checksum: None,
        }
    }
}

impl SyncConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    pub fn transfer_settings(&self) -> TransferSettings {
        TransferSettings {
            chunk_threshold: self.chunk_threshold_bytes.max(1),
            write_block: self.write_block_bytes.max(512),
            retry: self.retry.clone().unwrap_or_default().policy(),
        }
    }

    pub fn oracle_settings(&self, username: &str) -> OracleSettings {
        self.checksum
            .clone()
            .unwrap_or_default()
            .settings_for(username)
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("seedsync")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from the default location, creating a default file if none exists.
pub fn load_or_init() -> Result<SyncConfig> {
    let path = config_path()?;
    load_or_init_at(&path)
}

/// Same as [`load_or_init`] for an explicit path (`--config`).
pub fn load_or_init_at(path: &Path) -> Result<SyncConfig> {
    if !path.exists() {
        let default_cfg = SyncConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml).with_context(|| format!("write {}", path.display()))?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: SyncConfig =
        toml::from_str(&data).with_context(|| format!("parse {}", path.display()))?;
    Ok(cfg)
}
