//! Remote checksum oracle.
//!
//! The seedbox panel can compute an SFV (CRC-32) for a file it hosts. The
//! computation is an asynchronous job: `sfvcr` submits it, `getlog` polls its
//! log, and `rm` deletes the artifact it leaves behind. A stale artifact makes
//! the next job fail, so the artifact is deleted before every submission and
//! again after every job, whatever the outcome.

mod panel;
mod target;

pub use target::ChecksumTarget;

use std::time::Duration;

use thiserror::Error;

use crate::transport::{HttpTransport, TransportError};
use crate::url_model::RemotePath;
use panel::{file_list, form_body, hash_from_artifact, hash_from_log, PanelResponse};

/// Resolved panel endpoints and polling parameters for one account.
#[derive(Debug, Clone)]
pub struct OracleSettings {
    pub panel_url: String,
    pub artifact_url: String,
    pub artifact_name: String,
    pub poll_interval: Duration,
    /// Consecutive polls without a `status` field before the job log is abandoned.
    pub max_missing_status: u32,
    /// Total polls before a job that never finishes is abandoned.
    pub max_polls: u32,
}

#[derive(Debug, Error)]
pub enum ChecksumError {
    #[error("checksum job submission rejected (errcode {0})")]
    SubmitFailed(i64),
    #[error("malformed panel response: {0}")]
    Malformed(String),
    #[error("no hash in job log or artifact")]
    NoHash,
    #[error("cannot derive panel target for {0}")]
    InvalidTarget(String),
    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// The remote hash of a file could not be obtained; the file is skipped this run.
#[derive(Debug, Error)]
#[error("checksum unavailable for {file}: {source}")]
pub struct ChecksumUnavailable {
    pub file: String,
    #[source]
    pub source: ChecksumError,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    Submitted,
    Pending,
    Complete,
    Failed,
}

/// One checksum computation on the panel.
#[derive(Debug, Clone)]
pub struct ChecksumJob {
    pub target_dir: String,
    pub target_file: String,
    /// Panel temp dir naming the job; passed back to `getlog`.
    pub job_handle: String,
    pub status: JobStatus,
}

pub struct ChecksumOracle<'a, T: HttpTransport + ?Sized> {
    transport: &'a T,
    settings: OracleSettings,
}

impl<'a, T: HttpTransport + ?Sized> ChecksumOracle<'a, T> {
    pub fn new(transport: &'a T, settings: OracleSettings) -> Self {
        Self {
            transport,
            settings,
        }
    }

    /// Uppercase hex CRC-32 of `remote` as computed by the panel.
    pub fn remote_hash(
        &self,
        remote: &RemotePath,
        root: &RemotePath,
    ) -> Result<String, ChecksumUnavailable> {
        let unavailable = |source| ChecksumUnavailable {
            file: remote.decoded().to_string(),
            source,
        };
        let target = ChecksumTarget::derive(remote, root)
            .ok_or_else(|| unavailable(ChecksumError::InvalidTarget(remote.to_string())))?;

        tracing::debug!(dir = %target.dir, file = %target.file, "cleaning up old checksum artifact");
        self.delete_artifact();
        let result = self.compute(&target);
        self.delete_artifact();

        match result {
            Ok(hash) => {
                tracing::info!(url = %remote, hash = %hash, "remote checksum");
                Ok(hash)
            }
            Err(e) => Err(unavailable(e)),
        }
    }

    fn compute(&self, target: &ChecksumTarget) -> Result<String, ChecksumError> {
        let mut job = self.submit(target)?;
        let last = self.poll(&mut job);

        if let Some(hash) = last
            .as_ref()
            .and_then(PanelResponse::log_text)
            .and_then(|log| hash_from_log(&log))
        {
            return Ok(hash);
        }
        tracing::debug!(job = %job.job_handle, "no hash in job log, reading artifact");
        self.read_artifact_hash()
    }

    fn post(&self, pairs: &[(&str, &str)]) -> Result<String, TransportError> {
        self.transport
            .post_form(&self.settings.panel_url, &form_body(pairs))
    }

    /// Best-effort: failures are logged and swallowed.
    fn delete_artifact(&self) {
        let fls = file_list(&self.settings.artifact_name);
        match self.post(&[("dir", "/"), ("action", "rm"), ("fls", fls.as_str())]) {
            Ok(body) => match PanelResponse::parse(&body) {
                Ok(r) if r.errcode.unwrap_or(0) == 0 => {}
                Ok(r) => tracing::debug!(
                    errcode = ?r.errcode,
                    artifact = %self.settings.artifact_name,
                    "artifact delete rejected"
                ),
                Err(e) => tracing::warn!(error = %e, "artifact delete returned malformed response"),
            },
            Err(e) => tracing::warn!(error = %e, artifact = %self.settings.artifact_name, "artifact delete failed"),
        }
    }

    fn submit(&self, target: &ChecksumTarget) -> Result<ChecksumJob, ChecksumError> {
        let artifact = format!("/{}", self.settings.artifact_name);
        let fls = file_list(&target.file);
        let body = self.post(&[
            ("dir", target.dir.as_str()),
            ("action", "sfvcr"),
            ("target", artifact.as_str()),
            ("fls", fls.as_str()),
        ])?;
        let response =
            PanelResponse::parse(&body).map_err(|e| ChecksumError::Malformed(e.to_string()))?;
        match response.errcode {
            Some(0) => {}
            Some(code) => {
                tracing::warn!(errcode = code, file = %target.file, "checksum job rejected");
                return Err(ChecksumError::SubmitFailed(code));
            }
            None => return Err(ChecksumError::Malformed("submit response without errcode".into())),
        }
        let job_handle = response
            .tmpdir
            .ok_or_else(|| ChecksumError::Malformed("submit response without tmpdir".into()))?;
        tracing::debug!(job = %job_handle, dir = %target.dir, file = %target.file, "checksum job submitted");
        Ok(ChecksumJob {
            target_dir: target.dir.clone(),
            target_file: target.file.clone(),
            job_handle,
            status: JobStatus::Submitted,
        })
    }

    /// Poll until the job reports a non-zero status, the missing-status
    /// budget runs out or the overall poll cap is reached. Returns the last
    /// parsed response.
    fn poll(&self, job: &mut ChecksumJob) -> Option<PanelResponse> {
        let mut missing = 0u32;
        let mut polls = 0u32;
        let mut last = None;
        loop {
            polls += 1;
            let response = self
                .post(&[("dir", "/"), ("action", "getlog"), ("target", job.job_handle.as_str())])
                .map_err(|e| e.to_string())
                .and_then(|body| PanelResponse::parse(&body).map_err(|e| e.to_string()));

            match response {
                Ok(r) => {
                    match r.job_finished() {
                        Some(true) => {
                            job.status = JobStatus::Complete;
                            return Some(r);
                        }
                        Some(false) => {
                            job.status = JobStatus::Pending;
                            missing = 0;
                        }
                        None => missing += 1,
                    }
                    last = Some(r);
                }
                Err(e) => {
                    tracing::debug!(job = %job.job_handle, error = %e, "job status poll failed");
                    missing += 1;
                }
            }

            if missing >= self.settings.max_missing_status {
                tracing::warn!(
                    job = %job.job_handle,
                    dir = %job.target_dir,
                    file = %job.target_file,
                    polls = missing,
                    "could not retrieve checksum job status"
                );
                job.status = JobStatus::Failed;
                return last;
            }
            if polls >= self.settings.max_polls {
                tracing::warn!(
                    job = %job.job_handle,
                    dir = %job.target_dir,
                    file = %job.target_file,
                    polls,
                    "checksum job still pending, giving up"
                );
                job.status = JobStatus::Failed;
                return last;
            }
            std::thread::sleep(self.settings.poll_interval);
        }
    }

    fn read_artifact_hash(&self) -> Result<String, ChecksumError> {
        let text = self.transport.get_text(&self.settings.artifact_url)?;
        hash_from_artifact(&text).ok_or(ChecksumError::NoHash)
    }
}
