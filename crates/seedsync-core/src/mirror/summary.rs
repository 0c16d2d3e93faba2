use std::fmt;

/// What happened to one listed file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    AlreadyMirrored,
    Downloaded { bytes: u64 },
    TransferFailed,
    ChecksumUnavailable,
    Mismatch { local: String, remote: String },
    VerifyFailed,
    UnsafeName,
}

/// Per-run counters, logged when the run ends.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub files_seen: usize,
    pub already_mirrored: usize,
    pub downloaded: usize,
    pub transfer_failures: usize,
    pub checksum_unavailable: usize,
    pub mismatches: usize,
    pub verify_failures: usize,
    pub unsafe_names: usize,
    pub listing_failures: usize,
    pub pruned: usize,
}

impl RunSummary {
    pub fn record(&mut self, outcome: &FileOutcome) {
        match outcome {
            FileOutcome::AlreadyMirrored => self.already_mirrored += 1,
            FileOutcome::Downloaded { .. } => self.downloaded += 1,
            FileOutcome::TransferFailed => self.transfer_failures += 1,
            FileOutcome::ChecksumUnavailable => self.checksum_unavailable += 1,
            FileOutcome::Mismatch { .. } => self.mismatches += 1,
            FileOutcome::VerifyFailed => self.verify_failures += 1,
            FileOutcome::UnsafeName => self.unsafe_names += 1,
        }
    }

    /// Files that were attempted and will be retried next run.
    pub fn failed(&self) -> usize {
        self.transfer_failures + self.checksum_unavailable + self.mismatches + self.verify_failures
    }

    /// The traversal saw every directory, so the ledger may be pruned.
    pub fn traversal_complete(&self) -> bool {
        self.listing_failures == 0
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} files listed, {} already mirrored, {} downloaded, {} failed \
             ({} transfer, {} checksum unavailable, {} mismatch, {} verify), \
             {} unsafe names skipped, {} listing failures, {} ledger entries pruned",
            self.files_seen,
            self.already_mirrored,
            self.downloaded,
            self.failed(),
            self.transfer_failures,
            self.checksum_unavailable,
            self.mismatches,
            self.verify_failures,
            self.unsafe_names,
            self.listing_failures,
            self.pruned,
        )
    }
}
