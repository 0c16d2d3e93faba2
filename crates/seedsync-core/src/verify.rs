//! Local integrity digest.
//!
//! CRC-32 (IEEE) over the file's raw bytes, formatted as 8 uppercase hex
//! digits: the same format the panel reports in its SFV output. The file is
//! read in fixed 64 KiB blocks folded into one running CRC, so memory stays
//! at one block whatever the line lengths.

use anyhow::{Context, Result};
use crc32fast::Hasher;
use std::fs::File;
use std::io::Read;
use std::path::Path;

const BUF_SIZE: usize = 64 * 1024;

/// Compute the CRC-32 digest of a file as 8 uppercase hex digits.
pub fn local_digest(path: &Path) -> Result<String> {
    let mut f = File::open(path).with_context(|| format!("open {}", path.display()))?;
    let mut hasher = Hasher::new();
    let mut buf = vec![0u8; BUF_SIZE];
    loop {
        let n = f
            .read(&mut buf)
            .with_context(|| format!("read {}", path.display()))?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(format_digest(hasher.finalize()))
}

/// Format a CRC-32 value the way the remote side prints it.
pub fn format_digest(crc: u32) -> String {
    format!("{:08X}", crc)
}
