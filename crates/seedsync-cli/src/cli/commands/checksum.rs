//! `seedsync checksum` – CRC-32 of a local file, as the verifier computes it.

use anyhow::Result;
use seedsync_core::verify;
use std::path::Path;

pub fn run_checksum(path: &Path) -> Result<()> {
    let digest = verify::local_digest(path)?;
    println!("{}  {}", digest, path.display());
    Ok(())
}
