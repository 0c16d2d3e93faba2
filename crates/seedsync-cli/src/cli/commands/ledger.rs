//! `seedsync ledger` – list recorded remote files.

use anyhow::Result;
use seedsync_core::ledger::Ledger;
use std::path::Path;

pub fn run_ledger(working_dir: &Path) -> Result<()> {
    let ledger = Ledger::load(working_dir)?;
    if ledger.is_empty() {
        println!("No files recorded in {}.", ledger.path().display());
    } else {
        for entry in ledger.entries() {
            println!("{}", entry);
        }
    }
    Ok(())
}
