//! CLI command handlers, one per file.

mod checksum;
mod ledger;
mod sync;

pub use checksum::run_checksum;
pub use ledger::run_ledger;
pub use sync::{run_sync, SyncArgs};
