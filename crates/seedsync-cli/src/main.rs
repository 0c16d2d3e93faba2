use seedsync_core::mirror::SyncError;

mod cli;

use crate::cli::CliCommand;

fn main() {
    if let Err(err) = CliCommand::run_from_args() {
        tracing::error!(error = %format!("{:#}", err), "run aborted");
        eprintln!("seedsync error: {:#}", err);
        let code = err
            .downcast_ref::<SyncError>()
            .map(SyncError::exit_code)
            .unwrap_or(1);
        std::process::exit(code);
    }
}
