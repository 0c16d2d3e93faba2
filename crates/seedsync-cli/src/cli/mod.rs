//! CLI for the seedsync mirror.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use commands::{run_checksum, run_ledger, run_sync, SyncArgs};

/// Top-level CLI for seedsync.
#[derive(Debug, Parser)]
#[command(name = "seedsync")]
#[command(about = "Mirror a seedbox HTTP directory tree and verify every file", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Mirror the remote tree into a local directory.
    Sync {
        /// Remote root URL (an "index of" directory listing).
        #[arg(long)]
        url: String,
        /// Seedbox account name.
        #[arg(long)]
        user: String,
        /// Seedbox account password.
        #[arg(long)]
        password: String,
        /// Local directory the tree is mirrored into.
        #[arg(long)]
        ldir: PathBuf,
        /// Directory for the log, lockfile and ledger (default: the local directory).
        #[arg(long)]
        wdir: Option<PathBuf>,
        /// Config file to use instead of ~/.config/seedsync/config.toml.
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,
    },

    /// Print the CRC-32 digest of a local file.
    Checksum {
        /// Path to the file.
        path: PathBuf,
    },

    /// List the remote files recorded as mirrored.
    Ledger {
        /// Working directory holding the ledger.
        #[arg(long, default_value = ".")]
        wdir: PathBuf,
    },
}

impl CliCommand {
    pub fn run_from_args() -> Result<()> {
        let cli = Cli::parse();

        match cli.command {
            CliCommand::Sync {
                url,
                user,
                password,
                ldir,
                wdir,
                config,
            } => run_sync(SyncArgs {
                url,
                user,
                password,
                local_dir: ldir,
                working_dir: wdir,
                config,
            })?,
            CliCommand::Checksum { path } => run_checksum(&path)?,
            CliCommand::Ledger { wdir } => run_ledger(&wdir)?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
