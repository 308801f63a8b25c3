//! Command line interface.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Watches a results page and raises a desktop alert when new entries appear.
#[derive(Debug, Parser)]
#[command(
    name = "sentinel",
    version,
    after_help = "Logs are written to <state_dir>/sentinel.log"
)]
pub struct Cli {
    /// Path to the RON config file [default: ./sentinel.ron if present]
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Override the configured check interval
    #[arg(short, long, global = true)]
    pub interval_minutes: Option<u64>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Monitor until interrupted (the default)
    Run {
        /// Run a single check and exit
        #[arg(long)]
        once: bool,
    },
    /// Print the stored baseline and exit
    Baseline,
}

impl Cli {
    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Run { once: false })
    }
}
