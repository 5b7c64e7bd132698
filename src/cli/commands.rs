//! CLI command definitions using clap.
//!
//! Defines the main CLI structure and subcommands:
//! - start: run the scheduled dispatcher until interrupted (default)
//! - run-once: perform a single dispatch run and print the summary
//! - check: validate configuration and show upcoming fire times

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// smsched - Scheduled batch SMS dispatcher
#[derive(Parser, Debug)]
#[command(name = "smsched")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Optional config file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output (log to stderr)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// Check if verbose mode is enabled
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }
}

/// Main subcommands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Run dispatches on the configured schedule until interrupted
    Start {
        /// Fire one run immediately instead of waiting for the first tick
        #[arg(short, long)]
        now: bool,
    },

    /// Perform a single dispatch run and exit
    RunOnce {
        /// Force dry-run regardless of configuration
        #[arg(long)]
        dry_run: bool,
    },

    /// Validate configuration and show the next fire times
    Check {
        /// Number of upcoming fire times to show
        #[arg(short = 'n', long, default_value_t = 5)]
        count: usize,
    },
}
