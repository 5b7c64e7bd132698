//! CLI module for smsched - command-line interface and subcommands.
//!
//! Provides the main entry point with subcommands for running the
//! scheduler, a single dispatch, or a configuration check.

pub mod commands;

pub use commands::Cli;
