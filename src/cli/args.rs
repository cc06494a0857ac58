//! Defines the command-line arguments and subcommands for the smalltest CLI.
//!
//! This module uses the `clap` crate with its "derive" feature to create a
//! declarative and type-safe argument parsing structure.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// The main CLI argument structure.
#[derive(Debug, Parser)]
#[command(
    name = "smalltest",
    version,
    about = "A minimal test harness: discover, run, classify, report."
)]
pub struct SmalltestArgs {
    #[command(subcommand)]
    pub command: Command,
}

/// An enumeration of all available CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Discover and run every test under a directory, then report.
    Run {
        /// The directory to search for test files.
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Count tests that pass despite an expected-failure marker as
        /// failures.
        #[arg(long)]
        strict_xpass: bool,

        /// Prefix a function name must carry to count as a test.
        #[arg(long, default_value = "test_")]
        prefix: String,
    },
    /// List discovered tests without running them.
    Discover {
        /// The directory to search for test files.
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Prefix a function name must carry to count as a test.
        #[arg(long, default_value = "test_")]
        prefix: String,
    },
}
