//! The smalltest command-line interface.
//!
//! This module is the entry point for all CLI commands and orchestrates the
//! core library functions. The exit code is the machine-readable verdict:
//!
//!   0  every test passed (or was skipped / expectedly failed)
//!   1  at least one test failed
//!   2  no failures, but at least one test errored
//!   3  discovery failed
//!   4  a module failed to load
//!   5  report rendering failed
//!   6  discovery found no tests

use std::io::Write;
use std::path::Path;

use clap::Parser;

use crate::cli::args::{Command, SmalltestArgs};
use crate::coverage::{CoverageHook, NoCoverage};
use crate::discovery::{self, TEST_FILE_PATTERNS, TEST_FOLDER_NAMES};
use crate::errors::{ErrorStage, HarnessError};
use crate::report::{self, ReportConfig};
use crate::runner;

const EXIT_SUCCESS: i32 = 0;
const EXIT_TESTS_FAILED: i32 = 1;
const EXIT_TESTS_ERRORED: i32 = 2;
const EXIT_DISCOVERY_FAILED: i32 = 3;
const EXIT_LOAD_FAILED: i32 = 4;
const EXIT_REPORT_FAILED: i32 = 5;
const EXIT_NO_TESTS: i32 = 6;

pub mod args;

/// The main entry point for the CLI. Returns the process exit code.
pub fn run() -> i32 {
    let args = SmalltestArgs::parse();

    let result = match args.command {
        Command::Run {
            path,
            strict_xpass,
            prefix,
        } => handle_run(&path, strict_xpass, &prefix),
        Command::Discover { path, prefix } => handle_discover(&path, &prefix),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            let code = exit_code_for(&e);
            eprintln!("{:?}", miette::Report::new(e));
            code
        }
    }
}

fn exit_code_for(error: &HarnessError) -> i32 {
    match error.stage() {
        ErrorStage::Discovery => EXIT_DISCOVERY_FAILED,
        ErrorStage::Load => EXIT_LOAD_FAILED,
        ErrorStage::Report => EXIT_REPORT_FAILED,
    }
}

/// Handles the `run` subcommand: discover, execute, summarize, report.
fn handle_run(path: &Path, strict_xpass: bool, prefix: &str) -> Result<i32, HarnessError> {
    let tests = discovery::discover_tests(
        Some(path),
        TEST_FILE_PATTERNS,
        TEST_FOLDER_NAMES,
        prefix,
    )?;
    if tests.iter().all(|(_, names)| names.is_empty()) {
        println!("smalltest: no tests found under {}", path.display());
        return Ok(EXIT_NO_TESTS);
    }

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let mut coverage = NoCoverage;

    coverage.start();
    let results = runner::run_tests_serial(&tests, &mut out)?;
    coverage.stop();

    let config = ReportConfig {
        strict_xpass,
        ..ReportConfig::default()
    };
    let tally = report::summarize(&results, strict_xpass);
    report::render_report(&results, &tally, &config, &mut out)?;
    if tally.is_clean() {
        coverage.report(&mut out)?;
    }

    if tally.failure > 0 {
        Ok(EXIT_TESTS_FAILED)
    } else if tally.error > 0 {
        Ok(EXIT_TESTS_ERRORED)
    } else {
        Ok(EXIT_SUCCESS)
    }
}

/// Handles the `discover` subcommand: list qualified test names, one per
/// line, without executing anything.
fn handle_discover(path: &Path, prefix: &str) -> Result<i32, HarnessError> {
    let tests = discovery::discover_tests(
        Some(path),
        TEST_FILE_PATTERNS,
        TEST_FOLDER_NAMES,
        prefix,
    )?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let mut count = 0usize;
    for (file, names) in &tests {
        for name in names {
            writeln!(out, "{}::{}", file.module_id, name).map_err(HarnessError::report)?;
            count += 1;
        }
    }
    if count == 0 {
        println!("smalltest: no tests found under {}", path.display());
        return Ok(EXIT_NO_TESTS);
    }
    Ok(EXIT_SUCCESS)
}
