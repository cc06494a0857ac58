//! Result aggregation and report rendering.
//!
//! `summarize` folds a result map into a tally; `render_report` turns the
//! tally plus per-test records into the human report. The tally is the only
//! place the strict-xpass rule applies: under strict mode an unexpected
//! success counts as a failure in the tally while the per-test record keeps
//! its own outcome kind.

use std::io::Write;

use crate::errors::HarnessError;
use crate::runner::{OutcomeKind, ResultMap, TestResult};

// Color constants for terminal output
const RESET: &str = "\x1b[0m";
const RED: &str = "\x1b[31m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";

/// Rendering knobs for the final report.
#[derive(Debug, Clone)]
pub struct ReportConfig {
    pub strict_xpass: bool,
    pub use_colors: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            strict_xpass: false,
            use_colors: atty::is(atty::Stream::Stdout),
        }
    }
}

impl ReportConfig {
    /// Apply color formatting to text if colors are enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if self.use_colors {
            format!("{}{}{}", color, text, RESET)
        } else {
            text.to_string()
        }
    }
}

/// Counts per outcome bucket for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReportTally {
    pub success: usize,
    pub failure: usize,
    pub xfail: usize,
    pub xpass: usize,
    pub skipped: usize,
    pub error: usize,
}

impl ReportTally {
    pub fn total(&self) -> usize {
        self.success + self.failure + self.xfail + self.xpass + self.skipped + self.error
    }

    /// True when nothing failed, errored, or unexpectedly passed.
    pub fn is_clean(&self) -> bool {
        self.failure == 0 && self.error == 0 && self.xpass == 0
    }
}

/// Fold results into a tally. Under strict mode an unexpected success is
/// tallied as a failure instead of its own bucket, so the strict failure
/// count equals plain failures plus xpasses.
pub fn summarize(results: &ResultMap, strict_xpass: bool) -> ReportTally {
    let mut tally = ReportTally::default();
    for (_, result) in results {
        match result.kind {
            OutcomeKind::Success => tally.success += 1,
            OutcomeKind::Failure => tally.failure += 1,
            OutcomeKind::XFail => tally.xfail += 1,
            OutcomeKind::XPass if strict_xpass => tally.failure += 1,
            OutcomeKind::XPass => tally.xpass += 1,
            OutcomeKind::Skipped => tally.skipped += 1,
            OutcomeKind::Error => tally.error += 1,
        }
    }
    tally
}

/// Render the full report: detail blocks for every non-clean outcome, then
/// the aligned count summary.
pub fn render_report(
    results: &ResultMap,
    tally: &ReportTally,
    config: &ReportConfig,
    out: &mut dyn Write,
) -> Result<(), HarnessError> {
    for (name, result) in results {
        match result.kind {
            OutcomeKind::Failure => write_failure_block(name, result, config, out)?,
            OutcomeKind::Error => write_error_block(name, result, config, out)?,
            OutcomeKind::XPass if config.strict_xpass => {
                write_xpass_block(name, result, config, out)?
            }
            _ => {}
        }
    }

    let width = count_width(tally);
    writeln!(out).map_err(HarnessError::report)?;
    if tally.failure + tally.error > 0 {
        writeln!(out, "{}", "=".repeat(width + 10)).map_err(HarnessError::report)?;
    }
    writeln!(out, "Ran {:>width$} Tests", tally.total()).map_err(HarnessError::report)?;
    write_bucket(out, "Passed", tally.success, width, GREEN, config)?;
    write_bucket(out, "Failed", tally.failure, width, RED, config)?;
    write_bucket(out, "XFailed", tally.xfail, width, YELLOW, config)?;
    write_bucket(out, "XPassed", tally.xpass, width, RED, config)?;
    write_bucket(out, "Skipped", tally.skipped, width, YELLOW, config)?;
    write_bucket(
        out,
        "Failed to run due to errors",
        tally.error,
        width,
        RED,
        config,
    )?;
    Ok(())
}

fn count_width(tally: &ReportTally) -> usize {
    tally.total().to_string().len()
}

fn write_bucket(
    out: &mut dyn Write,
    label: &str,
    count: usize,
    width: usize,
    color: &str,
    config: &ReportConfig,
) -> Result<(), HarnessError> {
    if count == 0 {
        return Ok(());
    }
    writeln!(
        out,
        "    {:>width$} {}",
        count,
        config.colorize(label, color)
    )
    .map_err(HarnessError::report)
}

fn write_failure_block(
    name: &str,
    result: &TestResult,
    config: &ReportConfig,
    out: &mut dyn Write,
) -> Result<(), HarnessError> {
    writeln!(out, "{}: {}", config.colorize("Failed", RED), name)
        .map_err(HarnessError::report)?;
    if let Some(details) = &result.details {
        for message in &details.messages {
            writeln!(out, "    {}", message).map_err(HarnessError::report)?;
        }
    }
    write_captured_output(result, out)
}

fn write_error_block(
    name: &str,
    result: &TestResult,
    config: &ReportConfig,
    out: &mut dyn Write,
) -> Result<(), HarnessError> {
    writeln!(out, "{}: {}", config.colorize("ERROR", RED), name)
        .map_err(HarnessError::report)?;
    if let Some(details) = &result.details {
        if let Some(fault) = &details.fault_name {
            writeln!(out, "    Fault: {}", fault).map_err(HarnessError::report)?;
        }
        for message in &details.messages {
            writeln!(out, "    Message: {}", message).map_err(HarnessError::report)?;
        }
        if !details.trace.is_empty() {
            writeln!(out, "    Trace: {}", details.trace.join(" <- "))
                .map_err(HarnessError::report)?;
        }
    }
    write_captured_output(result, out)
}

fn write_xpass_block(
    name: &str,
    result: &TestResult,
    config: &ReportConfig,
    out: &mut dyn Write,
) -> Result<(), HarnessError> {
    writeln!(
        out,
        "{}: {}",
        config.colorize("Unexpectedly Passed", RED),
        name
    )
    .map_err(HarnessError::report)?;
    if let Some(details) = &result.details {
        for message in &details.messages {
            writeln!(out, "    {}", message).map_err(HarnessError::report)?;
        }
    }
    write_captured_output(result, out)
}

fn write_captured_output(result: &TestResult, out: &mut dyn Write) -> Result<(), HarnessError> {
    if !result.stdout.is_empty() {
        writeln!(out, "    --- captured stdout ---").map_err(HarnessError::report)?;
        for line in result.stdout.lines() {
            writeln!(out, "    {}", line).map_err(HarnessError::report)?;
        }
    }
    if !result.stderr.is_empty() {
        writeln!(out, "    --- captured stderr ---").map_err(HarnessError::report)?;
        for line in result.stderr.lines() {
            writeln!(out, "    {}", line).map_err(HarnessError::report)?;
        }
    }
    for warning in &result.warnings {
        writeln!(out, "    warning: {}", warning).map_err(HarnessError::report)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::ErrorDetails;

    fn result(kind: OutcomeKind) -> TestResult {
        TestResult {
            kind,
            details: None,
            stdout: String::new(),
            stderr: String::new(),
            warnings: Vec::new(),
        }
    }

    fn plain_config(strict_xpass: bool) -> ReportConfig {
        ReportConfig {
            strict_xpass,
            use_colors: false,
        }
    }

    #[test]
    fn strict_mode_folds_xpass_into_failures() {
        let results: ResultMap = vec![
            ("m::test_a".into(), result(OutcomeKind::Failure)),
            ("m::test_b".into(), result(OutcomeKind::XPass)),
            ("m::test_c".into(), result(OutcomeKind::Success)),
        ];
        let lax = summarize(&results, false);
        assert_eq!((lax.failure, lax.xpass), (1, 1));
        let strict = summarize(&results, true);
        assert_eq!(strict.failure, lax.failure + lax.xpass);
        assert_eq!(strict.xpass, 0);
        // folding never changes the total
        assert_eq!(lax.total(), 3);
        assert_eq!(strict.total(), 3);
    }

    #[test]
    fn clean_run_renders_only_counts() {
        let results: ResultMap = vec![
            ("m::test_a".into(), result(OutcomeKind::Success)),
            ("m::test_b".into(), result(OutcomeKind::Skipped)),
        ];
        let tally = summarize(&results, false);
        let mut buf = Vec::new();
        render_report(&results, &tally, &plain_config(false), &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("Ran 2 Tests"));
        assert!(text.contains("1 Passed"));
        assert!(text.contains("1 Skipped"));
        assert!(!text.contains("Failed"));
    }

    #[test]
    fn failure_block_carries_messages_and_captured_output() {
        let mut failing = result(OutcomeKind::Failure);
        failing.details = Some(ErrorDetails {
            messages: vec!["expected 2, got 1".into()],
            fault_name: None,
            trace: Vec::new(),
        });
        failing.stdout = "computing\n".into();
        let results: ResultMap = vec![("m::test_a".into(), failing)];
        let tally = summarize(&results, false);
        let mut buf = Vec::new();
        render_report(&results, &tally, &plain_config(false), &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("Failed: m::test_a"));
        assert!(text.contains("expected 2, got 1"));
        assert!(text.contains("captured stdout"));
        assert!(text.contains("computing"));
    }

    #[test]
    fn error_block_shows_fault_and_trace() {
        let mut erroring = result(OutcomeKind::Error);
        erroring.details = Some(ErrorDetails {
            messages: vec!["division by zero".into()],
            fault_name: Some("DivisionByZero".into()),
            trace: vec!["helper".into(), "test_outer".into()],
        });
        let results: ResultMap = vec![("m::test_outer".into(), erroring)];
        let tally = summarize(&results, false);
        let mut buf = Vec::new();
        render_report(&results, &tally, &plain_config(false), &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("ERROR: m::test_outer"));
        assert!(text.contains("Fault: DivisionByZero"));
        assert!(text.contains("Trace: helper <- test_outer"));
        assert!(text.contains("Failed to run due to errors"));
    }

    #[test]
    fn xpass_block_only_appears_under_strict() {
        let mut xpassed = result(OutcomeKind::XPass);
        xpassed.details = Some(ErrorDetails {
            messages: vec!["bug 42".into()],
            fault_name: None,
            trace: Vec::new(),
        });
        let results: ResultMap = vec![("m::test_fixed".into(), xpassed)];

        let lax_tally = summarize(&results, false);
        let mut buf = Vec::new();
        render_report(&results, &lax_tally, &plain_config(false), &mut buf).unwrap();
        assert!(!String::from_utf8(buf).unwrap().contains("Unexpectedly Passed: m"));

        let strict_tally = summarize(&results, true);
        let mut buf = Vec::new();
        render_report(&results, &strict_tally, &plain_config(true), &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("Unexpectedly Passed: m::test_fixed"));
        assert!(text.contains("bug 42"));
    }
}
