//! Test execution and outcome classification.
//!
//! `run_test` drives a single callable and folds its signal into exactly one
//! `OutcomeKind`; classification happens here and nowhere else. Each test
//! runs against its own capture handle, so output from one invocation can
//! never bleed into a neighbour's record.

use std::io::Write;

use crate::capture::SharedCapture;
use crate::discovery::TestMap;
use crate::errors::HarnessError;
use crate::loader::ModuleLoader;
use crate::signal::{Marker, TestCallable, TestSignal};

/// The closed set of outcomes a test can land in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeKind {
    /// Ran to completion with no assertion failure.
    Success,
    /// An assertion did not hold.
    Failure,
    /// Failed, and was expected to fail.
    XFail,
    /// Passed, but was expected to fail.
    XPass,
    /// Never ran; a skip marker fired.
    Skipped,
    /// Aborted by a runtime fault that is not an assertion failure.
    Error,
}

impl OutcomeKind {
    pub fn label(&self) -> &'static str {
        match self {
            OutcomeKind::Success => "Success",
            OutcomeKind::Failure => "Failure",
            OutcomeKind::XFail => "XFailed",
            OutcomeKind::XPass => "XPassed",
            OutcomeKind::Skipped => "Skipped",
            OutcomeKind::Error => "ERROR",
        }
    }
}

/// Diagnostic payload attached to non-Success outcomes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ErrorDetails {
    pub messages: Vec<String>,
    pub fault_name: Option<String>,
    pub trace: Vec<String>,
}

impl ErrorDetails {
    fn from_messages(messages: Vec<String>) -> Self {
        ErrorDetails {
            messages,
            ..Default::default()
        }
    }
}

/// Everything recorded about one test invocation.
#[derive(Debug, Clone)]
pub struct TestResult {
    pub kind: OutcomeKind,
    pub details: Option<ErrorDetails>,
    pub stdout: String,
    pub stderr: String,
    pub warnings: Vec<String>,
}

/// Ordered results keyed by qualified test name.
pub type ResultMap = Vec<(String, TestResult)>;

/// Run one callable and classify its signal.
pub fn run_test(callable: TestCallable, capture: &SharedCapture) -> TestResult {
    let (kind, details) = match callable() {
        Ok(()) => (OutcomeKind::Success, None),
        Err(TestSignal::Failure { messages, trace }) => (
            OutcomeKind::Failure,
            Some(ErrorDetails {
                messages,
                fault_name: None,
                trace,
            }),
        ),
        Err(TestSignal::Marked(Marker::Skip { reason })) => (
            OutcomeKind::Skipped,
            Some(ErrorDetails::from_messages(vec![reason])),
        ),
        Err(TestSignal::Marked(Marker::ExpectedFailure { reason, messages })) => {
            let mut all = vec![reason];
            all.extend(messages);
            (OutcomeKind::XFail, Some(ErrorDetails::from_messages(all)))
        }
        Err(TestSignal::Marked(Marker::UnexpectedSuccess { reason })) => (
            OutcomeKind::XPass,
            Some(ErrorDetails::from_messages(vec![reason])),
        ),
        Err(TestSignal::Fault(fault)) => (
            OutcomeKind::Error,
            Some(ErrorDetails {
                fault_name: Some(fault.kind.name().to_string()),
                messages: fault.messages,
                trace: fault.trace,
            }),
        ),
    };
    let (stdout, stderr, warnings) = capture.drain();
    TestResult {
        kind,
        details,
        stdout,
        stderr,
        warnings,
    }
}

/// Run every discovered test in order, one at a time, writing progress to
/// `out`. A missing function or unloadable module aborts the whole run with
/// a harness error rather than producing a per-test record.
pub fn run_tests_serial(
    tests: &TestMap,
    out: &mut dyn Write,
) -> Result<ResultMap, HarnessError> {
    let total: usize = tests.iter().map(|(_, names)| names.len()).sum();
    let banner = format!(
        "Smalltest: running {} tests from {} modules",
        total,
        tests.len()
    );
    let rule = "=".repeat(banner.len());
    writeln!(out, "{rule}").map_err(HarnessError::report)?;
    writeln!(out, "{banner}").map_err(HarnessError::report)?;
    writeln!(out, "{rule}").map_err(HarnessError::report)?;

    let mut loader = ModuleLoader::new();
    let mut results = ResultMap::new();
    let mut index = 0usize;
    for (file, names) in tests {
        let unit = loader.load(file)?;
        for name in names {
            index += 1;
            let capture = SharedCapture::new();
            let callable = unit.callable_for(name, capture.clone()).ok_or_else(|| {
                HarnessError::missing_function(&file.module_id, name)
            })?;
            let qualified = format!("{}::{}", file.module_id, name);
            let result = run_test(callable, &capture);
            let suffix = match (result.kind, &result.details) {
                (OutcomeKind::Skipped, Some(details)) => {
                    format!(" / {}", details.messages.join("; "))
                }
                _ => String::new(),
            };
            writeln!(
                out,
                "[{index}/{total}] {qualified} - {}{suffix}",
                result.kind.label()
            )
            .map_err(HarnessError::report)?;
            results.push((qualified, result));
        }
    }
    writeln!(out, "{rule}").map_err(HarnessError::report)?;
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::Fault;

    fn ok_test() -> TestCallable {
        Box::new(|| Ok(()))
    }

    #[test]
    fn success_has_no_details() {
        let capture = SharedCapture::new();
        let result = run_test(ok_test(), &capture);
        assert_eq!(result.kind, OutcomeKind::Success);
        assert!(result.details.is_none());
    }

    #[test]
    fn assertion_failure_classifies_as_failure() {
        let capture = SharedCapture::new();
        let test: TestCallable =
            Box::new(|| Err(Fault::assertion(vec!["1 is not 2".into()]).into()));
        let result = run_test(test, &capture);
        assert_eq!(result.kind, OutcomeKind::Failure);
        let details = result.details.unwrap();
        assert_eq!(details.messages, vec!["1 is not 2"]);
        assert!(details.fault_name.is_none());
    }

    #[test]
    fn non_assertion_fault_classifies_as_error() {
        let capture = SharedCapture::new();
        let test: TestCallable = Box::new(|| {
            Err(Fault::division_by_zero().push_frame("test_div").into())
        });
        let result = run_test(test, &capture);
        assert_eq!(result.kind, OutcomeKind::Error);
        let details = result.details.unwrap();
        assert_eq!(details.fault_name.as_deref(), Some("DivisionByZero"));
        assert_eq!(details.trace, vec!["test_div"]);
    }

    #[test]
    fn markers_map_to_their_outcomes() {
        let capture = SharedCapture::new();
        let skipped = crate::signal::skip("not today", ok_test());
        assert_eq!(run_test(skipped, &capture).kind, OutcomeKind::Skipped);

        let xpassed = crate::signal::xfail(true, "bug 42", ok_test());
        assert_eq!(run_test(xpassed, &capture).kind, OutcomeKind::XPass);

        let failing: TestCallable =
            Box::new(|| Err(Fault::assertion(vec!["boom".into()]).into()));
        let xfailed = crate::signal::xfail(true, "bug 42", failing);
        let result = run_test(xfailed, &capture);
        assert_eq!(result.kind, OutcomeKind::XFail);
        let messages = result.details.unwrap().messages;
        assert_eq!(messages, vec!["bug 42", "boom"]);
    }

    #[test]
    fn capture_is_drained_per_invocation() {
        let capture = SharedCapture::new();
        capture.emit_out("from A");
        let first = run_test(ok_test(), &capture);
        assert_eq!(first.stdout, "from A\n");

        capture.emit_out("from B");
        let second = run_test(ok_test(), &capture);
        assert_eq!(second.stdout, "from B\n");
    }
}
