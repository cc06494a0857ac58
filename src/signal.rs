//! Control-flow signals and test-callable wrappers.
//!
//! A test body normally either returns or raises a runtime fault. The marker
//! variants here let a wrapped callable communicate a third kind of outcome
//! (skip, expected failure, unexpected pass) without changing its return
//! contract. The runner consumes the whole closed set in one match; markers
//! are distinguished from assertion failures and from arbitrary faults by
//! construction, so no precedence bugs are possible at classification time.

/// What kind of runtime fault a test body raised.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultKind {
    Assertion,
    UndefinedSymbol,
    TypeMismatch,
    ArityMismatch,
    DivisionByZero,
    RecursionLimit,
}

impl FaultKind {
    pub fn name(&self) -> &'static str {
        match self {
            FaultKind::Assertion => "AssertionFailure",
            FaultKind::UndefinedSymbol => "UndefinedSymbol",
            FaultKind::TypeMismatch => "TypeMismatch",
            FaultKind::ArityMismatch => "ArityMismatch",
            FaultKind::DivisionByZero => "DivisionByZero",
            FaultKind::RecursionLimit => "RecursionLimit",
        }
    }
}

/// A runtime fault raised while evaluating a test body, with the call trace
/// accumulated as it propagated (innermost frame last).
#[derive(Debug, Clone, PartialEq)]
pub struct Fault {
    pub kind: FaultKind,
    pub messages: Vec<String>,
    pub trace: Vec<String>,
}

impl Fault {
    pub fn new(kind: FaultKind, messages: Vec<String>) -> Self {
        Self {
            kind,
            messages,
            trace: Vec::new(),
        }
    }

    pub fn assertion(messages: Vec<String>) -> Self {
        Self::new(FaultKind::Assertion, messages)
    }

    pub fn undefined_symbol(symbol: &str) -> Self {
        Self::new(
            FaultKind::UndefinedSymbol,
            vec![format!("undefined symbol '{}'", symbol)],
        )
    }

    pub fn type_mismatch(operation: &str, expected: &str, actual: &str) -> Self {
        Self::new(
            FaultKind::TypeMismatch,
            vec![format!(
                "{}: expected {}, got {}",
                operation, expected, actual
            )],
        )
    }

    pub fn arity_mismatch(operation: &str, expected: &str, actual: usize) -> Self {
        Self::new(
            FaultKind::ArityMismatch,
            vec![format!(
                "{}: expected {} arguments, got {}",
                operation, expected, actual
            )],
        )
    }

    pub fn division_by_zero() -> Self {
        Self::new(FaultKind::DivisionByZero, vec!["division by zero".into()])
    }

    /// Record a calling frame as the fault unwinds.
    pub fn push_frame(mut self, name: &str) -> Self {
        self.trace.push(name.to_string());
        self
    }
}

/// Marker signals produced by the wrapper subsystem. A three-member closed
/// set, consumed only by the runner's classification step.
#[derive(Debug, Clone, PartialEq)]
pub enum Marker {
    Skip {
        reason: String,
    },
    ExpectedFailure {
        reason: String,
        messages: Vec<String>,
    },
    UnexpectedSuccess {
        reason: String,
    },
}

/// Everything a test invocation can raise instead of completing.
#[derive(Debug, Clone, PartialEq)]
pub enum TestSignal {
    /// A failed truth-check, with its message arguments.
    Failure {
        messages: Vec<String>,
        trace: Vec<String>,
    },
    /// A marker raised by a wrapper.
    Marked(Marker),
    /// Any other runtime fault.
    Fault(Fault),
}

impl From<Fault> for TestSignal {
    fn from(fault: Fault) -> Self {
        match fault.kind {
            FaultKind::Assertion => TestSignal::Failure {
                messages: fault.messages,
                trace: fault.trace,
            },
            _ => TestSignal::Fault(fault),
        }
    }
}

/// A zero-argument test body, ready to invoke exactly once.
pub type TestCallable = Box<dyn FnOnce() -> Result<(), TestSignal>>;

/// Unconditionally replace `_test` with a callable that raises the skip
/// marker. The original body never runs.
pub fn skip(reason: impl Into<String>, _test: TestCallable) -> TestCallable {
    let reason = reason.into();
    Box::new(move || Err(TestSignal::Marked(Marker::Skip { reason })))
}

/// Skip only when `condition` holds at wrap time; otherwise the callable is
/// returned unmodified.
pub fn skipif(condition: bool, reason: impl Into<String>, test: TestCallable) -> TestCallable {
    if condition {
        skip(reason, test)
    } else {
        test
    }
}

/// Mark a test as expected to fail. When `condition` holds, an assertion
/// failure in the body becomes the expected-failure marker (carrying the
/// reason plus the original failure's messages) and a clean pass becomes the
/// unexpected-success marker. Non-assertion faults pass through untouched.
pub fn xfail(condition: bool, reason: impl Into<String>, test: TestCallable) -> TestCallable {
    if !condition {
        return test;
    }
    let reason = reason.into();
    Box::new(move || match test() {
        Ok(()) => Err(TestSignal::Marked(Marker::UnexpectedSuccess { reason })),
        Err(TestSignal::Failure { messages, .. }) => Err(TestSignal::Marked(
            Marker::ExpectedFailure { reason, messages },
        )),
        Err(other) => Err(other),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn passing() -> TestCallable {
        Box::new(|| Ok(()))
    }

    fn failing(msg: &str) -> TestCallable {
        let msg = msg.to_string();
        Box::new(move || {
            Err(TestSignal::Failure {
                messages: vec![msg],
                trace: vec![],
            })
        })
    }

    #[test]
    fn skip_never_runs_the_body() {
        let wrapped = skip(
            "not ready",
            Box::new(|| -> Result<(), TestSignal> { panic!("body must not run") }) as TestCallable,
        );
        match wrapped() {
            Err(TestSignal::Marked(Marker::Skip { reason })) => assert_eq!(reason, "not ready"),
            other => panic!("expected skip marker, got {:?}", other),
        }
    }

    #[test]
    fn skipif_false_is_identity() {
        let wrapped = skipif(false, "unused", passing());
        assert!(wrapped().is_ok());
    }

    #[test]
    fn xfail_turns_failure_into_expected_failure() {
        let wrapped = xfail(true, "known bug", failing("1 != 2"));
        match wrapped() {
            Err(TestSignal::Marked(Marker::ExpectedFailure { reason, messages })) => {
                assert_eq!(reason, "known bug");
                assert_eq!(messages, vec!["1 != 2".to_string()]);
            }
            other => panic!("expected xfail marker, got {:?}", other),
        }
    }

    #[test]
    fn xfail_turns_pass_into_unexpected_success() {
        let wrapped = xfail(true, "known bug", passing());
        match wrapped() {
            Err(TestSignal::Marked(Marker::UnexpectedSuccess { reason })) => {
                assert_eq!(reason, "known bug")
            }
            other => panic!("expected xpass marker, got {:?}", other),
        }
    }

    #[test]
    fn xfail_lets_other_faults_through() {
        let wrapped = xfail(
            true,
            "known bug",
            Box::new(|| Err(TestSignal::Fault(Fault::division_by_zero()))) as TestCallable,
        );
        assert!(matches!(wrapped(), Err(TestSignal::Fault(_))));
    }

    #[test]
    fn xfail_false_is_identity() {
        let wrapped = xfail(false, "unused", failing("boom"));
        assert!(matches!(wrapped(), Err(TestSignal::Failure { .. })));
    }

    #[test]
    fn assertion_fault_converts_to_failure_signal() {
        let signal: TestSignal = Fault::assertion(vec!["msg".into()]).into();
        assert!(matches!(signal, TestSignal::Failure { .. }));
        let signal: TestSignal = Fault::division_by_zero().into();
        assert!(matches!(signal, TestSignal::Fault(_)));
    }
}
