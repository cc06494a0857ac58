//! Optional coverage collaborator.
//!
//! The runner owns the lifecycle: start before the first test, stop after
//! the last, and append the coverage section to the report only when the
//! run finished fully clean. The harness itself is never measured.

use std::io::Write;

use crate::errors::HarnessError;

/// A measurement collaborator driven around the test run.
pub trait CoverageHook {
    /// Called once, before any test executes.
    fn start(&mut self);

    /// Called once, after the last test finishes, regardless of outcomes.
    fn stop(&mut self);

    /// Append the coverage section to the report. Only invoked after a
    /// fully clean run.
    fn report(&mut self, out: &mut dyn Write) -> Result<(), HarnessError>;
}

/// The default collaborator: measures nothing, reports nothing.
#[derive(Debug, Default)]
pub struct NoCoverage;

impl CoverageHook for NoCoverage {
    fn start(&mut self) {}

    fn stop(&mut self) {}

    fn report(&mut self, _out: &mut dyn Write) -> Result<(), HarnessError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_coverage_writes_nothing() {
        let mut hook = NoCoverage;
        hook.start();
        hook.stop();
        let mut buf = Vec::new();
        hook.report(&mut buf).unwrap();
        assert!(buf.is_empty());
    }
}
