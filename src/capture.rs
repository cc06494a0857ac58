//! Per-invocation output capture.
//!
//! Every test invocation gets a fresh capture region: two text buffers for
//! the script's stdout and stderr channels and a list of recorded warnings.
//! The region is created immediately before the invocation, shared with the
//! evaluator through a cheap handle, and drained exactly once on every exit
//! path. Nothing outlives the invocation, so one test's output can never
//! bleed into a sibling's record.

use std::cell::RefCell;
use std::rc::Rc;

#[derive(Debug, Default)]
struct CaptureBuffers {
    stdout: String,
    stderr: String,
    warnings: Vec<String>,
}

/// Shared handle to the capture region for a single test invocation.
#[derive(Clone, Default)]
pub struct SharedCapture(Rc<RefCell<CaptureBuffers>>);

impl SharedCapture {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a line to the captured stdout channel.
    pub fn emit_out(&self, text: &str) {
        let mut buffers = self.0.borrow_mut();
        buffers.stdout.push_str(text);
        buffers.stdout.push('\n');
    }

    /// Append a line to the captured stderr channel.
    pub fn emit_err(&self, text: &str) {
        let mut buffers = self.0.borrow_mut();
        buffers.stderr.push_str(text);
        buffers.stderr.push('\n');
    }

    /// Record a runtime warning.
    pub fn warn(&self, text: &str) {
        self.0.borrow_mut().warnings.push(text.to_string());
    }

    /// Take everything captured so far, leaving the region empty.
    pub fn drain(&self) -> (String, String, Vec<String>) {
        let mut buffers = self.0.borrow_mut();
        (
            std::mem::take(&mut buffers.stdout),
            std::mem::take(&mut buffers.stderr),
            std::mem::take(&mut buffers.warnings),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channels_stay_separate() {
        let capture = SharedCapture::new();
        capture.emit_out("to stdout");
        capture.emit_err("to stderr");
        capture.warn("careful");
        let (stdout, stderr, warnings) = capture.drain();
        assert_eq!(stdout, "to stdout\n");
        assert_eq!(stderr, "to stderr\n");
        assert_eq!(warnings, vec!["careful".to_string()]);
    }

    #[test]
    fn drain_empties_the_region() {
        let capture = SharedCapture::new();
        capture.emit_out("once");
        capture.drain();
        let (stdout, _, _) = capture.drain();
        assert!(stdout.is_empty());
    }

    #[test]
    fn clones_share_the_same_region() {
        let capture = SharedCapture::new();
        let handle = capture.clone();
        handle.emit_out("written through clone");
        let (stdout, _, _) = capture.drain();
        assert_eq!(stdout, "written through clone\n");
    }
}
