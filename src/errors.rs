//! Harness-level error handling.
//!
//! Per-test faults never appear here; they are contained into outcome records
//! by the runner. `HarnessError` covers the faults of the harness itself:
//! discovery (unreadable trees, malformed scripts), module loading, and
//! report rendering. Every variant carries enough context to diagnose the
//! tooling failure, distinct from a failing test.

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Which stage of the harness failed. Drives process exit-code mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorStage {
    Discovery,
    Load,
    Report,
}

#[derive(Debug, Error, Diagnostic)]
pub enum HarnessError {
    /// A test file could not be parsed. Raised at discovery time, before any
    /// test executes.
    #[error("failed to parse {path}: {message}")]
    #[diagnostic(code(smalltest::discovery::parse))]
    Parse {
        message: String,
        path: String,
        #[source_code]
        src: NamedSource<String>,
        #[label("{message}")]
        span: SourceSpan,
    },

    /// A test file could not be read from disk.
    #[error("failed to read {path}")]
    #[diagnostic(code(smalltest::discovery::read))]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The directory walk itself failed.
    #[error("failed to walk {path}: {message}")]
    #[diagnostic(code(smalltest::discovery::walk))]
    Walk { path: String, message: String },

    /// A file pattern could not be compiled into a matcher.
    #[error("invalid file pattern '{pattern}': {message}")]
    #[diagnostic(code(smalltest::discovery::pattern))]
    Pattern { pattern: String, message: String },

    /// A discovered module could not be loaded into a runnable unit. This
    /// aborts the remainder of the run; it is never a per-test outcome.
    #[error("failed to load module '{module}': {message}")]
    #[diagnostic(code(smalltest::load))]
    Load {
        module: String,
        message: String,
        #[source_code]
        src: NamedSource<String>,
        #[label("{message}")]
        span: SourceSpan,
    },

    /// A function discovery recorded is no longer present in the loaded
    /// unit. Discovery and loading parse the same source, so this only
    /// happens when the file changes between the two stages.
    #[error("module '{module}' has no function '{function}'")]
    #[diagnostic(code(smalltest::load::missing))]
    Missing { module: String, function: String },

    /// Writing the progress stream or the final report failed.
    #[error("failed to write report")]
    #[diagnostic(code(smalltest::report))]
    Report {
        #[source]
        source: std::io::Error,
    },
}

impl HarnessError {
    pub fn stage(&self) -> ErrorStage {
        match self {
            HarnessError::Parse { .. }
            | HarnessError::Read { .. }
            | HarnessError::Walk { .. }
            | HarnessError::Pattern { .. } => ErrorStage::Discovery,
            HarnessError::Load { .. } | HarnessError::Missing { .. } => ErrorStage::Load,
            HarnessError::Report { .. } => ErrorStage::Report,
        }
    }

    pub(crate) fn report(source: std::io::Error) -> Self {
        HarnessError::Report { source }
    }

    pub(crate) fn missing_function(module: &str, function: &str) -> Self {
        HarnessError::Missing {
            module: module.to_string(),
            function: function.to_string(),
        }
    }
}
