//! smalltest: a minimal test harness for small s-expression test scripts.
//!
//! The pipeline is discovery, loading, execution, classification, and
//! aggregation. `discovery` statically finds test files and functions,
//! `loader` turns each file into an isolated runnable unit, `runner`
//! executes one test at a time and classifies its signal into an outcome,
//! and `report` folds the outcomes into the final tally and report.

pub mod ast;
pub mod atoms;
pub mod capture;
pub mod cli;
pub mod coverage;
pub mod discovery;
pub mod errors;
pub mod eval;
pub mod loader;
pub mod report;
pub mod runner;
pub mod signal;
pub mod syntax;
pub mod value;

pub use errors::HarnessError;
