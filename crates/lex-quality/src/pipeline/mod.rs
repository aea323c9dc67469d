//! Pipeline module.
//!
//! This module provides the analyzer that drives one analysis run and the
//! run-control types it shares with collaborators.

mod analyzer;
mod cancellation;
pub mod progress;

pub use analyzer::{Analyzer, AnalyzerBuilder, analyze};
pub use cancellation::{CancellationToken, RunGuard};
pub use progress::{AnalysisStage, ClosureProgressReporter, ProgressReporter, ProgressUpdate};
