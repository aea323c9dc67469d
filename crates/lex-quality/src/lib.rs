//! Data Quality Analysis Engine
//!
//! Profiles a tabular dataset, runs a suite of independent quality
//! detectors over it and folds their results into a single 0-100 health
//! score and a structured, JSON-serializable report.
//!
//! # Overview
//!
//! - **Profiling**: per-column type inference (numeric, categorical, date,
//!   text), missing/distinct counts and numeric statistics
//! - **Detectors**: missing values, duplicate rows, class imbalance,
//!   outliers, type consistency, date formats, categorical consistency
//! - **Health Score**: weighted sub-scores with penalties, re-normalized
//!   when a detector is unavailable
//! - **Run Control**: cancellation, time budget, row/column limits and
//!   progress reporting
//!
//! Analysis is a pure function of the dataset and the configuration: two
//! runs over the same input produce identical reports apart from
//! `report_id`.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use lex_quality::{Analyzer, AnalysisConfig, load_csv};
//!
//! let dataset = load_csv("data.csv")?;
//!
//! let report = Analyzer::builder()
//!     .config(AnalysisConfig::builder().max_rows(1_000_000).build()?)
//!     .build()?
//!     .analyze(&dataset)?;
//!
//! println!("Health: {} ({})", report.health_score, report.health_label);
//! println!("{}", report.to_json_pretty()?);
//! ```
//!
//! # Custom Detectors
//!
//! A [`Detector`] returns one report section and a [`ScoreSignal`]. Passing
//! one to [`AnalyzerBuilder::detector`] replaces the built-in detector of
//! the same [`DetectorKind`]; the aggregator needs no changes.
//!
//! # Services
//!
//! Hosts that keep datasets and reports elsewhere implement
//! [`DatasetLoader`] and [`ReportStore`] and drive the engine through
//! [`AnalysisService`]:
//!
//! ```rust,ignore
//! use lex_quality::{AnalysisService, Analyzer, CsvDirectoryLoader, JsonFileReportStore};
//! use std::sync::Arc;
//!
//! let service = AnalysisService::new(
//!     Arc::new(CsvDirectoryLoader::new("data/")),
//!     Arc::new(JsonFileReportStore::new("reports/")),
//!     Analyzer::builder().build()?,
//! );
//! let report = service.analyze_dataset("customers")?;
//! ```

pub mod config;
pub mod dataset;
pub mod detectors;
pub mod error;
pub mod loader;
pub mod pipeline;
pub mod profiler;
pub mod report;
pub mod scoring;
pub mod service;
pub mod types;
pub mod utils;

// Re-exports for convenient access
pub use config::{
    AnalysisConfig, AnalysisConfigBuilder, ConfigValidationError, OutlierMethod, ResourceLimits,
    ScoreWeights, ScoringConfig,
};
pub use dataset::{Column, Dataset};
pub use detectors::{AnalysisContext, Detector, DetectorKind, DetectorResult, Section};
pub use error::{QualityError, Result as QualityResult, ResultExt};
pub use loader::{CsvDirectoryLoader, load_csv, parse_csv};
pub use pipeline::{
    AnalysisStage, Analyzer, AnalyzerBuilder, CancellationToken, ClosureProgressReporter,
    ProgressReporter, ProgressUpdate, RunGuard, analyze,
};
pub use profiler::DataProfiler;
pub use report::{Report, ReportAssembler, SectionResult};
pub use scoring::{HealthLabel, HealthScore, HealthScoreAggregator, ScoreBreakdown, ScoreSignal};
pub use service::{
    AnalysisService, DatasetLoader, InMemoryReportStore, JsonFileReportStore, ReportRenderer,
    ReportStore,
};
pub use types::{ColumnProfile, DatasetProfile, InferredType, NumericStats};
pub use utils::CellParser;
