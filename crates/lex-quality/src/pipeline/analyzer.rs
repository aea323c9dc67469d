//! Main analysis pipeline.
//!
//! Dataset → profiler → detectors (fan-out) → health score → report.

use crate::config::AnalysisConfig;
use crate::dataset::Dataset;
use crate::detectors::{
    AnalysisContext, Detector, DetectorKind, DetectorResult, Section, default_detectors,
};
use crate::error::{QualityError, Result};
use crate::pipeline::cancellation::{CancellationToken, RunGuard};
use crate::pipeline::progress::{
    AnalysisStage, ClosureProgressReporter, ProgressReporter, ProgressUpdate,
};
use crate::profiler::DataProfiler;
use crate::report::{Report, ReportAssembler};
use crate::scoring::{HealthScoreAggregator, ScoreSignal};
use crate::utils::CellParser;
use rayon::prelude::*;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, error, info, warn};

/// The data quality analyzer.
///
/// Use [`Analyzer::builder()`] to configure one. An analyzer holds only
/// read-only configuration and can run any number of analyses, from any
/// number of threads; nothing is cached between runs.
///
/// # Example
///
/// ```rust,ignore
/// use lex_quality::{Analyzer, AnalysisConfig, Dataset};
///
/// let analyzer = Analyzer::builder()
///     .config(AnalysisConfig::builder().max_rows(1_000_000).build()?)
///     .on_progress(|update| {
///         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
///     })
///     .build()?;
///
/// let report = analyzer.analyze(&dataset)?;
/// println!("{} ({})", report.health_score, report.health_label);
/// ```
pub struct Analyzer {
    config: AnalysisConfig,
    detectors: Vec<Arc<dyn Detector>>,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
    cancellation_token: CancellationToken,
}

static_assertions::assert_impl_all!(Analyzer: Send, Sync);

impl Analyzer {
    pub fn builder() -> AnalyzerBuilder {
        AnalyzerBuilder::default()
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Kinds of the configured detectors, in report order.
    pub fn detector_kinds(&self) -> Vec<DetectorKind> {
        self.detectors.iter().map(|d| d.kind()).collect()
    }

    /// Analyze a dataset and produce a new report.
    ///
    /// # Errors
    ///
    /// - [`QualityError::InvalidInput`] for a dataset without rows or columns
    /// - [`QualityError::ResourceExceeded`] when a configured limit is hit
    /// - [`QualityError::Cancelled`] when the cancellation token fires
    ///
    /// A failing detector does not fail the analysis; its section is marked
    /// unavailable instead.
    pub fn analyze(&self, dataset: &Dataset) -> Result<Report> {
        match self.analyze_internal(dataset) {
            Ok(report) => {
                self.report_progress(ProgressUpdate::complete(format!(
                    "Health score {} ({})",
                    report.health_score, report.health_label
                )));
                Ok(report)
            }
            Err(e) => {
                if e.is_cancelled() {
                    self.report_progress(ProgressUpdate::cancelled());
                } else {
                    self.report_progress(ProgressUpdate::failed(e.to_string()));
                }
                error!("Analysis error: {}", e);
                Err(e)
            }
        }
    }

    fn report_progress(&self, update: ProgressUpdate) {
        if let Some(reporter) = &self.progress_reporter {
            reporter.report(update);
        }
    }

    /// Reject inputs the engine cannot or may not analyze.
    fn check_input(&self, dataset: &Dataset) -> Result<()> {
        if dataset.width() == 0 {
            return Err(QualityError::InvalidInput(
                "dataset has no columns".to_string(),
            ));
        }
        if dataset.height() == 0 {
            return Err(QualityError::InvalidInput("dataset has no rows".to_string()));
        }

        let limits = &self.config.limits;
        if let Some(max_rows) = limits.max_rows
            && dataset.height() > max_rows
        {
            return Err(QualityError::resource_exceeded(
                "max_rows",
                max_rows as u64,
                dataset.height() as u64,
            ));
        }
        if let Some(max_columns) = limits.max_columns
            && dataset.width() > max_columns
        {
            return Err(QualityError::resource_exceeded(
                "max_columns",
                max_columns as u64,
                dataset.width() as u64,
            ));
        }
        Ok(())
    }

    fn analyze_internal(&self, dataset: &Dataset) -> Result<Report> {
        self.report_progress(ProgressUpdate::new(
            AnalysisStage::Initializing,
            0.0,
            "Validating dataset...",
        ));
        self.check_input(dataset)?;

        info!(
            "Starting analysis of {} rows x {} columns",
            dataset.height(),
            dataset.width()
        );
        let guard = RunGuard::new(
            self.cancellation_token.clone(),
            self.config.limits.time_budget_ms,
        );
        guard.check()?;

        // Step 1: Profile
        self.report_progress(ProgressUpdate::new(
            AnalysisStage::Profiling,
            0.0,
            "Profiling columns...",
        ));
        let parser = CellParser::from_config(&self.config);
        let profile = DataProfiler::profile_dataset(dataset, &parser, &self.config, &guard)?;
        debug!(
            "Profiled {} columns in {:?}",
            profile.total_columns,
            guard.elapsed()
        );
        guard.check()?;

        // Step 2: Detectors
        self.report_progress(ProgressUpdate::new(
            AnalysisStage::Detecting,
            0.0,
            "Running detectors...",
        ));
        let ctx = AnalysisContext {
            dataset,
            profile: &profile,
            parser: &parser,
            config: &self.config,
            guard: &guard,
        };
        let outcomes = self.run_detectors(&ctx);

        let mut sections: Vec<Section> = Vec::with_capacity(outcomes.len());
        let mut signals: Vec<ScoreSignal> = Vec::with_capacity(outcomes.len());
        let mut failures: Vec<(DetectorKind, String)> = Vec::new();

        for (kind, outcome) in outcomes {
            match outcome {
                Ok(result) if result.kind() == kind => {
                    debug!("{}: {} findings", kind, result.section.finding_count());
                    signals.push(result.signal);
                    sections.push(result.section);
                }
                Ok(result) => {
                    warn!(
                        "Detector '{}' returned a '{}' section; marking unavailable",
                        kind,
                        result.kind()
                    );
                    failures.push((kind, format!("detector returned a {} section", result.kind())));
                }
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    warn!("Detector '{}' failed, section unavailable: {}", kind, e);
                    failures.push((kind, e.to_string()));
                }
            }
        }
        guard.check()?;

        // Step 3: Score and assemble
        self.report_progress(ProgressUpdate::new(
            AnalysisStage::Scoring,
            0.0,
            "Computing health score...",
        ));
        let health = HealthScoreAggregator::aggregate(&signals, &self.config.scoring);
        let report = ReportAssembler::assemble(&profile, sections, &failures, health);

        info!(
            "Analysis complete: health score {} ({}) in {:?}",
            report.health_score,
            report.health_label,
            guard.elapsed()
        );
        Ok(report)
    }

    /// Run every detector against the shared context, in report order.
    fn run_detectors(
        &self,
        ctx: &AnalysisContext<'_>,
    ) -> Vec<(DetectorKind, Result<DetectorResult>)> {
        let total = self.detectors.len();
        let finished = AtomicUsize::new(0);

        let run_one = |detector: &Arc<dyn Detector>| {
            let kind = detector.kind();
            let outcome = ctx.guard.check().and_then(|_| detector.detect(ctx));
            let done = finished.fetch_add(1, Ordering::SeqCst) + 1;
            self.report_progress(ProgressUpdate::with_items(
                AnalysisStage::Detecting,
                done,
                total,
                format!("Finished {} detector", kind),
            ));
            (kind, outcome)
        };

        if self.config.parallel {
            self.detectors.par_iter().map(run_one).collect()
        } else {
            self.detectors.iter().map(run_one).collect()
        }
    }
}

/// Analyze a dataset with the default detectors.
pub fn analyze(dataset: &Dataset, config: &AnalysisConfig) -> Result<Report> {
    Analyzer::builder()
        .config(config.clone())
        .build()?
        .analyze(dataset)
}

/// Builder for an [`Analyzer`].
#[derive(Default)]
pub struct AnalyzerBuilder {
    config: Option<AnalysisConfig>,
    detectors: Vec<Arc<dyn Detector>>,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
    cancellation_token: Option<CancellationToken>,
}

static_assertions::assert_impl_all!(AnalyzerBuilder: Send);

impl AnalyzerBuilder {
    pub fn config(mut self, config: AnalysisConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Add a detector, replacing the default detector of the same kind.
    pub fn detector(mut self, detector: Arc<dyn Detector>) -> Self {
        self.detectors.push(detector);
        self
    }

    pub fn progress_reporter(mut self, reporter: Arc<dyn ProgressReporter>) -> Self {
        self.progress_reporter = Some(reporter);
        self
    }

    /// Set a progress callback closure.
    pub fn on_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(ProgressUpdate) + Send + Sync + 'static,
    {
        self.progress_reporter = Some(Arc::new(ClosureProgressReporter::new(callback)));
        self
    }

    /// Set a cancellation token. Cancelling any clone of it stops the
    /// running analysis with [`QualityError::Cancelled`].
    pub fn cancellation_token(mut self, token: CancellationToken) -> Self {
        self.cancellation_token = Some(token);
        self
    }

    /// Build the analyzer.
    ///
    /// Returns an error if the configuration is invalid.
    pub fn build(self) -> std::result::Result<Analyzer, crate::config::ConfigValidationError> {
        let config = self.config.unwrap_or_default();
        config.validate()?;

        let mut detectors = default_detectors();
        for custom in self.detectors {
            match detectors.iter_mut().find(|d| d.kind() == custom.kind()) {
                Some(slot) => *slot = custom,
                None => detectors.push(custom),
            }
        }

        Ok(Analyzer {
            config,
            detectors,
            progress_reporter: self.progress_reporter,
            cancellation_token: self.cancellation_token.unwrap_or_default(),
        })
    }
}
