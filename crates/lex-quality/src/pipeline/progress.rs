//! Progress reporting for an analysis run.
//!
//! Collaborators that show progress (a desktop shell, a CLI spinner) register
//! a [`ProgressReporter`] on the [`Analyzer`](crate::Analyzer) builder and
//! receive one [`ProgressUpdate`] per stage boundary and per finished detector.

use serde::{Deserialize, Serialize};

/// Stages of an analysis run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisStage {
    /// Validating the input and limits
    Initializing,
    /// Inferring column types and base statistics
    Profiling,
    /// Running the detector suite
    Detecting,
    /// Computing the health score and assembling the report
    Scoring,
    Complete,
    Cancelled,
    Failed,
}

impl AnalysisStage {
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Initializing => "Initializing",
            Self::Profiling => "Profiling Dataset",
            Self::Detecting => "Running Detectors",
            Self::Scoring => "Scoring",
            Self::Complete => "Complete",
            Self::Cancelled => "Cancelled",
            Self::Failed => "Failed",
        }
    }

    /// Share of the whole run spent in this stage (0.0 - 1.0).
    pub fn weight(&self) -> f32 {
        match self {
            Self::Initializing => 0.05,
            Self::Profiling => 0.35,
            Self::Detecting => 0.50,
            Self::Scoring => 0.10,
            Self::Complete | Self::Cancelled | Self::Failed => 0.0,
        }
    }

    /// Cumulative progress at the start of this stage.
    pub fn base_progress(&self) -> f32 {
        match self {
            Self::Initializing => 0.0,
            Self::Profiling => 0.05,
            Self::Detecting => 0.40,
            Self::Scoring => 0.90,
            Self::Complete => 1.0,
            Self::Cancelled | Self::Failed => 0.0,
        }
    }
}

/// One progress notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressUpdate {
    pub stage: AnalysisStage,

    /// Fraction of the whole run completed, in [0, 1]
    pub progress: f32,

    /// Progress within the current stage (0.0 - 1.0)
    pub stage_progress: f32,

    pub message: String,

    /// Detectors finished so far, during [`AnalysisStage::Detecting`]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items_processed: Option<usize>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub items_total: Option<usize>,
}

impl ProgressUpdate {
    pub fn new(stage: AnalysisStage, stage_progress: f32, message: impl Into<String>) -> Self {
        let stage_progress = stage_progress.clamp(0.0, 1.0);
        let progress = stage.base_progress() + stage.weight() * stage_progress;
        Self {
            stage,
            progress: progress.clamp(0.0, 1.0),
            stage_progress,
            message: message.into(),
            items_processed: None,
            items_total: None,
        }
    }

    /// Progress update carrying item counts.
    pub fn with_items(
        stage: AnalysisStage,
        current: usize,
        total: usize,
        message: impl Into<String>,
    ) -> Self {
        let stage_progress = if total > 0 {
            current as f32 / total as f32
        } else {
            0.0
        };
        Self {
            items_processed: Some(current),
            items_total: Some(total),
            ..Self::new(stage, stage_progress, message)
        }
    }

    pub fn complete(message: impl Into<String>) -> Self {
        Self::new(AnalysisStage::Complete, 1.0, message)
    }

    pub fn cancelled() -> Self {
        Self::new(AnalysisStage::Cancelled, 0.0, "Analysis cancelled")
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self::new(AnalysisStage::Failed, 0.0, message)
    }
}

static_assertions::assert_impl_all!(ProgressUpdate: Send, Sync);

/// Receives progress updates during an analysis.
///
/// Detectors run on the rayon pool, so `report` may be called from several
/// threads at once.
pub trait ProgressReporter: Send + Sync {
    fn report(&self, update: ProgressUpdate);
}

/// [`ProgressReporter`] backed by a closure.
pub struct ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    callback: F,
}

impl<F> ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    pub fn new(callback: F) -> Self {
        Self { callback }
    }
}

impl<F> ProgressReporter for ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    fn report(&self, update: ProgressUpdate) {
        (self.callback)(update);
    }
}
