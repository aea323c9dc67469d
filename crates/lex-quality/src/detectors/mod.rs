//! Detector suite.
//!
//! Every detector implements [`Detector`]: it reads the shared, immutable
//! [`AnalysisContext`] and returns one report section plus its contribution
//! to the health score. Detectors never depend on each other, so the
//! analyzer is free to run them in any order or in parallel.

mod consistency;
mod date_format;
mod duplicates;
mod imbalance;
mod missing;
mod outliers;
mod type_consistency;

pub use consistency::CategoricalConsistencyDetector;
pub use date_format::DateFormatDetector;
pub use duplicates::DuplicateRowDetector;
pub use imbalance::ClassImbalanceDetector;
pub use missing::MissingValueDetector;
pub use outliers::OutlierDetector;
pub use type_consistency::TypeConsistencyDetector;

use crate::config::AnalysisConfig;
use crate::dataset::Dataset;
use crate::error::Result;
use crate::pipeline::RunGuard;
use crate::report::{
    CategoricalConsistencySection, ClassImbalanceSection, DataTypesSection, DateFormatsSection,
    DuplicatesSection, MissingValuesSection, OutliersSection,
};
use crate::scoring::ScoreSignal;
use crate::types::{ColumnProfile, DatasetProfile};
use crate::utils::CellParser;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

/// Identifies a detector and the report section it fills.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectorKind {
    MissingValues,
    Duplicates,
    ClassImbalance,
    Outliers,
    DataTypes,
    DateFormats,
    CategoricalConsistency,
}

impl DetectorKind {
    /// Report field name of the section.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MissingValues => "missing_values",
            Self::Duplicates => "duplicates",
            Self::ClassImbalance => "class_imbalance",
            Self::Outliers => "outliers",
            Self::DataTypes => "data_types",
            Self::DateFormats => "date_formats",
            Self::CategoricalConsistency => "categorical_consistency",
        }
    }
}

impl fmt::Display for DetectorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A filled report section.
#[derive(Debug, Clone, PartialEq)]
pub enum Section {
    MissingValues(MissingValuesSection),
    Duplicates(DuplicatesSection),
    ClassImbalance(ClassImbalanceSection),
    Outliers(OutliersSection),
    DataTypes(DataTypesSection),
    DateFormats(DateFormatsSection),
    CategoricalConsistency(CategoricalConsistencySection),
}

impl Section {
    pub fn kind(&self) -> DetectorKind {
        match self {
            Self::MissingValues(_) => DetectorKind::MissingValues,
            Self::Duplicates(_) => DetectorKind::Duplicates,
            Self::ClassImbalance(_) => DetectorKind::ClassImbalance,
            Self::Outliers(_) => DetectorKind::Outliers,
            Self::DataTypes(_) => DetectorKind::DataTypes,
            Self::DateFormats(_) => DetectorKind::DateFormats,
            Self::CategoricalConsistency(_) => DetectorKind::CategoricalConsistency,
        }
    }

    /// Number of findings in the section, for logging.
    pub fn finding_count(&self) -> usize {
        match self {
            Self::MissingValues(s) => s.details.len(),
            Self::Duplicates(s) => s.full_row_duplicates,
            Self::ClassImbalance(s) => s.details.len(),
            Self::Outliers(s) => s.details.len(),
            Self::DataTypes(s) => s.type_issues.len(),
            Self::DateFormats(s) => s.details.len(),
            Self::CategoricalConsistency(s) => {
                s.details.iter().filter(|d| d.has_inconsistency).count()
            }
        }
    }
}

/// Output of one detector run.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectorResult {
    pub section: Section,
    pub signal: ScoreSignal,
}

impl DetectorResult {
    pub fn new(section: Section, signal: ScoreSignal) -> Self {
        Self { section, signal }
    }

    pub fn kind(&self) -> DetectorKind {
        self.section.kind()
    }
}

/// Read-only inputs shared by every detector of one analysis.
pub struct AnalysisContext<'a> {
    pub dataset: &'a Dataset,
    pub profile: &'a DatasetProfile,
    pub parser: &'a CellParser,
    pub config: &'a AnalysisConfig,
    pub guard: &'a RunGuard,
}

impl<'a> AnalysisContext<'a> {
    /// Non-missing cells of a column, in row order.
    pub fn present_values(&self, column: &ColumnProfile) -> impl Iterator<Item = &'a str> {
        let parser = self.parser;
        self.dataset
            .column(column.position)
            .into_iter()
            .flat_map(|c| c.iter())
            .filter_map(move |raw| parser.present(raw))
    }
}

/// A data quality detector.
///
/// Implementations must only read the context; anything they return becomes
/// one section of the report. Returning an error marks that section
/// unavailable, except for cancellation and resource errors, which abort
/// the analysis.
///
/// Only returned errors are isolated. Builds use `panic = "abort"`, so a
/// panicking detector terminates the whole process: report failures as
/// [`QualityError::DetectorFailed`](crate::QualityError::DetectorFailed)
/// instead.
pub trait Detector: Send + Sync {
    fn kind(&self) -> DetectorKind;

    fn detect(&self, ctx: &AnalysisContext<'_>) -> Result<DetectorResult>;
}

/// The seven built-in detectors, in report order.
pub fn default_detectors() -> Vec<Arc<dyn Detector>> {
    vec![
        Arc::new(MissingValueDetector),
        Arc::new(DuplicateRowDetector),
        Arc::new(ClassImbalanceDetector),
        Arc::new(OutlierDetector),
        Arc::new(TypeConsistencyDetector),
        Arc::new(DateFormatDetector),
        Arc::new(CategoricalConsistencyDetector),
    ]
}

/// Descending by `a`/`b`, ties broken by column position.
pub(crate) fn by_impact(a: f64, b: f64, pos_a: usize, pos_b: usize) -> Ordering {
    b.total_cmp(&a).then(pos_a.cmp(&pos_b))
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    /// Everything a detector test needs, owned in one place.
    pub struct Fixture {
        pub dataset: Dataset,
        pub profile: DatasetProfile,
        pub parser: CellParser,
        pub config: AnalysisConfig,
        pub guard: RunGuard,
    }

    impl Fixture {
        pub fn new(columns: Vec<(&str, Vec<&str>)>) -> Self {
            Self::with_config(columns, AnalysisConfig::default())
        }

        pub fn with_config(columns: Vec<(&str, Vec<&str>)>, config: AnalysisConfig) -> Self {
            let dataset = Dataset::from_columns(
                columns
                    .into_iter()
                    .map(|(name, values)| {
                        crate::dataset::Column::new(
                            name,
                            values.iter().map(|v| Some(v.to_string())).collect(),
                        )
                    })
                    .collect(),
            )
            .unwrap();
            let parser = CellParser::from_config(&config);
            let guard = RunGuard::unbounded();
            let profile =
                crate::profiler::DataProfiler::profile_dataset(&dataset, &parser, &config, &guard)
                    .unwrap();
            Self {
                dataset,
                profile,
                parser,
                config,
                guard,
            }
        }

        pub fn ctx(&self) -> AnalysisContext<'_> {
            AnalysisContext {
                dataset: &self.dataset,
                profile: &self.profile,
                parser: &self.parser,
                config: &self.config,
                guard: &self.guard,
            }
        }

        pub fn run(&self, detector: &dyn Detector) -> DetectorResult {
            detector.detect(&self.ctx()).unwrap()
        }
    }
}
