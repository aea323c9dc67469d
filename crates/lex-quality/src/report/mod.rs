//! The analysis report and its assembly.
//!
//! A [`Report`] is produced once per analysis and never updated. Each
//! detector section is wrapped in a [`SectionResult`] so that one failed
//! detector degrades only its own section.

mod assembler;
mod sections;

pub use assembler::ReportAssembler;
pub use sections::*;

use crate::detectors::DetectorKind;
use crate::scoring::{HealthLabel, ScoreBreakdown};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Status value written into unavailable sections.
pub const UNAVAILABLE: &str = "unavailable";

/// A detector section, or the reason it could not be produced.
///
/// Serialized untagged: an available section is the section object itself,
/// an unavailable one is `{"status": "unavailable", "reason": "..."}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SectionResult<T> {
    Available(T),
    Unavailable(UnavailableSection),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnavailableSection {
    pub status: String,
    pub reason: String,
}

impl<T> SectionResult<T> {
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable(UnavailableSection {
            status: UNAVAILABLE.to_string(),
            reason: reason.into(),
        })
    }

    pub fn available(&self) -> Option<&T> {
        match self {
            Self::Available(section) => Some(section),
            Self::Unavailable(_) => None,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Self::Available(_))
    }
}

/// Result of one analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub report_id: Uuid,
    pub health_score: u8,
    pub health_label: HealthLabel,
    pub score_breakdown: ScoreBreakdown,
    pub summary: Summary,
    pub missing_values: SectionResult<MissingValuesSection>,
    pub duplicates: SectionResult<DuplicatesSection>,
    pub class_imbalance: SectionResult<ClassImbalanceSection>,
    pub outliers: SectionResult<OutliersSection>,
    pub data_types: SectionResult<DataTypesSection>,
    pub date_formats: SectionResult<DateFormatsSection>,
    pub categorical_consistency: SectionResult<CategoricalConsistencySection>,
}

static_assertions::assert_impl_all!(Report: Send, Sync);

impl Report {
    /// Sections that could not be produced.
    pub fn unavailable_sections(&self) -> Vec<DetectorKind> {
        let flags = [
            (DetectorKind::MissingValues, self.missing_values.is_available()),
            (DetectorKind::Duplicates, self.duplicates.is_available()),
            (DetectorKind::ClassImbalance, self.class_imbalance.is_available()),
            (DetectorKind::Outliers, self.outliers.is_available()),
            (DetectorKind::DataTypes, self.data_types.is_available()),
            (DetectorKind::DateFormats, self.date_formats.is_available()),
            (
                DetectorKind::CategoricalConsistency,
                self.categorical_consistency.is_available(),
            ),
        ];
        flags
            .into_iter()
            .filter(|(_, available)| !available)
            .map(|(kind, _)| kind)
            .collect()
    }

    /// Same report with the identifier cleared, for comparing two runs.
    pub fn without_id(&self) -> Report {
        Report {
            report_id: Uuid::nil(),
            ..self.clone()
        }
    }

    pub fn to_json_pretty(&self) -> crate::error::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
