use super::{NumericSummary, Report, SectionResult, Summary};
use crate::detectors::{DetectorKind, Section};
use crate::scoring::HealthScore;
use crate::types::{DatasetProfile, InferredType};
use uuid::Uuid;

/// Merges the profile, detector sections and health score into a [`Report`].
///
/// The only effect is allocating a fresh report identifier.
pub struct ReportAssembler;

impl ReportAssembler {
    /// Build a report.
    ///
    /// `failures` lists the detectors that did not produce a section, with
    /// the reason; any section neither produced nor failed is reported as
    /// not configured.
    pub fn assemble(
        profile: &DatasetProfile,
        sections: Vec<Section>,
        failures: &[(DetectorKind, String)],
        health: HealthScore,
    ) -> Report {
        let reason_for = |kind: DetectorKind| {
            failures
                .iter()
                .find(|(k, _)| *k == kind)
                .map(|(_, reason)| reason.clone())
                .unwrap_or_else(|| format!("no {} detector configured", kind))
        };

        let mut missing_values = None;
        let mut duplicates = None;
        let mut class_imbalance = None;
        let mut outliers = None;
        let mut data_types = None;
        let mut date_formats = None;
        let mut categorical_consistency = None;

        for section in sections {
            match section {
                Section::MissingValues(s) => missing_values = Some(s),
                Section::Duplicates(s) => duplicates = Some(s),
                Section::ClassImbalance(s) => class_imbalance = Some(s),
                Section::Outliers(s) => outliers = Some(s),
                Section::DataTypes(s) => data_types = Some(s),
                Section::DateFormats(s) => date_formats = Some(s),
                Section::CategoricalConsistency(s) => categorical_consistency = Some(s),
            }
        }

        fn wrap<T>(section: Option<T>, reason: impl FnOnce() -> String) -> SectionResult<T> {
            match section {
                Some(s) => SectionResult::Available(s),
                None => SectionResult::unavailable(reason()),
            }
        }

        Report {
            report_id: Uuid::new_v4(),
            health_score: health.score,
            health_label: health.label,
            score_breakdown: health.breakdown,
            summary: Self::summary(profile),
            missing_values: wrap(missing_values, || reason_for(DetectorKind::MissingValues)),
            duplicates: wrap(duplicates, || reason_for(DetectorKind::Duplicates)),
            class_imbalance: wrap(class_imbalance, || reason_for(DetectorKind::ClassImbalance)),
            outliers: wrap(outliers, || reason_for(DetectorKind::Outliers)),
            data_types: wrap(data_types, || reason_for(DetectorKind::DataTypes)),
            date_formats: wrap(date_formats, || reason_for(DetectorKind::DateFormats)),
            categorical_consistency: wrap(categorical_consistency, || {
                reason_for(DetectorKind::CategoricalConsistency)
            }),
        }
    }

    /// Dataset shape, per-type counts and numeric descriptive statistics.
    pub fn summary(profile: &DatasetProfile) -> Summary {
        let numeric_summary = profile
            .columns_of(InferredType::Numeric)
            .filter_map(|c| {
                let stats = c.numeric.as_ref()?;
                Some(NumericSummary {
                    column: c.name.clone(),
                    count: c.present_count(),
                    mean: stats.mean,
                    std: stats.std,
                    min: stats.min,
                    p25: stats.q1,
                    p50: stats.median,
                    p75: stats.q3,
                    max: stats.max,
                })
            })
            .collect();

        Summary {
            total_rows: profile.total_rows,
            total_columns: profile.total_columns,
            numeric_columns: profile.count_of(InferredType::Numeric),
            categorical_columns: profile.count_of(InferredType::Categorical),
            date_columns: profile.count_of(InferredType::Date),
            text_columns: profile.count_of(InferredType::Text),
            numeric_summary,
        }
    }
}
