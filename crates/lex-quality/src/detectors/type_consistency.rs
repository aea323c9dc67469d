use super::{AnalysisContext, Detector, DetectorKind, DetectorResult, Section, by_impact};
use crate::error::Result;
use crate::report::{DataTypesSection, TypeDistributionEntry, TypeIssueFinding};
use crate::scoring::ScoreSignal;
use crate::types::{ColumnProfile, InferredType};
use crate::utils::round_to;

/// Text-like columns whose values mostly parse as another type.
///
/// Contributes a flat penalty per issue instead of a weighted sub-score.
pub struct TypeConsistencyDetector;

impl Detector for TypeConsistencyDetector {
    fn kind(&self) -> DetectorKind {
        DetectorKind::DataTypes
    }

    fn detect(&self, ctx: &AnalysisContext<'_>) -> Result<DetectorResult> {
        let threshold = ctx.config.supermajority_threshold;

        let type_distribution = ctx
            .profile
            .columns
            .iter()
            .map(|c| TypeDistributionEntry {
                column: c.name.clone(),
                current_type: c.inferred_type,
                unique_values: c.distinct_count,
                null_count: c.missing_count,
            })
            .collect();

        let mut issues: Vec<(usize, TypeIssueFinding)> = ctx
            .profile
            .columns
            .iter()
            .filter_map(|c| {
                let (suggested, ratio) = suggested_type(c, threshold)?;
                let share = 100.0 * ratio;
                Some((
                    c.position,
                    TypeIssueFinding {
                        column: c.name.clone(),
                        issue: format!("stored as {} but {:.0}% {}", c.inferred_type, share, suggested),
                        suggested_type: suggested,
                        consistent_percentage: round_to(share, 2),
                    },
                ))
            })
            .collect();
        issues.sort_by(|(pa, a), (pb, b)| {
            by_impact(a.consistent_percentage, b.consistent_percentage, *pa, *pb)
        });

        let scoring = &ctx.config.scoring;
        let penalized = issues.len().min(scoring.max_penalized_type_issues);
        let signal = ScoreSignal::Penalty(scoring.type_issue_penalty * penalized as f64);

        let section = DataTypesSection {
            type_distribution,
            type_issues: issues.into_iter().map(|(_, f)| f).collect(),
        };
        Ok(DetectorResult::new(Section::DataTypes(section), signal))
    }
}

/// The type a categorical or text column's values mostly parse as, with the
/// share of non-missing values that do.
///
/// A share must exceed `threshold`; numeric wins a tie with date.
pub(crate) fn suggested_type(column: &ColumnProfile, threshold: f64) -> Option<(InferredType, f64)> {
    if !column.inferred_type.is_textual() || column.is_all_missing() {
        return None;
    }
    let numeric = column.numeric_ratio();
    let date = column.date_ratio();

    if numeric > threshold && numeric >= date {
        Some((InferredType::Numeric, numeric))
    } else if date > threshold {
        Some((InferredType::Date, date))
    } else {
        None
    }
}
