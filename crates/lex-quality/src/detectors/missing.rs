use super::{AnalysisContext, Detector, DetectorKind, DetectorResult, Section, by_impact};
use crate::error::Result;
use crate::report::{MissingValueFinding, MissingValuesSection};
use crate::scoring::{ScoreComponent, ScoreSignal};
use crate::utils::percentage;

/// Per-column and overall missing-value counts.
///
/// Feeds the completeness component: `100 - percentage`.
pub struct MissingValueDetector;

impl Detector for MissingValueDetector {
    fn kind(&self) -> DetectorKind {
        DetectorKind::MissingValues
    }

    fn detect(&self, ctx: &AnalysisContext<'_>) -> Result<DetectorResult> {
        let profile = ctx.profile;
        let total_rows = profile.total_rows;
        let total_cells = total_rows * profile.total_columns;

        let mut affected: Vec<(usize, MissingValueFinding)> = profile
            .columns
            .iter()
            .filter(|c| c.missing_count > 0)
            .map(|c| {
                (
                    c.position,
                    MissingValueFinding {
                        column: c.name.clone(),
                        count: c.missing_count,
                        percentage: percentage(c.missing_count, total_rows),
                    },
                )
            })
            .collect();
        affected.sort_by(|(pa, a), (pb, b)| by_impact(a.count as f64, b.count as f64, *pa, *pb));

        let total_missing: usize = profile.columns.iter().map(|c| c.missing_count).sum();
        let section = MissingValuesSection {
            total_missing,
            total_cells,
            percentage: percentage(total_missing, total_cells),
            columns_affected: affected.len(),
            details: affected.into_iter().map(|(_, f)| f).collect(),
        };

        let signal = ScoreSignal::SubScore {
            component: ScoreComponent::Completeness,
            value: 100.0 - section.percentage,
        };
        Ok(DetectorResult::new(Section::MissingValues(section), signal))
    }
}
