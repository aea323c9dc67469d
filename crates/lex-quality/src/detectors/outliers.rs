use super::{AnalysisContext, Detector, DetectorKind, DetectorResult, Section, by_impact};
use crate::config::{AnalysisConfig, OutlierMethod};
use crate::error::Result;
use crate::profiler::statistics;
use crate::report::{OutlierFinding, OutliersSection};
use crate::scoring::{ScoreComponent, ScoreSignal};
use crate::types::{ColumnProfile, InferredType};
use crate::utils::{percentage, round_to};

/// Outliers of numeric columns, by Tukey fences or z-score.
///
/// Columns with fewer than `min_outlier_values` non-missing values are not
/// evaluated. Degenerate spread (IQR or std of 0) yields no outliers.
pub struct OutlierDetector;

impl Detector for OutlierDetector {
    fn kind(&self) -> DetectorKind {
        DetectorKind::Outliers
    }

    fn detect(&self, ctx: &AnalysisContext<'_>) -> Result<DetectorResult> {
        let config = ctx.config;
        let mut findings: Vec<(usize, OutlierFinding)> = Vec::new();
        let mut percentages: Vec<f64> = Vec::new();

        for column in ctx.profile.columns_of(InferredType::Numeric) {
            if column.sorted_values.len() < config.min_outlier_values {
                continue;
            }
            ctx.guard.check()?;

            let finding = evaluate_column(column, config);
            percentages.push(finding.percentage);
            if finding.outlier_count > 0 {
                findings.push((column.position, finding));
            }
        }

        findings.sort_by(|(pa, a), (pb, b)| by_impact(a.percentage, b.percentage, *pa, *pb));

        let section = OutliersSection {
            columns_with_outliers: findings.len(),
            columns_checked: percentages.len(),
            details: findings.into_iter().map(|(_, f)| f).collect(),
        };

        let value = if percentages.is_empty() {
            100.0
        } else {
            100.0 - percentages.iter().sum::<f64>() / percentages.len() as f64
        };
        let signal = ScoreSignal::SubScore {
            component: ScoreComponent::Outliers,
            value,
        };
        Ok(DetectorResult::new(Section::Outliers(section), signal))
    }
}

/// Lower and upper fence of a numeric column, or `None` when the spread is
/// zero.
fn fences(column: &ColumnProfile, config: &AnalysisConfig) -> Option<(f64, f64)> {
    let sorted = &column.sorted_values;
    match config.outlier_method {
        OutlierMethod::Iqr => {
            let stats = column.numeric.as_ref()?;
            let iqr = stats.iqr();
            if iqr == 0.0 {
                return None;
            }
            Some((
                stats.q1 - config.iqr_multiplier * iqr,
                stats.q3 + config.iqr_multiplier * iqr,
            ))
        }
        OutlierMethod::ZScore => {
            let mean = statistics::mean(sorted);
            let std = statistics::population_std(sorted, mean);
            if std == 0.0 {
                return None;
            }
            Some((
                mean - config.zscore_threshold * std,
                mean + config.zscore_threshold * std,
            ))
        }
    }
}

fn evaluate_column(column: &ColumnProfile, config: &AnalysisConfig) -> OutlierFinding {
    let sorted = &column.sorted_values;
    let min = sorted[0];
    let max = sorted[sorted.len() - 1];

    let (outlier_count, lower, upper) = match fences(column, config) {
        Some((lower, upper)) => {
            let count = sorted.iter().filter(|v| **v < lower || **v > upper).count();
            (count, lower, upper)
        }
        None => (0, min, max),
    };

    OutlierFinding {
        column: column.name.clone(),
        outlier_count,
        percentage: percentage(outlier_count, sorted.len()),
        min_value: round_to(min, 2),
        max_value: round_to(max, 2),
        lower_bound: round_to(lower.max(f64::MIN), 2),
        upper_bound: round_to(upper.min(f64::MAX), 2),
    }
}
