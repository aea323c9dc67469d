use super::{AnalysisContext, Detector, DetectorKind, DetectorResult, Section, by_impact};
use crate::error::Result;
use crate::report::{ClassImbalanceSection, ImbalanceFinding, Severity};
use crate::scoring::{ScoreComponent, ScoreSignal};
use crate::types::{ColumnProfile, InferredType};
use crate::utils::round_to;
use std::collections::HashMap;

/// Class imbalance of low-cardinality categorical columns.
///
/// Only categorical columns with between 2 and `cardinality_ceiling`
/// distinct values are treated as class labels.
pub struct ClassImbalanceDetector;

impl Detector for ClassImbalanceDetector {
    fn kind(&self) -> DetectorKind {
        DetectorKind::ClassImbalance
    }

    fn detect(&self, ctx: &AnalysisContext<'_>) -> Result<DetectorResult> {
        let config = ctx.config;
        let mut findings: Vec<(usize, ImbalanceFinding)> = Vec::new();

        for column in ctx.profile.columns_of(InferredType::Categorical) {
            if column.distinct_count < 2 || column.distinct_count > config.cardinality_ceiling {
                continue;
            }
            ctx.guard.check()?;
            if let Some(finding) = evaluate_column(ctx, column) {
                findings.push((column.position, finding));
            }
        }

        findings.sort_by(|(pa, a), (pb, b)| by_impact(a.imbalance_ratio, b.imbalance_ratio, *pa, *pb));

        let section = ClassImbalanceSection {
            columns_with_imbalance: findings.len(),
            details: findings.into_iter().map(|(_, f)| f).collect(),
        };

        let scoring = &config.scoring;
        let value = 100.0
            - scoring.high_imbalance_penalty * section.count_of(Severity::High) as f64
            - scoring.medium_imbalance_penalty * section.count_of(Severity::Medium) as f64;
        let signal = ScoreSignal::SubScore {
            component: ScoreComponent::Imbalance,
            value: value.max(0.0),
        };
        Ok(DetectorResult::new(Section::ClassImbalance(section), signal))
    }
}

fn evaluate_column(ctx: &AnalysisContext<'_>, column: &ColumnProfile) -> Option<ImbalanceFinding> {
    // value -> (count, first row seen)
    let mut classes: HashMap<&str, (usize, usize)> = HashMap::new();
    for (row, value) in ctx.present_values(column).enumerate() {
        classes.entry(value).or_insert((0, row)).0 += 1;
    }

    // Ties go to the class seen first.
    let (most_class, &(most_count, _)) = classes
        .iter()
        .max_by(|(_, (ca, fa)), (_, (cb, fb))| ca.cmp(cb).then(fb.cmp(fa)))?;
    let (least_class, &(least_count, _)) = classes
        .iter()
        .min_by(|(_, (ca, fa)), (_, (cb, fb))| ca.cmp(cb).then(fa.cmp(fb)))?;

    // Degenerate distribution: not imbalanced.
    if least_count == 0 {
        return None;
    }

    let ratio = round_to(most_count as f64 / least_count as f64, 1);
    let config = ctx.config;
    let severity = if ratio >= config.imbalance_high_ratio {
        Severity::High
    } else if ratio >= config.imbalance_medium_ratio {
        Severity::Medium
    } else {
        return None;
    };

    Some(ImbalanceFinding {
        column: column.name.clone(),
        imbalance_ratio: ratio,
        severity,
        unique_classes: classes.len(),
        most_common_class: most_class.to_string(),
        most_common_count: most_count,
        least_common_class: least_class.to_string(),
        least_common_count: least_count,
    })
}
