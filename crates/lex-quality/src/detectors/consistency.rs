use super::{AnalysisContext, Detector, DetectorKind, DetectorResult, Section};
use crate::error::Result;
use crate::report::{CategoricalConsistencySection, ConsistencyFinding, ValueCount};
use crate::scoring::ScoreSignal;
use crate::types::ColumnProfile;
use std::collections::{HashMap, HashSet};

const TOP_VALUES: usize = 5;
const MAX_DETAILS: usize = 10;
const CASE_OR_WHITESPACE: &str = "Case or whitespace variations";

/// Spelling consistency of low-cardinality text columns.
///
/// A column is inconsistent when trimming and lower-casing its values
/// merges some of them ("Yes", "yes ", "YES"). Informational only; it does
/// not affect the health score.
pub struct CategoricalConsistencyDetector;

impl Detector for CategoricalConsistencyDetector {
    fn kind(&self) -> DetectorKind {
        DetectorKind::CategoricalConsistency
    }

    fn detect(&self, ctx: &AnalysisContext<'_>) -> Result<DetectorResult> {
        let ceiling = ctx.config.max_consistency_cardinality;
        let mut findings: Vec<(usize, ConsistencyFinding)> = Vec::new();

        for column in &ctx.profile.columns {
            if !column.inferred_type.is_textual()
                || column.is_all_missing()
                || column.distinct_count >= ceiling
            {
                continue;
            }
            ctx.guard.check()?;
            findings.push((column.position, evaluate_column(ctx, column)));
        }

        let categorical_columns = findings.len();
        // Inconsistent columns first, then dataset order.
        findings.sort_by_key(|(position, f)| (!f.has_inconsistency, *position));

        let section = CategoricalConsistencySection {
            categorical_columns,
            details: findings
                .into_iter()
                .take(MAX_DETAILS)
                .map(|(_, f)| f)
                .collect(),
        };
        Ok(DetectorResult::new(
            Section::CategoricalConsistency(section),
            ScoreSignal::None,
        ))
    }
}

fn evaluate_column(ctx: &AnalysisContext<'_>, column: &ColumnProfile) -> ConsistencyFinding {
    // value -> (count, first row seen)
    let mut counts: HashMap<&str, (usize, usize)> = HashMap::new();
    for (row, value) in ctx.present_values(column).enumerate() {
        counts.entry(value).or_insert((0, row)).0 += 1;
    }

    let cleaned: HashSet<String> = counts.keys().map(|v| v.trim().to_lowercase()).collect();
    let has_inconsistency = cleaned.len() < counts.len();

    let mut ranked: Vec<(&str, usize, usize)> = counts
        .into_iter()
        .map(|(value, (count, first))| (value, count, first))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));

    ConsistencyFinding {
        column: column.name.clone(),
        unique_values: column.distinct_count,
        most_common: ranked
            .into_iter()
            .take(TOP_VALUES)
            .map(|(value, count, _)| ValueCount {
                value: value.to_string(),
                count,
            })
            .collect(),
        has_inconsistency,
        inconsistency_type: has_inconsistency.then(|| CASE_OR_WHITESPACE.to_string()),
    }
}
