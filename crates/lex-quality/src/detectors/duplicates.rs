use super::{AnalysisContext, Detector, DetectorKind, DetectorResult, Section, by_impact};
use crate::error::Result;
use crate::report::{ColumnDuplicateFinding, DuplicateRowSample, DuplicatesSection};
use crate::scoring::{ScoreComponent, ScoreSignal};
use crate::utils::percentage;
use std::collections::HashMap;
use tracing::debug;

// Rows between cancellation checks.
const CHECK_INTERVAL: usize = 4096;

const MAX_ROW_SAMPLES: usize = 5;

/// Full-row duplicates, found by fingerprinting each normalized row.
///
/// A row's fingerprint hashes its (column name, cell) pairs in column-name
/// order, so the result does not depend on column order. The first
/// occurrence of a row is not a duplicate; every later identical row is.
pub struct DuplicateRowDetector;

impl Detector for DuplicateRowDetector {
    fn kind(&self) -> DetectorKind {
        DetectorKind::Duplicates
    }

    fn detect(&self, ctx: &AnalysisContext<'_>) -> Result<DetectorResult> {
        let dataset = ctx.dataset;
        let total_rows = dataset.height();

        let mut by_name: Vec<usize> = (0..dataset.width()).collect();
        by_name.sort_by(|a, b| dataset.columns()[*a].name().cmp(dataset.columns()[*b].name()));

        // Fingerprint -> first row with that content
        let mut seen: HashMap<blake3::Hash, usize> = HashMap::with_capacity(total_rows);
        let mut full_row_duplicates = 0;
        let mut duplicate_row_samples = Vec::new();

        for row in 0..total_rows {
            if row % CHECK_INTERVAL == 0 {
                ctx.guard.check()?;
            }
            let fingerprint = row_fingerprint(ctx, &by_name, row);
            let first_row = *seen.entry(fingerprint).or_insert(row);
            if first_row == row {
                continue;
            }
            full_row_duplicates += 1;
            if duplicate_row_samples.len() < MAX_ROW_SAMPLES {
                duplicate_row_samples.push(DuplicateRowSample {
                    row,
                    first_row,
                    values: dataset.row(row).map(|v| v.map(str::to_string)).collect(),
                });
            }
        }
        debug!("{} duplicate rows among {}", full_row_duplicates, total_rows);

        let mut column_duplicates: Vec<(usize, ColumnDuplicateFinding)> = ctx
            .profile
            .columns
            .iter()
            .filter_map(|c| {
                // Missing cells form one value of their own.
                let values = c.distinct_count + usize::from(c.missing_count > 0);
                let count = c.total_count.saturating_sub(values);
                (count > 0).then(|| {
                    (
                        c.position,
                        ColumnDuplicateFinding {
                            column: c.name.clone(),
                            count,
                            percentage: percentage(count, total_rows),
                        },
                    )
                })
            })
            .collect();
        column_duplicates
            .sort_by(|(pa, a), (pb, b)| by_impact(a.count as f64, b.count as f64, *pa, *pb));

        let section = DuplicatesSection {
            full_row_duplicates,
            percentage: percentage(full_row_duplicates, total_rows),
            duplicate_row_samples,
            column_duplicates: column_duplicates.into_iter().map(|(_, f)| f).collect(),
        };

        let scoring = &ctx.config.scoring;
        let signal = ScoreSignal::SubScore {
            component: ScoreComponent::Uniqueness,
            value: 100.0 - (section.percentage * scoring.duplicate_multiplier).min(100.0),
        };
        Ok(DetectorResult::new(Section::Duplicates(section), signal))
    }
}

fn row_fingerprint(ctx: &AnalysisContext<'_>, by_name: &[usize], row: usize) -> blake3::Hash {
    let mut hasher = blake3::Hasher::new();
    for &index in by_name {
        let column = &ctx.dataset.columns()[index];
        write_field(&mut hasher, column.name().as_bytes());
        // Missing cells all hash to the same marker.
        match ctx.parser.present(ctx.dataset.cell(row, index)) {
            Some(value) => {
                hasher.update(&[1]);
                write_field(&mut hasher, value.as_bytes());
            }
            None => {
                hasher.update(&[0]);
            }
        }
    }
    hasher.finalize()
}

// Length prefix keeps ("ab", "c") and ("a", "bc") apart.
fn write_field(hasher: &mut blake3::Hasher, bytes: &[u8]) {
    hasher.update(&(bytes.len() as u64).to_le_bytes());
    hasher.update(bytes);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detectors::test_support::Fixture;
    use pretty_assertions::assert_eq;

    fn section(fixture: &Fixture) -> DuplicatesSection {
        match fixture.run(&DuplicateRowDetector).section {
            Section::Duplicates(s) => s,
            other => panic!("unexpected section {:?}", other.kind()),
        }
    }

    #[test]
    fn test_two_identical_rows_among_fifty() {
        let mut ids: Vec<String> = (0..49).map(|i| i.to_string()).collect();
        ids.push("7".to_string());
        let mut names: Vec<String> = (0..49).map(|i| format!("name-{}", i)).collect();
        names.push("name-7".to_string());

        let fixture = Fixture::new(vec![
            ("id", ids.iter().map(String::as_str).collect()),
            ("name", names.iter().map(String::as_str).collect()),
        ]);
        let section = section(&fixture);

        assert_eq!(section.full_row_duplicates, 1);
        assert_eq!(section.percentage, 2.0);
    }

    #[test]
    fn test_duplicate_row_samples() {
        let fixture = Fixture::new(vec![
            ("a", vec!["1", "2", "1", "3", "2", "1"]),
            ("b", vec!["x", "y", "x", "z", "y", "x"]),
        ]);
        let section = section(&fixture);

        assert_eq!(section.full_row_duplicates, 3);
        assert_eq!(
            section.duplicate_row_samples,
            vec![
                DuplicateRowSample {
                    row: 2,
                    first_row: 0,
                    values: vec![Some("1".to_string()), Some("x".to_string())],
                },
                DuplicateRowSample {
                    row: 4,
                    first_row: 1,
                    values: vec![Some("2".to_string()), Some("y".to_string())],
                },
                DuplicateRowSample {
                    row: 5,
                    first_row: 0,
                    values: vec![Some("1".to_string()), Some("x".to_string())],
                },
            ]
        );
    }

    #[test]
    fn test_row_samples_are_capped() {
        let fixture = Fixture::new(vec![("a", vec!["same"; 20])]);
        let section = section(&fixture);

        assert_eq!(section.full_row_duplicates, 19);
        assert_eq!(section.duplicate_row_samples.len(), MAX_ROW_SAMPLES);
        assert_eq!(section.duplicate_row_samples[0].row, 1);
        assert_eq!(section.duplicate_row_samples[4].first_row, 0);
    }

    #[test]
    fn test_missing_markers_are_equal() {
        let fixture = Fixture::new(vec![
            ("a", vec!["1", "1", "1"]),
            ("b", vec!["", "NA", "x"]),
        ]);
        assert_eq!(section(&fixture).full_row_duplicates, 1);
    }

    #[test]
    fn test_cell_boundaries_matter() {
        let fixture = Fixture::new(vec![("a", vec!["ab", "a"]), ("b", vec!["c", "bc"])]);
        assert_eq!(section(&fixture).full_row_duplicates, 0);
    }

    #[test]
    fn test_reversed_rows_same_count() {
        let a = vec!["1", "2", "1", "3", "2", "1"];
        let b = vec!["x", "y", "x", "z", "y", "q"];
        let forward = Fixture::new(vec![("a", a.clone()), ("b", b.clone())]);
        let reversed = Fixture::new(vec![
            ("a", a.into_iter().rev().collect()),
            ("b", b.into_iter().rev().collect()),
        ]);

        assert_eq!(section(&forward).full_row_duplicates, 2);
        assert_eq!(section(&reversed).full_row_duplicates, 2);
    }

    #[test]
    fn test_column_order_does_not_matter() {
        let left = Fixture::new(vec![("a", vec!["1", "1"]), ("b", vec!["x", "x"])]);
        let right = Fixture::new(vec![("b", vec!["x", "x"]), ("a", vec!["1", "1"])]);

        let ctx_left = left.ctx();
        let ctx_right = right.ctx();
        assert_eq!(
            row_fingerprint(&ctx_left, &[0, 1], 0),
            row_fingerprint(&ctx_right, &[1, 0], 0)
        );
    }

    #[test]
    fn test_column_duplicates() {
        let fixture = Fixture::new(vec![
            ("id", vec!["1", "2", "3", "4"]),
            ("city", vec!["Oslo", "Oslo", "Lima", ""]),
            ("flag", vec!["y", "y", "y", "y"]),
        ]);
        let section = section(&fixture);

        assert_eq!(
            section.column_duplicates,
            vec![
                ColumnDuplicateFinding {
                    column: "flag".to_string(),
                    count: 3,
                    percentage: 75.0,
                },
                ColumnDuplicateFinding {
                    column: "city".to_string(),
                    count: 1,
                    percentage: 25.0,
                },
            ]
        );
    }

    #[test]
    fn test_uniqueness_signal() {
        let fixture = Fixture::new(vec![("a", vec!["1", "1", "2", "3"])]);
        let result = fixture.run(&DuplicateRowDetector);
        // 25% duplicates, doubled
        assert_eq!(
            result.signal,
            ScoreSignal::SubScore {
                component: ScoreComponent::Uniqueness,
                value: 50.0,
            }
        );
    }
}
