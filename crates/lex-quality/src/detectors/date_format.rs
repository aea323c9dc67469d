use super::type_consistency::suggested_type;
use super::{AnalysisContext, Detector, DetectorKind, DetectorResult, Section, by_impact};
use crate::error::Result;
use crate::report::{DateFormatFinding, DateFormatsSection, DateStatus};
use crate::scoring::{ScoreComponent, ScoreSignal};
use crate::types::{ColumnProfile, InferredType};

const SAMPLE_SIZE: usize = 3;

/// Validity of date columns against the recognized formats.
///
/// Evaluates columns inferred as dates and text-like columns whose values
/// are mostly real dates.
///
/// The date-validity sub-score is `100` minus the mean invalid share.
/// A column's share is `invalid / (valid + invalid)`, not `invalid / valid`,
/// so a column without a single valid date costs exactly 100.
pub struct DateFormatDetector;

impl Detector for DateFormatDetector {
    fn kind(&self) -> DetectorKind {
        DetectorKind::DateFormats
    }

    fn detect(&self, ctx: &AnalysisContext<'_>) -> Result<DetectorResult> {
        let threshold = ctx.config.supermajority_threshold;
        let mut findings: Vec<(usize, DateFormatFinding)> = Vec::new();

        for column in &ctx.profile.columns {
            let is_date = column.inferred_type == InferredType::Date
                || matches!(suggested_type(column, threshold), Some((InferredType::Date, _)));
            if !is_date {
                continue;
            }
            ctx.guard.check()?;
            findings.push((column.position, evaluate_column(ctx, column)));
        }

        let invalid_shares: Vec<f64> = findings
            .iter()
            .map(|(_, f)| {
                let evaluated = f.valid_dates + f.invalid_dates;
                if evaluated == 0 {
                    0.0
                } else {
                    100.0 * f.invalid_dates as f64 / evaluated as f64
                }
            })
            .collect();

        findings.sort_by(|(pa, a), (pb, b)| {
            by_impact(a.invalid_dates as f64, b.invalid_dates as f64, *pa, *pb)
        });

        let value = if invalid_shares.is_empty() {
            100.0
        } else {
            100.0 - invalid_shares.iter().sum::<f64>() / invalid_shares.len() as f64
        };

        let section = DateFormatsSection {
            date_columns_found: findings.len(),
            details: findings.into_iter().map(|(_, f)| f).collect(),
        };
        let signal = ScoreSignal::SubScore {
            component: ScoreComponent::DateValidity,
            value,
        };
        Ok(DetectorResult::new(Section::DateFormats(section), signal))
    }
}

fn evaluate_column(ctx: &AnalysisContext<'_>, column: &ColumnProfile) -> DateFormatFinding {
    let patterns = ctx.parser.date_patterns();
    let mut matched = vec![false; patterns.len()];
    let mut valid_dates = 0;
    let mut invalid_dates = 0;
    let mut sample_values = Vec::with_capacity(SAMPLE_SIZE);

    for value in ctx.present_values(column) {
        if sample_values.len() < SAMPLE_SIZE {
            sample_values.push(value.to_string());
        }
        match ctx.parser.parse_date(value) {
            Some(index) => {
                valid_dates += 1;
                matched[index] = true;
            }
            None => invalid_dates += 1,
        }
    }

    let matched_formats = patterns
        .iter()
        .zip(matched)
        .filter(|(_, seen)| *seen)
        .map(|(p, _)| p.format().to_string())
        .collect();

    DateFormatFinding {
        column: column.name.clone(),
        status: if invalid_dates == 0 {
            DateStatus::Valid
        } else {
            DateStatus::HasIssues
        },
        valid_dates,
        invalid_dates,
        sample_values,
        matched_formats,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnalysisConfig;
    use crate::detectors::test_support::Fixture;
    use pretty_assertions::assert_eq;

    fn section(fixture: &Fixture) -> DateFormatsSection {
        match fixture.run(&DateFormatDetector).section {
            Section::DateFormats(s) => s,
            other => panic!("unexpected section {:?}", other.kind()),
        }
    }

    #[test]
    fn test_valid_date_column() {
        let fixture = Fixture::new(vec![(
            "joined",
            vec!["2024-01-05", "2024-02-10", "", "03/15/2024", "2024-04-01"],
        )]);
        let section = section(&fixture);

        assert_eq!(section.date_columns_found, 1);
        assert_eq!(
            section.details[0],
            DateFormatFinding {
                column: "joined".to_string(),
                status: DateStatus::Valid,
                valid_dates: 4,
                invalid_dates: 0,
                sample_values: vec![
                    "2024-01-05".to_string(),
                    "2024-02-10".to_string(),
                    "03/15/2024".to_string(),
                ],
                matched_formats: vec!["%Y-%m-%d".to_string(), "%m/%d/%Y".to_string()],
            }
        );
    }

    #[test]
    fn test_impossible_dates_are_invalid() {
        let fixture = Fixture::new(vec![("d", vec!["2024-01-05", "2024-02-30", "2024-13-01", "2024-03-01"])]);
        let result = fixture.run(&DateFormatDetector);

        let Section::DateFormats(section) = &result.section else {
            panic!("wrong section");
        };
        let finding = &section.details[0];
        assert_eq!(finding.status, DateStatus::HasIssues);
        assert_eq!((finding.valid_dates, finding.invalid_dates), (2, 2));
        assert_eq!(
            result.signal,
            ScoreSignal::SubScore {
                component: ScoreComponent::DateValidity,
                value: 50.0,
            }
        );
    }

    #[test]
    fn test_invalid_share_is_bounded_by_evaluated_dates() {
        let fixture = Fixture::new(vec![(
            "d",
            vec!["2024-01-05", "2024-02-30", "2024-13-01", "2024-02-31"],
        )]);
        let result = fixture.run(&DateFormatDetector);

        let Section::DateFormats(section) = &result.section else {
            panic!("wrong section");
        };
        assert_eq!((section.details[0].valid_dates, section.details[0].invalid_dates), (1, 3));
        assert_eq!(
            result.signal,
            ScoreSignal::SubScore {
                component: ScoreComponent::DateValidity,
                value: 25.0,
            }
        );
    }

    #[test]
    fn test_mostly_date_text_column_is_evaluated() {
        let mut values = vec!["2024-01-01"; 9];
        values.push("tomorrow");
        let fixture = Fixture::new(vec![("when", values), ("id", (0..10).map(|_| "1").collect())]);
        let section = section(&fixture);

        assert_eq!(section.date_columns_found, 1);
        assert_eq!(section.details[0].invalid_dates, 1);
    }

    #[test]
    fn test_no_date_columns_scores_full() {
        let fixture = Fixture::new(vec![("n", vec!["1", "2", "3"])]);
        let result = fixture.run(&DateFormatDetector);
        assert_eq!(
            result.signal,
            ScoreSignal::SubScore {
                component: ScoreComponent::DateValidity,
                value: 100.0,
            }
        );
    }

    #[test]
    fn test_custom_formats() {
        let config = AnalysisConfig::builder()
            .date_formats(["%d.%m.%Y"])
            .build()
            .unwrap();
        let fixture = Fixture::with_config(vec![("d", vec!["05.01.2024", "31.12.2023"])], config);
        let section = section(&fixture);

        assert_eq!(section.details[0].status, DateStatus::Valid);
        assert_eq!(section.details[0].matched_formats, vec!["%d.%m.%Y".to_string()]);
    }
}
