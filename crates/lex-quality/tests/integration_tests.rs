//! Integration tests for the data quality analysis engine.
//!
//! These tests verify end-to-end behavior using CSV fixtures and
//! generated datasets.

use lex_quality::detectors::OutlierDetector;
use lex_quality::report::Severity;
use lex_quality::{
    AnalysisConfig, AnalysisContext, AnalysisService, Analyzer, CancellationToken,
    CsvDirectoryLoader, Dataset, DatasetLoader, Detector, DetectorKind, DetectorResult,
    HealthLabel, InferredType, JsonFileReportStore, OutlierMethod, QualityError, QualityResult,
    Report, ReportStore, analyze, load_csv,
};
use pretty_assertions::assert_eq;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

// ============================================================================
// Helper Functions
// ============================================================================

fn fixtures_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn load_fixture(filename: &str) -> Dataset {
    load_csv(fixtures_path().join(filename)).expect("Failed to load fixture")
}

fn analyze_default(dataset: &Dataset) -> Report {
    analyze(dataset, &AnalysisConfig::default()).expect("Analysis failed")
}

fn cell(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Single-column dataset.
fn single_column(name: &str, values: &[String]) -> Dataset {
    Dataset::from_rows(
        vec![name],
        values.iter().map(|v| vec![cell(v)]).collect(),
    )
    .unwrap()
}

// ============================================================================
// Reference Scenarios
// ============================================================================

#[test]
fn test_missing_age_scenario() {
    let values: Vec<String> = (0..100)
        .map(|i| if i % 10 == 0 { String::new() } else { (20 + i % 40).to_string() })
        .collect();
    let report = analyze_default(&single_column("age", &values));

    let missing = report.missing_values.available().unwrap();
    assert_eq!(missing.details.len(), 1);
    assert_eq!(missing.details[0].column, "age");
    assert_eq!(missing.details[0].count, 10);
    assert_eq!(missing.details[0].percentage, 10.0);
    assert_eq!(missing.total_missing, 10);
    assert_eq!(missing.total_cells, 100);
    assert_eq!(missing.percentage, 10.0);
}

#[test]
fn test_tukey_outlier_scenario() {
    let values: Vec<String> = ["1", "2", "3", "4", "5", "100"].iter().map(|v| v.to_string()).collect();
    let report = analyze_default(&single_column("value", &values));

    let outliers = report.outliers.available().unwrap();
    assert_eq!(outliers.columns_with_outliers, 1);
    let finding = &outliers.details[0];
    assert_eq!(finding.outlier_count, 1);
    assert_eq!(finding.lower_bound, -1.5);
    assert_eq!(finding.upper_bound, 8.5);
    assert_eq!(finding.min_value, 1.0);
    assert_eq!(finding.max_value, 100.0);
    assert_eq!(finding.percentage, 16.67);

    let stats = &report.summary.numeric_summary[0];
    assert_eq!(stats.p25, 2.25);
    assert_eq!(stats.p75, 4.75);
}

#[test]
fn test_class_imbalance_scenario() {
    let values: Vec<String> = (0..100).map(|i| if i < 90 { "A" } else { "B" }.to_string()).collect();
    let report = analyze_default(&single_column("label", &values));

    let imbalance = report.class_imbalance.available().unwrap();
    assert_eq!(imbalance.columns_with_imbalance, 1);
    let finding = &imbalance.details[0];
    assert_eq!(finding.imbalance_ratio, 9.0);
    assert_eq!(finding.severity, Severity::Medium);
    assert_eq!(finding.most_common_count, 90);
    assert_eq!(finding.least_common_count, 10);
    assert_eq!(finding.most_common_class, "A");
    assert_eq!(finding.least_common_class, "B");
}

#[test]
fn test_duplicate_rows_scenario() {
    let mut rows: Vec<Vec<Option<String>>> = (0..49)
        .map(|i| vec![cell(&format!("user{}", i)), cell(&(i * 3).to_string())])
        .collect();
    rows.push(rows[7].clone());
    let dataset = Dataset::from_rows(vec!["user", "score"], rows).unwrap();

    let report = analyze_default(&dataset);
    let duplicates = report.duplicates.available().unwrap();
    assert_eq!(duplicates.full_row_duplicates, 1);
    assert_eq!(duplicates.percentage, 2.0);
}

// ============================================================================
// Fixture Datasets
// ============================================================================

#[test]
fn test_clean_dataset_is_excellent() {
    let report = analyze_default(&load_fixture("clean.csv"));

    assert_eq!(report.health_score, 100);
    assert_eq!(report.health_label, HealthLabel::Excellent);
    assert!(report.unavailable_sections().is_empty());

    let summary = &report.summary;
    assert_eq!(summary.total_rows, 10);
    assert_eq!(summary.total_columns, 5);
    assert_eq!(summary.numeric_columns, 2);
    assert_eq!(summary.categorical_columns, 1);
    assert_eq!(summary.date_columns, 1);
    assert_eq!(summary.text_columns, 1);

    assert_eq!(report.missing_values.available().unwrap().total_missing, 0);
    assert_eq!(report.class_imbalance.available().unwrap().columns_with_imbalance, 0);
    assert_eq!(report.outliers.available().unwrap().columns_with_outliers, 0);
    assert!(report.data_types.available().unwrap().type_issues.is_empty());
}

#[test]
fn test_messy_dataset_findings() {
    let report = analyze_default(&load_fixture("messy.csv"));

    // Missing: empty amount, empty signup, "NA" region
    let missing = report.missing_values.available().unwrap();
    assert_eq!(missing.total_missing, 3);
    assert_eq!(missing.total_cells, 60);
    assert_eq!(missing.percentage, 5.0);
    let columns: Vec<&str> = missing.details.iter().map(|d| d.column.as_str()).collect();
    assert_eq!(columns, vec!["region", "amount", "signup"]);
    assert_eq!(missing.details[0].percentage, 8.33);

    let duplicates = report.duplicates.available().unwrap();
    assert_eq!(duplicates.full_row_duplicates, 1);
    assert_eq!(duplicates.percentage, 8.33);

    let imbalance = report.class_imbalance.available().unwrap();
    assert_eq!(imbalance.columns_with_imbalance, 1);
    assert_eq!(imbalance.details[0].column, "region");
    assert_eq!(imbalance.details[0].imbalance_ratio, 8.0);
    assert_eq!(imbalance.details[0].severity, Severity::Medium);

    let outliers = report.outliers.available().unwrap();
    assert_eq!(outliers.columns_with_outliers, 1);
    assert_eq!(outliers.columns_checked, 2);
    assert_eq!(outliers.details[0].column, "amount");
    assert_eq!(outliers.details[0].outlier_count, 1);
    assert_eq!(outliers.details[0].percentage, 9.09);
    assert_eq!(outliers.details[0].max_value, 950.0);

    let types = report.data_types.available().unwrap();
    assert_eq!(types.type_issues.len(), 1);
    assert_eq!(types.type_issues[0].column, "zip");
    assert_eq!(types.type_issues[0].suggested_type, InferredType::Numeric);
    assert_eq!(types.type_issues[0].issue, "stored as text but 92% numeric");

    let dates = report.date_formats.available().unwrap();
    assert_eq!(dates.date_columns_found, 1);
    assert_eq!(dates.details[0].column, "signup");
    assert_eq!(dates.details[0].valid_dates, 10);
    assert_eq!(dates.details[0].invalid_dates, 1);
    assert_eq!(
        dates.details[0].sample_values,
        vec!["2024-01-05", "2024-01-06", "2024-13-40"]
    );

    let consistency = report.categorical_consistency.available().unwrap();
    assert_eq!(consistency.details[0].column, "region");
    assert!(consistency.details[0].has_inconsistency);

    // 0.30*95 + 0.20*83.34 + 0.20*95.45 + 0.15*95 + 0.15*90.91 - 10
    assert_eq!(report.health_score, 82);
    assert_eq!(report.health_label, HealthLabel::Good);
    assert_eq!(report.score_breakdown.type_penalty, 10.0);
}

#[test]
fn test_quoted_fields_load() {
    let dataset = load_fixture("quoted.csv");

    assert_eq!(dataset.height(), 3);
    assert_eq!(dataset.cell(0, 0), Some("Smith, J"));
    assert_eq!(dataset.cell(0, 1), Some("said \"hi\""));
}

#[test]
fn test_config_from_json_file() {
    let config = AnalysisConfig::from_json_file(fixtures_path().join("config_zscore.json")).unwrap();

    assert_eq!(config.outlier_method, OutlierMethod::ZScore);
    assert_eq!(config.zscore_threshold, 2.5);
    assert!(!config.parallel);
    // untouched fields keep defaults
    assert_eq!(config.iqr_multiplier, 1.5);
    assert!(config.validate().is_ok());

    let report = analyze(&load_fixture("messy.csv"), &config).unwrap();
    let outliers = report.outliers.available().unwrap();
    assert_eq!(outliers.details[0].column, "amount");
    assert_eq!(outliers.details[0].outlier_count, 1);
}

// ============================================================================
// Properties
// ============================================================================

#[test]
fn test_analysis_is_idempotent() {
    let dataset = load_fixture("messy.csv");
    let first = analyze_default(&dataset);
    let second = analyze_default(&dataset);

    assert_ne!(first.report_id, second.report_id);
    assert_eq!(first.without_id(), second.without_id());
    assert_eq!(
        serde_json::to_string(&first.without_id()).unwrap(),
        serde_json::to_string(&second.without_id()).unwrap()
    );
}

#[test]
fn test_overflowing_numbers_are_not_numeric() {
    let values: Vec<String> = ["1", "2", "3", "4", "1e999"].map(String::from).to_vec();
    let dataset = single_column("amount", &values);
    let first = analyze_default(&dataset);
    let second = analyze_default(&dataset);

    assert!(first.summary.numeric_summary.is_empty());
    assert_eq!(first.without_id(), second.without_id());

    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileReportStore::new(dir.path());
    let id = store.persist_report("amount", &first).unwrap();
    assert_eq!(store.load_report(&id).unwrap(), first);
}

#[test]
fn test_extreme_values_keep_report_finite() {
    let rows = [("1e308", "1e308"), ("1e308", "1e308"), ("-1e308", "1"), ("5", "2"), ("6", "3")]
        .iter()
        .map(|(a, b)| vec![cell(a), cell(b)])
        .collect();
    let dataset = Dataset::from_rows(vec!["wide", "high"], rows).unwrap();
    let report = analyze_default(&dataset);

    assert_eq!(report.summary.numeric_summary.len(), 2);
    for summary in &report.summary.numeric_summary {
        for value in [
            summary.mean,
            summary.std,
            summary.min,
            summary.p25,
            summary.p50,
            summary.p75,
            summary.max,
        ] {
            assert!(value.is_finite(), "{}: {}", summary.column, value);
        }
    }
    for finding in &report.outliers.available().unwrap().details {
        assert!(finding.lower_bound.is_finite() && finding.upper_bound.is_finite());
    }

    let json = report.to_json_pretty().unwrap();
    assert!(!json.contains("null"), "{}", json);

    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileReportStore::new(dir.path());
    let id = store.persist_report("extremes", &report).unwrap();
    assert!(store.load_report(&id).is_ok());
}

#[test]
fn test_duplicate_count_survives_row_reversal() {
    let dataset = load_fixture("messy.csv");
    let header: Vec<String> = dataset.column_names().iter().map(|n| n.to_string()).collect();
    let rows: Vec<Vec<Option<String>>> = (0..dataset.height())
        .rev()
        .map(|r| dataset.row(r).map(|v| v.map(str::to_string)).collect())
        .collect();
    let reversed = Dataset::from_rows(header, rows).unwrap();

    let forward = analyze_default(&dataset);
    let backward = analyze_default(&reversed);
    assert_eq!(
        forward.duplicates.available().unwrap().full_row_duplicates,
        backward.duplicates.available().unwrap().full_row_duplicates
    );
}

#[test]
fn test_constant_column_has_no_outliers() {
    for len in [4, 10, 500] {
        let values = vec!["7".to_string(); len];
        let report = analyze_default(&single_column("constant", &values));
        assert_eq!(report.outliers.available().unwrap().columns_with_outliers, 0);
    }
}

#[test]
fn test_all_missing_column_is_tolerated() {
    let rows = (0..5)
        .map(|i| vec![cell(&i.to_string()), None])
        .collect();
    let dataset = Dataset::from_rows(vec!["id", "empty"], rows).unwrap();
    let report = analyze_default(&dataset);

    let missing = report.missing_values.available().unwrap();
    assert_eq!(missing.details[0].column, "empty");
    assert_eq!(missing.details[0].percentage, 100.0);
    assert_eq!(report.summary.text_columns, 1);
    assert_eq!(report.class_imbalance.available().unwrap().columns_with_imbalance, 0);
    assert!(report.health_score <= 100);
}

#[test]
fn test_score_always_in_range() {
    for fixture in ["clean.csv", "messy.csv", "quoted.csv"] {
        let report = analyze_default(&load_fixture(fixture));
        assert!(report.health_score <= 100, "{} scored {}", fixture, report.health_score);
        assert_eq!(report.health_label, HealthLabel::from_score(report.health_score));
    }
}

#[test]
fn test_report_json_contract() {
    let report = analyze_default(&load_fixture("messy.csv"));
    let json = serde_json::to_value(&report).unwrap();

    for key in [
        "health_score",
        "summary",
        "missing_values",
        "duplicates",
        "class_imbalance",
        "outliers",
        "data_types",
        "date_formats",
    ] {
        assert!(json.get(key).is_some(), "missing key {}", key);
    }
    for key in ["total_rows", "total_columns", "numeric_columns", "categorical_columns"] {
        assert!(json["summary"].get(key).is_some(), "missing summary.{}", key);
    }
    for key in ["total_missing", "total_cells", "percentage", "details"] {
        assert!(json["missing_values"].get(key).is_some());
    }
    assert!(json["duplicates"]["full_row_duplicates"].is_u64());
    assert!(json["class_imbalance"]["columns_with_imbalance"].is_u64());
    assert!(json["outliers"]["columns_with_outliers"].is_u64());
    assert!(json["data_types"]["type_issues"].is_array());
    assert!(json["date_formats"]["date_columns_found"].is_u64());
    assert_eq!(json["class_imbalance"]["details"][0]["severity"], "Medium");
    assert_eq!(json["date_formats"]["details"][0]["status"], "Has Issues");
    assert_eq!(json["health_label"], "Good");
}

// ============================================================================
// Limits and Cancellation
// ============================================================================

#[test]
fn test_row_limit_fails_fast() {
    let config = AnalysisConfig::builder().max_rows(5).build().unwrap();
    let err = analyze(&load_fixture("messy.csv"), &config).unwrap_err();

    assert!(err.is_resource_exceeded());
    assert_eq!(err.error_code(), "RESOURCE_EXCEEDED");
}

struct SlowDetector;

impl Detector for SlowDetector {
    fn kind(&self) -> DetectorKind {
        DetectorKind::Outliers
    }

    fn detect(&self, ctx: &AnalysisContext<'_>) -> QualityResult<DetectorResult> {
        std::thread::sleep(Duration::from_millis(25));
        ctx.guard.check()?;
        OutlierDetector.detect(ctx)
    }
}

#[test]
fn test_time_budget_aborts_analysis() {
    let config = AnalysisConfig::builder().time_budget_ms(1).build().unwrap();
    let result = Analyzer::builder()
        .config(config)
        .detector(Arc::new(SlowDetector))
        .build()
        .unwrap()
        .analyze(&load_fixture("clean.csv"));

    let err = result.unwrap_err();
    assert!(err.is_resource_exceeded());
    assert!(err.to_string().contains("time_budget_ms"), "{}", err);
}

#[test]
fn test_cancelled_token_stops_analysis() {
    let token = CancellationToken::new();
    token.cancel();
    let result = Analyzer::builder()
        .cancellation_token(token)
        .build()
        .unwrap()
        .analyze(&load_fixture("clean.csv"));

    assert!(matches!(result, Err(QualityError::Cancelled)));
}

#[test]
fn test_header_only_file_is_invalid_input() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("empty.csv");
    std::fs::write(&path, "a,b,c\n").unwrap();

    let dataset = load_csv(&path).unwrap();
    let err = analyze(&dataset, &AnalysisConfig::default()).unwrap_err();
    assert_eq!(err.error_code(), "INVALID_INPUT");
}

// ============================================================================
// Service Wiring
// ============================================================================

#[test]
fn test_service_with_directory_loader_and_json_store() {
    let reports = tempfile::tempdir().unwrap();
    let loader = Arc::new(CsvDirectoryLoader::new(fixtures_path()));
    let store = Arc::new(JsonFileReportStore::new(reports.path()));
    let service = AnalysisService::new(
        loader.clone(),
        store.clone(),
        Analyzer::builder().build().unwrap(),
    );

    let first = service.analyze_dataset("messy").unwrap();
    let second = service.analyze_dataset("messy").unwrap();

    assert_ne!(first.report_id, second.report_id);
    assert_eq!(store.load_report(&first.report_id).unwrap(), first);
    assert_eq!(store.load_report(&second.report_id).unwrap(), second);
    assert_eq!(std::fs::read_dir(reports.path()).unwrap().count(), 2);

    let err = service.analyze_dataset("does-not-exist").unwrap_err();
    assert_eq!(err.error_code(), "DATASET_NOT_FOUND");
    assert!(loader.load_dataset("clean").is_ok());
}
