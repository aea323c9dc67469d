//! CLI entry point for the data quality analysis engine.

use anyhow::{Context, Result, anyhow};
use clap::{Args as ClapArgs, Parser, Subcommand};
use lex_quality::{
    AnalysisConfig, Analyzer, CellParser, DataProfiler, Dataset, JsonFileReportStore, Report,
    ReportStore, RunGuard, SectionResult, load_csv,
};
use std::path::{Path, PathBuf};
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(
    author = "Lex Machina Team",
    version,
    about = "Data quality analysis for tabular datasets",
    long_about = "Profiles a CSV dataset, runs the quality detectors and reports a 0-100 health score.\n\n\
                  ENVIRONMENT VARIABLES:\n  \
                  RUST_LOG    Overrides --log-level (e.g. RUST_LOG=lex_quality=debug)\n\n\
                  EXAMPLES:\n  \
                  # Analyze with default settings\n  \
                  lex-quality analyze -i data.csv\n\n  \
                  # Machine-readable report\n  \
                  lex-quality analyze -i data.csv --json | jq .health_score\n\n  \
                  # Custom thresholds and a saved report\n  \
                  lex-quality analyze -i data.csv --config quality.json -r reports/\n\n  \
                  # Column profile only\n  \
                  lex-quality profile -i data.csv"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info", global = true)]
    log_level: String,

    /// Suppress progress output (only show errors and final result)
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the full analysis and print the health report
    Analyze(AnalyzeArgs),
    /// Print the per-column profile
    Profile(ProfileArgs),
}

#[derive(ClapArgs, Debug)]
struct AnalyzeArgs {
    /// Path to the CSV file to analyze
    #[arg(short, long)]
    input: PathBuf,

    /// JSON file with analysis settings
    ///
    /// Missing fields keep their defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output JSON to stdout instead of human-readable summary
    ///
    /// Disables all progress logs; only outputs the report.
    #[arg(long)]
    json: bool,

    /// Write the JSON report into this directory as <report_id>.json
    #[arg(short = 'r', long, value_name = "DIR")]
    emit_report: Option<PathBuf>,

    /// Reject datasets with more rows
    #[arg(long)]
    max_rows: Option<usize>,

    /// Reject datasets with more columns
    #[arg(long)]
    max_columns: Option<usize>,

    /// Abort the analysis after this many milliseconds
    #[arg(long)]
    time_budget_ms: Option<u64>,

    /// Run detectors sequentially
    #[arg(long)]
    sequential: bool,
}

#[derive(ClapArgs, Debug)]
struct ProfileArgs {
    /// Path to the CSV file to profile
    #[arg(short, long)]
    input: PathBuf,

    /// JSON file with analysis settings
    #[arg(long)]
    config: Option<PathBuf>,
}

/// Initialize the tracing subscriber for logging.
///
/// When `json_output` is true, logging is completely disabled to ensure
/// only JSON is written to stdout.
fn init_logging(level: &str, quiet: bool, json_output: bool) {
    if json_output {
        return;
    }

    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let json_output = matches!(&cli.command, Command::Analyze(args) if args.json);
    init_logging(&cli.log_level, cli.quiet, json_output);

    match cli.command {
        Command::Analyze(args) => run_analyze(&args, cli.quiet),
        Command::Profile(args) => run_profile(&args),
    }
}

fn load_config(path: Option<&Path>) -> Result<AnalysisConfig> {
    match path {
        Some(path) => {
            let config = AnalysisConfig::from_json_file(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?;
            config.validate()?;
            Ok(config)
        }
        None => Ok(AnalysisConfig::default()),
    }
}

fn load_input(path: &Path) -> Result<Dataset> {
    if !path.exists() {
        return Err(anyhow!("Input file not found: {}", path.display()));
    }
    info!("Loading dataset from: {}", path.display());
    Ok(load_csv(path)?)
}

fn run_analyze(args: &AnalyzeArgs, quiet: bool) -> Result<()> {
    let mut config = load_config(args.config.as_deref())?;
    if args.max_rows.is_some() {
        config.limits.max_rows = args.max_rows;
    }
    if args.max_columns.is_some() {
        config.limits.max_columns = args.max_columns;
    }
    if args.time_budget_ms.is_some() {
        config.limits.time_budget_ms = args.time_budget_ms;
    }
    if args.sequential {
        config.parallel = false;
    }

    let dataset = load_input(&args.input)?;

    let mut builder = Analyzer::builder().config(config);
    if !quiet && !args.json {
        builder = builder.on_progress(|update| {
            info!(
                "[{:.0}%] {}: {}",
                update.progress * 100.0,
                update.stage.display_name(),
                update.message
            );
        });
    }
    let analyzer = builder.build()?;

    let report = match analyzer.analyze(&dataset) {
        Ok(report) => report,
        Err(e) => {
            error!("Analysis failed: {}", e);
            return Err(anyhow!("Analysis failed [{}]: {}", e.error_code(), e));
        }
    };

    if let Some(dir) = &args.emit_report {
        let store = JsonFileReportStore::new(dir);
        let id = store.persist_report(&extract_file_stem(&args.input), &report)?;
        info!("Report written to: {}", store.path_for(&id).display());
    }

    if args.json {
        println!("{}", report.to_json_pretty()?);
        return Ok(());
    }

    print_human_readable_summary(&report, &args.input);
    Ok(())
}

fn run_profile(args: &ProfileArgs) -> Result<()> {
    let config = load_config(args.config.as_deref())?;
    let dataset = load_input(&args.input)?;

    let parser = CellParser::from_config(&config);
    let profile =
        DataProfiler::profile_dataset(&dataset, &parser, &config, &RunGuard::unbounded())?;

    println!();
    println!("COLUMN PROFILES: {}", args.input.display());
    println!("  Rows: {}", profile.total_rows);
    println!("  Columns: {}", profile.total_columns);
    println!();
    println!(
        "{:<24} {:<12} {:>10} {:>10} {:>12}",
        "Column", "Type", "Missing %", "Unique", "Mean"
    );
    println!("{}", "-".repeat(72));

    for column in &profile.columns {
        let mean = column
            .numeric
            .as_ref()
            .map(|s| format!("{:.2}", s.mean))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<24} {:<12} {:>10.1} {:>10} {:>12}",
            truncate_str(&column.name, 23),
            column.inferred_type,
            column.missing_percentage(),
            column.distinct_count,
            mean
        );
    }
    println!();
    Ok(())
}

/// Extract the file stem (name without extension) from a path.
fn extract_file_stem(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("dataset")
        .to_string()
}

fn truncate_str(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

fn section_line<T>(section: &SectionResult<T>, describe: impl Fn(&T) -> String) -> String {
    match section {
        SectionResult::Available(s) => describe(s),
        SectionResult::Unavailable(u) => format!("unavailable ({})", u.reason),
    }
}

/// Print a human-readable summary of the report.
///
/// This is the default output when `--json` is not specified.
fn print_human_readable_summary(report: &Report, input: &Path) {
    let summary = &report.summary;

    println!();
    println!("{}", "=".repeat(80));
    println!("DATA QUALITY REPORT");
    println!("{}", "=".repeat(80));
    println!();
    println!(
        "Input:  {} ({} rows x {} columns)",
        input.display(),
        summary.total_rows,
        summary.total_columns
    );
    println!(
        "Types:  {} numeric, {} categorical, {} date, {} text",
        summary.numeric_columns,
        summary.categorical_columns,
        summary.date_columns,
        summary.text_columns
    );
    println!();
    println!("Health Score: {}/100 ({})", report.health_score, report.health_label);
    println!();

    println!("Findings:");
    println!(
        "  Missing values:   {}",
        section_line(&report.missing_values, |s| format!(
            "{} of {} cells ({:.2}%) in {} columns",
            s.total_missing, s.total_cells, s.percentage, s.columns_affected
        ))
    );
    println!(
        "  Duplicate rows:   {}",
        section_line(&report.duplicates, |s| format!(
            "{} ({:.2}%)",
            s.full_row_duplicates, s.percentage
        ))
    );
    println!(
        "  Class imbalance:  {}",
        section_line(&report.class_imbalance, |s| format!(
            "{} columns",
            s.columns_with_imbalance
        ))
    );
    println!(
        "  Outliers:         {}",
        section_line(&report.outliers, |s| format!(
            "{} of {} numeric columns",
            s.columns_with_outliers, s.columns_checked
        ))
    );
    println!(
        "  Type issues:      {}",
        section_line(&report.data_types, |s| format!("{} columns", s.type_issues.len()))
    );
    println!(
        "  Date formats:     {}",
        section_line(&report.date_formats, |s| format!(
            "{} date columns",
            s.date_columns_found
        ))
    );
    println!(
        "  Consistency:      {}",
        section_line(&report.categorical_consistency, |s| format!(
            "{} of {} categorical columns inconsistent",
            s.details.iter().filter(|d| d.has_inconsistency).count(),
            s.categorical_columns
        ))
    );
    println!();

    if let Some(types) = report.data_types.available()
        && !types.type_issues.is_empty()
    {
        println!("Type Issues:");
        for issue in &types.type_issues {
            println!("  - {}: {}", issue.column, issue.issue);
        }
        println!();
    }

    println!("Report ID: {}", report.report_id);
    println!("Use --json for machine-readable output");
    println!("Use --emit-report <DIR> to save the JSON report");
    println!("{}", "=".repeat(80));
}
