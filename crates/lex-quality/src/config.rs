//! Configuration types for the quality engine.
//!
//! Every threshold the detectors and the health score use lives here, with
//! documented defaults, so callers can tune them without touching the
//! detectors. Use [`AnalysisConfig::builder()`] for a validated config.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Method used by the outlier detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OutlierMethod {
    /// Tukey fences: values outside [Q1 - k*IQR, Q3 + k*IQR]
    #[default]
    Iqr,
    /// Values whose absolute z-score exceeds the configured threshold
    ZScore,
}

/// Weights of the health score components. They must sum to 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    pub completeness: f64,
    pub uniqueness: f64,
    pub outliers: f64,
    pub imbalance: f64,
    pub date_validity: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            completeness: 0.30,
            uniqueness: 0.20,
            outliers: 0.20,
            imbalance: 0.15,
            date_validity: 0.15,
        }
    }
}

impl ScoreWeights {
    pub fn total(&self) -> f64 {
        self.completeness + self.uniqueness + self.outliers + self.imbalance + self.date_validity
    }
}

/// Constants of the health score formula.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Component weights.
    pub weights: ScoreWeights,

    /// Multiplier applied to the duplicate percentage before it is
    /// subtracted from the uniqueness score.
    /// Default: 2.0
    pub duplicate_multiplier: f64,

    /// Points removed from the imbalance score per High finding.
    /// Default: 10.0
    pub high_imbalance_penalty: f64,

    /// Points removed from the imbalance score per Medium finding.
    /// Default: 5.0
    pub medium_imbalance_penalty: f64,

    /// Points removed from the final score per type issue.
    /// Default: 10.0
    pub type_issue_penalty: f64,

    /// Type issues beyond this count add no further penalty.
    /// Default: 5
    pub max_penalized_type_issues: usize,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            weights: ScoreWeights::default(),
            duplicate_multiplier: 2.0,
            high_imbalance_penalty: 10.0,
            medium_imbalance_penalty: 5.0,
            type_issue_penalty: 10.0,
            max_penalized_type_issues: 5,
        }
    }
}

/// Caller-imposed ceilings. An analysis that would exceed one fails fast
/// with [`QualityError::ResourceExceeded`](crate::error::QualityError::ResourceExceeded).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceLimits {
    pub max_rows: Option<usize>,
    pub max_columns: Option<usize>,
    /// Wall-clock budget for one analysis, in milliseconds.
    pub time_budget_ms: Option<u64>,
}

/// Configuration for an analysis run.
///
/// # Example
///
/// ```rust,ignore
/// use lex_quality::config::{AnalysisConfig, OutlierMethod};
///
/// let config = AnalysisConfig::builder()
///     .supermajority_threshold(0.9)
///     .outlier_method(OutlierMethod::Iqr)
///     .max_rows(1_000_000)
///     .build()?;
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Columns whose distinct/total ratio is at or below this are categorical.
    /// Default: 0.5
    pub categorical_threshold: f64,

    /// Categorical columns with more distinct values than this are not
    /// treated as classes by the imbalance detector.
    /// Default: 20
    pub cardinality_ceiling: usize,

    /// Ratio at which a column is reported as Medium imbalance.
    /// Default: 3.0
    pub imbalance_medium_ratio: f64,

    /// Ratio at which a column is reported as High imbalance.
    /// Default: 10.0
    pub imbalance_high_ratio: f64,

    /// Outlier detection method.
    /// Default: Iqr
    pub outlier_method: OutlierMethod,

    /// Fence multiplier for the IQR method.
    /// Default: 1.5
    pub iqr_multiplier: f64,

    /// Absolute z-score above which a value is an outlier (ZScore method).
    /// Default: 3.0
    pub zscore_threshold: f64,

    /// Numeric columns with fewer non-missing values are not checked for outliers.
    /// Default: 4
    pub min_outlier_values: usize,

    /// Share of values that must parse as another type before a text
    /// column is flagged as mistyped (0.0 - 1.0, exclusive).
    /// Default: 0.8
    pub supermajority_threshold: f64,

    /// Recognized date formats, in chrono `strftime` syntax.
    /// Default: `%Y-%m-%d`, `%m/%d/%Y`, `%d-%m-%Y`
    pub date_formats: Vec<String>,

    /// Cell values treated as missing, compared case-insensitively after
    /// trimming. Empty cells are always missing.
    /// Default: `NA`, `N/A`, `null`
    pub missing_tokens: Vec<String>,

    /// Categorical/text columns with this many distinct values or more are
    /// skipped by the consistency check.
    /// Default: 100
    pub max_consistency_cardinality: usize,

    /// Profile columns and run detectors on the rayon pool.
    /// Default: true
    pub parallel: bool,

    /// Health score constants.
    pub scoring: ScoringConfig,

    /// Resource ceilings.
    pub limits: ResourceLimits,
}

pub const DEFAULT_DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%m/%d/%Y", "%d-%m-%Y"];
pub const DEFAULT_MISSING_TOKENS: [&str; 3] = ["NA", "N/A", "null"];

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            categorical_threshold: 0.5,
            cardinality_ceiling: 20,
            imbalance_medium_ratio: 3.0,
            imbalance_high_ratio: 10.0,
            outlier_method: OutlierMethod::default(),
            iqr_multiplier: 1.5,
            zscore_threshold: 3.0,
            min_outlier_values: 4,
            supermajority_threshold: 0.8,
            date_formats: DEFAULT_DATE_FORMATS.iter().map(|f| f.to_string()).collect(),
            missing_tokens: DEFAULT_MISSING_TOKENS.iter().map(|t| t.to_string()).collect(),
            max_consistency_cardinality: 100,
            parallel: true,
            scoring: ScoringConfig::default(),
            limits: ResourceLimits::default(),
        }
    }
}

impl AnalysisConfig {
    /// Create a new configuration builder.
    pub fn builder() -> AnalysisConfigBuilder {
        AnalysisConfigBuilder::default()
    }

    /// Read a (possibly partial) configuration from a JSON file and validate it.
    pub fn from_json_file(path: impl AsRef<Path>) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: AnalysisConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        check_unit_interval("categorical_threshold", self.categorical_threshold)?;
        check_unit_interval("supermajority_threshold", self.supermajority_threshold)?;

        if self.cardinality_ceiling < 2 {
            return Err(ConfigValidationError::InvalidCount {
                field: "cardinality_ceiling".to_string(),
                value: self.cardinality_ceiling,
                minimum: 2,
            });
        }

        if self.min_outlier_values < 4 {
            return Err(ConfigValidationError::InvalidCount {
                field: "min_outlier_values".to_string(),
                value: self.min_outlier_values,
                minimum: 4,
            });
        }

        if !(self.imbalance_medium_ratio >= 1.0
            && self.imbalance_medium_ratio <= self.imbalance_high_ratio)
        {
            return Err(ConfigValidationError::InvalidImbalanceRatios {
                medium: self.imbalance_medium_ratio,
                high: self.imbalance_high_ratio,
            });
        }

        check_positive("iqr_multiplier", self.iqr_multiplier)?;
        check_positive("zscore_threshold", self.zscore_threshold)?;

        if self.date_formats.is_empty() {
            return Err(ConfigValidationError::NoDateFormats);
        }

        let weights = &self.scoring.weights;
        let all_weights = [
            ("completeness", weights.completeness),
            ("uniqueness", weights.uniqueness),
            ("outliers", weights.outliers),
            ("imbalance", weights.imbalance),
            ("date_validity", weights.date_validity),
        ];
        for (name, weight) in all_weights {
            if !(weight >= 0.0) {
                return Err(ConfigValidationError::NegativeWeight {
                    field: name.to_string(),
                    value: weight,
                });
            }
        }
        if (weights.total() - 1.0).abs() > 1e-6 {
            return Err(ConfigValidationError::WeightsDoNotSumToOne(weights.total()));
        }

        Ok(())
    }
}

fn check_unit_interval(field: &str, value: f64) -> Result<(), ConfigValidationError> {
    if !(0.0..=1.0).contains(&value) {
        return Err(ConfigValidationError::InvalidThreshold {
            field: field.to_string(),
            value,
        });
    }
    Ok(())
}

fn check_positive(field: &str, value: f64) -> Result<(), ConfigValidationError> {
    if !(value > 0.0) {
        return Err(ConfigValidationError::NotPositive {
            field: field.to_string(),
            value,
        });
    }
    Ok(())
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid threshold for '{field}': {value} (must be between 0.0 and 1.0)")]
    InvalidThreshold { field: String, value: f64 },

    #[error("Invalid value for '{field}': {value} (must be at least {minimum})")]
    InvalidCount {
        field: String,
        value: usize,
        minimum: usize,
    },

    #[error("Invalid imbalance ratios: medium {medium}, high {high} (need 1.0 <= medium <= high)")]
    InvalidImbalanceRatios { medium: f64, high: f64 },

    #[error("Invalid value for '{field}': {value} (must be positive)")]
    NotPositive { field: String, value: f64 },

    #[error("At least one date format is required")]
    NoDateFormats,

    #[error("Score weight '{field}' is negative: {value}")]
    NegativeWeight { field: String, value: f64 },

    #[error("Score weights must sum to 1.0, got {0}")]
    WeightsDoNotSumToOne(f64),
}

/// Builder for [`AnalysisConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct AnalysisConfigBuilder {
    config: AnalysisConfig,
}

impl AnalysisConfigBuilder {
    pub fn categorical_threshold(mut self, threshold: f64) -> Self {
        self.config.categorical_threshold = threshold;
        self
    }

    pub fn cardinality_ceiling(mut self, ceiling: usize) -> Self {
        self.config.cardinality_ceiling = ceiling;
        self
    }

    /// Set the Medium and High imbalance ratio cutoffs.
    pub fn imbalance_ratios(mut self, medium: f64, high: f64) -> Self {
        self.config.imbalance_medium_ratio = medium;
        self.config.imbalance_high_ratio = high;
        self
    }

    pub fn outlier_method(mut self, method: OutlierMethod) -> Self {
        self.config.outlier_method = method;
        self
    }

    pub fn iqr_multiplier(mut self, multiplier: f64) -> Self {
        self.config.iqr_multiplier = multiplier;
        self
    }

    pub fn zscore_threshold(mut self, threshold: f64) -> Self {
        self.config.zscore_threshold = threshold;
        self
    }

    pub fn min_outlier_values(mut self, count: usize) -> Self {
        self.config.min_outlier_values = count;
        self
    }

    pub fn supermajority_threshold(mut self, threshold: f64) -> Self {
        self.config.supermajority_threshold = threshold;
        self
    }

    /// Replace the recognized date formats (chrono `strftime` syntax).
    pub fn date_formats<I, S>(mut self, formats: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.date_formats = formats.into_iter().map(Into::into).collect();
        self
    }

    /// Add a date format on top of the current set.
    pub fn add_date_format(mut self, format: impl Into<String>) -> Self {
        self.config.date_formats.push(format.into());
        self
    }

    pub fn missing_tokens<I, S>(mut self, tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.missing_tokens = tokens.into_iter().map(Into::into).collect();
        self
    }

    pub fn max_consistency_cardinality(mut self, cardinality: usize) -> Self {
        self.config.max_consistency_cardinality = cardinality;
        self
    }

    /// Enable or disable rayon fan-out. Output is identical either way.
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.config.parallel = parallel;
        self
    }

    pub fn score_weights(mut self, weights: ScoreWeights) -> Self {
        self.config.scoring.weights = weights;
        self
    }

    pub fn scoring(mut self, scoring: ScoringConfig) -> Self {
        self.config.scoring = scoring;
        self
    }

    pub fn max_rows(mut self, rows: usize) -> Self {
        self.config.limits.max_rows = Some(rows);
        self
    }

    pub fn max_columns(mut self, columns: usize) -> Self {
        self.config.limits.max_columns = Some(columns);
        self
    }

    pub fn time_budget_ms(mut self, budget: u64) -> Self {
        self.config.limits.time_budget_ms = Some(budget);
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `AnalysisConfig` or an error if validation fails.
    pub fn build(self) -> Result<AnalysisConfig, ConfigValidationError> {
        self.config.validate()?;
        Ok(self.config)
    }
}
