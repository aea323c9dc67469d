//! Report sections and the findings they carry.
//!
//! Field names are part of the report's JSON contract with rendering layers.

use crate::types::InferredType;
use serde::{Deserialize, Serialize};

// =============================================================================
// Summary
// =============================================================================

/// Dataset shape and per-type column counts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub total_rows: usize,
    pub total_columns: usize,
    pub numeric_columns: usize,
    pub categorical_columns: usize,
    pub date_columns: usize,
    pub text_columns: usize,
    pub numeric_summary: Vec<NumericSummary>,
}

/// Descriptive statistics of one numeric column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericSummary {
    pub column: String,
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    #[serde(rename = "25%")]
    pub p25: f64,
    #[serde(rename = "50%")]
    pub p50: f64,
    #[serde(rename = "75%")]
    pub p75: f64,
    pub max: f64,
}

// =============================================================================
// Missing values
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissingValueFinding {
    pub column: String,
    pub count: usize,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissingValuesSection {
    pub total_missing: usize,
    pub total_cells: usize,
    pub percentage: f64,
    pub columns_affected: usize,
    pub details: Vec<MissingValueFinding>,
}

// =============================================================================
// Duplicates
// =============================================================================

/// Repeated values within a single column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDuplicateFinding {
    pub column: String,
    pub count: usize,
    pub percentage: f64,
}

/// A duplicate row and the earlier row it repeats, with its raw cells in
/// column order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DuplicateRowSample {
    pub row: usize,
    pub first_row: usize,
    pub values: Vec<Option<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DuplicatesSection {
    pub full_row_duplicates: usize,
    pub percentage: f64,
    /// The first few duplicate rows, in row order.
    #[serde(default)]
    pub duplicate_row_samples: Vec<DuplicateRowSample>,
    pub column_duplicates: Vec<ColumnDuplicateFinding>,
}

// =============================================================================
// Class imbalance
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    High,
    Medium,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImbalanceFinding {
    pub column: String,
    pub imbalance_ratio: f64,
    pub severity: Severity,
    pub unique_classes: usize,
    pub most_common_class: String,
    pub most_common_count: usize,
    pub least_common_class: String,
    pub least_common_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassImbalanceSection {
    pub columns_with_imbalance: usize,
    pub details: Vec<ImbalanceFinding>,
}

impl ClassImbalanceSection {
    pub fn count_of(&self, severity: Severity) -> usize {
        self.details.iter().filter(|d| d.severity == severity).count()
    }
}

// =============================================================================
// Outliers
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutlierFinding {
    pub column: String,
    pub outlier_count: usize,
    pub percentage: f64,
    pub min_value: f64,
    pub max_value: f64,
    pub lower_bound: f64,
    pub upper_bound: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutliersSection {
    pub columns_with_outliers: usize,
    /// Numeric columns with enough values to be evaluated.
    pub columns_checked: usize,
    pub details: Vec<OutlierFinding>,
}

// =============================================================================
// Data types
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeIssueFinding {
    pub column: String,
    pub issue: String,
    pub suggested_type: InferredType,
    /// Share of non-missing values consistent with the suggested type.
    pub consistent_percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeDistributionEntry {
    pub column: String,
    pub current_type: InferredType,
    pub unique_values: usize,
    pub null_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataTypesSection {
    pub type_distribution: Vec<TypeDistributionEntry>,
    pub type_issues: Vec<TypeIssueFinding>,
}

// =============================================================================
// Date formats
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DateStatus {
    Valid,
    #[serde(rename = "Has Issues")]
    HasIssues,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateFormatFinding {
    pub column: String,
    pub status: DateStatus,
    pub valid_dates: usize,
    pub invalid_dates: usize,
    pub sample_values: Vec<String>,
    /// Recognized formats seen in this column, in configured order.
    pub matched_formats: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateFormatsSection {
    pub date_columns_found: usize,
    pub details: Vec<DateFormatFinding>,
}

// =============================================================================
// Categorical consistency
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueCount {
    pub value: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsistencyFinding {
    pub column: String,
    pub unique_values: usize,
    pub most_common: Vec<ValueCount>,
    pub has_inconsistency: bool,
    pub inconsistency_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoricalConsistencySection {
    pub categorical_columns: usize,
    pub details: Vec<ConsistencyFinding>,
}
