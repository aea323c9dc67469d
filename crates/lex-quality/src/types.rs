use serde::{Deserialize, Serialize};
use std::fmt;

/// Working type of a column, decided by the schema inferer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InferredType {
    Numeric,
    Categorical,
    Date,
    Text,
}

impl InferredType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Numeric => "numeric",
            Self::Categorical => "categorical",
            Self::Date => "date",
            Self::Text => "text",
        }
    }

    /// Categorical and text columns are stored as strings.
    pub fn is_textual(&self) -> bool {
        matches!(self, Self::Categorical | Self::Text)
    }
}

impl fmt::Display for InferredType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Summary statistics of a numeric column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericStats {
    pub min: f64,
    pub max: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub mean: f64,
    /// Sample standard deviation (n - 1); 0 for fewer than two values.
    pub std: f64,
}

impl NumericStats {
    pub fn iqr(&self) -> f64 {
        self.q3 - self.q1
    }
}

/// Read-only profile of one column, built once per analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnProfile {
    pub name: String,
    /// Position of the column in the dataset.
    pub position: usize,
    pub inferred_type: InferredType,
    /// Number of rows, missing cells included.
    pub total_count: usize,
    pub missing_count: usize,
    /// Distinct non-missing values (exact string comparison).
    pub distinct_count: usize,
    /// Non-missing values that parse as numbers.
    pub numeric_like_count: usize,
    /// Non-missing values shaped like a recognized date format.
    pub date_shape_count: usize,
    /// Non-missing values that parse as a real date in a recognized format.
    pub date_parse_count: usize,
    /// Present for numeric columns only.
    pub numeric: Option<NumericStats>,
    /// Sorted non-missing values of a numeric column.
    #[serde(skip)]
    pub sorted_values: Vec<f64>,
}

impl ColumnProfile {
    pub fn present_count(&self) -> usize {
        self.total_count - self.missing_count
    }

    pub fn is_all_missing(&self) -> bool {
        self.present_count() == 0
    }

    pub fn missing_percentage(&self) -> f64 {
        crate::utils::percentage(self.missing_count, self.total_count)
    }

    /// Share of non-missing values parsing as numbers (0.0 - 1.0).
    pub fn numeric_ratio(&self) -> f64 {
        ratio(self.numeric_like_count, self.present_count())
    }

    /// Share of non-missing values parsing as real dates (0.0 - 1.0).
    pub fn date_ratio(&self) -> f64 {
        ratio(self.date_parse_count, self.present_count())
    }
}

fn ratio(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64
    }
}

/// Profiles of every column, in dataset order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetProfile {
    pub total_rows: usize,
    pub total_columns: usize,
    pub columns: Vec<ColumnProfile>,
}

impl DatasetProfile {
    pub fn count_of(&self, inferred_type: InferredType) -> usize {
        self.columns
            .iter()
            .filter(|c| c.inferred_type == inferred_type)
            .count()
    }

    pub fn columns_of(&self, inferred_type: InferredType) -> impl Iterator<Item = &ColumnProfile> {
        self.columns
            .iter()
            .filter(move |c| c.inferred_type == inferred_type)
    }
}
