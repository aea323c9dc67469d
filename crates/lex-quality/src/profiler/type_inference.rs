//! Schema inference: decide a working type per column from value counts.

use crate::types::InferredType;

/// Value counts the classification policy looks at.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct TypeEvidence {
    pub total_count: usize,
    pub present_count: usize,
    pub distinct_count: usize,
    pub numeric_like_count: usize,
    pub date_shape_count: usize,
}

/// Classify a column. Rules apply in priority order:
///
/// 1. every non-missing value is numeric → `Numeric`
/// 2. every non-missing value has a recognized date shape → `Date`
/// 3. `distinct / total <= categorical_threshold` → `Categorical`
/// 4. otherwise `Text`
///
/// A column without non-missing values is `Text`. Values that are both
/// numeric and date-shaped resolve to `Numeric` by rule order.
pub(crate) fn infer_column_type(evidence: &TypeEvidence, categorical_threshold: f64) -> InferredType {
    let present = evidence.present_count;
    if present == 0 {
        return InferredType::Text;
    }

    if evidence.numeric_like_count == present {
        return InferredType::Numeric;
    }

    if evidence.date_shape_count == present {
        return InferredType::Date;
    }

    let distinct_ratio = evidence.distinct_count as f64 / evidence.total_count as f64;
    if distinct_ratio <= categorical_threshold {
        return InferredType::Categorical;
    }

    InferredType::Text
}
