//! Data profiling module for dataset analysis.
//!
//! This module provides:
//! - Schema inference (numeric, categorical, date, text)
//! - Per-column base statistics (counts, distinct values, numeric summary)
//!
//! Each column is profiled independently in a single pass, so columns are
//! profiled on the rayon pool when the config allows it.

pub(crate) mod statistics;
mod type_inference;

use crate::config::AnalysisConfig;
use crate::dataset::{Column, Dataset};
use crate::error::Result;
use crate::pipeline::RunGuard;
use crate::types::{ColumnProfile, DatasetProfile, InferredType};
use crate::utils::CellParser;
use rayon::prelude::*;
use std::collections::HashSet;
use tracing::debug;

use statistics::numeric_stats;
use type_inference::{TypeEvidence, infer_column_type};

/// Data profiler for analyzing dataset structure and characteristics.
pub struct DataProfiler;

impl DataProfiler {
    /// Profile every column of a dataset.
    pub fn profile_dataset(
        dataset: &Dataset,
        parser: &CellParser,
        config: &AnalysisConfig,
        guard: &RunGuard,
    ) -> Result<DatasetProfile> {
        let profile_one = |(position, column): (usize, &Column)| -> Result<ColumnProfile> {
            guard.check()?;
            Ok(Self::profile_column(position, column, parser, config))
        };

        let columns: Result<Vec<ColumnProfile>> = if config.parallel {
            dataset
                .columns()
                .par_iter()
                .enumerate()
                .map(profile_one)
                .collect()
        } else {
            dataset
                .columns()
                .iter()
                .enumerate()
                .map(profile_one)
                .collect()
        };

        Ok(DatasetProfile {
            total_rows: dataset.height(),
            total_columns: dataset.width(),
            columns: columns?,
        })
    }

    /// Profile a single column in one pass over its cells.
    pub fn profile_column(
        position: usize,
        column: &Column,
        parser: &CellParser,
        config: &AnalysisConfig,
    ) -> ColumnProfile {
        let mut missing_count = 0;
        let mut distinct: HashSet<&str> = HashSet::new();
        let mut numeric_values = Vec::new();
        let mut date_shape_count = 0;
        let mut date_parse_count = 0;

        for raw in column.iter() {
            let Some(value) = parser.present(raw) else {
                missing_count += 1;
                continue;
            };
            distinct.insert(value);
            if let Some(number) = parser.parse_numeric(value) {
                numeric_values.push(number);
            }
            if parser.looks_like_date(value) {
                date_shape_count += 1;
            }
            if parser.parse_date(value).is_some() {
                date_parse_count += 1;
            }
        }

        let total_count = column.len();
        let evidence = TypeEvidence {
            total_count,
            present_count: total_count - missing_count,
            distinct_count: distinct.len(),
            numeric_like_count: numeric_values.len(),
            date_shape_count,
        };
        let inferred_type = infer_column_type(&evidence, config.categorical_threshold);

        let (numeric, sorted_values) = if inferred_type == InferredType::Numeric {
            numeric_values.sort_by(f64::total_cmp);
            (numeric_stats(&numeric_values), numeric_values)
        } else {
            (None, Vec::new())
        };

        debug!(
            "Profiled column '{}': {} ({} missing, {} distinct)",
            column.name(),
            inferred_type,
            missing_count,
            evidence.distinct_count
        );

        ColumnProfile {
            name: column.name().to_string(),
            position,
            inferred_type,
            total_count,
            missing_count,
            distinct_count: evidence.distinct_count,
            numeric_like_count: evidence.numeric_like_count,
            date_shape_count,
            date_parse_count,
            numeric,
            sorted_values,
        }
    }
}
