//! In-memory tabular dataset consumed by the engine.
//!
//! Cells are raw strings exactly as the loader produced them; whether a cell
//! counts as missing is decided later by [`CellParser`](crate::utils::CellParser).
//! Storage is column-major because profiling and most detectors walk one
//! column at a time.

use crate::error::{QualityError, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// One named column of raw cells.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    name: String,
    values: Vec<Option<String>>,
}

impl Column {
    pub fn new(name: impl Into<String>, values: Vec<Option<String>>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn values(&self) -> &[Option<String>] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate raw cells as borrowed strings.
    pub fn iter(&self) -> impl Iterator<Item = Option<&str>> + '_ {
        self.values.iter().map(|v| v.as_deref())
    }
}

/// Ordered rows over a fixed, ordered column set.
///
/// Every row has a cell for every column; an absent value is stored as
/// `None`, never omitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dataset {
    columns: Vec<Column>,
    height: usize,
}

impl Dataset {
    /// Build a dataset from named columns of equal length.
    pub fn from_columns(columns: Vec<Column>) -> Result<Self> {
        check_unique_names(columns.iter().map(|c| c.name()))?;

        let height = columns.first().map(Column::len).unwrap_or(0);
        if let Some(column) = columns.iter().find(|c| c.len() != height) {
            return Err(QualityError::InvalidInput(format!(
                "column '{}' has {} cells, expected {}",
                column.name(),
                column.len(),
                height
            )));
        }

        Ok(Self { columns, height })
    }

    /// Build a dataset from a header and rows of cells.
    ///
    /// Every row must have exactly one cell per header column.
    pub fn from_rows<S: Into<String>>(
        header: Vec<S>,
        rows: Vec<Vec<Option<String>>>,
    ) -> Result<Self> {
        let names: Vec<String> = header.into_iter().map(Into::into).collect();
        check_unique_names(names.iter().map(String::as_str))?;

        let width = names.len();
        let mut columns: Vec<Vec<Option<String>>> =
            (0..width).map(|_| Vec::with_capacity(rows.len())).collect();

        for (index, row) in rows.into_iter().enumerate() {
            if row.len() != width {
                return Err(QualityError::InvalidInput(format!(
                    "row {} has {} cells, expected {}",
                    index,
                    row.len(),
                    width
                )));
            }
            for (column, cell) in columns.iter_mut().zip(row) {
                column.push(cell);
            }
        }

        Self::from_columns(
            names
                .into_iter()
                .zip(columns)
                .map(|(name, values)| Column::new(name, values))
                .collect(),
        )
    }

    /// Build a dataset from column-name → value records.
    ///
    /// Column order follows the first record. Every record must carry the
    /// same set of keys.
    pub fn from_records<R, K>(records: Vec<R>) -> Result<Self>
    where
        R: IntoIterator<Item = (K, Option<String>)>,
        K: Into<String>,
    {
        let mut header: Vec<String> = Vec::new();
        let mut rows = Vec::with_capacity(records.len());

        for (index, record) in records.into_iter().enumerate() {
            let pairs: Vec<(String, Option<String>)> =
                record.into_iter().map(|(k, v)| (k.into(), v)).collect();

            if index == 0 {
                header = pairs.iter().map(|(k, _)| k.clone()).collect();
                check_unique_names(header.iter().map(String::as_str))?;
            }

            let mut by_name: HashMap<String, Option<String>> = pairs.into_iter().collect();
            if by_name.len() != header.len() {
                return Err(QualityError::InvalidInput(format!(
                    "record {} has {} fields, expected {}",
                    index,
                    by_name.len(),
                    header.len()
                )));
            }

            let mut row = Vec::with_capacity(header.len());
            for name in &header {
                match by_name.remove(name) {
                    Some(value) => row.push(value),
                    None => {
                        return Err(QualityError::InvalidInput(format!(
                            "record {} is missing field '{}'",
                            index, name
                        )));
                    }
                }
            }
            rows.push(row);
        }

        Self::from_rows(header, rows)
    }

    /// Convert a polars DataFrame, casting every column to string.
    ///
    /// Polars nulls become missing cells.
    pub fn from_dataframe(df: &DataFrame) -> Result<Self> {
        let mut columns = Vec::with_capacity(df.width());

        for column in df.get_columns() {
            let name = column.name().to_string();
            let as_string = column.as_materialized_series().cast(&DataType::String)?;
            let values: Vec<Option<String>> = as_string
                .str()?
                .into_iter()
                .map(|v| v.map(str::to_string))
                .collect();
            columns.push(Column::new(name, values));
        }

        Self::from_columns(columns)
    }

    /// Number of rows.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, index: usize) -> Option<&Column> {
        self.columns.get(index)
    }

    pub fn column_by_name(&self, name: &str) -> Result<&Column> {
        self.columns
            .iter()
            .find(|c| c.name() == name)
            .ok_or_else(|| QualityError::ColumnNotFound(name.to_string()))
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(Column::name).collect()
    }

    /// Raw cell at (row, column).
    pub fn cell(&self, row: usize, column: usize) -> Option<&str> {
        self.columns
            .get(column)
            .and_then(|c| c.values.get(row))
            .and_then(|v| v.as_deref())
    }

    /// Raw cells of one row, in column order.
    pub fn row(&self, row: usize) -> impl Iterator<Item = Option<&str>> + '_ {
        self.columns
            .iter()
            .map(move |c| c.values.get(row).and_then(|v| v.as_deref()))
    }
}

fn check_unique_names<'a>(names: impl Iterator<Item = &'a str>) -> Result<()> {
    let mut seen = HashSet::new();
    for name in names {
        if !seen.insert(name) {
            return Err(QualityError::InvalidInput(format!(
                "duplicate column name '{}'",
                name
            )));
        }
    }
    Ok(())
}
