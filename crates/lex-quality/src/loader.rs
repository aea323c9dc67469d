//! CSV ingestion.
//!
//! Every column is read as text (schema inference disabled) so the profiler
//! sees the raw cell values; typing is the analyzer's job, not the reader's.

use crate::dataset::Dataset;
use crate::error::{QualityError, Result, ResultExt};
use crate::service::DatasetLoader;
use polars::io::csv::read::CsvReadOptions;
use polars::prelude::*;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Load a CSV file into a [`Dataset`].
///
/// Tries a quoted read, then an unquoted read, then a read of pre-cleaned
/// content before giving up.
pub fn load_csv(path: impl AsRef<Path>) -> Result<Dataset> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(QualityError::DatasetNotFound(path.display().to_string()));
    }

    let df = read_with_fallbacks(path)?;
    info!("Loaded {} ({} rows x {} columns)", path.display(), df.height(), df.width());
    Dataset::from_dataframe(&df)
}

/// Parse CSV content already held in memory.
pub fn parse_csv(content: &str) -> Result<Dataset> {
    let df = text_options()
        .into_reader_with_file_handle(Cursor::new(content.as_bytes().to_vec()))
        .finish()
        .context("Failed to parse CSV content")?;
    Dataset::from_dataframe(&df)
}

fn text_options() -> CsvReadOptions {
    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
}

fn read_with_fallbacks(path: &Path) -> Result<DataFrame> {
    // Strategy 1: standard quoting
    match text_options()
        .with_parse_options(CsvParseOptions::default().with_quote_char(Some(b'"')))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()
    {
        Ok(df) => return Ok(df),
        Err(e) => debug!("Quoted read of {} failed: {}", path.display(), e),
    }

    // Strategy 2: no quote handling
    match text_options()
        .with_parse_options(CsvParseOptions::default().with_quote_char(None))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()
    {
        Ok(df) => return Ok(df),
        Err(e) => debug!("Unquoted read of {} failed: {}", path.display(), e),
    }

    // Strategy 3: pre-cleaned content
    let content = std::fs::read_to_string(path)
        .context(format!("Failed to read {}", path.display()))?;
    text_options()
        .into_reader_with_file_handle(Cursor::new(clean_csv_content(&content).into_bytes()))
        .finish()
        .context(format!("Failed to parse {}", path.display()))
}

/// Collapse doubled quote runs and drop blank lines.
fn clean_csv_content(content: &str) -> String {
    content
        .replace("\"\"\"", "\"")
        .replace("\"\"", "\"")
        .lines()
        .filter(|line| !line.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Resolves dataset ids to `<root>/<id>.csv`.
#[derive(Debug, Clone)]
pub struct CsvDirectoryLoader {
    root: PathBuf,
}

impl CsvDirectoryLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, dataset_id: &str) -> Result<PathBuf> {
        let trimmed = dataset_id.trim();
        if trimmed.is_empty()
            || trimmed.contains(['/', '\\'])
            || trimmed.starts_with('.')
        {
            return Err(QualityError::InvalidInput(format!(
                "invalid dataset id '{}'",
                dataset_id
            )));
        }
        Ok(self.root.join(format!("{}.csv", trimmed)))
    }
}

impl DatasetLoader for CsvDirectoryLoader {
    fn load_dataset(&self, dataset_id: &str) -> Result<Dataset> {
        let path = self.path_for(dataset_id)?;
        if !path.is_file() {
            return Err(QualityError::DatasetNotFound(dataset_id.to_string()));
        }
        load_csv(&path).context(format!("Failed to load dataset '{}'", dataset_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_parse_csv_keeps_text() {
        let dataset = parse_csv("id,code\n1,007\n2,\n").unwrap();

        assert_eq!(dataset.height(), 2);
        assert_eq!(dataset.column_names(), vec!["id", "code"]);
        assert_eq!(dataset.cell(0, 1), Some("007"));
        assert_eq!(dataset.cell(1, 1), None);
    }

    #[test]
    fn test_clean_csv_content() {
        let cleaned = clean_csv_content("a,b\n\n\"\"\"x\"\"\",1\n   \n");
        assert_eq!(cleaned, "a,b\n\"x\",1");
    }

    #[test]
    fn test_load_csv_missing_file() {
        let err = load_csv("/definitely/not/here.csv").unwrap_err();
        assert_eq!(err.error_code(), "DATASET_NOT_FOUND");
    }

    #[test]
    fn test_directory_loader() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("sales.csv"), "region,amount\nnorth,10\nsouth,12\n").unwrap();
        let loader = CsvDirectoryLoader::new(dir.path());

        let dataset = loader.load_dataset("sales").unwrap();
        assert_eq!(dataset.width(), 2);

        let err = loader.load_dataset("missing").unwrap_err();
        assert!(matches!(err, QualityError::DatasetNotFound(id) if id == "missing"));

        let err = loader.load_dataset("../sales").unwrap_err();
        assert!(matches!(err, QualityError::InvalidInput(_)));
    }
}
