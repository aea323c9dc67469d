//! Collaborator contracts and the service that wires them to the analyzer.
//!
//! The engine itself never touches storage. A host application supplies a
//! [`DatasetLoader`] and a [`ReportStore`]; [`AnalysisService`] loads the
//! dataset, runs the [`Analyzer`] and persists the resulting report.

use crate::dataset::Dataset;
use crate::error::{QualityError, Result, ResultExt};
use crate::pipeline::Analyzer;
use crate::report::Report;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// Resolves a dataset identifier to tabular data.
pub trait DatasetLoader: Send + Sync {
    /// Returns [`QualityError::DatasetNotFound`] for unknown ids.
    fn load_dataset(&self, dataset_id: &str) -> Result<Dataset>;
}

/// Persists finished reports.
pub trait ReportStore: Send + Sync {
    /// Store a report for a dataset and return the report's id.
    fn persist_report(&self, dataset_id: &str, report: &Report) -> Result<Uuid>;
}

/// Renders a report for export.
pub trait ReportRenderer: Send + Sync {
    fn render_pdf(&self, report: &Report) -> Result<Vec<u8>>;
}

/// Report store backed by a map, for tests and embedding.
#[derive(Default)]
pub struct InMemoryReportStore {
    reports: RwLock<HashMap<Uuid, (String, Report)>>,
}

static_assertions::assert_impl_all!(InMemoryReportStore: Send, Sync);

impl InMemoryReportStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, report_id: &Uuid) -> Option<Report> {
        self.reports.read().get(report_id).map(|(_, r)| r.clone())
    }

    /// Reports stored for one dataset, in no particular order.
    pub fn reports_for(&self, dataset_id: &str) -> Vec<Report> {
        self.reports
            .read()
            .values()
            .filter(|(id, _)| id == dataset_id)
            .map(|(_, r)| r.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.reports.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.reports.read().is_empty()
    }
}

impl ReportStore for InMemoryReportStore {
    fn persist_report(&self, dataset_id: &str, report: &Report) -> Result<Uuid> {
        let mut reports = self.reports.write();
        if reports.contains_key(&report.report_id) {
            return Err(QualityError::InvalidInput(format!(
                "report {} already stored",
                report.report_id
            )));
        }
        reports.insert(report.report_id, (dataset_id.to_string(), report.clone()));
        Ok(report.report_id)
    }
}

/// Writes each report as pretty JSON to `<dir>/<report_id>.json`.
///
/// Existing files are never overwritten.
#[derive(Debug, Clone)]
pub struct JsonFileReportStore {
    dir: PathBuf,
}

impl JsonFileReportStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, report_id: &Uuid) -> PathBuf {
        self.dir.join(format!("{}.json", report_id))
    }

    pub fn load_report(&self, report_id: &Uuid) -> Result<Report> {
        let path = self.path_for(report_id);
        let content = std::fs::read_to_string(&path)
            .context(format!("Failed to read report {}", path.display()))?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl ReportStore for JsonFileReportStore {
    fn persist_report(&self, dataset_id: &str, report: &Report) -> Result<Uuid> {
        std::fs::create_dir_all(&self.dir)
            .context(format!("Failed to create {}", self.dir.display()))?;

        let path = self.path_for(&report.report_id);
        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .context(format!("Failed to create {}", path.display()))?;

        let json = report.to_json_pretty()?;
        file.write_all(json.as_bytes())
            .context(format!("Failed to write {}", path.display()))?;

        info!("Stored report {} for dataset '{}'", report.report_id, dataset_id);
        Ok(report.report_id)
    }
}

/// Loads a dataset, analyzes it and stores the report.
pub struct AnalysisService {
    loader: Arc<dyn DatasetLoader>,
    store: Arc<dyn ReportStore>,
    analyzer: Analyzer,
}

static_assertions::assert_impl_all!(AnalysisService: Send, Sync);

impl AnalysisService {
    pub fn new(
        loader: Arc<dyn DatasetLoader>,
        store: Arc<dyn ReportStore>,
        analyzer: Analyzer,
    ) -> Self {
        Self {
            loader,
            store,
            analyzer,
        }
    }

    pub fn analyzer(&self) -> &Analyzer {
        &self.analyzer
    }

    /// Analyze a stored dataset and persist a new report.
    pub fn analyze_dataset(&self, dataset_id: &str) -> Result<Report> {
        let dataset = self.loader.load_dataset(dataset_id)?;
        let report = self
            .analyzer
            .analyze(&dataset)
            .context(format!("Failed to analyze dataset '{}'", dataset_id))?;
        self.store.persist_report(dataset_id, &report)?;
        Ok(report)
    }
}
