//! Custom error types for the data quality engine.
//!
//! This module provides the error hierarchy using `thiserror` for every
//! stage of an analysis run, from dataset ingestion to report persistence.
//!
//! Errors are serializable so that a JSON-speaking collaborator (HTTP layer,
//! desktop shell) can forward them without losing the error code.

use crate::config::ConfigValidationError;
use serde::Serialize;
use serde::ser::SerializeStruct;
use thiserror::Error;

/// The main error type for the quality engine.
#[derive(Error, Debug)]
pub enum QualityError {
    /// The dataset cannot be analyzed (no rows, no columns, ragged rows).
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A caller-imposed resource ceiling was hit.
    #[error("Resource limit exceeded for {resource}: {actual} > {limit}")]
    ResourceExceeded {
        resource: String,
        limit: u64,
        actual: u64,
    },

    /// Analysis was cancelled through its cancellation token.
    #[error("Analysis cancelled")]
    Cancelled,

    /// The analysis configuration failed validation.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(#[from] ConfigValidationError),

    /// The loader collaborator has no dataset under this identifier.
    #[error("Dataset '{0}' not found")]
    DatasetNotFound(String),

    /// A named column does not exist.
    #[error("Column '{0}' not found in dataset")]
    ColumnNotFound(String),

    /// A single detector failed; the rest of the analysis continues.
    #[error("Detector '{detector}' failed: {reason}")]
    DetectorFailed { detector: String, reason: String },

    /// Internal error (e.g., broken invariant).
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Raised by the CSV reader or a DataFrame conversion.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Another error wrapped with a description of what was being done.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<QualityError>,
    },
}

impl QualityError {
    /// Wrap this error with a description of the failed operation.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        QualityError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Shorthand for a resource-ceiling violation.
    pub fn resource_exceeded(resource: impl Into<String>, limit: u64, actual: u64) -> Self {
        QualityError::ResourceExceeded {
            resource: resource.into(),
            limit,
            actual,
        }
    }

    /// Get error code for collaborator handling.
    ///
    /// Context-wrapped errors report the code of the innermost error.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "INVALID_INPUT",
            Self::ResourceExceeded { .. } => "RESOURCE_EXCEEDED",
            Self::Cancelled => "CANCELLED",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::DatasetNotFound(_) => "DATASET_NOT_FOUND",
            Self::ColumnNotFound(_) => "COLUMN_NOT_FOUND",
            Self::DetectorFailed { .. } => "DETECTOR_FAILED",
            Self::Internal(_) => "INTERNAL_ERROR",
            Self::Io(_) => "IO_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
            Self::Json(_) => "JSON_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }

    /// True for [`QualityError::Cancelled`], also through context wrappers.
    pub fn is_cancelled(&self) -> bool {
        match self {
            Self::Cancelled => true,
            Self::WithContext { source, .. } => source.is_cancelled(),
            _ => false,
        }
    }

    /// Check if this error is a resource-ceiling violation.
    pub fn is_resource_exceeded(&self) -> bool {
        match self {
            Self::ResourceExceeded { .. } => true,
            Self::WithContext { source, .. } => source.is_resource_exceeded(),
            _ => false,
        }
    }

    /// Errors that must abort the whole analysis instead of degrading a
    /// single report section.
    pub fn is_fatal(&self) -> bool {
        self.is_cancelled() || self.is_resource_exceeded()
    }

    /// Check if this error is recoverable by the caller (e.g. by retrying
    /// with a smaller dataset or a different configuration).
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Cancelled
            | Self::ResourceExceeded { .. }
            | Self::InvalidConfig(_)
            | Self::DatasetNotFound(_) => true,
            Self::WithContext { source, .. } => source.is_recoverable(),
            _ => false,
        }
    }
}

/// Errors are serialized as a struct with `code` and `message` fields.
impl Serialize for QualityError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("QualityError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for quality engine operations.
pub type Result<T> = std::result::Result<T, QualityError>;

/// Adds a context message to the error side of a result.
pub trait ResultExt<T> {
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, polars::error::PolarsError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| QualityError::Polars(e).with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, std::io::Error> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| QualityError::Io(e).with_context(context))
    }
}
