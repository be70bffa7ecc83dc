//! Error types for ratingcurve-io.

use std::path::PathBuf;

use ratingcurve_model::ModelError;

/// Error type for all fallible operations in the ratingcurve-io crate.
///
/// Covers file-system failures, format errors from Parquet and JSON,
/// schema problems in observation files, and model-level rejections of the
/// data that was read.
#[derive(Debug, thiserror::Error)]
pub enum IoError {
    /// Returned when a required file does not exist on disk.
    #[error("file not found: {}", path.display())]
    FileNotFound {
        /// Path that could not be found.
        path: PathBuf,
    },

    /// Returned when a file cannot be opened or created.
    #[error("cannot access {}: {reason}", path.display())]
    File {
        /// Path being accessed.
        path: PathBuf,
        /// Description of the operating-system failure.
        reason: String,
    },

    /// Wraps an error originating from the Parquet or Arrow libraries.
    #[error("parquet error: {reason}")]
    Parquet {
        /// Description of the underlying Parquet failure.
        reason: String,
    },

    /// Wraps a JSON (de)serialisation failure.
    #[error("json error: {reason}")]
    Json {
        /// Description of the underlying serde_json failure.
        reason: String,
    },

    /// Returned when a required column is not present in a file.
    #[error("column '{name}' not found in {}", path.display())]
    MissingColumn {
        /// Name of the missing column.
        name: String,
        /// Path to the file that was inspected.
        path: PathBuf,
    },

    /// Returned when a column has an unsupported data type.
    #[error("column '{name}' has type {actual}, expected {expected}")]
    ColumnType {
        /// Column name.
        name: String,
        /// Supported type.
        expected: &'static str,
        /// Type found in the file.
        actual: String,
    },

    /// Returned when one or more validation checks fail.
    #[error("{count} validation error(s): {details}")]
    Validation {
        /// Number of accumulated validation failures.
        count: usize,
        /// Human-readable summary of the failures.
        details: String,
    },

    /// The data was read but rejected by the model crate.
    #[error(transparent)]
    Model(#[from] ModelError),
}

impl From<parquet::errors::ParquetError> for IoError {
    fn from(e: parquet::errors::ParquetError) -> Self {
        IoError::Parquet {
            reason: e.to_string(),
        }
    }
}

impl From<arrow::error::ArrowError> for IoError {
    fn from(e: arrow::error::ArrowError) -> Self {
        IoError::Parquet {
            reason: e.to_string(),
        }
    }
}

impl From<serde_json::Error> for IoError {
    fn from(e: serde_json::Error) -> Self {
        IoError::Json {
            reason: e.to_string(),
        }
    }
}
