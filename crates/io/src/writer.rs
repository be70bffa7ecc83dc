//! High-level Parquet writer configuration and orchestration.

use std::path::Path;

use parquet::file::properties::WriterProperties;
use ratingcurve_model::RatingTable;
use tracing::info;

use crate::error::IoError;
use crate::parquet_write;

/// Compression algorithm for Parquet output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Compression {
    /// No compression.
    None,
    /// Snappy compression (fast, moderate ratio).
    #[default]
    Snappy,
    /// Zstd compression (slower, better ratio).
    Zstd,
}

impl Compression {
    /// Converts to the corresponding `parquet::basic::Compression` variant.
    fn to_parquet(self) -> Result<parquet::basic::Compression, IoError> {
        Ok(match self {
            Self::None => parquet::basic::Compression::UNCOMPRESSED,
            Self::Snappy => parquet::basic::Compression::SNAPPY,
            Self::Zstd => parquet::basic::Compression::ZSTD(parquet::basic::ZstdLevel::try_new(3)?),
        })
    }
}

impl std::str::FromStr for Compression {
    type Err = IoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" | "uncompressed" => Ok(Self::None),
            "snappy" => Ok(Self::Snappy),
            "zstd" => Ok(Self::Zstd),
            other => Err(IoError::Validation {
                count: 1,
                details: format!("unknown compression '{other}' (expected none, snappy or zstd)"),
            }),
        }
    }
}

/// Configuration for writing rating tables to Parquet.
#[derive(Debug, Clone)]
pub struct WriterConfig {
    /// Compression algorithm to use.
    compression: Compression,
    /// Maximum number of rows per row group.
    row_group_size: usize,
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            compression: Compression::default(),
            row_group_size: 1_000_000,
        }
    }
}

impl WriterConfig {
    /// Sets the compression algorithm.
    pub fn with_compression(mut self, comp: Compression) -> Self {
        self.compression = comp;
        self
    }

    /// Sets the maximum number of rows per row group.
    pub fn with_row_group_size(mut self, size: usize) -> Self {
        self.row_group_size = size;
        self
    }

    /// Returns the compression algorithm.
    pub fn compression(&self) -> Compression {
        self.compression
    }

    /// Returns the maximum number of rows per row group.
    pub fn row_group_size(&self) -> usize {
        self.row_group_size
    }

    /// Validates this configuration.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::Validation`] if `row_group_size` is zero.
    fn validate(&self) -> Result<(), IoError> {
        if self.row_group_size == 0 {
            return Err(IoError::Validation {
                count: 1,
                details: "row_group_size must be greater than 0".to_string(),
            });
        }
        Ok(())
    }
}

/// Write a rating table to a Parquet file with columns `stage`,
/// `discharge` and `sigma`.
///
/// # Errors
///
/// Returns [`IoError::Validation`] if the configuration is invalid,
/// [`IoError::File`] if the file cannot be created, or
/// [`IoError::Parquet`] if batch conversion or encoding fails.
pub fn write_rating_table(
    path: &Path,
    table: &RatingTable,
    config: &WriterConfig,
) -> Result<(), IoError> {
    config.validate()?;

    let schema = parquet_write::build_schema();

    let props = WriterProperties::builder()
        .set_compression(config.compression.to_parquet()?)
        .set_max_row_group_size(config.row_group_size)
        .build();

    let batch = parquet_write::table_to_record_batch(table, &schema)?;
    parquet_write::write_batches(path, &[batch], &schema, props)?;

    info!(path = %path.display(), rows = table.len(), "wrote rating table");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let config = WriterConfig::default();
        assert_eq!(config.compression(), Compression::Snappy);
        assert_eq!(config.row_group_size(), 1_000_000);
    }

    #[test]
    fn builder_methods() {
        let config = WriterConfig::default()
            .with_compression(Compression::Zstd)
            .with_row_group_size(500);
        assert_eq!(config.compression(), Compression::Zstd);
        assert_eq!(config.row_group_size(), 500);
    }

    #[test]
    fn validate_zero_row_group_size() {
        let config = WriterConfig::default().with_row_group_size(0);
        match config.validate().unwrap_err() {
            IoError::Validation { count, details } => {
                assert_eq!(count, 1);
                assert!(details.contains("row_group_size"));
            }
            other => panic!("expected Validation error, got {other:?}"),
        }
    }

    #[test]
    fn compression_from_str() {
        assert_eq!("none".parse::<Compression>().unwrap(), Compression::None);
        assert_eq!("Snappy".parse::<Compression>().unwrap(), Compression::Snappy);
        assert_eq!("ZSTD".parse::<Compression>().unwrap(), Compression::Zstd);
        assert!("lz4".parse::<Compression>().is_err());
    }
}
