//! High-level readers for observation, stage and rating-table files.

use std::path::Path;

use ratingcurve_model::{Observations, RatingTable};
use tracing::{debug, info};

use crate::error::IoError;
use crate::parquet_read;
use crate::parquet_write::{DISCHARGE, SIGMA, STAGE};
use crate::validate::validate_columns;

// ---------------------------------------------------------------------------
// ReaderConfig
// ---------------------------------------------------------------------------

/// Column names used when reading gaugings from Parquet.
///
/// The [`Default`] implementation expects `stage`, `discharge` and an
/// optional `q_sigma` column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReaderConfig {
    /// Column holding the stage.
    stage_column: String,
    /// Column holding the discharge.
    discharge_column: String,
    /// Column holding the discharge standard deviation, used when present.
    q_sigma_column: Option<String>,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            stage_column: STAGE.into(),
            discharge_column: DISCHARGE.into(),
            q_sigma_column: Some("q_sigma".into()),
        }
    }
}

impl ReaderConfig {
    /// Set the stage column name.
    pub fn with_stage_column(mut self, name: impl Into<String>) -> Self {
        self.stage_column = name.into();
        self
    }

    /// Set the discharge column name.
    pub fn with_discharge_column(mut self, name: impl Into<String>) -> Self {
        self.discharge_column = name.into();
        self
    }

    /// Set the uncertainty column name, or `None` to ignore uncertainty.
    pub fn with_q_sigma_column(mut self, name: Option<impl Into<String>>) -> Self {
        self.q_sigma_column = name.map(Into::into);
        self
    }

    /// Returns the stage column name.
    pub fn stage_column(&self) -> &str {
        &self.stage_column
    }

    /// Returns the discharge column name.
    pub fn discharge_column(&self) -> &str {
        &self.discharge_column
    }

    /// Returns the uncertainty column name, if any.
    pub fn q_sigma_column(&self) -> Option<&str> {
        self.q_sigma_column.as_deref()
    }

    /// Validate that the configuration is internally consistent.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::Validation`] if a column name is empty or two
    /// roles share a column.
    pub fn validate(&self) -> Result<(), IoError> {
        let mut names = vec![self.stage_column.as_str(), self.discharge_column.as_str()];
        if let Some(q_sigma) = &self.q_sigma_column {
            names.push(q_sigma);
        }
        if names.iter().any(|n| n.is_empty()) {
            return Err(IoError::Validation {
                count: 1,
                details: "column names must not be empty".to_string(),
            });
        }
        for (i, a) in names.iter().enumerate() {
            if names[i + 1..].contains(a) {
                return Err(IoError::Validation {
                    count: 1,
                    details: format!("column '{a}' is assigned to more than one role"),
                });
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Readers
// ---------------------------------------------------------------------------

/// Read gaugings from a Parquet file.
///
/// The uncertainty column is used only if configured and present in the
/// file.
///
/// # Errors
///
/// Returns [`IoError`] on a missing file or column, a non-`Float64` column,
/// nulls, or when [`Observations::new`] rejects the values.
pub fn read_observations(path: &Path, config: &ReaderConfig) -> Result<Observations, IoError> {
    config.validate()?;
    let (schema, batches) = parquet_read::read_batches(path)?;

    let h = parquet_read::float_column(&schema, &batches, &config.stage_column, path)?;
    let q = parquet_read::float_column(&schema, &batches, &config.discharge_column, path)?;
    let q_sigma = match &config.q_sigma_column {
        Some(name) if parquet_read::has_column(&schema, name) => Some((
            name.as_str(),
            parquet_read::float_column(&schema, &batches, name, path)?,
        )),
        Some(name) => {
            debug!(column = %name, "uncertainty column absent, treating gaugings as exact");
            None
        }
        None => None,
    };

    let n = h.values.len();
    let mut columns = vec![
        (config.stage_column.as_str(), h.values.as_slice(), h.nulls),
        (config.discharge_column.as_str(), q.values.as_slice(), q.nulls),
    ];
    if let Some((name, col)) = &q_sigma {
        columns.push((*name, col.values.as_slice(), col.nulls));
    }
    validate_columns(&columns, n).finish()?;

    let observations = Observations::new(q.values, h.values, q_sigma.map(|(_, c)| c.values))?;
    info!(
        path = %path.display(),
        n_obs = observations.len(),
        has_q_sigma = observations.q_sigma().is_some(),
        "read observations"
    );
    Ok(observations)
}

/// Read a single `Float64` stage column from a Parquet file.
///
/// # Errors
///
/// Returns [`IoError`] on a missing file or column, a non-`Float64` column,
/// or nulls.
pub fn read_stages(path: &Path, column: &str) -> Result<Vec<f64>, IoError> {
    let (schema, batches) = parquet_read::read_batches(path)?;
    let h = parquet_read::float_column(&schema, &batches, column, path)?;
    validate_columns(&[(column, h.values.as_slice(), h.nulls)], h.values.len()).finish()?;
    debug!(path = %path.display(), n_stages = h.values.len(), "read stages");
    Ok(h.values)
}

/// Read a rating table written by [`write_rating_table`](crate::write_rating_table).
///
/// # Errors
///
/// Returns [`IoError`] on a missing file or column, nulls, or when
/// [`RatingTable::new`] rejects the values.
pub fn read_rating_table(path: &Path) -> Result<RatingTable, IoError> {
    let (schema, batches) = parquet_read::read_batches(path)?;
    let h = parquet_read::float_column(&schema, &batches, STAGE, path)?;
    let q = parquet_read::float_column(&schema, &batches, DISCHARGE, path)?;
    let s = parquet_read::float_column(&schema, &batches, SIGMA, path)?;
    validate_columns(
        &[
            (STAGE, h.values.as_slice(), h.nulls),
            (DISCHARGE, q.values.as_slice(), q.nulls),
            (SIGMA, s.values.as_slice(), s.nulls),
        ],
        h.values.len(),
    )
    .finish()?;
    Ok(RatingTable::new(h.values, q.values, s.values)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = ReaderConfig::default();
        assert_eq!(config.stage_column(), "stage");
        assert_eq!(config.discharge_column(), "discharge");
        assert_eq!(config.q_sigma_column(), Some("q_sigma"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn builder_methods() {
        let config = ReaderConfig::default()
            .with_stage_column("h")
            .with_discharge_column("q")
            .with_q_sigma_column(None::<String>);
        assert_eq!(config.stage_column(), "h");
        assert_eq!(config.discharge_column(), "q");
        assert_eq!(config.q_sigma_column(), None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn empty_name_is_invalid() {
        let config = ReaderConfig::default().with_stage_column("");
        assert!(matches!(
            config.validate(),
            Err(IoError::Validation { .. })
        ));
    }

    #[test]
    fn shared_column_is_invalid() {
        let config = ReaderConfig::default().with_discharge_column("stage");
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("'stage'"));
    }
}
