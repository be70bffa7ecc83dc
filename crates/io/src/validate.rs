//! Accumulated validation utilities.
//!
//! Provides [`ValidationCollector`] for gathering multiple validation errors
//! into a single [`IoError::Validation`], plus a helper that checks the
//! columns read from an observation file.

use crate::error::IoError;

// ---------------------------------------------------------------------------
// ValidationCollector
// ---------------------------------------------------------------------------

/// Accumulates validation errors and converts them into a single
/// [`IoError::Validation`].
pub(crate) struct ValidationCollector {
    errors: Vec<String>,
}

impl ValidationCollector {
    /// Create an empty collector.
    pub(crate) fn new() -> Self {
        Self { errors: Vec::new() }
    }

    /// Record one validation error.
    pub(crate) fn push(&mut self, msg: impl Into<String>) {
        self.errors.push(msg.into());
    }

    /// Returns `true` when no errors have been recorded.
    #[cfg(test)]
    pub(crate) fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Returns the number of recorded errors.
    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.errors.len()
    }

    /// Consume the collector and return `Ok(())` if no errors were recorded,
    /// or `Err(IoError::Validation { count, details })` otherwise.
    ///
    /// The `details` string joins all messages with `"; "`.
    pub(crate) fn finish(self) -> Result<(), IoError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(IoError::Validation {
                count: self.errors.len(),
                details: self.errors.join("; "),
            })
        }
    }
}

// ---------------------------------------------------------------------------
// Column checks
// ---------------------------------------------------------------------------

/// Records one message per column with nulls and per column whose length
/// differs from `expected_len`.
///
/// `columns` holds `(name, values, null_count)`.
pub(crate) fn validate_columns(
    columns: &[(&str, &[f64], usize)],
    expected_len: usize,
) -> ValidationCollector {
    let mut c = ValidationCollector::new();

    for &(name, values, nulls) in columns {
        if nulls > 0 {
            c.push(format!("column '{name}' has {nulls} null value(s)"));
        }
        if values.len() != expected_len {
            c.push(format!(
                "column '{name}' has {} rows, expected {expected_len}",
                values.len()
            ));
        }
    }

    c
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collector_empty_is_ok() {
        let c = ValidationCollector::new();
        assert!(c.is_empty());
        assert_eq!(c.len(), 0);
        assert!(c.finish().is_ok());
    }

    #[test]
    fn collector_non_empty_is_err_with_correct_count() {
        let mut c = ValidationCollector::new();
        c.push("error one");
        c.push("error two");
        assert_eq!(c.len(), 2);

        match c.finish().unwrap_err() {
            IoError::Validation { count, details } => {
                assert_eq!(count, 2);
                assert_eq!(details, "error one; error two");
            }
            other => panic!("expected IoError::Validation, got {other:?}"),
        }
    }

    #[test]
    fn clean_columns_are_ok() {
        let h = [1.0, 2.0];
        let q = [3.0, 4.0];
        let c = validate_columns(&[("stage", &h, 0), ("discharge", &q, 0)], 2);
        assert!(c.is_empty());
    }

    #[test]
    fn nulls_and_lengths_are_reported() {
        let h = [1.0, 2.0];
        let q = [3.0];
        let c = validate_columns(&[("stage", &h, 1), ("discharge", &q, 0)], 2);
        assert_eq!(c.len(), 2);

        match c.finish().unwrap_err() {
            IoError::Validation { details, .. } => {
                assert!(details.contains("column 'stage' has 1 null value(s)"));
                assert!(details.contains("column 'discharge' has 1 rows, expected 2"));
            }
            other => panic!("expected IoError::Validation, got {other:?}"),
        }
    }
}
