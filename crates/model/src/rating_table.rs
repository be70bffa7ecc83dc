//! Predicted rating tables.

use crate::error::ModelError;

/// Predicted discharge with multiplicative uncertainty at a set of stages.
///
/// `sigma` is a factor: the one-sigma band is `discharge / sigma` to
/// `discharge * sigma`.
#[derive(Debug, Clone, PartialEq)]
pub struct RatingTable {
    stage: Vec<f64>,
    discharge: Vec<f64>,
    sigma: Vec<f64>,
}

impl RatingTable {
    /// Creates a table from equally long columns.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::LengthMismatch`] if the columns differ in length.
    pub fn new(stage: Vec<f64>, discharge: Vec<f64>, sigma: Vec<f64>) -> Result<Self, ModelError> {
        let n = stage.len();
        for (field, len) in [("discharge", discharge.len()), ("sigma", sigma.len())] {
            if len != n {
                return Err(ModelError::LengthMismatch {
                    field,
                    expected: n,
                    actual: len,
                });
            }
        }
        Ok(Self {
            stage,
            discharge,
            sigma,
        })
    }

    /// Returns the stages.
    pub fn stage(&self) -> &[f64] {
        &self.stage
    }

    /// Returns the predicted discharge.
    pub fn discharge(&self) -> &[f64] {
        &self.discharge
    }

    /// Returns the multiplicative uncertainty.
    pub fn sigma(&self) -> &[f64] {
        &self.sigma
    }

    /// Returns the number of rows.
    pub fn len(&self) -> usize {
        self.stage.len()
    }

    /// Returns `true` if the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.stage.is_empty()
    }

    /// Lower and upper bounds `discharge / sigma^k`, `discharge * sigma^k`.
    pub fn band(&self, k: f64) -> (Vec<f64>, Vec<f64>) {
        self.discharge
            .iter()
            .zip(&self.sigma)
            .map(|(&q, &s)| {
                let factor = s.powf(k);
                (q / factor, q * factor)
            })
            .unzip()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn columns_must_match() {
        let err = RatingTable::new(vec![1.0, 2.0], vec![3.0, 4.0], vec![1.1]).unwrap_err();
        assert!(matches!(
            err,
            ModelError::LengthMismatch {
                field: "sigma",
                expected: 2,
                actual: 1
            }
        ));
    }

    #[test]
    fn band_is_multiplicative() {
        let t = RatingTable::new(vec![1.0], vec![10.0], vec![2.0]).unwrap();
        let (lo, hi) = t.band(1.0);
        assert_relative_eq!(lo[0], 5.0);
        assert_relative_eq!(hi[0], 20.0);
        let (lo, hi) = t.band(2.0);
        assert_relative_eq!(lo[0], 2.5);
        assert_relative_eq!(hi[0], 40.0);
        assert_eq!(t.len(), 1);
        assert!(!t.is_empty());
    }
}
