//! Validated discharge/stage observation sets.

use crate::error::ModelError;

/// Paired discharge and stage observations with optional discharge
/// uncertainty.
///
/// Discharge must be strictly positive, stage finite, and the optional
/// uncertainty (in discharge units) finite and non-negative. All inputs share
/// one length.
#[derive(Debug, Clone, PartialEq)]
pub struct Observations {
    q: Vec<f64>,
    h: Vec<f64>,
    q_sigma: Option<Vec<f64>>,
}

impl Observations {
    /// Builds an observation set.
    ///
    /// # Errors
    ///
    /// | Variant | Trigger |
    /// |---------|---------|
    /// | [`ModelError::EmptyData`] | `q` is empty |
    /// | [`ModelError::LengthMismatch`] | `h` or `q_sigma` differ in length from `q` |
    /// | [`ModelError::NonPositiveDischarge`] | any `q <= 0` or NaN |
    /// | [`ModelError::NonFiniteStage`] | any `h` is NaN or infinite |
    /// | [`ModelError::InvalidUncertainty`] | any `q_sigma < 0` or non-finite |
    pub fn new(q: Vec<f64>, h: Vec<f64>, q_sigma: Option<Vec<f64>>) -> Result<Self, ModelError> {
        let n = q.len();
        if n == 0 {
            return Err(ModelError::EmptyData);
        }
        if h.len() != n {
            return Err(ModelError::LengthMismatch {
                field: "stage",
                expected: n,
                actual: h.len(),
            });
        }
        if let Some((index, &value)) = q
            .iter()
            .enumerate()
            .find(|(_, v)| !(v.is_finite() && **v > 0.0))
        {
            return Err(ModelError::NonPositiveDischarge { index, value });
        }
        check_stage(&h)?;
        if let Some(sigma) = &q_sigma {
            check_uncertainty(sigma, n)?;
        }
        Ok(Self { q, h, q_sigma })
    }

    /// Returns the observed discharge.
    pub fn discharge(&self) -> &[f64] {
        &self.q
    }

    /// Returns the observed stage.
    pub fn stage(&self) -> &[f64] {
        &self.h
    }

    /// Returns the discharge uncertainty, if any.
    pub fn q_sigma(&self) -> Option<&[f64]> {
        self.q_sigma.as_deref()
    }

    /// Returns the number of observations.
    pub fn len(&self) -> usize {
        self.q.len()
    }

    /// Returns `true` if there are no observations (never, once built).
    pub fn is_empty(&self) -> bool {
        self.q.is_empty()
    }

    /// Returns the observed stage range `(min, max)`.
    pub fn stage_range(&self) -> (f64, f64) {
        self.h
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            })
    }

    /// Discharge uncertainty on the log scale: `ln(1 + q_sigma / q)`, or
    /// zeros when no uncertainty was supplied.
    pub fn log_q_sigma(&self) -> Vec<f64> {
        log_uncertainty(&self.q, self.q_sigma.as_deref())
    }
}

/// Rejects non-finite stages.
pub(crate) fn check_stage(h: &[f64]) -> Result<(), ModelError> {
    match h.iter().enumerate().find(|(_, v)| !v.is_finite()) {
        Some((index, &value)) => Err(ModelError::NonFiniteStage { index, value }),
        None => Ok(()),
    }
}

/// Rejects uncertainty of the wrong length or with negative entries.
pub(crate) fn check_uncertainty(q_sigma: &[f64], n: usize) -> Result<(), ModelError> {
    if q_sigma.len() != n {
        return Err(ModelError::LengthMismatch {
            field: "q_sigma",
            expected: n,
            actual: q_sigma.len(),
        });
    }
    match q_sigma
        .iter()
        .enumerate()
        .find(|(_, v)| !v.is_finite() || **v < 0.0)
    {
        Some((index, &value)) => Err(ModelError::InvalidUncertainty { index, value }),
        None => Ok(()),
    }
}

/// `ln(1 + q_sigma / q)` elementwise; zeros when `q_sigma` is absent.
pub(crate) fn log_uncertainty(q: &[f64], q_sigma: Option<&[f64]>) -> Vec<f64> {
    match q_sigma {
        Some(sigma) => q
            .iter()
            .zip(sigma)
            .map(|(&q, &s)| (s / q).ln_1p())
            .collect(),
        None => vec![0.0; q.len()],
    }
}
