//! Z-score standardisation.

use ratingcurve_stats::{nanmean, nanstd};

use crate::error::TransformError;
use crate::transform::Transform;

/// Standardises data to zero mean and unit variance.
///
/// Fitted once from reference data with missing values ignored; the
/// standard deviation uses the population (N) denominator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZTransform {
    mean: f64,
    std: f64,
}

impl ZTransform {
    /// Fits the transform to `x`.
    ///
    /// # Errors
    ///
    /// | Variant | Trigger |
    /// |---------|---------|
    /// | [`TransformError::EmptyData`] | `x` is empty or all NaN |
    /// | [`TransformError::ConstantData`] | the non-missing values have zero spread |
    pub fn fit(x: &[f64]) -> Result<Self, TransformError> {
        let mean = nanmean(x).ok_or(TransformError::EmptyData)?;
        let std = nanstd(x).ok_or(TransformError::EmptyData)?;
        if !std.is_finite() || std <= 0.0 {
            return Err(TransformError::ConstantData { value: mean });
        }
        Ok(Self { mean, std })
    }

    /// Returns the fitted mean.
    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// Returns the fitted standard deviation.
    pub fn std(&self) -> f64 {
        self.std
    }
}

impl Transform for ZTransform {
    fn forward(&self, x: f64) -> f64 {
        (x - self.mean) / self.std
    }

    fn inverse(&self, y: f64) -> f64 {
        y * self.std + self.mean
    }
}
