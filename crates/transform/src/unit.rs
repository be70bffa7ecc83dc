//! Scaling to the unit interval.

use ratingcurve_stats::nanmax;

use crate::error::TransformError;
use crate::transform::Transform;

/// Divides by the reference maximum so that non-negative data lies in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnitTransform {
    max: f64,
}

impl UnitTransform {
    /// Fits the transform to `x`, ignoring missing values.
    ///
    /// # Errors
    ///
    /// Returns [`TransformError::EmptyData`] if `x` is empty or all NaN and
    /// [`TransformError::DegenerateScale`] if the maximum is zero or infinite.
    pub fn fit(x: &[f64]) -> Result<Self, TransformError> {
        let max = nanmax(x).ok_or(TransformError::EmptyData)?;
        if max == 0.0 || !max.is_finite() {
            return Err(TransformError::DegenerateScale { max });
        }
        Ok(Self { max })
    }

    /// Returns the fitted maximum.
    pub fn max(&self) -> f64 {
        self.max
    }
}

impl Transform for UnitTransform {
    fn forward(&self, x: f64) -> f64 {
        x / self.max
    }

    fn inverse(&self, y: f64) -> f64 {
        y * self.max
    }
}
