//! The capability shared by every modelling-scale transform.

use ndarray::{Array, Dimension};

use crate::error::TransformError;

/// A fitted, immutable mapping between original units and a modelling scale.
///
/// Implementors provide the scalar maps; the slice and array helpers are
/// derived from them. `untransform(transform(x)) == x` up to rounding for
/// every `x` in the domain.
pub trait Transform {
    /// Maps one value to the modelling scale. Assumes `in_domain(x)`.
    fn forward(&self, x: f64) -> f64;

    /// Maps one modelling-scale value back to original units.
    fn inverse(&self, y: f64) -> f64;

    /// Returns `true` if `x` can be transformed. Missing values (NaN) are
    /// always accepted and pass through as NaN.
    fn in_domain(&self, x: f64) -> bool {
        let _ = x;
        true
    }

    /// Transforms a slice, rejecting the first out-of-domain value.
    ///
    /// # Errors
    ///
    /// Returns [`TransformError::NonPositive`] for values outside a log domain.
    fn transform(&self, x: &[f64]) -> Result<Vec<f64>, TransformError> {
        x.iter()
            .enumerate()
            .map(|(index, &value)| {
                if self.in_domain(value) {
                    Ok(self.forward(value))
                } else {
                    Err(TransformError::NonPositive { index, value })
                }
            })
            .collect()
    }

    /// Maps a slice of modelling-scale values back to original units.
    fn untransform(&self, y: &[f64]) -> Vec<f64> {
        y.iter().map(|&v| self.inverse(v)).collect()
    }

    /// Maps an array of any shape back to original units.
    fn untransform_array<D: Dimension>(&self, y: &Array<f64, D>) -> Array<f64, D>
    where
        Self: Sized,
    {
        y.mapv(|v| self.inverse(v))
    }
}
