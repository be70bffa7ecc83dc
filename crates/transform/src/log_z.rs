//! Log transform followed by z-score standardisation.
//!
//! This is the modelling scale for discharge. Summaries computed from
//! log-z values are reported in discharge units:
//!
//! | Method | Result |
//! |--------|--------|
//! | [`LogZTransform::mean`] | arithmetic mean of the untransformed values |
//! | [`LogZTransform::median`] | median of the untransformed values (geometric mean) |
//! | [`LogZTransform::sigma`] | `exp(std(z))`, a multiplicative factor |

use ndarray::{Array1, Array2, Axis};
use ratingcurve_stats::{median, sorted};

use crate::error::TransformError;
use crate::transform::Transform;
use crate::z::ZTransform;

/// Log transform then z-score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LogZTransform {
    z: ZTransform,
}

impl LogZTransform {
    /// Fits the transform to strictly positive data `x`.
    ///
    /// # Errors
    ///
    /// | Variant | Trigger |
    /// |---------|---------|
    /// | [`TransformError::NonPositive`] | any non-missing value is `<= 0` |
    /// | [`TransformError::EmptyData`] | `x` is empty or all NaN |
    /// | [`TransformError::ConstantData`] | all values are identical |
    pub fn fit(x: &[f64]) -> Result<Self, TransformError> {
        let log_x = log_checked(x)?;
        Ok(Self {
            z: ZTransform::fit(&log_x)?,
        })
    }

    /// Returns the underlying z-score transform of `ln(x)`.
    pub fn log_scale(&self) -> &ZTransform {
        &self.z
    }

    /// Arithmetic mean, in original units, of log-z values along `axis`.
    ///
    /// # Errors
    ///
    /// Returns [`TransformError::AxisOutOfBounds`] for `axis > 1` and
    /// [`TransformError::EmptyData`] if the axis has length zero.
    pub fn mean(&self, z: &Array2<f64>, axis: Axis) -> Result<Array1<f64>, TransformError> {
        check_axis(z, axis)?;
        self.untransform_array(z)
            .mean_axis(axis)
            .ok_or(TransformError::EmptyData)
    }

    /// Multiplicative standard deviation `exp(std(z))` along `axis`.
    ///
    /// Bounds are `discharge * sigma` and `discharge / sigma`, never
    /// `discharge ± sigma`.
    ///
    /// # Errors
    ///
    /// Same as [`LogZTransform::mean`].
    pub fn sigma(&self, z: &Array2<f64>, axis: Axis) -> Result<Array1<f64>, TransformError> {
        check_axis(z, axis)?;
        Ok(z.std_axis(axis, 0.0).mapv(f64::exp))
    }

    /// Median, in original units, of log-z values along `axis`.
    ///
    /// # Errors
    ///
    /// Same as [`LogZTransform::mean`].
    pub fn median(&self, z: &Array2<f64>, axis: Axis) -> Result<Array1<f64>, TransformError> {
        check_axis(z, axis)?;
        let x = self.untransform_array(z);
        Ok(x.map_axis(axis, |lane| median(&sorted(&lane.to_vec()))))
    }
}

impl Transform for LogZTransform {
    fn forward(&self, x: f64) -> f64 {
        self.z.forward(x.ln())
    }

    fn inverse(&self, y: f64) -> f64 {
        self.z.inverse(y).exp()
    }

    fn in_domain(&self, x: f64) -> bool {
        x.is_nan() || x > 0.0
    }
}

/// Natural log of every value, rejecting non-positive entries.
fn log_checked(x: &[f64]) -> Result<Vec<f64>, TransformError> {
    x.iter()
        .enumerate()
        .map(|(index, &value)| {
            if value.is_nan() || value > 0.0 {
                Ok(value.ln())
            } else {
                Err(TransformError::NonPositive { index, value })
            }
        })
        .collect()
}

fn check_axis(z: &Array2<f64>, axis: Axis) -> Result<(), TransformError> {
    if axis.index() > 1 {
        return Err(TransformError::AxisOutOfBounds { axis: axis.index() });
    }
    if z.len_of(axis) == 0 {
        return Err(TransformError::EmptyData);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    fn doubling_series_maps_to_even_steps() {
        // ln q = k ln2 for k = 0..4: mean 2 ln2, population sd sqrt(2) ln2.
        let t = LogZTransform::fit(&[1.0, 2.0, 4.0, 8.0, 16.0]).unwrap();
        let y = t.transform(&[1.0, 2.0, 4.0, 8.0, 16.0]).unwrap();
        for (k, v) in y.iter().enumerate() {
            let expected = (k as f64 - 2.0) / 2f64.sqrt();
            assert_relative_eq!(*v, expected, epsilon = 1e-12);
        }
    }

    #[test]
    fn round_trip() {
        let x = [0.3, 1.7, 12.0, 150.0, 2200.0];
        let t = LogZTransform::fit(&x).unwrap();
        let back = t.untransform(&t.transform(&x).unwrap());
        for (a, b) in x.iter().zip(&back) {
            assert_relative_eq!(a, b, max_relative = 1e-12);
        }
    }

    #[test]
    fn non_positive_fit_rejected() {
        let err = LogZTransform::fit(&[1.0, 0.0, 3.0]).unwrap_err();
        assert!(matches!(
            err,
            TransformError::NonPositive { index: 1, .. }
        ));
    }

    #[test]
    fn non_positive_transform_rejected() {
        let t = LogZTransform::fit(&[1.0, 2.0, 3.0]).unwrap();
        let err = t.transform(&[1.0, -4.0]).unwrap_err();
        assert!(matches!(
            err,
            TransformError::NonPositive { index: 1, value } if value == -4.0
        ));
    }

    #[test]
    fn sigma_is_exp_of_std() {
        let t = LogZTransform::fit(&[1.0, 2.0, 4.0]).unwrap();
        let z = array![[0.0, 1.0, 2.0, 3.0], [-1.0, -1.0, 1.0, 1.0]];
        let s = t.sigma(&z, Axis(1)).unwrap();
        // population sd of [0,1,2,3] is sqrt(1.25); of [-1,-1,1,1] is 1
        assert_relative_eq!(s[0], 1.25f64.sqrt().exp(), epsilon = 1e-12);
        assert_relative_eq!(s[1], 1f64.exp(), epsilon = 1e-12);
    }

    #[test]
    fn mean_is_arithmetic_in_original_units() {
        let t = LogZTransform::fit(&[1.0, 10.0, 100.0]).unwrap();
        let q = [2.0, 8.0];
        let z = t.transform(&q).unwrap();
        let z = Array2::from_shape_vec((1, 2), z).unwrap();
        let m = t.mean(&z, Axis(1)).unwrap();
        assert_relative_eq!(m[0], 5.0, max_relative = 1e-12);
    }

    #[test]
    fn median_is_geometric_mean_for_symmetric_draws() {
        let t = LogZTransform::fit(&[1.0, 10.0, 100.0]).unwrap();
        let q = [2.0, 4.0, 8.0];
        let z = t.transform(&q).unwrap();
        let z = Array2::from_shape_vec((3, 1), z).unwrap();
        let med = t.median(&z, Axis(0)).unwrap();
        assert_relative_eq!(med[0], 4.0, max_relative = 1e-12);
    }

    #[test]
    fn summaries_along_axis_zero() {
        let t = LogZTransform::fit(&[1.0, 2.0, 4.0]).unwrap();
        let z = array![[0.0, 1.0], [0.0, 3.0]];
        let s = t.sigma(&z, Axis(0)).unwrap();
        assert_eq!(s.len(), 2);
        assert_relative_eq!(s[0], 1.0, epsilon = 1e-12);
        assert_relative_eq!(s[1], 1f64.exp(), epsilon = 1e-12);
    }

    #[test]
    fn bad_axis_rejected() {
        let t = LogZTransform::fit(&[1.0, 2.0, 4.0]).unwrap();
        let z = array![[0.0, 1.0]];
        assert!(matches!(
            t.mean(&z, Axis(2)),
            Err(TransformError::AxisOutOfBounds { axis: 2 })
        ));
    }

    #[test]
    fn empty_axis_rejected() {
        let t = LogZTransform::fit(&[1.0, 2.0, 4.0]).unwrap();
        let z = Array2::<f64>::zeros((3, 0));
        assert!(matches!(
            t.median(&z, Axis(1)),
            Err(TransformError::EmptyData)
        ));
    }
}
