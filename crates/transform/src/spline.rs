//! Spline design matrices for stage.
//!
//! The `cr` family is the natural cubic regression spline parameterised by
//! its values at the knots (Wood 2006, §4.1.2). Knots sit at evenly spaced
//! quantiles of the reference stages, so `df` equals the number of knots and
//! of design-matrix columns. No intercept column is added.

use std::str::FromStr;

use ndarray::{Array2, s};
use ratingcurve_stats::{quantile_type7, sorted};

use crate::error::TransformError;

/// Smallest supported number of knots.
const MIN_DF: usize = 3;

/// Spline basis family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SplineForm {
    /// Natural cubic regression spline (`"cr"`).
    #[default]
    CubicRegression,
}

impl FromStr for SplineForm {
    type Err = TransformError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "cr" => Ok(Self::CubicRegression),
            other => Err(TransformError::UnknownSplineForm {
                form: other.to_string(),
            }),
        }
    }
}

/// A reusable spline design-matrix builder fitted to reference stages.
#[derive(Debug, Clone)]
pub struct Dmatrix {
    form: SplineForm,
    knots: Vec<f64>,
    /// Maps knot values to second derivatives at the knots (n x n).
    f: Array2<f64>,
}

impl Dmatrix {
    /// Fits the basis to `stage` with `df` degrees of freedom.
    ///
    /// # Errors
    ///
    /// | Variant | Trigger |
    /// |---------|---------|
    /// | [`TransformError::InvalidDegreesOfFreedom`] | `df < 3` |
    /// | [`TransformError::EmptyData`] | no finite stages |
    /// | [`TransformError::DuplicateKnots`] | quantile knots are not distinct |
    pub fn fit(stage: &[f64], df: usize, form: SplineForm) -> Result<Self, TransformError> {
        if df < MIN_DF {
            return Err(TransformError::InvalidDegreesOfFreedom { df, min: MIN_DF });
        }
        let finite: Vec<f64> = stage.iter().copied().filter(|x| x.is_finite()).collect();
        if finite.is_empty() {
            return Err(TransformError::EmptyData);
        }
        let sorted_stage = sorted(&finite);
        let knots: Vec<f64> = (0..df)
            .map(|i| quantile_type7(&sorted_stage, i as f64 / (df - 1) as f64))
            .collect();
        if knots.windows(2).any(|w| w[1] <= w[0]) {
            return Err(TransformError::DuplicateKnots { knots });
        }

        let f = natural_f(&knots);
        Ok(Self { form, knots, f })
    }

    /// Fits the basis with the family given by name (e.g. `"cr"`).
    ///
    /// # Errors
    ///
    /// [`TransformError::UnknownSplineForm`] for unrecognised names, plus
    /// everything [`Dmatrix::fit`] returns.
    pub fn from_form_name(stage: &[f64], df: usize, form: &str) -> Result<Self, TransformError> {
        Self::fit(stage, df, form.parse()?)
    }

    /// Returns the basis family.
    pub fn form(&self) -> SplineForm {
        self.form
    }

    /// Returns the knot locations.
    pub fn knots(&self) -> &[f64] {
        &self.knots
    }

    /// Returns the number of basis columns.
    pub fn df(&self) -> usize {
        self.knots.len()
    }

    /// Builds the design matrix, shape `(stage.len(), df)`.
    ///
    /// # Errors
    ///
    /// Returns [`TransformError::OutsideKnots`] if any stage is non-finite or
    /// lies outside `[knots[0], knots[df - 1]]`.
    pub fn transform(&self, stage: &[f64]) -> Result<Array2<f64>, TransformError> {
        let n = self.knots.len();
        let lower = self.knots[0];
        let upper = self.knots[n - 1];
        let mut dm = Array2::zeros((stage.len(), n));

        for (row, &x) in stage.iter().enumerate() {
            if !x.is_finite() || x < lower || x > upper {
                return Err(TransformError::OutsideKnots {
                    index: row,
                    value: x,
                    lower,
                    upper,
                });
            }

            let j = self
                .knots
                .partition_point(|&k| k < x)
                .saturating_sub(1)
                .min(n - 2);
            let hj = self.knots[j + 1] - self.knots[j];
            let right = self.knots[j + 1] - x;
            let left = x - self.knots[j];

            let ajm = right / hj;
            let ajp = left / hj;
            let cjm = right.powi(3) / (6.0 * hj) - hj * right / 6.0;
            let cjp = left.powi(3) / (6.0 * hj) - hj * left / 6.0;

            for col in 0..n {
                dm[[row, col]] = cjm * self.f[[j, col]] + cjp * self.f[[j + 1, col]];
            }
            dm[[row, j]] += ajm;
            dm[[row, j + 1]] += ajp;
        }

        Ok(dm)
    }
}

/// Matrix mapping knot values to the natural spline's second derivatives.
///
/// Rows 0 and n-1 are zero (natural boundary conditions); the interior rows
/// solve `B F = D` with `B` symmetric tridiagonal.
fn natural_f(knots: &[f64]) -> Array2<f64> {
    let n = knots.len();
    let m = n - 2;
    let h: Vec<f64> = knots.windows(2).map(|w| w[1] - w[0]).collect();

    let diag: Vec<f64> = (0..m).map(|i| (h[i] + h[i + 1]) / 3.0).collect();
    let off: Vec<f64> = (0..m.saturating_sub(1)).map(|i| h[i + 1] / 6.0).collect();

    let mut d = Array2::zeros((m, n));
    for i in 0..m {
        d[[i, i]] = 1.0 / h[i];
        d[[i, i + 2]] = 1.0 / h[i + 1];
        d[[i, i + 1]] = -d[[i, i]] - d[[i, i + 2]];
    }

    let fm = solve_tridiagonal(&diag, &off, d);
    let mut f = Array2::zeros((n, n));
    f.slice_mut(s![1..n - 1, ..]).assign(&fm);
    f
}

/// Solves a symmetric tridiagonal system for every column of `rhs`
/// (Thomas algorithm). `off[i]` couples rows `i` and `i + 1`.
fn solve_tridiagonal(diag: &[f64], off: &[f64], mut rhs: Array2<f64>) -> Array2<f64> {
    let m = diag.len();
    let mut denom = vec![0.0; m];
    let mut upper = vec![0.0; m];

    for i in 0..m {
        denom[i] = if i == 0 {
            diag[0]
        } else {
            diag[i] - off[i - 1] * upper[i - 1]
        };
        if i + 1 < m {
            upper[i] = off[i] / denom[i];
        }
    }

    for mut col in rhs.columns_mut() {
        for i in 0..m {
            let carried = if i == 0 { 0.0 } else { off[i - 1] * col[i - 1] };
            col[i] = (col[i] - carried) / denom[i];
        }
        for i in (0..m.saturating_sub(1)).rev() {
            col[i] -= upper[i] * col[i + 1];
        }
    }

    rhs
}
