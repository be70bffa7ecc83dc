//! Log densities of the fixed slope, intercept and residual-scale priors.

use statrs::distribution::{Cauchy, Continuous, Normal};

use crate::error::ModelError;

/// Mean of the per-segment slope prior.
pub const SLOPE_MU: f64 = 1.6;
/// Standard deviation of the per-segment slope prior.
pub const SLOPE_SIGMA: f64 = 0.5;
/// Mean of the intercept prior.
pub const INTERCEPT_MU: f64 = 0.0;
/// Standard deviation of the intercept prior.
pub const INTERCEPT_SIGMA: f64 = 2.0;
/// Scale of the half-Cauchy prior on the residual scale.
pub const SIGMA_BETA: f64 = 0.1;

const HALF_LN_2PI: f64 = 0.918_938_533_204_672_8;

/// `ln N(x; mu, sigma)`; `-inf` for non-positive `sigma`.
///
/// Closed form, so the likelihood loop does not build a statrs `Normal`
/// per observation.
pub(crate) fn normal_ln_pdf(x: f64, mu: f64, sigma: f64) -> f64 {
    if !(sigma > 0.0) {
        return f64::NEG_INFINITY;
    }
    let z = (x - mu) / sigma;
    -HALF_LN_2PI - sigma.ln() - 0.5 * z * z
}

/// The slope, intercept and residual-scale priors.
#[derive(Debug, Clone)]
pub(crate) struct FixedPriors {
    slope: Normal,
    intercept: Normal,
    scale: Cauchy,
}

impl FixedPriors {
    pub(crate) fn new() -> Result<Self, ModelError> {
        let normal = |mu, sigma| {
            Normal::new(mu, sigma).map_err(|e| ModelError::Distribution {
                distribution: "normal",
                message: e.to_string(),
            })
        };
        let scale = Cauchy::new(0.0, SIGMA_BETA).map_err(|e| ModelError::Distribution {
            distribution: "half-cauchy",
            message: e.to_string(),
        })?;
        Ok(Self {
            slope: normal(SLOPE_MU, SLOPE_SIGMA)?,
            intercept: normal(INTERCEPT_MU, INTERCEPT_SIGMA)?,
            scale,
        })
    }

    pub(crate) fn ln_slope(&self, w: f64) -> f64 {
        self.slope.ln_pdf(w)
    }

    pub(crate) fn ln_intercept(&self, a: f64) -> f64 {
        self.intercept.ln_pdf(a)
    }

    /// Half-Cauchy: twice the Cauchy density on the positive half-line.
    pub(crate) fn ln_scale(&self, sigma: f64) -> f64 {
        if sigma <= 0.0 {
            return f64::NEG_INFINITY;
        }
        std::f64::consts::LN_2 + self.scale.ln_pdf(sigma)
    }
}
