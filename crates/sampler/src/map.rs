//! Maximum a posteriori starting point.
//!
//! Wraps the `argmin` Nelder-Mead solver to minimise the negative log
//! density over the unconstrained parameters.

use argmin::core::{CostFunction, Executor};
use argmin::solver::neldermead::NelderMead;
use ratingcurve_model::PosteriorModel;
use tracing::debug;

use crate::error::SamplerError;

/// Initial simplex edge length in unconstrained units.
const SIMPLEX_STEP: f64 = 0.5;

/// Finds the posterior mode starting from `start`.
///
/// Returns `start` unchanged if the search does not improve on it.
pub(crate) fn find_map(
    model: &dyn PosteriorModel,
    start: &[f64],
    max_iters: u64,
) -> Result<Vec<f64>, SamplerError> {
    let dim = start.len();
    let mut simplex: Vec<Vec<f64>> = Vec::with_capacity(dim + 1);
    simplex.push(start.to_vec());
    for i in 0..dim {
        let mut vertex = start.to_vec();
        vertex[i] += SIMPLEX_STEP;
        simplex.push(vertex);
    }

    let solver = NelderMead::new(simplex)
        .with_sd_tolerance(1e-10)
        .map_err(|e| SamplerError::OptimizationFailed {
            reason: e.to_string(),
        })?;
    let result = Executor::new(NegLogDensity { model }, solver)
        .configure(|state| state.max_iters(max_iters))
        .run()
        .map_err(|e| SamplerError::OptimizationFailed {
            reason: e.to_string(),
        })?;

    let state = result.state();
    let best = match state.best_param.as_ref() {
        Some(best) => best.clone(),
        None => return Ok(start.to_vec()),
    };

    let start_lp = model.log_density(start);
    let best_lp = model.log_density(&best);
    debug!(start_lp, best_lp, iters = state.iter, "MAP search finished");
    if best_lp.is_finite() && (best_lp >= start_lp || !start_lp.is_finite()) {
        Ok(best)
    } else {
        Ok(start.to_vec())
    }
}

/// Cost function for argmin: negative log density, `f64::MAX` outside the
/// support.
struct NegLogDensity<'a> {
    model: &'a dyn PosteriorModel,
}

impl CostFunction for NegLogDensity<'_> {
    type Param = Vec<f64>;
    type Output = f64;

    fn cost(&self, param: &Self::Param) -> Result<Self::Output, argmin::core::Error> {
        let lp = self.model.log_density(param);
        Ok(if lp.is_finite() { -lp } else { f64::MAX })
    }
}
