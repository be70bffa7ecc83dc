//! Posterior predictive rating tables at new stages.

use ndarray::{Array2, Axis};
use rand::Rng;
use rand_distr::{Distribution, Normal};
use tracing::debug;

use crate::basis::linear_predictor;
use crate::error::ModelError;
use crate::observations::check_stage;
use crate::ordered::is_strictly_increasing;
use crate::rating_table::RatingTable;
use crate::reitan::ReitanRating;
use crate::trace::{BREAKPOINTS, INTERCEPT, PosteriorTrace, SCALE, SLOPES};

impl ReitanRating {
    /// Predictive draws on the log-z discharge scale, shape
    /// `(h.len(), draws)`.
    ///
    /// Each draw evaluates `a + sum_i w[i] * b_i(h)` with that draw's
    /// breakpoints and adds one `Normal(0, sigma)` residual shared by every
    /// stage.
    ///
    /// # Errors
    ///
    /// | Variant | Trigger |
    /// |---------|---------|
    /// | [`ModelError::NonFiniteStage`] | any `h` is NaN or infinite |
    /// | [`ModelError::MissingParameter`] / [`ModelError::TraceShape`] | trace does not match this model |
    /// | [`ModelError::EmptyTrace`] | the trace holds no draws |
    /// | [`ModelError::InvalidDraw`] | a draw has non-finite values, unordered breakpoints or `sigma <= 0` |
    pub fn predictive_draws<R: Rng + ?Sized>(
        &self,
        trace: &PosteriorTrace,
        h: &[f64],
        rng: &mut R,
    ) -> Result<Array2<f64>, ModelError> {
        check_stage(h)?;
        let n_draws = trace.check_rating(self.segments())?;
        let a = trace.get(INTERCEPT)?;
        let w = trace.get(SLOPES)?;
        let hs = trace.get(BREAKPOINTS)?;
        let sigma = trace.get(SCALE)?;

        let mut q_z = Array2::zeros((h.len(), n_draws));
        for d in 0..n_draws {
            let w_d = w.row(d).to_vec();
            let hs_d = hs.row(d).to_vec();
            check_draw(d, a[[d, 0]], &w_d, &hs_d, sigma[[d, 0]])?;
            let noise = Normal::new(0.0, sigma[[d, 0]]).map_err(|e| ModelError::Distribution {
                distribution: "normal",
                message: e.to_string(),
            })?;
            let e = noise.sample(rng);
            for (s, &stage) in h.iter().enumerate() {
                q_z[[s, d]] = linear_predictor(stage, a[[d, 0]], &w_d, &hs_d, self.offsets()) + e;
            }
        }
        Ok(q_z)
    }

    /// Predicts discharge and its multiplicative uncertainty at stages `h`.
    ///
    /// `discharge` is the arithmetic mean of the predictive draws in
    /// discharge units; `sigma` is `exp` of their standard deviation on the
    /// log-z scale.
    ///
    /// # Errors
    ///
    /// Same as [`ReitanRating::predictive_draws`].
    #[tracing::instrument(skip_all, fields(name = %self.name(), n_stages = h.len(), n_draws = trace.n_draws()))]
    pub fn predict<R: Rng + ?Sized>(
        &self,
        trace: &PosteriorTrace,
        h: &[f64],
        rng: &mut R,
    ) -> Result<RatingTable, ModelError> {
        let q_z = self.predictive_draws(trace, h, rng)?;
        let discharge = self.q_transform().mean(&q_z, Axis(1))?;
        let sigma = self.q_transform().sigma(&q_z, Axis(1))?;
        debug!("summarised predictive draws");
        RatingTable::new(h.to_vec(), discharge.to_vec(), sigma.to_vec())
    }
}

/// Rejects a draw that would turn the predictive table into NaN.
fn check_draw(draw: usize, a: f64, w: &[f64], hs: &[f64], sigma: f64) -> Result<(), ModelError> {
    let invalid = |reason: String| ModelError::InvalidDraw { draw, reason };
    if !a.is_finite() || w.iter().any(|v| !v.is_finite()) {
        return Err(invalid(format!("non-finite intercept or slope (a = {a}, w = {w:?})")));
    }
    if hs.iter().any(|v| !v.is_finite()) || !is_strictly_increasing(hs) {
        return Err(invalid(format!(
            "breakpoints must be finite and strictly increasing, got {hs:?}"
        )));
    }
    if !(sigma.is_finite() && sigma > 0.0) {
        return Err(invalid(format!("sigma must be finite and positive, got {sigma}")));
    }
    Ok(())
}

/// `n_points` evenly spaced stages from `lower` to `upper` inclusive.
///
/// # Errors
///
/// Returns [`ModelError::InvalidGrid`] if `n_points < 2`, a bound is not
/// finite, or `lower >= upper`.
pub fn stage_grid(lower: f64, upper: f64, n_points: usize) -> Result<Vec<f64>, ModelError> {
    if n_points < 2 {
        return Err(ModelError::InvalidGrid {
            reason: format!("need at least 2 points, got {n_points}"),
        });
    }
    if !(lower.is_finite() && upper.is_finite() && lower < upper) {
        return Err(ModelError::InvalidGrid {
            reason: format!("bounds [{lower}, {upper}] do not form a finite interval"),
        });
    }
    let step = (upper - lower) / (n_points - 1) as f64;
    Ok((0..n_points)
        .map(|i| {
            if i == n_points - 1 {
                upper
            } else {
                lower + step * i as f64
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RatingConfig;
    use crate::observations::Observations;
    use approx::assert_relative_eq;
    use ndarray::array;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use ratingcurve_transform::Transform;

    fn model() -> ReitanRating {
        let obs = Observations::new(
            vec![1.0, 2.0, 4.0, 8.0, 16.0],
            vec![1.0, 2.0, 3.0, 4.0, 5.0],
            None,
        )
        .unwrap();
        ReitanRating::new(&obs, &RatingConfig::new(1)).unwrap()
    }

    fn point_trace(a: f64, w: f64, hs: f64, sigma: f64, draws: usize) -> PosteriorTrace {
        PosteriorTrace::new(1)
            .with_variable(INTERCEPT, Array2::from_elem((draws, 1), a))
            .with_variable(SLOPES, Array2::from_elem((draws, 1), w))
            .with_variable(BREAKPOINTS, Array2::from_elem((draws, 1), hs))
            .with_variable(SCALE, Array2::from_elem((draws, 1), sigma))
    }

    #[test]
    fn grid_includes_endpoints() {
        let g = stage_grid(1.0, 2.0, 5).unwrap();
        assert_eq!(g.len(), 5);
        assert_eq!(g[0], 1.0);
        assert_eq!(g[4], 2.0);
        assert_relative_eq!(g[2], 1.5);
    }

    #[test]
    fn grid_rejects_bad_input() {
        assert!(stage_grid(1.0, 2.0, 1).is_err());
        assert!(stage_grid(2.0, 1.0, 10).is_err());
        assert!(stage_grid(f64::NAN, 1.0, 10).is_err());
    }

    #[test]
    fn near_zero_noise_reproduces_power_law() {
        let m = model();
        let trace = point_trace(0.2, 1.5, 0.5, 1e-12, 20);
        let mut rng = StdRng::seed_from_u64(1);
        let h = [1.0, 2.5, 4.0];
        let table = m.predict(&trace, &h, &mut rng).unwrap();
        for (i, &stage) in h.iter().enumerate() {
            let z = 0.2 + 1.5 * (stage - 0.5f64).ln();
            let expected = m.q_transform().inverse(z);
            assert_relative_eq!(table.discharge()[i], expected, max_relative = 1e-9);
            assert_relative_eq!(table.sigma()[i], 1.0, epsilon = 1e-9);
        }
        assert_eq!(table.stage(), &h);
    }

    #[test]
    fn noise_is_shared_across_stages() {
        let m = model();
        let trace = point_trace(0.0, 1.6, 0.5, 0.3, 50);
        let mut rng = StdRng::seed_from_u64(2);
        let h = [1.0, 3.0, 5.0];
        let q_z = m.predictive_draws(&trace, &h, &mut rng).unwrap();
        assert_eq!(q_z.dim(), (3, 50));
        // Differences between stages are noise free.
        for d in 0..50 {
            let diff = q_z[[2, d]] - q_z[[0, d]];
            assert_relative_eq!(diff, 1.6 * (4.5f64.ln() - 0.5f64.ln()), epsilon = 1e-10);
        }
        // Shared noise gives every stage the same spread.
        let sigma = m.q_transform().sigma(&q_z, Axis(1)).unwrap();
        assert_relative_eq!(sigma[0], sigma[2], epsilon = 1e-10);
        assert!(sigma[0] > 1.0);
    }

    #[test]
    fn same_seed_same_prediction() {
        let m = model();
        let trace = point_trace(0.0, 1.6, 0.5, 0.3, 30);
        let a = m
            .predict(&trace, &[2.0, 3.0], &mut StdRng::seed_from_u64(9))
            .unwrap();
        let b = m
            .predict(&trace, &[2.0, 3.0], &mut StdRng::seed_from_u64(9))
            .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn mismatched_trace_rejected() {
        let m = model();
        let trace = PosteriorTrace::new(1)
            .with_variable(INTERCEPT, array![[0.0]])
            .with_variable(SLOPES, array![[1.0, 2.0]])
            .with_variable(BREAKPOINTS, array![[0.1, 0.2]])
            .with_variable(SCALE, array![[0.1]]);
        let mut rng = StdRng::seed_from_u64(3);
        assert!(matches!(
            m.predict(&trace, &[1.0], &mut rng),
            Err(ModelError::TraceShape { .. })
        ));
    }

    #[test]
    fn unordered_breakpoints_rejected() {
        let obs = Observations::new(
            vec![1.0, 2.0, 4.0, 8.0, 16.0],
            vec![1.0, 2.0, 3.0, 4.0, 5.0],
            None,
        )
        .unwrap();
        let m = ReitanRating::new(&obs, &RatingConfig::new(2)).unwrap();
        let trace = PosteriorTrace::new(1)
            .with_variable(INTERCEPT, array![[0.0], [0.0]])
            .with_variable(SLOPES, array![[1.6, 1.6], [1.6, 1.6]])
            .with_variable(BREAKPOINTS, array![[0.5, 1.5], [2.0, 1.5]])
            .with_variable(SCALE, array![[0.1], [0.1]]);
        let mut rng = StdRng::seed_from_u64(5);
        assert!(matches!(
            m.predict(&trace, &[1.0, 3.0], &mut rng),
            Err(ModelError::InvalidDraw { draw: 1, .. })
        ));
    }

    #[test]
    fn non_finite_breakpoint_rejected() {
        let m = model();
        let trace = point_trace(0.0, 1.6, f64::NAN, 0.3, 3);
        let mut rng = StdRng::seed_from_u64(6);
        assert!(matches!(
            m.predict(&trace, &[2.0], &mut rng),
            Err(ModelError::InvalidDraw { draw: 0, .. })
        ));
    }

    #[test]
    fn non_positive_sigma_rejected() {
        let m = model();
        let mut rng = StdRng::seed_from_u64(7);
        for sigma in [0.0, -0.2, f64::INFINITY] {
            let trace = point_trace(0.0, 1.6, 0.5, sigma, 3);
            assert!(matches!(
                m.predictive_draws(&trace, &[2.0], &mut rng),
                Err(ModelError::InvalidDraw { draw: 0, .. })
            ));
        }
    }

    #[test]
    fn non_finite_stage_rejected() {
        let m = model();
        let trace = point_trace(0.0, 1.6, 0.5, 0.3, 5);
        let mut rng = StdRng::seed_from_u64(4);
        assert!(matches!(
            m.predict(&trace, &[1.0, f64::INFINITY], &mut rng),
            Err(ModelError::NonFiniteStage { index: 1, .. })
        ));
    }
}
