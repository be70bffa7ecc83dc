//! Adaptive random-walk Metropolis for a single chain.
//!
//! Tuning runs in two halves. The first half adapts a global step size by
//! Robbins-Monro toward the target acceptance rate with unit proposal
//! scales, collecting the second quarter of its states. At the midpoint the
//! per-coordinate scales are set to the standard deviations of that window
//! and the step is reset. The second half adapts the step only. Draws are
//! taken with everything frozen.

use ndarray::{Array2, ArrayView1};
use rand::Rng;
use rand_distr::{Distribution, StandardNormal};
use ratingcurve_model::{Chain, PosteriorModel};
use tracing::debug;

use crate::config::SamplerConfig;
use crate::error::SamplerError;

/// Optimal random-walk scale constant (Roberts, Gelman & Gilks 1997).
const OPTIMAL_SCALE: f64 = 2.38;

/// Robbins-Monro gain at the first iteration.
const ADAPT_RATE: f64 = 2.0;

/// Robbins-Monro decay exponent; gains shrink as `t^-0.6`.
const ADAPT_DECAY: f64 = 0.6;

/// Initial global step for a `dim`-dimensional target.
pub(crate) fn optimal_step(dim: usize) -> f64 {
    OPTIMAL_SCALE / (dim.max(1) as f64).sqrt()
}

/// State of one random walk.
struct Walker<'a> {
    model: &'a dyn PosteriorModel,
    theta: Vec<f64>,
    log_density: f64,
    proposal: Vec<f64>,
    scales: Vec<f64>,
    log_step: f64,
}

impl<'a> Walker<'a> {
    fn new(model: &'a dyn PosteriorModel, theta: Vec<f64>, log_density: f64) -> Self {
        let dim = theta.len();
        Self {
            model,
            proposal: vec![0.0; dim],
            theta,
            log_density,
            scales: vec![1.0; dim],
            log_step: optimal_step(dim).ln(),
        }
    }

    /// One Metropolis step. Returns the acceptance probability and whether
    /// the proposal was taken.
    fn step<R: Rng + ?Sized>(&mut self, rng: &mut R) -> (f64, bool) {
        let step = self.log_step.exp();
        for i in 0..self.theta.len() {
            let z: f64 = StandardNormal.sample(rng);
            self.proposal[i] = self.theta[i] + step * self.scales[i] * z;
        }

        let proposed = self.model.log_density(&self.proposal);
        let alpha = if proposed.is_finite() {
            (proposed - self.log_density).exp().min(1.0)
        } else {
            0.0
        };

        let u: f64 = rng.random();
        if u < alpha {
            std::mem::swap(&mut self.theta, &mut self.proposal);
            self.log_density = proposed;
            (alpha, true)
        } else {
            (alpha, false)
        }
    }

    /// Robbins-Monro update of the global step at adaptation iteration `t`.
    fn adapt(&mut self, alpha: f64, t: usize, target: f64) {
        let gain = ADAPT_RATE * ((t + 1) as f64).powf(-ADAPT_DECAY);
        self.log_step += gain * (alpha - target);
    }

    /// Sets per-coordinate scales from the tuning window and resets the step.
    fn rescale(&mut self, window: &[Vec<f64>]) {
        for (scale, values) in self.scales.iter_mut().zip(window) {
            let sd = ratingcurve_stats::variance(values).sqrt();
            if sd.is_finite() && sd > 0.0 {
                *scale = sd;
            }
        }
        self.log_step = optimal_step(self.theta.len()).ln();
    }
}

/// Runs one chain from `start` and returns its retained draws.
///
/// # Errors
///
/// Returns [`SamplerError::NonFiniteStart`] if the log density at `start`
/// is not finite.
pub(crate) fn run_chain<R: Rng + ?Sized>(
    model: &dyn PosteriorModel,
    start: Vec<f64>,
    config: &SamplerConfig,
    chain: usize,
    rng: &mut R,
) -> Result<Chain, SamplerError> {
    let log_density = model.log_density(&start);
    if !log_density.is_finite() {
        return Err(SamplerError::NonFiniteStart { chain, log_density });
    }

    let dim = start.len();
    let target = config.target_accept();
    let tune = config.tune();
    let half = tune / 2;
    let window_start = tune / 4;

    let mut walker = Walker::new(model, start, log_density);
    let mut window: Vec<Vec<f64>> = vec![Vec::with_capacity(half - window_start); dim];

    for t in 0..half {
        let (alpha, _) = walker.step(rng);
        walker.adapt(alpha, t, target);
        if t >= window_start {
            for (values, &x) in window.iter_mut().zip(&walker.theta) {
                values.push(x);
            }
        }
    }
    if tune > 0 {
        walker.rescale(&window);
    }
    for t in 0..(tune - half) {
        let (alpha, _) = walker.step(rng);
        walker.adapt(alpha, t, target);
    }

    let n_draws = config.draws();
    let mut draws = Array2::zeros((n_draws, dim));
    let mut accepted = 0usize;
    for d in 0..n_draws {
        let (_, taken) = walker.step(rng);
        if taken {
            accepted += 1;
        }
        draws.row_mut(d).assign(&ArrayView1::from(&walker.theta[..]));
    }

    let acceptance_rate = accepted as f64 / n_draws.max(1) as f64;
    debug!(
        chain,
        step = walker.log_step.exp(),
        acceptance_rate,
        "chain finished"
    );
    Ok(Chain::new(draws, acceptance_rate))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    /// Independent normals with the given means and standard deviations.
    struct Gaussian {
        mu: Vec<f64>,
        sd: Vec<f64>,
    }

    impl PosteriorModel for Gaussian {
        fn dim(&self) -> usize {
            self.mu.len()
        }

        fn log_density(&self, theta: &[f64]) -> f64 {
            theta
                .iter()
                .zip(self.mu.iter().zip(&self.sd))
                .map(|(t, (m, s))| -0.5 * ((t - m) / s).powi(2))
                .sum()
        }

        fn initial_point(&self) -> Vec<f64> {
            self.mu.clone()
        }
    }

    /// Positive half-line: `-inf` for negative coordinates.
    struct HalfLine;

    impl PosteriorModel for HalfLine {
        fn dim(&self) -> usize {
            1
        }

        fn log_density(&self, theta: &[f64]) -> f64 {
            if theta[0] < 0.0 {
                f64::NEG_INFINITY
            } else {
                -theta[0]
            }
        }

        fn initial_point(&self) -> Vec<f64> {
            vec![1.0]
        }
    }

    #[test]
    fn optimal_step_shrinks_with_dimension() {
        assert_relative_eq!(optimal_step(1), 2.38, epsilon = 1e-12);
        assert_relative_eq!(optimal_step(4), 1.19, epsilon = 1e-12);
        assert_relative_eq!(optimal_step(0), 2.38, epsilon = 1e-12);
    }

    #[test]
    fn recovers_gaussian_moments() {
        let model = Gaussian {
            mu: vec![3.0, -1.0],
            sd: vec![0.05, 4.0],
        };
        let config = SamplerConfig::new().with_tune(2000).with_draws(20000);
        let mut rng = StdRng::seed_from_u64(42);
        let chain = run_chain(&model, vec![3.0, -1.0], &config, 0, &mut rng).unwrap();

        assert_eq!(chain.len(), 20000);
        for (i, (&m, &s)) in model.mu.iter().zip(&model.sd).enumerate() {
            let column: Vec<f64> = chain.draws().column(i).to_vec();
            let mean = ratingcurve_stats::mean(&column);
            let sd = ratingcurve_stats::variance(&column).sqrt();
            assert!((mean - m).abs() < 0.2 * s, "coordinate {i}: mean {mean}");
            assert!((sd / s - 1.0).abs() < 0.2, "coordinate {i}: sd {sd}");
        }
        assert!(chain.acceptance_rate() > 0.1 && chain.acceptance_rate() < 0.6);
    }

    #[test]
    fn never_leaves_the_support() {
        let config = SamplerConfig::new().with_tune(200).with_draws(2000);
        let mut rng = StdRng::seed_from_u64(1);
        let chain = run_chain(&HalfLine, vec![1.0], &config, 0, &mut rng).unwrap();
        assert!(chain.draws().iter().all(|&x| x >= 0.0));
    }

    #[test]
    fn rejects_non_finite_start() {
        let config = SamplerConfig::new().with_tune(10).with_draws(10);
        let mut rng = StdRng::seed_from_u64(1);
        let result = run_chain(&HalfLine, vec![-1.0], &config, 3, &mut rng);
        assert!(matches!(
            result,
            Err(SamplerError::NonFiniteStart { chain: 3, .. })
        ));
    }

    #[test]
    fn works_without_tuning() {
        let config = SamplerConfig::new().with_tune(0).with_draws(50);
        let mut rng = StdRng::seed_from_u64(2);
        let chain = run_chain(&HalfLine, vec![1.0], &config, 0, &mut rng).unwrap();
        assert_eq!(chain.len(), 50);
    }
}
