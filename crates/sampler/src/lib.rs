//! # ratingcurve-sampler
//!
//! MAP-initialised adaptive random-walk Metropolis for any
//! [`PosteriorModel`].
//!
//! ## Sampling Pipeline
//!
//! ```mermaid
//! graph LR
//!     A["PosteriorModel"] -->|"initial_point()"| B["start"]
//!     B -->|"Nelder-Mead on -log p"| C["MAP"]
//!     C -->|"jitter per chain"| D["chain starts"]
//!     D -->|"tune + draw (rayon)"| E["Vec&lt;Chain&gt;"]
//!     E -->|"split R-hat"| F["diagnostics"]
//! ```
//!
//! ## Quick Start
//!
//! ```ignore
//! use ratingcurve_model::{Observations, RatingConfig, ReitanRating};
//! use ratingcurve_sampler::{MetropolisEngine, SamplerConfig};
//!
//! let model = ReitanRating::new(&observations, &RatingConfig::new(2))?;
//! let engine = MetropolisEngine::new(SamplerConfig::new().with_seed(42));
//! let trace = model.sample(&engine)?;
//! ```

mod config;
mod diagnostics;
mod error;
mod map;
mod metropolis;

pub use config::SamplerConfig;
pub use diagnostics::{RHAT_THRESHOLD, split_rhat};
pub use error::SamplerError;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, StandardNormal};
use rayon::prelude::*;
use ratingcurve_model::{Chain, InferenceEngine, PosteriorModel};
use tracing::{debug, info};

/// Attempts at drawing a jittered start with finite density before falling
/// back to the shared start.
const JITTER_ATTEMPTS: usize = 20;

/// Inference engine running independent adaptive Metropolis chains in
/// parallel.
///
/// Chain `c` is seeded with `seed + c`, so a fixed seed reproduces the
/// draws regardless of thread scheduling.
#[derive(Debug, Clone, Default)]
pub struct MetropolisEngine {
    config: SamplerConfig,
}

impl MetropolisEngine {
    /// Creates an engine with the given settings.
    pub fn new(config: SamplerConfig) -> Self {
        Self { config }
    }

    /// Returns the sampler settings.
    pub fn config(&self) -> &SamplerConfig {
        &self.config
    }
}

impl InferenceEngine for MetropolisEngine {
    type Error = SamplerError;

    /// Draws `chains` chains of `draws` unconstrained samples each.
    ///
    /// # Errors
    ///
    /// | Condition | Error |
    /// |---|---|
    /// | Invalid settings | [`SamplerError::InvalidConfig`] |
    /// | `initial_point()` length differs from `dim()` | [`SamplerError::DimensionMismatch`] |
    /// | Nelder-Mead setup or run fails | [`SamplerError::OptimizationFailed`] |
    /// | Start has non-finite log density | [`SamplerError::NonFiniteStart`] |
    #[tracing::instrument(skip_all, fields(chains = self.config.chains(), dim = model.dim()))]
    fn sample(&self, model: &dyn PosteriorModel) -> Result<Vec<Chain>, SamplerError> {
        self.config.validate()?;

        let dim = model.dim();
        let initial = model.initial_point();
        if initial.len() != dim {
            return Err(SamplerError::DimensionMismatch {
                expected: dim,
                actual: initial.len(),
            });
        }

        let start = if self.config.max_map_iters() > 0 {
            map::find_map(model, &initial, self.config.max_map_iters())?
        } else {
            initial
        };
        debug!(log_density = model.log_density(&start), "chain start located");

        let base_seed = match self.config.seed() {
            Some(seed) => seed,
            None => StdRng::from_os_rng().random(),
        };

        let config = &self.config;
        let chains = (0..config.chains())
            .into_par_iter()
            .map(|c| {
                let mut rng = StdRng::seed_from_u64(base_seed.wrapping_add(c as u64));
                let chain_start = jittered_start(model, &start, config.init_jitter(), &mut rng);
                metropolis::run_chain(model, chain_start, config, c, &mut rng)
            })
            .collect::<Result<Vec<_>, _>>()?;

        let flagged = diagnostics::report(&chains, &model.parameter_names());
        info!(
            chains = chains.len(),
            draws = config.draws(),
            flagged,
            "sampling complete"
        );
        Ok(chains)
    }
}

/// Perturbs `start` by `jitter` standard normal noise, retrying until the
/// log density is finite. Falls back to `start`.
fn jittered_start<R: Rng + ?Sized>(
    model: &dyn PosteriorModel,
    start: &[f64],
    jitter: f64,
    rng: &mut R,
) -> Vec<f64> {
    if jitter > 0.0 {
        for _ in 0..JITTER_ATTEMPTS {
            let candidate: Vec<f64> = start
                .iter()
                .map(|&x| {
                    let z: f64 = StandardNormal.sample(rng);
                    x + jitter * z
                })
                .collect();
            if model.log_density(&candidate).is_finite() {
                return candidate;
            }
        }
    }
    start.to_vec()
}
