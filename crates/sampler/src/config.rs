//! Configuration for the adaptive Metropolis sampler.

use crate::error::SamplerError;

/// Sampler settings.
///
/// # Example
///
/// ```
/// use ratingcurve_sampler::SamplerConfig;
///
/// let config = SamplerConfig::new()
///     .with_chains(2)
///     .with_draws(500)
///     .with_seed(7);
///
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SamplerConfig {
    /// Number of independent chains.
    chains: usize,
    /// Adaptation iterations per chain (discarded).
    tune: usize,
    /// Retained draws per chain.
    draws: usize,
    /// Base seed; chain `c` uses `seed + c`. `None` seeds from the OS.
    seed: Option<u64>,
    /// Acceptance rate targeted during tuning.
    target_accept: f64,
    /// Standard deviation of the per-chain jitter around the start point.
    init_jitter: f64,
    /// Iteration cap of the MAP search; 0 disables it.
    max_map_iters: u64,
}

impl SamplerConfig {
    /// Creates a configuration with defaults.
    ///
    /// Defaults: 4 chains, 2000 tuning iterations, 1000 draws, OS seed,
    /// target acceptance 0.234, jitter 0.1, 2000 MAP iterations.
    pub fn new() -> Self {
        Self {
            chains: 4,
            tune: 2000,
            draws: 1000,
            seed: None,
            target_accept: 0.234,
            init_jitter: 0.1,
            max_map_iters: 2000,
        }
    }

    /// Sets the number of chains.
    pub fn with_chains(mut self, chains: usize) -> Self {
        self.chains = chains;
        self
    }

    /// Sets the number of tuning iterations per chain.
    pub fn with_tune(mut self, tune: usize) -> Self {
        self.tune = tune;
        self
    }

    /// Sets the number of retained draws per chain.
    pub fn with_draws(mut self, draws: usize) -> Self {
        self.draws = draws;
        self
    }

    /// Sets the base seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Sets the target acceptance rate.
    pub fn with_target_accept(mut self, target_accept: f64) -> Self {
        self.target_accept = target_accept;
        self
    }

    /// Sets the start-point jitter.
    pub fn with_init_jitter(mut self, init_jitter: f64) -> Self {
        self.init_jitter = init_jitter;
        self
    }

    /// Sets the MAP iteration cap (0 disables the MAP search).
    pub fn with_max_map_iters(mut self, max_map_iters: u64) -> Self {
        self.max_map_iters = max_map_iters;
        self
    }

    /// Returns the number of chains.
    pub fn chains(&self) -> usize {
        self.chains
    }

    /// Returns the number of tuning iterations.
    pub fn tune(&self) -> usize {
        self.tune
    }

    /// Returns the number of retained draws per chain.
    pub fn draws(&self) -> usize {
        self.draws
    }

    /// Returns the base seed, if fixed.
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// Returns the target acceptance rate.
    pub fn target_accept(&self) -> f64 {
        self.target_accept
    }

    /// Returns the start-point jitter.
    pub fn init_jitter(&self) -> f64 {
        self.init_jitter
    }

    /// Returns the MAP iteration cap.
    pub fn max_map_iters(&self) -> u64 {
        self.max_map_iters
    }

    /// Validates this configuration.
    ///
    /// Returns an error if `chains` or `draws` is zero, `target_accept` is
    /// outside `(0, 1)`, or `init_jitter` is negative or non-finite.
    pub fn validate(&self) -> Result<(), SamplerError> {
        if self.chains < 1 {
            return Err(invalid("chains must be >= 1"));
        }
        if self.draws < 1 {
            return Err(invalid("draws must be >= 1"));
        }
        if !(self.target_accept > 0.0 && self.target_accept < 1.0) {
            return Err(invalid(&format!(
                "target_accept must be in (0, 1), got {}",
                self.target_accept
            )));
        }
        if !self.init_jitter.is_finite() || self.init_jitter < 0.0 {
            return Err(invalid(&format!(
                "init_jitter must be finite and >= 0, got {}",
                self.init_jitter
            )));
        }
        Ok(())
    }
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self::new()
    }
}

fn invalid(reason: &str) -> SamplerError {
    SamplerError::InvalidConfig {
        reason: reason.to_string(),
    }
}
