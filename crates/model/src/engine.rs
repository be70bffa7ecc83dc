//! The boundary between a posterior and the engine that samples it.
//!
//! A model exposes its posterior declaratively through [`PosteriorModel`]
//! (dimension, unconstrained log density, starting point). An
//! [`InferenceEngine`] turns that into [`Chain`]s of unconstrained draws,
//! which the model converts back into a named trace.

use ndarray::Array2;

/// A log density over an unconstrained real vector.
///
/// Implementations must be safe to evaluate from several threads at once.
pub trait PosteriorModel: Sync {
    /// Number of unconstrained coordinates.
    fn dim(&self) -> usize;

    /// Log posterior density (up to a constant) at `theta`, Jacobian
    /// adjustments included. Returns `-inf` outside the support.
    fn log_density(&self, theta: &[f64]) -> f64;

    /// A point with finite log density.
    fn initial_point(&self) -> Vec<f64>;

    /// Coordinate names for diagnostics.
    fn parameter_names(&self) -> Vec<String> {
        (0..self.dim()).map(|i| format!("theta[{i}]")).collect()
    }
}

/// Something that draws samples from a [`PosteriorModel`].
pub trait InferenceEngine {
    /// Engine failure.
    type Error: std::error::Error;

    /// Draws one or more chains from `model`.
    fn sample(&self, model: &dyn PosteriorModel) -> Result<Vec<Chain>, Self::Error>;
}

/// Unconstrained draws of one chain.
#[derive(Debug, Clone, PartialEq)]
pub struct Chain {
    /// Shape `(draws, dim)`.
    draws: Array2<f64>,
    acceptance_rate: f64,
}

impl Chain {
    /// Creates a chain from `draws` of shape `(draws, dim)`.
    pub fn new(draws: Array2<f64>, acceptance_rate: f64) -> Self {
        Self {
            draws,
            acceptance_rate,
        }
    }

    /// Returns the draws, shape `(draws, dim)`.
    pub fn draws(&self) -> &Array2<f64> {
        &self.draws
    }

    /// Returns the number of draws.
    pub fn len(&self) -> usize {
        self.draws.nrows()
    }

    /// Returns `true` if the chain holds no draws.
    pub fn is_empty(&self) -> bool {
        self.draws.nrows() == 0
    }

    /// Fraction of accepted proposals after tuning.
    pub fn acceptance_rate(&self) -> f64 {
        self.acceptance_rate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Flat;

    impl PosteriorModel for Flat {
        fn dim(&self) -> usize {
            2
        }

        fn log_density(&self, _theta: &[f64]) -> f64 {
            0.0
        }

        fn initial_point(&self) -> Vec<f64> {
            vec![0.0; 2]
        }
    }

    #[test]
    fn default_parameter_names() {
        assert_eq!(Flat.parameter_names(), vec!["theta[0]", "theta[1]"]);
    }

    #[test]
    fn chain_accessors() {
        let chain = Chain::new(Array2::zeros((5, 3)), 0.25);
        assert_eq!(chain.len(), 5);
        assert!(!chain.is_empty());
        assert_eq!(chain.draws().ncols(), 3);
        assert_eq!(chain.acceptance_rate(), 0.25);
    }
}
