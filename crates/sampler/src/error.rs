//! Error types for the ratingcurve-sampler crate.

/// Error type for all fallible operations in the ratingcurve-sampler crate.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SamplerError {
    /// Returned when a configuration parameter is invalid.
    #[error("invalid sampler configuration: {reason}")]
    InvalidConfig {
        /// Description of the problem.
        reason: String,
    },

    /// Returned when the model's initial point has the wrong length.
    #[error("initial point has {actual} coordinates, model dimension is {expected}")]
    DimensionMismatch {
        /// Model dimension.
        expected: usize,
        /// Length of the initial point.
        actual: usize,
    },

    /// Returned when a chain cannot start from a point of finite density.
    #[error("log density is not finite at the starting point of chain {chain} ({log_density})")]
    NonFiniteStart {
        /// Chain index.
        chain: usize,
        /// The offending log density.
        log_density: f64,
    },

    /// Returned when the MAP search fails.
    ///
    /// The `reason` field is a `String` because argmin errors do not
    /// implement `Clone`.
    #[error("MAP optimisation failed: {reason}")]
    OptimizationFailed {
        /// Description of the failure.
        reason: String,
    },
}
