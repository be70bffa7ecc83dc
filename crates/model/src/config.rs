//! Configuration for building a rating model.

use crate::error::ModelError;
use crate::prior::PriorConfig;

/// Configuration for a multi-segment power-law rating.
///
/// # Example
///
/// ```
/// use ratingcurve_model::{PriorConfig, RatingConfig};
///
/// let config = RatingConfig::new(2)
///     .with_prior("normal".parse::<PriorConfig>().unwrap())
///     .with_name("gauge-07");
///
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RatingConfig {
    /// Number of power-law segments.
    segments: usize,
    /// Breakpoint prior selection.
    prior: PriorConfig,
    /// Label for log output.
    name: String,
}

impl RatingConfig {
    /// Creates a configuration with `segments` segments.
    ///
    /// Defaults: uniform breakpoint prior over the observed stage range,
    /// empty name.
    pub fn new(segments: usize) -> Self {
        Self {
            segments,
            prior: PriorConfig::default(),
            name: String::new(),
        }
    }

    /// Sets the breakpoint prior.
    pub fn with_prior(mut self, prior: PriorConfig) -> Self {
        self.prior = prior;
        self
    }

    /// Sets the model name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Returns the number of segments.
    pub fn segments(&self) -> usize {
        self.segments
    }

    /// Returns the breakpoint prior selection.
    pub fn prior(&self) -> &PriorConfig {
        &self.prior
    }

    /// Returns the model name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Validates this configuration.
    ///
    /// Returns an error if `segments < 1` or the prior's explicit parameters
    /// are inconsistent with `segments`.
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.segments < 1 {
            return Err(ModelError::InvalidSegments {
                segments: self.segments,
            });
        }
        self.prior.validate(self.segments)
    }
}

impl Default for RatingConfig {
    fn default() -> Self {
        Self::new(1)
    }
}
