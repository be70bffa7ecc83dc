//! Error types for the ratingcurve-model crate.

use ratingcurve_transform::TransformError;

/// Error type for all fallible operations in the ratingcurve-model crate.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ModelError {
    /// Returned when there are no observations.
    #[error("observation set is empty")]
    EmptyData,

    /// Returned when paired inputs differ in length.
    #[error("length mismatch: {field} has {actual} elements, expected {expected}")]
    LengthMismatch {
        /// Name of the offending input.
        field: &'static str,
        /// Required length.
        expected: usize,
        /// Actual length.
        actual: usize,
    },

    /// Returned when an observed discharge is zero, negative or missing.
    #[error("discharge at index {index} must be positive, got {value}")]
    NonPositiveDischarge {
        /// Position of the offending observation.
        index: usize,
        /// The offending value.
        value: f64,
    },

    /// Returned when a stage is NaN or infinite.
    #[error("stage at index {index} is not finite ({value})")]
    NonFiniteStage {
        /// Position of the offending stage.
        index: usize,
        /// The offending value.
        value: f64,
    },

    /// Returned when a discharge uncertainty is negative or not finite.
    #[error("discharge uncertainty at index {index} must be finite and >= 0, got {value}")]
    InvalidUncertainty {
        /// Position of the offending value.
        index: usize,
        /// The offending value.
        value: f64,
    },

    /// Returned when fewer than one segment is requested.
    #[error("number of segments must be >= 1, got {segments}")]
    InvalidSegments {
        /// The requested number of segments.
        segments: usize,
    },

    /// Returned when the breakpoint prior name is not recognised.
    #[error("unknown breakpoint prior: {name:?} (expected \"uniform\" or \"normal\")")]
    UnknownPrior {
        /// The unrecognised name.
        name: String,
    },

    /// Returned when breakpoint prior parameters are invalid.
    #[error("invalid breakpoint prior: {reason}")]
    InvalidPrior {
        /// Description of the problem.
        reason: String,
    },

    /// Returned when a probability distribution cannot be constructed.
    ///
    /// The `message` field is a `String` because statrs and rand_distr
    /// errors do not implement `Clone`.
    #[error("failed to construct {distribution} distribution: {message}")]
    Distribution {
        /// Name of the distribution.
        distribution: &'static str,
        /// Description of the failure.
        message: String,
    },

    /// Returned when a posterior trace lacks a required parameter.
    #[error("posterior trace has no parameter {name:?}")]
    MissingParameter {
        /// The missing parameter name.
        name: String,
    },

    /// Returned when a trace parameter has the wrong shape.
    #[error("trace parameter {name:?} has {actual} {what}, expected {expected}")]
    TraceShape {
        /// The parameter name.
        name: String,
        /// Which dimension is wrong (`"draws"` or `"components"`).
        what: &'static str,
        /// Required size.
        expected: usize,
        /// Actual size.
        actual: usize,
    },

    /// Returned when a posterior trace contains no draws.
    #[error("posterior trace contains no draws")]
    EmptyTrace,

    /// Returned when a single posterior draw is unusable for prediction.
    #[error("posterior draw {draw} is invalid: {reason}")]
    InvalidDraw {
        /// Index of the offending draw.
        draw: usize,
        /// Description of the problem.
        reason: String,
    },

    /// Returned when a prediction grid cannot be built.
    #[error("invalid stage grid: {reason}")]
    InvalidGrid {
        /// Description of the problem.
        reason: String,
    },

    /// Returned when the inference engine fails.
    #[error("inference failed: {reason}")]
    Inference {
        /// The engine's error message.
        reason: String,
    },

    /// Wraps a transform error.
    #[error(transparent)]
    Transform(#[from] TransformError),
}
