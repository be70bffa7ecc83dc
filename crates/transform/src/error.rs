//! Error types for the ratingcurve-transform crate.

/// Error type for all fallible operations in the ratingcurve-transform crate.
#[derive(Debug, Clone, thiserror::Error)]
pub enum TransformError {
    /// Returned when the reference data is empty or entirely missing.
    #[error("input data is empty or all missing")]
    EmptyData,

    /// Returned when the reference data has zero spread.
    #[error("input data is constant (value {value}): standardisation is undefined")]
    ConstantData {
        /// The repeated value.
        value: f64,
    },

    /// Returned when the reference maximum cannot be used as a scale.
    #[error("degenerate scale: maximum is {max}")]
    DegenerateScale {
        /// The offending maximum.
        max: f64,
    },

    /// Returned when a value lies outside the domain of a log transform.
    #[error("value at index {index} is not positive ({value}): log transform undefined")]
    NonPositive {
        /// Position of the offending value.
        index: usize,
        /// The offending value.
        value: f64,
    },

    /// Returned when a summary axis does not exist for a 2-D array.
    #[error("axis {axis} out of bounds for a 2-D array")]
    AxisOutOfBounds {
        /// The requested axis.
        axis: usize,
    },

    /// Returned when the spline family name is not recognised.
    #[error("unknown spline form: {form:?} (expected \"cr\")")]
    UnknownSplineForm {
        /// The unrecognised name.
        form: String,
    },

    /// Returned when too few degrees of freedom are requested.
    #[error("spline degrees of freedom must be >= {min}, got {df}")]
    InvalidDegreesOfFreedom {
        /// Requested degrees of freedom.
        df: usize,
        /// Minimum supported value.
        min: usize,
    },

    /// Returned when the reference stages do not yield distinct knots.
    #[error("spline knots are not strictly increasing: {knots:?}")]
    DuplicateKnots {
        /// The computed knots.
        knots: Vec<f64>,
    },

    /// Returned when a stage requires extrapolation beyond the fitted knots.
    #[error("stage {value} at index {index} lies outside the knot range [{lower}, {upper}]")]
    OutsideKnots {
        /// Position of the offending stage.
        index: usize,
        /// The offending stage.
        value: f64,
        /// Lowest knot.
        lower: f64,
        /// Highest knot.
        upper: f64,
    },
}
