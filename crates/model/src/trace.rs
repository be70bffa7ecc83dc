//! Named posterior draws.

use std::collections::BTreeMap;

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// Trace key of the intercept.
pub const INTERCEPT: &str = "a";
/// Trace key of the slopes.
pub const SLOPES: &str = "w";
/// Trace key of the breakpoints.
pub const BREAKPOINTS: &str = "hs";
/// Trace key of the residual scale.
pub const SCALE: &str = "sigma";

/// Posterior draws keyed by parameter name.
///
/// Every parameter is stored as an array of shape `(draws, dim)`; draws from
/// all chains are concatenated chain by chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PosteriorTrace {
    chains: usize,
    variables: BTreeMap<String, Array2<f64>>,
}

impl PosteriorTrace {
    /// Creates an empty trace for `chains` chains.
    pub fn new(chains: usize) -> Self {
        Self {
            chains,
            variables: BTreeMap::new(),
        }
    }

    /// Adds or replaces a parameter.
    pub fn insert(&mut self, name: impl Into<String>, values: Array2<f64>) {
        self.variables.insert(name.into(), values);
    }

    /// Builder form of [`PosteriorTrace::insert`].
    pub fn with_variable(mut self, name: impl Into<String>, values: Array2<f64>) -> Self {
        self.insert(name, values);
        self
    }

    /// Returns the number of chains the draws came from.
    pub fn chains(&self) -> usize {
        self.chains
    }

    /// Returns the draws of `name`.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::MissingParameter`] if `name` is absent.
    pub fn get(&self, name: &str) -> Result<&Array2<f64>, ModelError> {
        self.variables
            .get(name)
            .ok_or_else(|| ModelError::MissingParameter {
                name: name.to_string(),
            })
    }

    /// Parameter names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.variables.keys().map(String::as_str)
    }

    /// Total number of draws (rows of the first parameter; 0 when empty).
    pub fn n_draws(&self) -> usize {
        self.variables.values().next().map_or(0, Array2::nrows)
    }

    /// Checks that the trace holds a rating with `segments` segments and
    /// returns the number of draws.
    ///
    /// # Errors
    ///
    /// | Variant | Trigger |
    /// |---------|---------|
    /// | [`ModelError::MissingParameter`] | `a`, `w`, `hs` or `sigma` absent |
    /// | [`ModelError::TraceShape`] | wrong column count or unequal draw counts |
    /// | [`ModelError::EmptyTrace`] | zero draws |
    pub fn check_rating(&self, segments: usize) -> Result<usize, ModelError> {
        let draws = self.get(INTERCEPT)?.nrows();
        for (name, dim) in [
            (INTERCEPT, 1),
            (SLOPES, segments),
            (BREAKPOINTS, segments),
            (SCALE, 1),
        ] {
            let values = self.get(name)?;
            if values.ncols() != dim {
                return Err(ModelError::TraceShape {
                    name: name.to_string(),
                    what: "components",
                    expected: dim,
                    actual: values.ncols(),
                });
            }
            if values.nrows() != draws {
                return Err(ModelError::TraceShape {
                    name: name.to_string(),
                    what: "draws",
                    expected: draws,
                    actual: values.nrows(),
                });
            }
        }
        if draws == 0 {
            return Err(ModelError::EmptyTrace);
        }
        Ok(draws)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn rating_trace() -> PosteriorTrace {
        PosteriorTrace::new(1)
            .with_variable(INTERCEPT, array![[0.1], [0.2]])
            .with_variable(SLOPES, array![[1.5, 2.0], [1.6, 2.1]])
            .with_variable(BREAKPOINTS, array![[0.3, 1.0], [0.35, 1.1]])
            .with_variable(SCALE, array![[0.05], [0.06]])
    }

    #[test]
    fn valid_rating_trace() {
        let trace = rating_trace();
        assert_eq!(trace.check_rating(2).unwrap(), 2);
        assert_eq!(trace.n_draws(), 2);
        assert_eq!(trace.names().collect::<Vec<_>>(), vec!["a", "hs", "sigma", "w"]);
    }

    #[test]
    fn missing_parameter() {
        let mut trace = PosteriorTrace::new(1);
        trace.insert(INTERCEPT, array![[0.0]]);
        assert!(matches!(
            trace.check_rating(1),
            Err(ModelError::MissingParameter { name }) if name == "w"
        ));
    }

    #[test]
    fn wrong_segment_count() {
        assert!(matches!(
            rating_trace().check_rating(3),
            Err(ModelError::TraceShape {
                what: "components",
                expected: 3,
                actual: 2,
                ..
            })
        ));
    }

    #[test]
    fn unequal_draws() {
        let trace = rating_trace().with_variable(SCALE, array![[0.05]]);
        assert!(matches!(
            trace.check_rating(2),
            Err(ModelError::TraceShape { what: "draws", .. })
        ));
    }

    #[test]
    fn empty_trace() {
        let trace = PosteriorTrace::new(1)
            .with_variable(INTERCEPT, Array2::zeros((0, 1)))
            .with_variable(SLOPES, Array2::zeros((0, 1)))
            .with_variable(BREAKPOINTS, Array2::zeros((0, 1)))
            .with_variable(SCALE, Array2::zeros((0, 1)));
        assert!(matches!(trace.check_rating(1), Err(ModelError::EmptyTrace)));
    }

    #[test]
    fn json_round_trip() {
        let trace = rating_trace();
        let json = serde_json::to_string(&trace).unwrap();
        let back: PosteriorTrace = serde_json::from_str(&json).unwrap();
        assert_eq!(trace, back);
    }
}
