//! Parameter vector layout and constrained parameter values.

use std::ops::Range;

use crate::prior::BreakpointPrior;

/// Position of each parameter in the unconstrained vector.
///
/// Layout for `S` segments (dimension `2S + 2`):
///
/// | Slot | Parameter | Map to constrained |
/// |------|-----------|--------------------|
/// | `0` | `a` | identity |
/// | `1..1+S` | `w` | identity |
/// | `1+S..1+2S` | `hs` | breakpoint prior's ordered map |
/// | `1+2S` | `sigma` | `exp` |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParameterLayout {
    segments: usize,
}

impl ParameterLayout {
    /// Creates the layout for `segments` segments.
    pub fn new(segments: usize) -> Self {
        Self { segments }
    }

    /// Returns the number of segments.
    pub fn segments(&self) -> usize {
        self.segments
    }

    /// Total number of unconstrained coordinates.
    pub fn dim(&self) -> usize {
        2 * self.segments + 2
    }

    /// Slot of the intercept.
    pub fn intercept(&self) -> usize {
        0
    }

    /// Slots of the slopes.
    pub fn slopes(&self) -> Range<usize> {
        1..1 + self.segments
    }

    /// Slots of the unconstrained breakpoints.
    pub fn breakpoints(&self) -> Range<usize> {
        1 + self.segments..1 + 2 * self.segments
    }

    /// Slot of `ln(sigma)`.
    pub fn log_scale(&self) -> usize {
        1 + 2 * self.segments
    }

    /// Coordinate names, in slot order.
    pub fn names(&self) -> Vec<String> {
        let mut names = Vec::with_capacity(self.dim());
        names.push("a".to_string());
        names.extend((0..self.segments).map(|i| format!("w[{i}]")));
        names.extend((0..self.segments).map(|i| format!("hs_raw[{i}]")));
        names.push("log_sigma".to_string());
        names
    }

    /// Maps an unconstrained vector to parameter values.
    ///
    /// `theta` must have length [`ParameterLayout::dim`].
    pub fn constrain(&self, theta: &[f64], prior: &BreakpointPrior) -> RatingParameters {
        RatingParameters {
            a: theta[self.intercept()],
            w: theta[self.slopes()].to_vec(),
            hs: prior.constrain(&theta[self.breakpoints()]),
            sigma: theta[self.log_scale()].exp(),
        }
    }
}

/// One draw of the rating parameters on their natural scale.
#[derive(Debug, Clone, PartialEq)]
pub struct RatingParameters {
    a: f64,
    w: Vec<f64>,
    hs: Vec<f64>,
    sigma: f64,
}

impl RatingParameters {
    /// Creates a parameter set. `w` and `hs` have one entry per segment.
    pub fn new(a: f64, w: Vec<f64>, hs: Vec<f64>, sigma: f64) -> Self {
        Self { a, w, hs, sigma }
    }

    /// Intercept on the log-z discharge scale.
    pub fn a(&self) -> f64 {
        self.a
    }

    /// Per-segment slopes.
    pub fn w(&self) -> &[f64] {
        &self.w
    }

    /// Breakpoints in stage units; `hs[0]` is the zero-flow stage.
    pub fn hs(&self) -> &[f64] {
        &self.hs
    }

    /// Residual scale on the log-z discharge scale.
    pub fn sigma(&self) -> f64 {
        self.sigma
    }
}
