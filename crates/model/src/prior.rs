//! Breakpoint priors.
//!
//! A [`PriorConfig`] is the user's selection, parsed from a distribution
//! name and optionally carrying explicit parameters. It is resolved once,
//! against the observed stage range, into a [`BreakpointPrior`] that the
//! model evaluates.

use std::str::FromStr;

use rand::Rng;
use rand_distr::{Distribution, StandardNormal};

use crate::density::normal_ln_pdf;
use crate::error::ModelError;
use crate::ordered::{IntervalOrdered, Ordered, is_strictly_increasing};

/// Breakpoint prior selection.
///
/// Parameters left as `None` are derived from the observed stage range when
/// the model is built.
#[derive(Debug, Clone, PartialEq)]
pub enum PriorConfig {
    /// Uniform breakpoints between `lower` and `upper`.
    ///
    /// The zero-flow stage `hs[0]` lies below the lowest observed stage (or
    /// below `upper`, if that is lower); the remaining breakpoints are
    /// ordered uniform above it.
    ///
    /// Defaults: `lower = h_min - range`, `upper = h_max`.
    Uniform {
        /// Lower bound of the zero-flow stage.
        lower: Option<f64>,
        /// Upper bound of the breakpoint range.
        upper: Option<f64>,
    },
    /// Independent normals per breakpoint, restricted to increasing vectors.
    ///
    /// Defaults, with `step = range / segments`: `mu[0] = h_min - step`
    /// and `mu[i] = h_min + i * step` for `i >= 1`;
    /// `sigma = range / (2 * segments)`.
    Normal {
        /// Prior means, one per segment.
        mu: Option<Vec<f64>>,
        /// Prior standard deviations, one per segment.
        sigma: Option<Vec<f64>>,
    },
}

impl Default for PriorConfig {
    fn default() -> Self {
        Self::Uniform {
            lower: None,
            upper: None,
        }
    }
}

impl FromStr for PriorConfig {
    type Err = ModelError;

    /// Parses a distribution name (`"uniform"` or `"normal"`) into a
    /// configuration with default parameters.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "uniform" => Ok(Self::default()),
            "normal" => Ok(Self::Normal {
                mu: None,
                sigma: None,
            }),
            _ => Err(ModelError::UnknownPrior {
                name: s.to_string(),
            }),
        }
    }
}

impl PriorConfig {
    /// Returns the distribution name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Uniform { .. } => "uniform",
            Self::Normal { .. } => "normal",
        }
    }

    /// Checks explicit parameters that do not depend on the data.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidPrior`] for non-finite bounds or
    /// parameter vectors whose length differs from `segments`.
    pub fn validate(&self, segments: usize) -> Result<(), ModelError> {
        match self {
            Self::Uniform { lower, upper } => {
                for (label, bound) in [("lower", lower), ("upper", upper)] {
                    if let Some(v) = bound.filter(|v| !v.is_finite()) {
                        return Err(invalid(format!("uniform {label} bound is not finite ({v})")));
                    }
                }
                if let (Some(lo), Some(hi)) = (lower, upper) {
                    if lo >= hi {
                        return Err(invalid(format!(
                            "uniform lower bound {lo} must be below upper bound {hi}"
                        )));
                    }
                }
            }
            Self::Normal { mu, sigma } => {
                for (label, values) in [("mu", mu), ("sigma", sigma)] {
                    let len = values.as_ref().map_or(segments, Vec::len);
                    if len != segments {
                        return Err(invalid(format!(
                            "normal {label} has {len} entries, expected {segments}"
                        )));
                    }
                }
            }
        }
        Ok(())
    }

    /// Resolves defaults against the observed stage range.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidPrior`] if the resolved parameters are
    /// unusable: an empty zero-flow or interior uniform interval,
    /// non-increasing or non-finite normal means, or non-positive normal
    /// standard deviations.
    pub fn resolve(
        &self,
        stage_range: (f64, f64),
        segments: usize,
    ) -> Result<BreakpointPrior, ModelError> {
        self.validate(segments)?;
        let (h_min, h_max) = stage_range;
        let range = h_max - h_min;

        match self {
            Self::Uniform { lower, upper } => {
                let upper = upper.unwrap_or(h_max);
                let split = h_min.min(upper);
                let lower = lower.unwrap_or(split - range);
                if !(lower < split) {
                    return Err(invalid(format!(
                        "zero-flow interval [{lower}, {split}] is empty"
                    )));
                }
                if segments > 1 && !(split < upper) {
                    return Err(invalid(format!(
                        "interior breakpoint interval [{split}, {upper}] is empty"
                    )));
                }
                Ok(BreakpointPrior::Uniform {
                    lower,
                    split,
                    upper,
                })
            }
            Self::Normal { mu, sigma } => {
                let step = range / segments as f64;
                let mu = mu.clone().unwrap_or_else(|| {
                    (0..segments)
                        .map(|i| match i {
                            0 => h_min - step,
                            _ => h_min + step * i as f64,
                        })
                        .collect()
                });
                let sigma = sigma
                    .clone()
                    .unwrap_or_else(|| vec![range / (2.0 * segments as f64); segments]);

                if mu.iter().any(|m| !m.is_finite()) || !is_strictly_increasing(&mu) {
                    return Err(invalid(format!(
                        "normal mu must be finite and strictly increasing, got {mu:?}"
                    )));
                }
                if sigma.iter().any(|s| !(s.is_finite() && *s > 0.0)) {
                    return Err(invalid(format!(
                        "normal sigma must be finite and positive, got {sigma:?}"
                    )));
                }
                Ok(BreakpointPrior::Normal { mu, sigma })
            }
        }
    }
}

/// A resolved breakpoint prior with concrete parameters.
#[derive(Debug, Clone, PartialEq)]
pub enum BreakpointPrior {
    /// `hs[0]` uniform over `(lower, split)`, `hs[1..]` ordered uniform
    /// over `(split, upper)`.
    Uniform {
        /// Lower bound of the zero-flow stage.
        lower: f64,
        /// Upper bound of the zero-flow stage, lower bound of the rest.
        split: f64,
        /// Upper bound of the interior breakpoints.
        upper: f64,
    },
    /// Ordered independent normals.
    Normal {
        /// Means, one per segment.
        mu: Vec<f64>,
        /// Standard deviations, one per segment.
        sigma: Vec<f64>,
    },
}

impl BreakpointPrior {
    /// Maps unconstrained values to an increasing breakpoint vector.
    pub fn constrain(&self, z: &[f64]) -> Vec<f64> {
        match self {
            Self::Uniform {
                lower,
                split,
                upper,
            } => {
                let (head, tail) = split_zero_flow(z);
                let mut hs = IntervalOrdered::new(*lower, *split).forward(head);
                hs.extend(IntervalOrdered::new(*split, *upper).forward(tail));
                hs
            }
            Self::Normal { .. } => Ordered.forward(z),
        }
    }

    /// Maps an increasing breakpoint vector to unconstrained values.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidPrior`] if `hs` is not strictly
    /// increasing or, for the uniform prior, leaves its open intervals.
    pub fn unconstrain(&self, hs: &[f64]) -> Result<Vec<f64>, ModelError> {
        let z = match self {
            Self::Uniform {
                lower,
                split,
                upper,
            } => {
                let (head, tail) = split_zero_flow(hs);
                IntervalOrdered::new(*lower, *split)
                    .inverse(head)
                    .zip(IntervalOrdered::new(*split, *upper).inverse(tail))
                    .map(|(mut z, rest)| {
                        z.extend(rest);
                        z
                    })
            }
            Self::Normal { .. } => Ordered.inverse(hs),
        };
        z.ok_or_else(|| invalid(format!("breakpoints {hs:?} lie outside the prior support")))
    }

    /// Log prior density of an increasing breakpoint vector.
    ///
    /// Returns `-inf` outside the support.
    pub fn log_density(&self, hs: &[f64]) -> f64 {
        if !is_strictly_increasing(hs) {
            return f64::NEG_INFINITY;
        }
        match self {
            Self::Uniform {
                lower,
                split,
                upper,
            } => {
                let (head, tail) = split_zero_flow(hs);
                if head.iter().any(|&h| h <= *lower || h >= *split)
                    || tail.iter().any(|&h| h <= *split || h >= *upper)
                {
                    return f64::NEG_INFINITY;
                }
                // 1 / (split - lower) times the ordered simplex density
                // k! / (upper - split)^k over the k interior breakpoints.
                let k = tail.len();
                let interior = if k == 0 {
                    0.0
                } else {
                    ln_factorial(k) - k as f64 * (upper - split).ln()
                };
                -(split - lower).ln() * head.len() as f64 + interior
            }
            Self::Normal { mu, sigma } => hs
                .iter()
                .zip(mu.iter().zip(sigma))
                .map(|(&h, (&m, &s))| normal_ln_pdf(h, m, s))
                .sum(),
        }
    }

    /// Log density on the unconstrained scale, Jacobian included.
    pub fn log_density_unconstrained(&self, z: &[f64]) -> f64 {
        let jacobian = match self {
            Self::Uniform {
                lower,
                split,
                upper,
            } => {
                let (head, tail) = split_zero_flow(z);
                IntervalOrdered::new(*lower, *split).log_jacobian(head)
                    + IntervalOrdered::new(*split, *upper).log_jacobian(tail)
            }
            Self::Normal { .. } => Ordered.log_jacobian(z),
        };
        self.log_density(&self.constrain(z)) + jacobian
    }

    /// Deterministic starting breakpoints inside the support.
    ///
    /// Uniform: the midpoint of the zero-flow interval, then midpoints of
    /// equal sub-intervals of the interior range. Normal: the prior means.
    pub fn initial(&self, segments: usize) -> Vec<f64> {
        match self {
            Self::Uniform {
                lower,
                split,
                upper,
            } => {
                let interior = segments.saturating_sub(1);
                let step = (upper - split) / interior.max(1) as f64;
                std::iter::once(0.5 * (lower + split))
                    .chain((0..interior).map(|i| split + step * (i as f64 + 0.5)))
                    .collect()
            }
            Self::Normal { mu, .. } => mu.clone(),
        }
    }

    /// Draws an increasing breakpoint vector from the prior.
    ///
    /// Draws are sorted, so the result is non-decreasing (strictly
    /// increasing with probability one).
    pub fn sample<R: Rng + ?Sized>(&self, segments: usize, rng: &mut R) -> Vec<f64> {
        let mut hs: Vec<f64> = match self {
            Self::Uniform {
                lower,
                split,
                upper,
            } => (0..segments)
                .map(|i| {
                    let (lo, hi) = if i == 0 { (lower, split) } else { (split, upper) };
                    lo + (hi - lo) * rng.random::<f64>()
                })
                .collect(),
            Self::Normal { mu, sigma } => mu
                .iter()
                .zip(sigma)
                .map(|(&m, &s)| {
                    let z: f64 = StandardNormal.sample(rng);
                    m + s * z
                })
                .collect(),
        };
        hs.sort_by(f64::total_cmp);
        hs
    }
}

/// Splits off the zero-flow entry from the interior breakpoints.
fn split_zero_flow(x: &[f64]) -> (&[f64], &[f64]) {
    x.split_at(x.len().min(1))
}

fn ln_factorial(k: usize) -> f64 {
    (2..=k).map(|i| (i as f64).ln()).sum()
}

fn invalid(reason: String) -> ModelError {
    ModelError::InvalidPrior { reason }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn parse_names() {
        assert_eq!("uniform".parse::<PriorConfig>().unwrap().name(), "uniform");
        assert_eq!("Normal".parse::<PriorConfig>().unwrap().name(), "normal");
        let err = "gamma".parse::<PriorConfig>().unwrap_err();
        assert!(matches!(err, ModelError::UnknownPrior { name } if name == "gamma"));
    }

    #[test]
    fn uniform_defaults_put_zero_flow_below_data() {
        let prior = PriorConfig::default().resolve((0.5, 3.0), 2).unwrap();
        assert_eq!(
            prior,
            BreakpointPrior::Uniform {
                lower: -2.0,
                split: 0.5,
                upper: 3.0
            }
        );
        let hs = prior.initial(2);
        assert!(hs[0] < 0.5);
        assert!(hs[1] > 0.5 && hs[1] < 3.0);
    }

    #[test]
    fn default_support_contains_power_law_offset() {
        // q = 3 (h - 0.5)^2 gauged on 1..3: zero flow at 0.5.
        let prior = PriorConfig::default().resolve((1.0, 2.95), 1).unwrap();
        let z = prior.unconstrain(&[0.5]).unwrap();
        assert_relative_eq!(prior.constrain(&z)[0], 0.5, epsilon = 1e-12);
        assert!(prior.log_density(&[0.5]).is_finite());
        assert_eq!(prior.log_density(&[1.5]), f64::NEG_INFINITY);
        assert!(prior.initial(1)[0] < 1.0);
    }

    #[test]
    fn uniform_override_bounds() {
        let cfg = PriorConfig::Uniform {
            lower: Some(0.0),
            upper: None,
        };
        assert_eq!(
            cfg.resolve((1.0, 2.0), 1).unwrap(),
            BreakpointPrior::Uniform {
                lower: 0.0,
                split: 1.0,
                upper: 2.0
            }
        );
        // An upper bound below the data caps the zero-flow stage.
        let cfg = PriorConfig::Uniform {
            lower: Some(0.0),
            upper: Some(0.9),
        };
        assert_eq!(
            cfg.resolve((1.0, 2.0), 1).unwrap(),
            BreakpointPrior::Uniform {
                lower: 0.0,
                split: 0.9,
                upper: 0.9
            }
        );
        assert!(cfg.resolve((1.0, 2.0), 2).is_err());
    }

    #[test]
    fn uniform_empty_interval_rejected() {
        assert!(matches!(
            PriorConfig::default().resolve((2.0, 2.0), 1),
            Err(ModelError::InvalidPrior { .. })
        ));
        let cfg = PriorConfig::Uniform {
            lower: Some(3.0),
            upper: Some(1.0),
        };
        assert!(cfg.validate(1).is_err());
        // Zero flow cannot start above the lowest stage.
        let cfg = PriorConfig::Uniform {
            lower: Some(1.5),
            upper: None,
        };
        assert!(cfg.resolve((1.0, 2.0), 1).is_err());
    }

    #[test]
    fn normal_defaults() {
        let cfg: PriorConfig = "normal".parse().unwrap();
        let prior = cfg.resolve((1.0, 5.0), 4).unwrap();
        match prior {
            BreakpointPrior::Normal { mu, sigma } => {
                assert_eq!(mu, vec![0.0, 2.0, 3.0, 4.0]);
                assert_eq!(sigma, vec![0.5; 4]);
            }
            other => panic!("unexpected prior {other:?}"),
        }
    }

    #[test]
    fn normal_length_mismatch_rejected() {
        let cfg = PriorConfig::Normal {
            mu: Some(vec![1.0, 2.0]),
            sigma: None,
        };
        assert!(matches!(cfg.validate(3), Err(ModelError::InvalidPrior { .. })));
    }

    #[test]
    fn normal_unordered_mu_rejected() {
        let cfg = PriorConfig::Normal {
            mu: Some(vec![2.0, 1.0]),
            sigma: Some(vec![0.1, 0.1]),
        };
        assert!(cfg.resolve((0.0, 3.0), 2).is_err());
    }

    #[test]
    fn uniform_density_is_constant_inside() {
        let prior = BreakpointPrior::Uniform {
            lower: 0.0,
            split: 1.0,
            upper: 3.0,
        };
        // 1 / 1 for hs[0], 2! / 2^2 for the two interior breakpoints.
        assert_relative_eq!(prior.log_density(&[0.3, 1.1, 2.0]), 0.5f64.ln(), epsilon = 1e-12);
        assert_relative_eq!(prior.log_density(&[0.9, 1.5, 2.9]), 0.5f64.ln(), epsilon = 1e-12);
        assert_eq!(prior.log_density(&[0.3, 2.0, 1.1]), f64::NEG_INFINITY);
        assert_eq!(prior.log_density(&[1.1, 1.5, 2.0]), f64::NEG_INFINITY);
        assert_eq!(prior.log_density(&[0.3, 1.1, 3.1]), f64::NEG_INFINITY);
    }

    #[test]
    fn uniform_density_integrates_to_one() {
        // Riemann sum over (0, 1) x (1, 2) for two segments.
        let prior = BreakpointPrior::Uniform {
            lower: 0.0,
            split: 1.0,
            upper: 2.0,
        };
        let n = 200;
        let dx = 1.0 / n as f64;
        let mut total = 0.0;
        for i in 0..n {
            for j in 0..n {
                let hs = [(i as f64 + 0.5) * dx, 1.0 + (j as f64 + 0.5) * dx];
                total += prior.log_density(&hs).exp() * dx * dx;
            }
        }
        assert_relative_eq!(total, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn saturated_breakpoints_fall_outside_support() {
        let prior = BreakpointPrior::Uniform {
            lower: 0.0,
            split: 1.0,
            upper: 2.0,
        };
        let hs = prior.constrain(&[40.0, 0.0]);
        assert_eq!(hs[0], 1.0);
        assert_eq!(prior.log_density(&hs), f64::NEG_INFINITY);
    }

    #[test]
    fn initial_point_is_in_support() {
        for cfg in [PriorConfig::default(), "normal".parse().unwrap()] {
            let prior = cfg.resolve((1.0, 4.0), 3).unwrap();
            let hs = prior.initial(3);
            assert!(is_strictly_increasing(&hs));
            let z = prior.unconstrain(&hs).unwrap();
            let back = prior.constrain(&z);
            for (a, b) in hs.iter().zip(&back) {
                assert_relative_eq!(a, b, epsilon = 1e-10);
            }
            assert!(prior.log_density_unconstrained(&z).is_finite());
        }
    }

    #[test]
    fn prior_draws_are_ordered() {
        let mut rng = StdRng::seed_from_u64(7);
        for cfg in [PriorConfig::default(), "normal".parse().unwrap()] {
            let prior = cfg.resolve((0.0, 10.0), 4).unwrap();
            for _ in 0..200 {
                let hs = prior.sample(4, &mut rng);
                assert_eq!(hs.len(), 4);
                assert!(hs.windows(2).all(|w| w[0] <= w[1]));
            }
        }
    }

    #[test]
    fn constrained_values_are_ordered() {
        let mut rng = StdRng::seed_from_u64(11);
        for cfg in [PriorConfig::default(), "normal".parse().unwrap()] {
            let prior = cfg.resolve((0.0, 10.0), 3).unwrap();
            for _ in 0..200 {
                let z: Vec<f64> = (0..3)
                    .map(|_| {
                        let v: f64 = StandardNormal.sample(&mut rng);
                        3.0 * v
                    })
                    .collect();
                assert!(is_strictly_increasing(&prior.constrain(&z)));
            }
        }
    }

    #[test]
    fn unconstrain_rejects_outside_support() {
        let prior = BreakpointPrior::Uniform {
            lower: 0.0,
            split: 1.0,
            upper: 2.0,
        };
        assert!(prior.unconstrain(&[0.5, 2.5]).is_err());
        assert!(prior.unconstrain(&[1.2, 1.5]).is_err());
        assert!(prior.unconstrain(&[0.5, 1.5]).is_ok());
    }

    #[test]
    fn ln_factorial_values() {
        assert_eq!(ln_factorial(0), 0.0);
        assert_eq!(ln_factorial(1), 0.0);
        assert_relative_eq!(ln_factorial(4), 24f64.ln(), epsilon = 1e-12);
    }
}
