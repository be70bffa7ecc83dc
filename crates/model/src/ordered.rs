//! Order-preserving maps from unconstrained vectors to increasing
//! breakpoint vectors.
//!
//! Both maps are bijections onto strictly increasing vectors in exact
//! arithmetic and expose the log absolute Jacobian determinant needed to
//! express a prior on the unconstrained scale. In floating point they
//! saturate for large inputs; see [`IntervalOrdered::forward`].

/// Stick-breaking map onto increasing vectors inside `(lower, upper)`.
///
/// `x[0] = lower + (upper - lower) * s(z[0])` and
/// `x[i] = x[i-1] + (upper - x[i-1]) * s(z[i])`, with `s` the logistic
/// function.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntervalOrdered {
    lower: f64,
    upper: f64,
}

impl IntervalOrdered {
    /// Creates the map for the interval `(lower, upper)`.
    pub fn new(lower: f64, upper: f64) -> Self {
        Self { lower, upper }
    }

    /// Maps unconstrained `z` to an increasing vector.
    ///
    /// The logistic rounds to exactly 1 for `z` above about 37, so such an
    /// entry equals `upper` and every later entry ties with it. Callers
    /// must treat the output as outside the open interval in that case;
    /// [`IntervalOrdered::inverse`] rejects it.
    pub fn forward(&self, z: &[f64]) -> Vec<f64> {
        let mut x = Vec::with_capacity(z.len());
        let mut prev = self.lower;
        for &zi in z {
            prev += (self.upper - prev) * logistic(zi);
            x.push(prev);
        }
        x
    }

    /// Maps an increasing vector back to the unconstrained scale.
    ///
    /// Returns `None` unless `lower < x[0] < x[1] < ... < upper`.
    pub fn inverse(&self, x: &[f64]) -> Option<Vec<f64>> {
        let mut z = Vec::with_capacity(x.len());
        let mut prev = self.lower;
        for &xi in x {
            let u = (xi - prev) / (self.upper - prev);
            if !(u > 0.0 && u < 1.0) {
                return None;
            }
            z.push((u / (1.0 - u)).ln());
            prev = xi;
        }
        Some(z)
    }

    /// Log absolute Jacobian determinant of [`IntervalOrdered::forward`] at `z`.
    pub fn log_jacobian(&self, z: &[f64]) -> f64 {
        let mut prev = self.lower;
        let mut total = 0.0;
        for &zi in z {
            let width = self.upper - prev;
            total += width.ln() - softplus(-zi) - softplus(zi);
            prev += width * logistic(zi);
        }
        total
    }
}

/// Cumulative-exponential map onto unbounded increasing vectors.
///
/// `x[0] = z[0]` and `x[i] = x[i-1] + exp(z[i])`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Ordered;

impl Ordered {
    /// Maps unconstrained `z` to an increasing vector.
    pub fn forward(&self, z: &[f64]) -> Vec<f64> {
        let mut x: Vec<f64> = Vec::with_capacity(z.len());
        for &zi in z {
            let next = match x.last() {
                Some(&prev) => prev + zi.exp(),
                None => zi,
            };
            x.push(next);
        }
        x
    }

    /// Maps an increasing vector back to the unconstrained scale.
    ///
    /// Returns `None` if `x` is not strictly increasing or not finite.
    pub fn inverse(&self, x: &[f64]) -> Option<Vec<f64>> {
        let first = *x.first()?;
        if !first.is_finite() {
            return None;
        }
        let mut z = vec![first];
        for pair in x.windows(2) {
            let gap = pair[1] - pair[0];
            if !(gap > 0.0 && gap.is_finite()) {
                return None;
            }
            z.push(gap.ln());
        }
        Some(z)
    }

    /// Log absolute Jacobian determinant of [`Ordered::forward`] at `z`.
    pub fn log_jacobian(&self, z: &[f64]) -> f64 {
        z.iter().skip(1).sum()
    }
}

/// Returns `true` if `x` is strictly increasing.
pub fn is_strictly_increasing(x: &[f64]) -> bool {
    x.windows(2).all(|w| w[0] < w[1])
}

fn logistic(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

/// `ln(1 + exp(x))` without overflow.
fn softplus(x: f64) -> f64 {
    if x > 0.0 {
        x + (-x).exp().ln_1p()
    } else {
        x.exp().ln_1p()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn interval_forward_is_increasing_and_bounded() {
        let t = IntervalOrdered::new(1.0, 4.0);
        let x = t.forward(&[-3.0, 0.5, 2.0, -1.0, 7.0]);
        assert!(is_strictly_increasing(&x));
        assert!(x.iter().all(|&v| v > 1.0 && v < 4.0));
    }

    #[test]
    fn interval_inverse_round_trip() {
        let t = IntervalOrdered::new(-2.0, 3.0);
        let z = [0.3, -1.2, 0.8];
        let back = t.inverse(&t.forward(&z)).unwrap();
        for (a, b) in z.iter().zip(&back) {
            assert_relative_eq!(a, b, epsilon = 1e-10);
        }
    }

    #[test]
    fn interval_inverse_rejects_unordered() {
        let t = IntervalOrdered::new(0.0, 1.0);
        assert!(t.inverse(&[0.5, 0.4]).is_none());
        assert!(t.inverse(&[0.0, 0.4]).is_none());
        assert!(t.inverse(&[0.2, 1.0]).is_none());
    }

    #[test]
    fn interval_jacobian_matches_finite_differences() {
        // Triangular Jacobian: the determinant is the product of diagonal
        // derivatives dx_i/dz_i.
        let t = IntervalOrdered::new(0.5, 2.5);
        let z = [0.4, -0.7, 1.1];
        let eps = 1e-6;
        let mut expected = 0.0;
        for i in 0..z.len() {
            let mut up = z;
            let mut down = z;
            up[i] += eps;
            down[i] -= eps;
            let d = (t.forward(&up)[i] - t.forward(&down)[i]) / (2.0 * eps);
            expected += d.ln();
        }
        assert_relative_eq!(t.log_jacobian(&z), expected, epsilon = 1e-6);
    }

    #[test]
    fn interval_forward_saturates_at_upper() {
        let t = IntervalOrdered::new(0.0, 1.0);
        let x = t.forward(&[40.0, 0.0]);
        assert_eq!(x, vec![1.0, 1.0]);
        assert!(!is_strictly_increasing(&x));
        assert!(t.inverse(&x).is_none());
    }

    #[test]
    fn interval_jacobian_stable_for_large_inputs() {
        let t = IntervalOrdered::new(0.0, 1.0);
        assert!(t.log_jacobian(&[800.0]).is_finite());
        assert!(t.log_jacobian(&[-800.0]).is_finite());
    }

    #[test]
    fn ordered_forward_inverse() {
        let x = Ordered.forward(&[1.0, 0.0, 2f64.ln()]);
        assert_relative_eq!(x[0], 1.0);
        assert_relative_eq!(x[1], 2.0);
        assert_relative_eq!(x[2], 4.0, epsilon = 1e-12);
        let z = Ordered.inverse(&x).unwrap();
        assert_relative_eq!(z[2], 2f64.ln(), epsilon = 1e-12);
    }

    #[test]
    fn ordered_jacobian_is_sum_of_tail() {
        assert_relative_eq!(Ordered.log_jacobian(&[5.0, 0.5, -0.25]), 0.25);
        assert_eq!(Ordered.log_jacobian(&[5.0]), 0.0);
    }

    #[test]
    fn ordered_inverse_rejects_ties() {
        assert!(Ordered.inverse(&[1.0, 1.0]).is_none());
        assert!(Ordered.inverse(&[]).is_none());
    }

    #[test]
    fn softplus_matches_naive_in_range() {
        for x in [-5.0, -0.5, 0.0, 0.5, 5.0] {
            assert_relative_eq!(softplus(x), (1.0 + f64::exp(x)).ln(), epsilon = 1e-12);
        }
        assert_relative_eq!(softplus(1000.0), 1000.0);
    }
}
