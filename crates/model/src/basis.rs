//! Piecewise log-linear basis of the multi-segment power law.
//!
//! Segment `i` is active above its lower breakpoint `hs[i]` and frozen above
//! the next breakpoint `hs[i + 1]` (the last segment is unbounded). The same
//! function builds the basis for training and for prediction.

use ndarray::Array2;

/// Offsets added inside the logarithm: 0 for the first segment, 1 for the
/// rest.
///
/// The first segment is a classic power law in `h - hs[0]`; later segments
/// start at `ln(1) = 0` so the curve stays continuous at each breakpoint.
pub fn segment_offsets(segments: usize) -> Vec<f64> {
    (0..segments)
        .map(|i| if i == 0 { 0.0 } else { 1.0 })
        .collect()
}

/// Basis value of one segment at stage `h`.
///
/// | Stage | Value |
/// |-------|-------|
/// | `h > upper` | `ln(upper - lower + offset)` |
/// | `lower < h <= upper` | `ln(h - lower + offset)` |
/// | `h <= lower` | `0` |
pub fn segment_basis(h: f64, lower: f64, upper: f64, offset: f64) -> f64 {
    if h > upper {
        (upper - lower + offset).ln()
    } else if h > lower {
        (h - lower + offset).ln()
    } else {
        0.0
    }
}

/// Upper bound of segment `i`: the next breakpoint, or `+inf` for the last.
fn upper_bound(hs: &[f64], i: usize) -> f64 {
    hs.get(i + 1).copied().unwrap_or(f64::INFINITY)
}

/// Basis matrix of shape `(segments, h.len())` for breakpoints `hs`.
pub fn basis_matrix(h: &[f64], hs: &[f64]) -> Array2<f64> {
    let offsets = segment_offsets(hs.len());
    Array2::from_shape_fn((hs.len(), h.len()), |(i, n)| {
        segment_basis(h[n], hs[i], upper_bound(hs, i), offsets[i])
    })
}

/// Linear predictor `a + sum_i w[i] * b_i(h)` at a single stage.
///
/// `w`, `hs` and `offsets` all have one entry per segment.
pub fn linear_predictor(h: f64, a: f64, w: &[f64], hs: &[f64], offsets: &[f64]) -> f64 {
    w.iter()
        .zip(offsets)
        .enumerate()
        .fold(a, |acc, (i, (&wi, &off))| {
            acc + wi * segment_basis(h, hs[i], upper_bound(hs, i), off)
        })
}
