//! Statistical helper functions for the ratingcurve workspace.
//!
//! The `nan*` variants ignore missing values the way NumPy's `nanmean`,
//! `nanstd` and `nanmax` do; everything else expects finite input.

/// Arithmetic mean of a slice. Returns 0.0 if empty.
pub fn mean(data: &[f64]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    let sum: f64 = data.iter().sum();
    sum / data.len() as f64
}

/// Sample variance with N-1 denominator.
/// Returns 0.0 if fewer than 2 elements.
pub fn variance(data: &[f64]) -> f64 {
    let n = data.len();
    if n < 2 {
        return 0.0;
    }
    let nf = n as f64;
    let mean = data.iter().sum::<f64>() / nf;
    data.iter().map(|&x| (x - mean) * (x - mean)).sum::<f64>() / (nf - 1.0)
}

/// Population standard deviation (N denominator, NumPy's default `ddof=0`).
/// Returns 0.0 if empty.
pub fn std_pop(data: &[f64]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    let nf = data.len() as f64;
    let m = mean(data);
    (data.iter().map(|&x| (x - m) * (x - m)).sum::<f64>() / nf).sqrt()
}

/// Mean of the non-NaN values, or `None` if every value is NaN.
pub fn nanmean(data: &[f64]) -> Option<f64> {
    let finite: Vec<f64> = data.iter().copied().filter(|x| !x.is_nan()).collect();
    if finite.is_empty() {
        None
    } else {
        Some(mean(&finite))
    }
}

/// Population standard deviation of the non-NaN values, or `None` if every
/// value is NaN.
pub fn nanstd(data: &[f64]) -> Option<f64> {
    let finite: Vec<f64> = data.iter().copied().filter(|x| !x.is_nan()).collect();
    if finite.is_empty() {
        None
    } else {
        Some(std_pop(&finite))
    }
}

/// Maximum of the non-NaN values, or `None` if every value is NaN.
pub fn nanmax(data: &[f64]) -> Option<f64> {
    data.iter()
        .copied()
        .filter(|x| !x.is_nan())
        .fold(None, |acc, x| match acc {
            Some(m) if m >= x => Some(m),
            _ => Some(x),
        })
}

/// Minimum and maximum of the non-NaN values, or `None` if every value is NaN.
pub fn nanrange(data: &[f64]) -> Option<(f64, f64)> {
    let mut it = data.iter().copied().filter(|x| !x.is_nan());
    let first = it.next()?;
    Some(it.fold((first, first), |(lo, hi), x| (lo.min(x), hi.max(x))))
}

/// Returns a sorted copy of `data`. NaN values sort as equal to their
/// neighbours, so callers should filter them first.
pub fn sorted(data: &[f64]) -> Vec<f64> {
    let mut out = data.to_vec();
    out.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    out
}

/// Linear-interpolation quantile (R type 7, NumPy's default `percentile`).
///
/// **Expects pre-sorted input** (caller's responsibility).
///
/// # Panics
///
/// Panics if `sorted` is empty.
pub fn quantile_type7(sorted: &[f64], p: f64) -> f64 {
    assert!(
        !sorted.is_empty(),
        "quantile_type7: input must not be empty"
    );
    let n = sorted.len();
    let h = (n - 1) as f64 * p;
    let lo = h.floor() as usize;
    let hi = (lo + 1).min(n - 1);
    sorted[lo] + (h - h.floor()) * (sorted[hi] - sorted[lo])
}

/// Median of pre-sorted data. For even length, averages the middle two values.
///
/// # Panics
///
/// Panics if `sorted` is empty.
pub fn median(sorted: &[f64]) -> f64 {
    assert!(!sorted.is_empty(), "median: input must not be empty");
    let n = sorted.len();
    if n % 2 == 1 {
        sorted[n / 2]
    } else {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    }
}

/// Split potential scale reduction factor (Gelman et al. 2013).
///
/// Each chain is cut in half and the halves are treated as separate
/// sequences. Returns `None` when there are no chains, a chain has fewer
/// than 4 draws, chains differ in length, or the within-sequence variance
/// is zero.
pub fn split_rhat(chains: &[Vec<f64>]) -> Option<f64> {
    let len = chains.first()?.len();
    if len < 4 || chains.iter().any(|c| c.len() != len) {
        return None;
    }

    let half = len / 2;
    let halves: Vec<&[f64]> = chains
        .iter()
        .flat_map(|c| [&c[..half], &c[len - half..]])
        .collect();

    let m = halves.len() as f64;
    let n = half as f64;
    let means: Vec<f64> = halves.iter().map(|h| mean(h)).collect();
    let grand = mean(&means);

    let between = n / (m - 1.0) * means.iter().map(|x| (x - grand).powi(2)).sum::<f64>();
    let within = halves.iter().map(|h| variance(h)).sum::<f64>() / m;
    if within <= 0.0 {
        return None;
    }

    let var_plus = (n - 1.0) / n * within + between / n;
    Some((var_plus / within).sqrt())
}
