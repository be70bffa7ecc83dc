//! Convergence diagnostics across chains.

use ratingcurve_model::Chain;
use tracing::{info, warn};

/// Split R-hat above which a coordinate is reported as unconverged.
pub const RHAT_THRESHOLD: f64 = 1.05;

/// Split R-hat of every coordinate across `chains`.
///
/// Entries are `None` where R-hat is undefined (too few draws, or a
/// coordinate that never moved).
pub fn split_rhat(chains: &[Chain]) -> Vec<Option<f64>> {
    let dim = chains.first().map_or(0, |c| c.draws().ncols());
    (0..dim)
        .map(|i| {
            let columns: Vec<Vec<f64>> = chains
                .iter()
                .map(|c| c.draws().column(i).to_vec())
                .collect();
            ratingcurve_stats::split_rhat(&columns)
        })
        .collect()
}

/// Logs acceptance rates and warns about coordinates whose split R-hat
/// exceeds [`RHAT_THRESHOLD`]. Returns the number of flagged coordinates.
pub(crate) fn report(chains: &[Chain], names: &[String]) -> usize {
    for (c, chain) in chains.iter().enumerate() {
        info!(
            chain = c,
            draws = chain.len(),
            acceptance_rate = chain.acceptance_rate(),
            "chain sampled"
        );
    }

    let mut flagged = 0;
    for (i, rhat) in split_rhat(chains).into_iter().enumerate() {
        if let Some(rhat) = rhat.filter(|&r| r > RHAT_THRESHOLD) {
            let name = names.get(i).map_or("?", String::as_str);
            warn!(parameter = name, rhat, "split R-hat above threshold");
            flagged += 1;
        }
    }
    flagged
}
