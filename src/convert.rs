//! Pure conversion functions: TOML config structs -> crate API config types.

use anyhow::{Result, bail};

use crate::config::*;

use ratingcurve_io::{Compression, ReaderConfig, WriterConfig};
use ratingcurve_model::{PriorConfig, RatingConfig, stage_grid};
use ratingcurve_sampler::SamplerConfig;

/// Parses a compression algorithm name string into the corresponding enum variant.
pub fn parse_compression(s: &str) -> Result<Compression> {
    Ok(s.parse::<Compression>()?)
}

/// Parses a breakpoint prior name and attaches its TOML parameters.
///
/// Parameters given for the prior that was not selected are rejected.
pub fn parse_prior(model: &ModelToml) -> Result<PriorConfig> {
    let has_uniform = model.uniform.lower.is_some() || model.uniform.upper.is_some();
    let has_normal = model.normal.mu.is_some() || model.normal.sigma.is_some();
    match model.prior.parse::<PriorConfig>()? {
        PriorConfig::Uniform { .. } => {
            if has_normal {
                bail!("[model.normal] is set but prior is \"uniform\"");
            }
            Ok(PriorConfig::Uniform {
                lower: model.uniform.lower,
                upper: model.uniform.upper,
            })
        }
        PriorConfig::Normal { .. } => {
            if has_uniform {
                bail!("[model.uniform] is set but prior is \"normal\"");
            }
            Ok(PriorConfig::Normal {
                mu: model.normal.mu.clone(),
                sigma: model.normal.sigma.clone(),
            })
        }
    }
}

/// Builds a [`ReaderConfig`] from the TOML I/O configuration.
pub fn build_reader_config(io: &IoConfig) -> ReaderConfig {
    ReaderConfig::default()
        .with_stage_column(&io.stage_column)
        .with_discharge_column(&io.discharge_column)
        .with_q_sigma_column(io.q_sigma_column.as_deref())
}

/// Builds a validated [`RatingConfig`] from the TOML model configuration.
pub fn build_rating_config(model: &ModelToml) -> Result<RatingConfig> {
    let cfg = RatingConfig::new(model.segments)
        .with_prior(parse_prior(model)?)
        .with_name(&model.name);
    cfg.validate()?;
    Ok(cfg)
}

/// Builds a validated [`SamplerConfig`] from the TOML sampler configuration.
///
/// An optional global seed is forwarded to the sampler.
pub fn build_sampler_config(sampler: &SamplerToml, seed: Option<u64>) -> Result<SamplerConfig> {
    let mut cfg = SamplerConfig::new()
        .with_chains(sampler.chains)
        .with_tune(sampler.tune)
        .with_draws(sampler.draws)
        .with_target_accept(sampler.target_accept)
        .with_init_jitter(sampler.init_jitter)
        .with_max_map_iters(sampler.max_map_iters);
    if let Some(s) = seed {
        cfg = cfg.with_seed(s);
    }
    cfg.validate()?;
    Ok(cfg)
}

/// Builds a [`WriterConfig`] from the TOML I/O configuration.
pub fn build_writer_config(io: &IoConfig) -> Result<WriterConfig> {
    let compression = parse_compression(&io.compression)?;
    Ok(WriterConfig::default()
        .with_compression(compression)
        .with_row_group_size(io.row_group_size))
}

/// Builds the prediction stage grid; unset bounds default to `observed`
/// (the observed stage range).
pub fn build_stage_grid(predict: &PredictToml, observed: (f64, f64)) -> Result<Vec<f64>> {
    let lower = predict.min.unwrap_or(observed.0);
    let upper = predict.max.unwrap_or(observed.1);
    Ok(stage_grid(lower, upper, predict.n_points)?)
}
