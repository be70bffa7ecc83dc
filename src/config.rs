use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

/// Top-level ratingcurve configuration.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RatingCurveConfig {
    /// Global RNG seed for sampling and predictive noise.
    #[serde(default)]
    pub seed: Option<u64>,

    /// I/O settings.
    #[serde(default)]
    pub io: IoConfig,

    /// Model settings.
    #[serde(default)]
    pub model: ModelToml,

    /// Sampler settings.
    #[serde(default)]
    pub sampler: SamplerToml,

    /// Prediction grid settings.
    #[serde(default)]
    pub predict: PredictToml,
}

/// Reads and parses a TOML configuration file.
pub fn load(path: &Path) -> Result<RatingCurveConfig> {
    let toml_str = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file: {}", path.display()))?;
    toml::from_str(&toml_str).context("failed to parse TOML config")
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IoConfig {
    /// Gaugings Parquet file.
    pub observations: Option<PathBuf>,
    /// Posterior trace JSON, written by `fit` and read by `predict`.
    pub trace: Option<PathBuf>,
    /// Rating-table Parquet output.
    pub output: Option<PathBuf>,
    #[serde(default = "default_stage_column")]
    pub stage_column: String,
    #[serde(default = "default_discharge_column")]
    pub discharge_column: String,
    #[serde(default = "default_q_sigma_column")]
    pub q_sigma_column: Option<String>,
    #[serde(default = "default_compression")]
    pub compression: String,
    #[serde(default = "default_row_group_size")]
    pub row_group_size: usize,
}

impl Default for IoConfig {
    fn default() -> Self {
        Self {
            observations: None,
            trace: None,
            output: None,
            stage_column: default_stage_column(),
            discharge_column: default_discharge_column(),
            q_sigma_column: default_q_sigma_column(),
            compression: default_compression(),
            row_group_size: default_row_group_size(),
        }
    }
}

fn default_stage_column() -> String {
    "stage".to_string()
}
fn default_discharge_column() -> String {
    "discharge".to_string()
}
fn default_q_sigma_column() -> Option<String> {
    Some("q_sigma".to_string())
}
fn default_compression() -> String {
    "snappy".to_string()
}
fn default_row_group_size() -> usize {
    1_000_000
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModelToml {
    #[serde(default)]
    pub name: String,
    #[serde(default = "default_segments")]
    pub segments: usize,
    #[serde(default = "default_prior")]
    pub prior: String,
    #[serde(default)]
    pub uniform: UniformToml,
    #[serde(default)]
    pub normal: NormalToml,
}

impl Default for ModelToml {
    fn default() -> Self {
        Self {
            name: String::new(),
            segments: default_segments(),
            prior: default_prior(),
            uniform: UniformToml::default(),
            normal: NormalToml::default(),
        }
    }
}

fn default_segments() -> usize {
    1
}
fn default_prior() -> String {
    "uniform".to_string()
}

/// Uniform breakpoint prior bounds.
///
/// `lower` bounds the zero-flow stage from below (default: one stage range
/// under the lowest gauging); `upper` defaults to the highest gauging.
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct UniformToml {
    pub lower: Option<f64>,
    pub upper: Option<f64>,
}

/// Normal breakpoint prior parameters, one entry per segment.
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct NormalToml {
    pub mu: Option<Vec<f64>>,
    pub sigma: Option<Vec<f64>>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SamplerToml {
    #[serde(default = "default_chains")]
    pub chains: usize,
    #[serde(default = "default_tune")]
    pub tune: usize,
    #[serde(default = "default_draws")]
    pub draws: usize,
    #[serde(default = "default_target_accept")]
    pub target_accept: f64,
    #[serde(default = "default_init_jitter")]
    pub init_jitter: f64,
    #[serde(default = "default_max_map_iters")]
    pub max_map_iters: u64,
}

impl Default for SamplerToml {
    fn default() -> Self {
        Self {
            chains: default_chains(),
            tune: default_tune(),
            draws: default_draws(),
            target_accept: default_target_accept(),
            init_jitter: default_init_jitter(),
            max_map_iters: default_max_map_iters(),
        }
    }
}

fn default_chains() -> usize {
    4
}
fn default_tune() -> usize {
    2000
}
fn default_draws() -> usize {
    1000
}
fn default_target_accept() -> f64 {
    0.234
}
fn default_init_jitter() -> f64 {
    0.1
}
fn default_max_map_iters() -> u64 {
    2000
}

/// Stage grid for the rating table; unset bounds follow the observed stages.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PredictToml {
    #[serde(default = "default_n_points")]
    pub n_points: usize,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl Default for PredictToml {
    fn default() -> Self {
        Self {
            n_points: default_n_points(),
            min: None,
            max: None,
        }
    }
}

fn default_n_points() -> usize {
    100
}
