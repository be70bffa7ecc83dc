use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Bayesian multi-segment power-law rating curves.
#[derive(Parser)]
#[command(
    name = "ratingcurve",
    version,
    about = "Fit and evaluate Bayesian stage-discharge rating curves"
)]
pub struct Cli {
    /// Increase verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands.
#[derive(Subcommand)]
pub enum Command {
    /// Sample the posterior from gaugings and write the trace and rating table.
    Fit(FitArgs),
    /// Predict a rating table from gaugings and a saved trace.
    Predict(PredictArgs),
}

/// Arguments for the `fit` subcommand.
#[derive(clap::Args)]
pub struct FitArgs {
    /// Path to TOML configuration file.
    #[arg(short, long, default_value = "ratingcurve.toml")]
    pub config: PathBuf,

    /// Override rating-table Parquet path from config.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Override global RNG seed from config.
    #[arg(short, long)]
    pub seed: Option<u64>,
}

/// Arguments for the `predict` subcommand.
#[derive(clap::Args)]
pub struct PredictArgs {
    /// Path to TOML configuration file.
    #[arg(short, long, default_value = "ratingcurve.toml")]
    pub config: PathBuf,

    /// Override rating-table Parquet path from config.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Override global RNG seed from config.
    #[arg(short, long)]
    pub seed: Option<u64>,

    /// Parquet file with a `stage` column to predict at instead of the grid.
    #[arg(long)]
    pub stages: Option<PathBuf>,
}
