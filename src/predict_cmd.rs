//! Predict command: rating table from gaugings and a saved trace.

use anyhow::{Context, Result};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{info, info_span};

use ratingcurve_io::{read_observations, read_stages, read_trace, write_rating_table};
use ratingcurve_model::{PosteriorTrace, RatingTable, ReitanRating};

use crate::cli::PredictArgs;
use crate::config;
use crate::convert;

/// Run the prediction pipeline.
pub fn run(args: PredictArgs) -> Result<()> {
    let _cmd = info_span!("predict").entered();

    // 1. Load config and apply CLI overrides
    let mut config = config::load(&args.config)?;
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    if let Some(output) = args.output {
        config.io.output = Some(output);
    }

    let input = config
        .io
        .observations
        .as_ref()
        .ok_or_else(|| anyhow::anyhow!("no observations path: set [io].observations in config"))?;
    let trace_path = config
        .io
        .trace
        .as_ref()
        .ok_or_else(|| anyhow::anyhow!("no trace path: set [io].trace in config"))?;
    let output = config.io.output.as_ref().ok_or_else(|| {
        anyhow::anyhow!("no output path: set [io].output in config or use --output")
    })?;

    // 2. Rebuild the model; its discharge transform comes from the gaugings
    let reader_cfg = convert::build_reader_config(&config.io);
    let rating_cfg = convert::build_rating_config(&config.model)?;
    let writer_cfg = convert::build_writer_config(&config.io)?;

    let observations = read_observations(input, &reader_cfg)
        .with_context(|| format!("failed to read observations: {}", input.display()))?;
    let model = ReitanRating::new(&observations, &rating_cfg)
        .context("failed to build rating model")?;
    let trace = read_trace(trace_path)
        .with_context(|| format!("failed to read trace: {}", trace_path.display()))?;

    // 3. Stages from file or grid
    let stages = match &args.stages {
        Some(path) => read_stages(path, &config.io.stage_column)
            .with_context(|| format!("failed to read stages: {}", path.display()))?,
        None => convert::build_stage_grid(&config.predict, observations.stage_range())?,
    };

    // 4. Predict and write
    let table = predict_table(&model, &trace, &stages, config.seed)?;
    write_rating_table(output, &table, &writer_cfg)
        .with_context(|| format!("failed to write rating table: {}", output.display()))?;

    info!(
        output = %output.display(),
        n_stages = table.len(),
        "predict complete"
    );
    Ok(())
}

/// Predicts a rating table at `stages`, seeding the predictive noise from
/// `seed` when given.
pub fn predict_table(
    model: &ReitanRating,
    trace: &PosteriorTrace,
    stages: &[f64],
    seed: Option<u64>,
) -> Result<RatingTable> {
    let mut rng = match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_os_rng(),
    };
    model
        .predict(trace, stages, &mut rng)
        .context("prediction failed")
}
