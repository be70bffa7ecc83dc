//! Fit command: sample the posterior and write the trace and rating table.

use anyhow::{Context, Result};
use tracing::{info, info_span};

use ratingcurve_io::{read_observations, write_rating_table, write_trace};
use ratingcurve_model::ReitanRating;
use ratingcurve_sampler::MetropolisEngine;

use crate::cli::FitArgs;
use crate::config;
use crate::convert;
use crate::predict_cmd;

/// Run the fitting pipeline.
pub fn run(args: FitArgs) -> Result<()> {
    let _cmd = info_span!("fit").entered();

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
    let output = config.io.output.as_ref().ok_or_else(|| {
        anyhow::anyhow!("no output path: set [io].output in config or use --output")
    })?;

    // 2. Build configs from TOML
    let reader_cfg = convert::build_reader_config(&config.io);
    let rating_cfg = convert::build_rating_config(&config.model)?;
    let sampler_cfg = convert::build_sampler_config(&config.sampler, config.seed)?;
    let writer_cfg = convert::build_writer_config(&config.io)?;

    // 3. Read gaugings and build the model
    let observations = read_observations(input, &reader_cfg)
        .with_context(|| format!("failed to read observations: {}", input.display()))?;
    let model = ReitanRating::new(&observations, &rating_cfg)
        .context("failed to build rating model")?;

    // 4. Sample
    let engine = MetropolisEngine::new(sampler_cfg);
    let trace = model.sample(&engine).context("posterior sampling failed")?;

    if let Some(trace_path) = &config.io.trace {
        write_trace(trace_path, &trace)
            .with_context(|| format!("failed to write trace: {}", trace_path.display()))?;
    }

    // 5. Predict over the stage grid and write the rating table
    let stages = convert::build_stage_grid(&config.predict, observations.stage_range())?;
    let table = predict_cmd::predict_table(&model, &trace, &stages, config.seed)?;
    write_rating_table(output, &table, &writer_cfg)
        .with_context(|| format!("failed to write rating table: {}", output.display()))?;

    info!(
        output = %output.display(),
        n_stages = table.len(),
        "fit complete"
    );
    Ok(())
}
