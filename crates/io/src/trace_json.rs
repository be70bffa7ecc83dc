//! Posterior traces as JSON.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use ratingcurve_model::PosteriorTrace;
use tracing::info;

use crate::error::IoError;

/// Write a posterior trace to `path` as pretty-printed JSON.
///
/// # Errors
///
/// Returns [`IoError::File`] if the file cannot be created or flushed, or
/// [`IoError::Json`] if serialisation fails.
pub fn write_trace(path: &Path, trace: &PosteriorTrace) -> Result<(), IoError> {
    let file = File::create(path).map_err(|e| IoError::File {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, trace)?;
    writer.flush().map_err(|e| IoError::File {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    info!(
        path = %path.display(),
        chains = trace.chains(),
        draws = trace.n_draws(),
        "wrote posterior trace"
    );
    Ok(())
}

/// Read a posterior trace written by [`write_trace`].
///
/// # Errors
///
/// Returns [`IoError::FileNotFound`] if the file does not exist,
/// [`IoError::File`] if it cannot be opened, or [`IoError::Json`] if it is
/// not a valid trace.
pub fn read_trace(path: &Path) -> Result<PosteriorTrace, IoError> {
    if !path.exists() {
        return Err(IoError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    let file = File::open(path).map_err(|e| IoError::File {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    let trace: PosteriorTrace = serde_json::from_reader(BufReader::new(file))?;
    info!(
        path = %path.display(),
        chains = trace.chains(),
        draws = trace.n_draws(),
        "read posterior trace"
    );
    Ok(trace)
}
