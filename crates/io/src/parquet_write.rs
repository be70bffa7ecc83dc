//! Low-level Parquet column building.

use std::path::Path;
use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array, RecordBatch};
use arrow::datatypes::{DataType, Field, Schema};
use parquet::arrow::ArrowWriter;
use parquet::file::properties::WriterProperties;
use ratingcurve_model::RatingTable;

use crate::error::IoError;

/// Stage column name.
pub(crate) const STAGE: &str = "stage";
/// Discharge column name.
pub(crate) const DISCHARGE: &str = "discharge";
/// Multiplicative uncertainty column name.
pub(crate) const SIGMA: &str = "sigma";

/// Builds the Arrow schema for rating-table output: `stage`, `discharge`,
/// `sigma`, all non-null `Float64`.
pub(crate) fn build_schema() -> Schema {
    Schema::new(vec![
        Field::new(STAGE, DataType::Float64, false),
        Field::new(DISCHARGE, DataType::Float64, false),
        Field::new(SIGMA, DataType::Float64, false),
    ])
}

/// Converts a [`RatingTable`] into an Arrow [`RecordBatch`].
pub(crate) fn table_to_record_batch(
    table: &RatingTable,
    schema: &Schema,
) -> Result<RecordBatch, IoError> {
    let columns: Vec<ArrayRef> = vec![
        Arc::new(Float64Array::from(table.stage().to_vec())),
        Arc::new(Float64Array::from(table.discharge().to_vec())),
        Arc::new(Float64Array::from(table.sigma().to_vec())),
    ];

    Ok(RecordBatch::try_new(Arc::new(schema.clone()), columns)?)
}

/// Writes a sequence of [`RecordBatch`]es to a Parquet file at `path`.
///
/// # Errors
///
/// Returns [`IoError::File`] if the file cannot be created, or
/// [`IoError::Parquet`] if batch writing or file finalisation fails.
pub(crate) fn write_batches(
    path: &Path,
    batches: &[RecordBatch],
    schema: &Schema,
    props: WriterProperties,
) -> Result<(), IoError> {
    let file = std::fs::File::create(path).map_err(|e| IoError::File {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    let mut writer = ArrowWriter::try_new(file, Arc::new(schema.clone()), Some(props))?;

    for batch in batches {
        writer.write(batch)?;
    }

    writer.close()?;
    Ok(())
}
