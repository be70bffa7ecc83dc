//! Low-level Parquet reading and column extraction.

use std::path::Path;

use arrow::array::{Array, AsArray, RecordBatch};
use arrow::datatypes::{DataType, Float64Type, SchemaRef};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

use crate::error::IoError;

/// A `Float64` column gathered across record batches.
#[derive(Debug)]
pub(crate) struct FloatColumn {
    /// Values in file order; nulls read as NaN.
    pub values: Vec<f64>,
    /// Number of null entries.
    pub nulls: usize,
}

/// Reads the schema and all record batches from a Parquet file.
///
/// # Errors
///
/// Returns [`IoError::FileNotFound`] if the file does not exist,
/// [`IoError::File`] if it cannot be opened, or [`IoError::Parquet`] if it
/// cannot be decoded.
pub(crate) fn read_batches(path: &Path) -> Result<(SchemaRef, Vec<RecordBatch>), IoError> {
    if !path.exists() {
        return Err(IoError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let file = std::fs::File::open(path).map_err(|e| IoError::File {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
    let schema = builder.schema().clone();
    let reader = builder.build()?;

    let batches: Vec<RecordBatch> = reader.collect::<Result<Vec<_>, _>>()?;

    Ok((schema, batches))
}

/// Returns `true` if `schema` has a column called `name`.
pub(crate) fn has_column(schema: &SchemaRef, name: &str) -> bool {
    schema.index_of(name).is_ok()
}

/// Extracts the `Float64` column `name` from every batch.
///
/// # Errors
///
/// Returns [`IoError::MissingColumn`] if the schema has no such column, or
/// [`IoError::ColumnType`] if it is not `Float64`.
pub(crate) fn float_column(
    schema: &SchemaRef,
    batches: &[RecordBatch],
    name: &str,
    path: &Path,
) -> Result<FloatColumn, IoError> {
    let index = schema.index_of(name).map_err(|_| IoError::MissingColumn {
        name: name.to_string(),
        path: path.to_path_buf(),
    })?;

    let data_type = schema.field(index).data_type();
    if data_type != &DataType::Float64 {
        return Err(IoError::ColumnType {
            name: name.to_string(),
            expected: "Float64",
            actual: data_type.to_string(),
        });
    }

    let mut values = Vec::new();
    let mut nulls = 0;
    for batch in batches {
        let column = batch.column(index).as_primitive::<Float64Type>();
        nulls += column.null_count();
        values.extend(
            column
                .iter()
                .map(|v: Option<f64>| v.unwrap_or(f64::NAN)),
        );
    }

    Ok(FloatColumn { values, nulls })
}
