//! # ratingcurve-io
//!
//! Read gaugings and stage grids from Parquet, write predicted rating
//! tables to Parquet, and persist posterior traces as JSON. Bridges
//! external file formats into the `ratingcurve-model` types.

mod error;
mod parquet_read;
mod parquet_write;
mod reader;
mod trace_json;
mod validate;
mod writer;

pub use error::IoError;
pub use reader::{ReaderConfig, read_observations, read_rating_table, read_stages};
pub use trace_json::{read_trace, write_trace};
pub use writer::{Compression, WriterConfig, write_rating_table};
