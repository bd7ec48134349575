//! Batch input abstraction for the row reader.
//!
//! A [`BatchSource`] knows the schema of a columnar dataset and can build a
//! fresh, forward-only [`BatchStream`] over it from the first row. The reader
//! calls [`BatchSource::open_stream`] once at open time and again on every
//! circular reset.

pub mod memory;
pub mod parquet;

use std::sync::Arc;

use arrow::array::RecordBatch;
use arrow::datatypes::Schema;
use thiserror::Error;

/// Errors that can occur while producing batches.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parquet error: {0}")]
    Parquet(#[from] ::parquet::errors::ParquetError),

    #[error("batch has {got} columns, schema declares {expected}")]
    SchemaMismatch { expected: usize, got: usize },
}

/// A forward-only sequence of record batches.
///
/// Each call may perform I/O. Implementations never read ahead more than the
/// batch they return.
pub trait BatchStream: Send {
    /// Pull the next batch. Returns `None` once the stream is exhausted, and
    /// keeps returning `None` on later calls.
    fn next_batch(&mut self) -> Result<Option<RecordBatch>, InputError>;
}

/// Factory for batch streams over a single dataset with a fixed schema.
pub trait BatchSource: Send {
    /// Schema shared by every batch this source produces.
    fn schema(&self) -> Arc<Schema>;

    /// Build a new stream positioned at the first row of the dataset.
    fn open_stream(&mut self) -> Result<Box<dyn BatchStream>, InputError>;
}

/// Check that a batch carries exactly one array per schema column.
pub(crate) fn check_batch_width(schema: &Schema, batch: &RecordBatch) -> Result<(), InputError> {
    let expected = schema.fields().len();
    let got = batch.num_columns();
    if expected != got {
        return Err(InputError::SchemaMismatch { expected, got });
    }
    Ok(())
}
