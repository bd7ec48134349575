//! Parquet input implementation.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrow::array::RecordBatch;
use arrow::datatypes::Schema;
use parquet::arrow::arrow_reader::{
    ArrowReaderMetadata, ArrowReaderOptions, ParquetRecordBatchReader,
    ParquetRecordBatchReaderBuilder,
};
use parquet::arrow::ProjectionMask;
use tracing::{debug, trace};

use super::{check_batch_width, BatchSource, BatchStream, InputError};

/// A single Parquet file opened for repeated full scans.
///
/// The footer is decoded once at open time. Every stream gets its own
/// duplicate of the file handle and reuses the cached metadata, so a circular
/// reset does not parse the footer again.
pub struct ParquetFile {
    path: PathBuf,
    file: File,
    metadata: ArrowReaderMetadata,
    batch_size: usize,
}

impl ParquetFile {
    /// Open a Parquet file and read its metadata.
    pub fn open(path: &Path, batch_size: usize) -> Result<Self, InputError> {
        let file = File::open(path)?;
        let metadata = ArrowReaderMetadata::load(&file, ArrowReaderOptions::new())?;

        debug!(
            path = %path.display(),
            row_groups = metadata.metadata().num_row_groups(),
            rows = metadata.metadata().file_metadata().num_rows(),
            columns = metadata.schema().fields().len(),
            "opened parquet file"
        );

        Ok(Self {
            path: path.to_path_buf(),
            file,
            metadata,
            batch_size: batch_size.max(1),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn num_row_groups(&self) -> usize {
        self.metadata.metadata().num_row_groups()
    }

    /// Total row count recorded in the file footer.
    pub fn num_rows(&self) -> u64 {
        self.metadata.metadata().file_metadata().num_rows().max(0) as u64
    }
}

impl BatchSource for ParquetFile {
    fn schema(&self) -> Arc<Schema> {
        self.metadata.schema().clone()
    }

    fn open_stream(&mut self) -> Result<Box<dyn BatchStream>, InputError> {
        let file = self.file.try_clone()?;
        let row_groups: Vec<usize> = (0..self.num_row_groups()).collect();

        let reader = ParquetRecordBatchReaderBuilder::new_with_metadata(file, self.metadata.clone())
            .with_projection(ProjectionMask::all())
            .with_row_groups(row_groups)
            .with_batch_size(self.batch_size)
            .build()?;

        Ok(Box::new(ParquetBatchStream {
            schema: self.schema(),
            reader,
            finished: false,
        }))
    }
}

/// Forward-only batch stream over every row group of a Parquet file.
pub struct ParquetBatchStream {
    schema: Arc<Schema>,
    reader: ParquetRecordBatchReader,
    finished: bool,
}

impl BatchStream for ParquetBatchStream {
    fn next_batch(&mut self) -> Result<Option<RecordBatch>, InputError> {
        if self.finished {
            return Ok(None);
        }
        match self.reader.next() {
            Some(Ok(batch)) => {
                check_batch_width(&self.schema, &batch)?;
                trace!(rows = batch.num_rows(), "fetched parquet batch");
                Ok(Some(batch))
            }
            Some(Err(e)) => Err(InputError::Arrow(e)),
            None => {
                self.finished = true;
                Ok(None)
            }
        }
    }
}
