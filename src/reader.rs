//! Circular, offset-resumable row reader.
//!
//! [`CircularReader`] pulls batches from a [`BatchSource`] one at a time and
//! hands out one row per call. When the stream runs dry it either reports the
//! end of data or, in circular mode, throws the stream away and opens a fresh
//! one from the first row.

use std::path::Path;

use tracing::debug;

use crate::arrow::{ColumnEncoding, RowMaterializer};
use crate::cursor::RowCursor;
use crate::input::parquet::ParquetFile;
use crate::input::{BatchSource, BatchStream};
use crate::options::ReaderOptions;
use crate::source::{DataSource, SourceError};
use crate::value::Row;

/// Row reader over a Parquet file.
pub type ParquetDataSource = CircularReader<ParquetFile>;

/// Open a Parquet file, skip `start_offset` rows and return a reader
/// positioned at the next one.
pub fn open(
    path: impl AsRef<Path>,
    start_offset: u64,
    circular: bool,
) -> Result<ParquetDataSource, SourceError> {
    let options = ReaderOptions::default()
        .with_start_offset(start_offset)
        .with_circular(circular);
    open_with_options(path, &options)
}

/// Like [`open`], with full control over reader options.
pub fn open_with_options(
    path: impl AsRef<Path>,
    options: &ReaderOptions,
) -> Result<ParquetDataSource, SourceError> {
    let path = path.as_ref();
    let open_error = |source| SourceError::Open {
        path: path.to_path_buf(),
        source,
    };

    let file = ParquetFile::open(path, options.batch_size).map_err(open_error)?;
    CircularReader::new(file, options).map_err(|e| match e {
        SourceError::Input(source) => open_error(source),
        other => other,
    })
}

/// Reads rows from any [`BatchSource`], optionally wrapping around.
///
/// At most one decoded batch is held at a time. Dropping the reader closes it.
pub struct CircularReader<S: BatchSource> {
    /// `None` once closed.
    source: Option<S>,
    stream: Option<Box<dyn BatchStream>>,
    cursor: RowCursor,
    materializer: RowMaterializer,
    circular: bool,
    /// Rows consumed from the current stream, skipped or read.
    position: u64,
    /// Rows in one full pass, known after the first wrap.
    pass_rows: Option<u64>,
    wraps: u64,
    rows_read: u64,
}

impl<S: BatchSource> CircularReader<S> {
    /// Open the first stream over `source` and skip to
    /// `options.start_offset`.
    pub fn new(mut source: S, options: &ReaderOptions) -> Result<Self, SourceError> {
        let materializer = RowMaterializer::new(&source.schema());
        let stream = source.open_stream()?;

        let mut reader = Self {
            source: Some(source),
            stream: Some(stream),
            cursor: RowCursor::default(),
            materializer,
            circular: options.circular,
            position: 0,
            pass_rows: None,
            wraps: 0,
            rows_read: 0,
        };
        reader.skip_until_offset(options.start_offset)?;

        debug!(
            columns = reader.materializer.column_names().len(),
            start_offset = options.start_offset,
            circular = options.circular,
            "data source ready"
        );
        Ok(reader)
    }

    pub fn column_names(&self) -> &[String] {
        self.materializer.column_names()
    }

    pub fn encodings(&self) -> &[ColumnEncoding] {
        self.materializer.encodings()
    }

    /// Number of times the stream has been reopened from the first row.
    pub fn wraps(&self) -> u64 {
        self.wraps
    }

    /// Rows returned by [`next_row`](Self::next_row) so far.
    pub fn rows_read(&self) -> u64 {
        self.rows_read
    }

    pub fn is_closed(&self) -> bool {
        self.source.is_none()
    }

    /// Move past `n` rows without materializing them.
    ///
    /// In non-circular mode, skipping beyond the last row is not an error; the
    /// next read simply reports the end of data. In circular mode the skip
    /// wraps around as many times as needed.
    pub fn skip_until_offset(&mut self, n: u64) -> Result<(), SourceError> {
        if self.is_closed() {
            return Err(SourceError::Closed);
        }

        let mut remaining = n;
        while remaining > 0 {
            let wraps = self.wraps;
            if !self.fill()? {
                return Ok(());
            }
            if self.wraps != wraps {
                // Whole passes land back where they started.
                if let Some(pass_rows) = self.pass_rows {
                    remaining %= pass_rows;
                    if remaining == 0 {
                        break;
                    }
                }
            }

            let step = usize::try_from(remaining).unwrap_or(usize::MAX);
            let skipped = self.cursor.skip(step) as u64;
            self.position += skipped;
            remaining -= skipped;
        }
        Ok(())
    }

    /// Materialize the next row.
    ///
    /// Returns `Ok(None)` when a non-circular reader is out of rows, and keeps
    /// doing so on later calls.
    pub fn next_row(&mut self) -> Result<Option<Row>, SourceError> {
        if !self.fill()? {
            return Ok(None);
        }

        let row = match self.cursor.current() {
            Some((batch, offset)) => self.materializer.read_row(batch, offset),
            None => return Ok(None),
        };
        self.cursor.advance();
        self.position += 1;
        self.rows_read += 1;
        Ok(Some(row))
    }

    /// Release the held batch, the stream and the underlying source.
    pub fn close(&mut self) {
        if self.is_closed() {
            return;
        }
        self.cursor.release();
        self.stream = None;
        self.source = None;
        debug!(
            rows_read = self.rows_read,
            wraps = self.wraps,
            "data source closed"
        );
    }

    /// Make sure the cursor holds a batch with an unread row.
    ///
    /// Returns `false` when a non-circular stream is exhausted.
    fn fill(&mut self) -> Result<bool, SourceError> {
        if !self.cursor.is_empty() {
            return Ok(true);
        }

        let stream = self.stream.as_mut().ok_or(SourceError::Closed)?;
        while let Some(batch) = stream.next_batch()? {
            if self.cursor.hold(batch) {
                return Ok(true);
            }
        }

        if !self.circular {
            return Ok(false);
        }

        self.reset()?;
        let stream = self.stream.as_mut().ok_or(SourceError::Closed)?;
        while let Some(batch) = stream.next_batch()? {
            if self.cursor.hold(batch) {
                return Ok(true);
            }
        }
        Err(SourceError::ResetExhausted)
    }

    /// Discard the exhausted stream and open a new one at the first row.
    ///
    /// If the new stream cannot be opened the exhausted one is kept, so the
    /// next read retries the reset and reports the same failure.
    fn reset(&mut self) -> Result<(), SourceError> {
        self.cursor.release();

        let source = self.source.as_mut().ok_or(SourceError::Closed)?;
        let stream = source.open_stream()?;
        self.stream = Some(stream);

        if self.position > 0 {
            self.pass_rows = Some(self.position);
        }
        self.position = 0;
        self.wraps += 1;

        debug!(wraps = self.wraps, pass_rows = ?self.pass_rows, "restarted batch stream");
        Ok(())
    }
}

impl<S: BatchSource> DataSource for CircularReader<S> {
    fn column_names(&self) -> &[String] {
        CircularReader::column_names(self)
    }

    fn next_row(&mut self) -> Result<Option<Row>, SourceError> {
        CircularReader::next_row(self)
    }

    fn close(&mut self) {
        CircularReader::close(self)
    }
}

impl<S: BatchSource> Drop for CircularReader<S> {
    fn drop(&mut self) {
        self.close();
    }
}
