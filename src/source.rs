//! Row source contract consumed by workload generators.
//!
//! A [`DataSource`] hands out rows as owned [`Row`]s in schema order, so the
//! caller never needs to know which storage format backs it.
//!
//! # Example
//! ```ignore
//! let mut source = dsfeed::open("vectors.parquet", 0, true)?;
//! let names = source.column_names().to_vec();
//! while let Some(row) = source.next_row()? {
//!     generator.feed(&names, row);
//! }
//! source.close();
//! ```

use std::path::PathBuf;

use thiserror::Error;

use crate::input::InputError;
use crate::value::Row;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("error opening {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: InputError,
    },

    #[error("failed to read after reset: source yielded no rows")]
    ResetExhausted,

    #[error("read error: {0}")]
    Input(#[from] InputError),

    #[error("data source is closed")]
    Closed,
}

/// A pull-based source of rows.
///
/// Not meant to be shared between threads; give each worker its own source.
pub trait DataSource: Send {
    /// Column names in schema order. Stable for the lifetime of the source.
    fn column_names(&self) -> &[String];

    /// Produce the next row, or `None` once a non-circular source is
    /// exhausted.
    fn next_row(&mut self) -> Result<Option<Row>, SourceError>;

    /// Release the batch, stream and file handle. Calling it again is a
    /// no-op; reads after close fail with [`SourceError::Closed`].
    fn close(&mut self);
}
