//! Row-level access to columnar files for benchmark workload generators.
//!
//! [`open`] turns a Parquet file into a [`DataSource`]: a pull-based sequence
//! of owned, dynamically typed rows that can start at any row offset and
//! optionally wrap around when the file runs out.

pub mod arrow;
mod cursor;
pub mod input;
pub mod options;
pub mod reader;
pub mod source;
pub mod value;

pub use options::ReaderOptions;
pub use reader::{open, open_with_options, CircularReader, ParquetDataSource};
pub use source::{DataSource, SourceError};
pub use value::{Row, Value};
