mod materialize;

pub use materialize::{ColumnEncoding, RowMaterializer};
