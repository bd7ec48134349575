//! Row materialization from Arrow RecordBatches.
//!
//! Each column's physical encoding is resolved once from the schema into a
//! [`ColumnEncoding`]. Reading a row then dispatches on that tag and copies
//! the cell out of the batch into an owned [`Value`].

use std::fmt;

use arrow::array::{
    Array, BinaryArray, Float32Array, Float64Array, Int64Array, ListArray, StringArray,
};
use arrow::datatypes::{DataType, Schema};
use arrow::record_batch::RecordBatch;
use tracing::warn;

use crate::value::{Row, Value};

/// Physical column encodings the reader knows how to extract.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnEncoding {
    Int64,
    Float64,
    Utf8,
    Binary,
    /// Variable-length list whose items are 32-bit floats.
    Float32List,
    /// Anything else. Cells of such columns materialize as [`Value::Null`].
    Unsupported(DataType),
}

impl ColumnEncoding {
    pub fn of(data_type: &DataType) -> Self {
        match data_type {
            DataType::Int64 => ColumnEncoding::Int64,
            DataType::Float64 => ColumnEncoding::Float64,
            DataType::Utf8 => ColumnEncoding::Utf8,
            DataType::Binary => ColumnEncoding::Binary,
            DataType::List(item) if item.data_type() == &DataType::Float32 => {
                ColumnEncoding::Float32List
            }
            other => ColumnEncoding::Unsupported(other.clone()),
        }
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self, ColumnEncoding::Unsupported(_))
    }
}

impl fmt::Display for ColumnEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnEncoding::Int64 => write!(f, "int64"),
            ColumnEncoding::Float64 => write!(f, "float64"),
            ColumnEncoding::Utf8 => write!(f, "utf8"),
            ColumnEncoding::Binary => write!(f, "binary"),
            ColumnEncoding::Float32List => write!(f, "list<float32>"),
            ColumnEncoding::Unsupported(dt) => write!(f, "unsupported({dt})"),
        }
    }
}

/// Turns rows of a batch into owned [`Row`]s, in schema order.
#[derive(Debug, Clone)]
pub struct RowMaterializer {
    names: Vec<String>,
    encodings: Vec<ColumnEncoding>,
}

impl RowMaterializer {
    pub fn new(schema: &Schema) -> Self {
        let mut names = Vec::with_capacity(schema.fields().len());
        let mut encodings = Vec::with_capacity(schema.fields().len());

        for field in schema.fields() {
            let encoding = ColumnEncoding::of(field.data_type());
            if !encoding.is_supported() {
                warn!(
                    column = field.name().as_str(),
                    data_type = %field.data_type(),
                    "unsupported column encoding, values will be null"
                );
            }
            names.push(field.name().clone());
            encodings.push(encoding);
        }

        Self { names, encodings }
    }

    pub fn column_names(&self) -> &[String] {
        &self.names
    }

    pub fn encodings(&self) -> &[ColumnEncoding] {
        &self.encodings
    }

    /// Materialize row `row` of `batch`.
    ///
    /// The batch must follow the schema this materializer was built from.
    pub fn read_row(&self, batch: &RecordBatch, row: usize) -> Row {
        self.encodings
            .iter()
            .zip(batch.columns())
            .map(|(encoding, column)| read_value(encoding, column.as_ref(), row))
            .collect()
    }
}

/// Extract one cell. A column whose array does not match its declared
/// encoding yields null, same as an unsupported encoding.
///
/// Nulls are tracked per cell only: a null slot becomes [`Value::Null`], but
/// null items inside a float list keep their position and read as `0.0`.
fn read_value(encoding: &ColumnEncoding, array: &dyn Array, row: usize) -> Value {
    if array.is_null(row) {
        return Value::Null;
    }

    let value = match encoding {
        ColumnEncoding::Int64 => read_scalar(array, |arr: &Int64Array| Value::Int64(arr.value(row))),
        ColumnEncoding::Float64 => {
            read_scalar(array, |arr: &Float64Array| Value::Float64(arr.value(row)))
        }
        ColumnEncoding::Utf8 => {
            read_scalar(array, |arr: &StringArray| Value::Utf8(arr.value(row).to_string()))
        }
        ColumnEncoding::Binary => {
            read_scalar(array, |arr: &BinaryArray| Value::Binary(arr.value(row).to_vec()))
        }
        ColumnEncoding::Float32List => {
            read_scalar(array, |list: &ListArray| read_f32_list(list, row)).flatten()
        }
        ColumnEncoding::Unsupported(_) => None,
    };

    value.unwrap_or(Value::Null)
}

fn read_scalar<A, F, T>(array: &dyn Array, extract: F) -> Option<T>
where
    A: Array + 'static,
    F: FnOnce(&A) -> T,
{
    array.as_any().downcast_ref::<A>().map(extract)
}

/// Copy the items of list slot `row`. `ListArray::value` slices the child
/// array between the slot's offsets without copying, so the items are copied
/// out here before the batch goes away.
fn read_f32_list(list: &ListArray, row: usize) -> Option<Value> {
    let items = list.value(row);
    let floats = items.as_any().downcast_ref::<Float32Array>()?;
    Some(Value::Float32List(floats.values().to_vec()))
}
