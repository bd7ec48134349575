//! Format-agnostic row values handed to workload generators.

use std::fmt;

/// A single materialized cell.
///
/// Values own their data; nothing here borrows from the batch it was read
/// from.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Null slot, or a column whose encoding the reader does not extract.
    Null,
    Int64(i64),
    Float64(f64),
    Utf8(String),
    Binary(Vec<u8>),
    /// One row of a list-of-float32 column, e.g. an embedding vector.
    Float32List(Vec<f32>),
}

/// One value per column, in schema order.
pub type Row = Vec<Value>;

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Utf8(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Binary(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_f32_list(&self) -> Option<&[f32]> {
        match self {
            Value::Float32List(v) => Some(v),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Int64(v) => write!(f, "{v}"),
            Value::Float64(v) => write!(f, "{v}"),
            Value::Utf8(v) => write!(f, "{v}"),
            Value::Binary(v) => {
                write!(f, "0x")?;
                for byte in v {
                    write!(f, "{byte:02x}")?;
                }
                Ok(())
            }
            Value::Float32List(v) => {
                write!(f, "[")?;
                for (i, x) in v.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{x}")?;
                }
                write!(f, "]")
            }
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int64(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float64(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Utf8(v.to_string())
    }
}

impl From<Vec<f32>> for Value {
    fn from(v: Vec<f32>) -> Self {
        Value::Float32List(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accessors_match_variant() {
        assert_eq!(Value::Int64(7).as_i64(), Some(7));
        assert_eq!(Value::Int64(7).as_f64(), None);
        assert_eq!(Value::from("abc").as_str(), Some("abc"));
        assert_eq!(Value::Binary(vec![1, 2]).as_bytes(), Some(&[1u8, 2][..]));
        assert_eq!(
            Value::from(vec![1.0f32, 2.5]).as_f32_list(),
            Some(&[1.0f32, 2.5][..])
        );
        assert!(Value::Null.is_null());
        assert!(!Value::Float64(0.0).is_null());
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::Null.to_string(), "null");
        assert_eq!(Value::Int64(-3).to_string(), "-3");
        assert_eq!(Value::Binary(vec![0xde, 0xad]).to_string(), "0xdead");
        assert_eq!(Value::Float32List(vec![1.0, 2.5]).to_string(), "[1, 2.5]");
        assert_eq!(Value::Float32List(vec![]).to_string(), "[]");
    }
}
