//! Position tracking within the batch currently being read.

use arrow::record_batch::RecordBatch;

/// The batch being read, if any, and the index of its next unread row.
///
/// A batch is dropped the moment its last row is consumed, so the cursor
/// never rests on an exhausted batch.
#[derive(Debug, Default)]
pub(crate) enum RowCursor {
    #[default]
    Empty,
    Holding { batch: RecordBatch, offset: usize },
}

impl RowCursor {
    pub(crate) fn is_empty(&self) -> bool {
        matches!(self, RowCursor::Empty)
    }

    /// Take ownership of a freshly fetched batch. A zero-row batch is dropped
    /// immediately and the cursor stays empty. Returns whether a row is now
    /// available.
    pub(crate) fn hold(&mut self, batch: RecordBatch) -> bool {
        debug_assert!(self.is_empty(), "fetched a batch while still holding one");
        *self = if batch.num_rows() == 0 {
            RowCursor::Empty
        } else {
            RowCursor::Holding { batch, offset: 0 }
        };
        !self.is_empty()
    }

    /// The held batch and the index of the next unread row in it.
    pub(crate) fn current(&self) -> Option<(&RecordBatch, usize)> {
        match self {
            RowCursor::Empty => None,
            RowCursor::Holding { batch, offset } => Some((batch, *offset)),
        }
    }

    /// Unread rows left in the held batch.
    pub(crate) fn remaining(&self) -> usize {
        match self {
            RowCursor::Empty => 0,
            RowCursor::Holding { batch, offset } => batch.num_rows() - *offset,
        }
    }

    /// Move past up to `n` rows of the held batch, releasing it if that
    /// consumes its last row. Returns the number of rows actually skipped.
    pub(crate) fn skip(&mut self, n: usize) -> usize {
        let step = n.min(self.remaining());
        if let RowCursor::Holding { batch, offset } = self {
            *offset += step;
            if *offset >= batch.num_rows() {
                self.release();
            }
        }
        step
    }

    /// Move past the current row.
    pub(crate) fn advance(&mut self) {
        self.skip(1);
    }

    /// Drop the held batch, if any.
    pub(crate) fn release(&mut self) {
        *self = RowCursor::Empty;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::Int64Array;
    use arrow::datatypes::{DataType, Field, Schema};
    use std::sync::Arc;

    fn batch(rows: i64) -> RecordBatch {
        let schema = Arc::new(Schema::new(vec![Field::new("id", DataType::Int64, false)]));
        RecordBatch::try_new(schema, vec![Arc::new(Int64Array::from_iter_values(0..rows))])
            .unwrap()
    }

    #[test]
    fn test_advance_through_batch() {
        let mut cursor = RowCursor::default();
        assert!(cursor.is_empty());
        assert!(cursor.hold(batch(3)));

        assert_eq!(cursor.current().map(|(_, k)| k), Some(0));
        cursor.advance();
        assert_eq!(cursor.current().map(|(_, k)| k), Some(1));
        assert_eq!(cursor.remaining(), 2);
        cursor.advance();
        cursor.advance();

        assert!(cursor.is_empty());
        assert_eq!(cursor.remaining(), 0);
        assert!(cursor.current().is_none());
    }

    #[test]
    fn test_skip_is_bounded_by_batch() {
        let mut cursor = RowCursor::default();
        cursor.hold(batch(5));

        assert_eq!(cursor.skip(2), 2);
        assert_eq!(cursor.remaining(), 3);

        assert_eq!(cursor.skip(10), 3);
        assert!(cursor.is_empty());

        assert_eq!(cursor.skip(4), 0);
    }

    #[test]
    fn test_skip_zero_keeps_position() {
        let mut cursor = RowCursor::default();
        cursor.hold(batch(2));
        assert_eq!(cursor.skip(0), 0);
        assert_eq!(cursor.current().map(|(_, k)| k), Some(0));
    }

    #[test]
    fn test_zero_row_batch_is_not_held() {
        let mut cursor = RowCursor::default();
        assert!(!cursor.hold(batch(0)));
        assert!(cursor.is_empty());
    }

    #[test]
    fn test_release() {
        let mut cursor = RowCursor::default();
        cursor.hold(batch(4));
        cursor.release();
        assert!(cursor.is_empty());
    }
}
