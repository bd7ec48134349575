//! In-memory input built from pre-decoded record batches.

use std::sync::Arc;

use arrow::array::RecordBatch;
use arrow::datatypes::Schema;

use super::{check_batch_width, BatchSource, BatchStream, InputError};

/// A batch source backed by record batches already held in memory.
///
/// Batches are shared, not copied, between streams.
#[derive(Debug, Clone)]
pub struct MemoryBatches {
    schema: Arc<Schema>,
    batches: Arc<[RecordBatch]>,
}

impl MemoryBatches {
    /// Create a source from batches that all follow `schema`.
    pub fn try_new(schema: Arc<Schema>, batches: Vec<RecordBatch>) -> Result<Self, InputError> {
        for batch in &batches {
            check_batch_width(&schema, batch)?;
        }
        Ok(Self {
            schema,
            batches: batches.into(),
        })
    }

    pub fn num_rows(&self) -> usize {
        self.batches.iter().map(|b| b.num_rows()).sum()
    }
}

impl BatchSource for MemoryBatches {
    fn schema(&self) -> Arc<Schema> {
        self.schema.clone()
    }

    fn open_stream(&mut self) -> Result<Box<dyn BatchStream>, InputError> {
        Ok(Box::new(MemoryBatchStream {
            batches: self.batches.clone(),
            next: 0,
        }))
    }
}

struct MemoryBatchStream {
    batches: Arc<[RecordBatch]>,
    next: usize,
}

impl BatchStream for MemoryBatchStream {
    fn next_batch(&mut self) -> Result<Option<RecordBatch>, InputError> {
        let batch = self.batches.get(self.next).cloned();
        if batch.is_some() {
            self.next += 1;
        }
        Ok(batch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::Int64Array;
    use arrow::datatypes::{DataType, Field};

    fn schema() -> Arc<Schema> {
        Arc::new(Schema::new(vec![Field::new("id", DataType::Int64, false)]))
    }

    fn batch(values: Vec<i64>) -> RecordBatch {
        RecordBatch::try_new(schema(), vec![Arc::new(Int64Array::from(values))]).unwrap()
    }

    #[test]
    fn test_streams_are_independent() {
        let mut source = MemoryBatches::try_new(schema(), vec![batch(vec![1, 2]), batch(vec![3])])
            .unwrap();
        assert_eq!(source.num_rows(), 3);

        let mut a = source.open_stream().unwrap();
        assert_eq!(a.next_batch().unwrap().unwrap().num_rows(), 2);

        let mut b = source.open_stream().unwrap();
        assert_eq!(b.next_batch().unwrap().unwrap().num_rows(), 2);

        assert_eq!(a.next_batch().unwrap().unwrap().num_rows(), 1);
        assert!(a.next_batch().unwrap().is_none());
        assert!(a.next_batch().unwrap().is_none());
    }

    #[test]
    fn test_rejects_batch_wider_than_schema() {
        let wide = Arc::new(Schema::new(vec![
            Field::new("a", DataType::Int64, false),
            Field::new("b", DataType::Int64, false),
        ]));
        let wide_batch = RecordBatch::try_new(
            wide,
            vec![
                Arc::new(Int64Array::from(vec![1])),
                Arc::new(Int64Array::from(vec![2])),
            ],
        )
        .unwrap();

        let err = MemoryBatches::try_new(schema(), vec![wide_batch]).unwrap_err();
        assert!(matches!(
            err,
            InputError::SchemaMismatch {
                expected: 1,
                got: 2
            }
        ));
    }
}
