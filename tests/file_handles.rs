//! Descriptor accounting lives in its own test binary so no other test opens
//! files concurrently.
#![cfg(target_os = "linux")]

use std::fs::{self, File};
use std::sync::Arc;

use arrow::array::{Int64Array, RecordBatch};
use arrow::datatypes::{DataType, Field, Schema};
use parquet::arrow::ArrowWriter;
use parquet::file::properties::WriterProperties;
use tempfile::tempdir;

use dsfeed::{open, open_with_options, DataSource, ReaderOptions};

fn open_fds() -> usize {
    fs::read_dir("/proc/self/fd").unwrap().count()
}

#[test]
fn test_close_and_drop_release_file_handles() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("ids.parquet");

    let schema = Arc::new(Schema::new(vec![Field::new("id", DataType::Int64, false)]));
    let batch =
        RecordBatch::try_new(schema.clone(), vec![Arc::new(Int64Array::from_iter_values(0..10))])
            .unwrap();
    let props = WriterProperties::builder().set_max_row_group_size(4).build();
    let mut writer = ArrowWriter::try_new(File::create(&path).unwrap(), schema, Some(props)).unwrap();
    writer.write(&batch).unwrap();
    writer.close().unwrap();

    let baseline = open_fds();

    // Explicit close after several wraps.
    let options = ReaderOptions::default()
        .with_start_offset(7)
        .with_circular(true)
        .with_batch_size(3);
    let mut source = open_with_options(&path, &options).unwrap();
    for _ in 0..35 {
        source.next_row().unwrap().unwrap();
    }
    assert!(source.wraps() >= 3);
    assert!(open_fds() > baseline);
    source.close();
    assert_eq!(open_fds(), baseline);

    // Drop without close.
    {
        let mut source = open(&path, 0, true).unwrap();
        source.next_row().unwrap();
    }
    assert_eq!(open_fds(), baseline);

    // Boxed trait object, closed through the trait.
    let mut boxed: Box<dyn DataSource> = Box::new(open(&path, 3, false).unwrap());
    while boxed.next_row().unwrap().is_some() {}
    boxed.close();
    assert_eq!(open_fds(), baseline);
    drop(boxed);
    assert_eq!(open_fds(), baseline);
}
