//! Parquet seed import.
//!
//! Required columns: `id`, `title`, `body` (Utf8 or LargeUtf8).
//! Optional: `label` (Int32/Int64), `seed` (Boolean).

use std::path::Path;

use arrow::array::{Array, BooleanArray, Int32Array, Int64Array, LargeStringArray, StringArray};
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use tracing::info;
use triage_core::{Category, Document};

use crate::StoreError;

pub fn read_seed_parquet(path: &Path) -> Result<Vec<Document>, StoreError> {
    let file = std::fs::File::open(path)?;
    let reader = ParquetRecordBatchReaderBuilder::try_new(file)?.build()?;

    let mut documents = Vec::new();
    for batch in reader {
        let batch = batch?;
        documents_from_batch(&batch, documents.len(), &mut documents)?;
    }
    info!(
        path = %path.display(),
        documents = documents.len(),
        seeds = documents.iter().filter(|d| d.seed).count(),
        "read parquet seed file"
    );
    Ok(documents)
}

/// Append one batch's rows. `first_row` numbers rows across batches for errors.
fn documents_from_batch(
    batch: &RecordBatch,
    first_row: usize,
    out: &mut Vec<Document>,
) -> Result<(), StoreError> {
    let id = required(batch, "id")?;
    let title = required(batch, "title")?;
    let body = required(batch, "body")?;
    let label = optional(batch, "label");
    let seed = optional(batch, "seed");

    for i in 0..batch.num_rows() {
        let row = first_row + i;
        let Some(doc_id) = col_str(id, i) else {
            return Err(StoreError::InvalidRow {
                row,
                reason: "null or non-string id".into(),
            });
        };
        let label = match label {
            Some(col) => col_label(col, i).map_err(|reason| StoreError::InvalidRow { row, reason })?,
            None => None,
        };
        let seed = seed.and_then(|col| col_bool(col, i)).unwrap_or(false);

        out.push(Document::new(
            doc_id,
            col_str(title, i).unwrap_or_default(),
            col_str(body, i).unwrap_or_default(),
            label,
            seed,
        ));
    }
    Ok(())
}

fn required<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a dyn Array, StoreError> {
    optional(batch, name).ok_or_else(|| StoreError::MissingColumn(name.into()))
}

fn optional<'a>(batch: &'a RecordBatch, name: &str) -> Option<&'a dyn Array> {
    let idx = batch.schema().index_of(name).ok()?;
    Some(batch.column(idx).as_ref())
}

/// Get a string value from a column that might be Utf8 or LargeUtf8.
fn col_str(col: &dyn Array, i: usize) -> Option<&str> {
    if col.is_null(i) {
        return None;
    }
    if let Some(arr) = col.as_any().downcast_ref::<StringArray>() {
        return Some(arr.value(i));
    }
    if let Some(arr) = col.as_any().downcast_ref::<LargeStringArray>() {
        return Some(arr.value(i));
    }
    None
}

fn col_label(col: &dyn Array, i: usize) -> Result<Option<Category>, String> {
    if col.is_null(i) {
        return Ok(None);
    }
    let value = if let Some(arr) = col.as_any().downcast_ref::<Int32Array>() {
        i64::from(arr.value(i))
    } else if let Some(arr) = col.as_any().downcast_ref::<Int64Array>() {
        arr.value(i)
    } else {
        return Err(format!("label column has type {}", col.data_type()));
    };
    Category::try_from(value)
        .map(Some)
        .map_err(|_| format!("negative label {value}"))
}

fn col_bool(col: &dyn Array, i: usize) -> Option<bool> {
    if col.is_null(i) {
        return None;
    }
    col.as_any()
        .downcast_ref::<BooleanArray>()
        .map(|a| a.value(i))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use arrow::datatypes::{DataType, Field, Schema};
    use parquet::arrow::ArrowWriter;
    use tempfile::TempDir;

    fn write(path: &Path, batch: &RecordBatch) {
        let file = std::fs::File::create(path).unwrap();
        let mut writer = ArrowWriter::try_new(file, batch.schema(), None).unwrap();
        writer.write(batch).unwrap();
        writer.close().unwrap();
    }

    #[test]
    fn reads_all_columns() {
        let schema = Arc::new(Schema::new(vec![
            Field::new("id", DataType::Utf8, false),
            Field::new("title", DataType::Utf8, false),
            Field::new("body", DataType::LargeUtf8, true),
            Field::new("label", DataType::Int64, true),
            Field::new("seed", DataType::Boolean, true),
        ]));
        let batch = RecordBatch::try_new(
            schema,
            vec![
                Arc::new(StringArray::from(vec!["r1", "r2"])),
                Arc::new(StringArray::from(vec!["App", "Hotel"])),
                Arc::new(LargeStringArray::from(vec![Some("crashes"), None])),
                Arc::new(Int64Array::from(vec![Some(0), None])),
                Arc::new(BooleanArray::from(vec![Some(true), None])),
            ],
        )
        .unwrap();

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("seed.parquet");
        write(&path, &batch);

        let docs = read_seed_parquet(&path).unwrap();
        assert_eq!(
            docs,
            vec![
                Document::new("r1", "App", "crashes", Some(0), true),
                Document::new("r2", "Hotel", "", None, false),
            ]
        );
    }

    #[test]
    fn missing_body_column() {
        let schema = Arc::new(Schema::new(vec![
            Field::new("id", DataType::Utf8, false),
            Field::new("title", DataType::Utf8, false),
        ]));
        let batch = RecordBatch::try_new(
            schema,
            vec![
                Arc::new(StringArray::from(vec!["r1"])),
                Arc::new(StringArray::from(vec!["t"])),
            ],
        )
        .unwrap();

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("seed.parquet");
        write(&path, &batch);

        let err = read_seed_parquet(&path).unwrap_err();
        assert!(matches!(err, StoreError::MissingColumn(ref c) if c == "body"));
    }

    #[test]
    fn negative_label_is_invalid_row() {
        let schema = Arc::new(Schema::new(vec![
            Field::new("id", DataType::Utf8, false),
            Field::new("title", DataType::Utf8, false),
            Field::new("body", DataType::Utf8, false),
            Field::new("label", DataType::Int32, true),
        ]));
        let batch = RecordBatch::try_new(
            schema,
            vec![
                Arc::new(StringArray::from(vec!["r1", "r2"])),
                Arc::new(StringArray::from(vec!["a", "b"])),
                Arc::new(StringArray::from(vec!["", ""])),
                Arc::new(Int32Array::from(vec![1, -3])),
            ],
        )
        .unwrap();

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("seed.parquet");
        write(&path, &batch);

        let err = read_seed_parquet(&path).unwrap_err();
        assert!(matches!(err, StoreError::InvalidRow { row: 1, .. }));
    }
}
