use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("line {line}: {source}")]
    Json {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[cfg(feature = "parquet")]
    #[error("arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[cfg(feature = "parquet")]
    #[error("parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("missing column: {0}")]
    MissingColumn(String),

    #[error("row {row}: {reason}")]
    InvalidRow { row: usize, reason: String },

    #[error("{documents} documents but {results} prior results")]
    Mismatch { documents: usize, results: usize },

    #[error("prior result {index}: bucket {bucket} out of range (0..{bucket_count})")]
    InvalidBucket {
        index: usize,
        bucket: usize,
        bucket_count: usize,
    },
}
