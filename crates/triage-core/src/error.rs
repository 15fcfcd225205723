use thiserror::Error;

use crate::{ClassifierError, DocId, ExportError};

/// Errors raised by the document store and the manual review commands.
///
/// All of these are recoverable: the command that raised them changed nothing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    #[error("unknown document: {0}")]
    UnknownDocument(DocId),

    #[error("bucket {bucket} out of range (expected 0..{bucket_count})")]
    InvalidBucket { bucket: usize, bucket_count: usize },

    #[error("document already registered: {0}")]
    DuplicateDocument(DocId),

    #[error("seed example {id} has label {label:?}, expected a category in 0..{categories}")]
    InvalidSeedLabel {
        id: DocId,
        label: Option<usize>,
        categories: usize,
    },

    #[error("invalid session configuration: {0}")]
    InvalidConfig(String),
}

#[derive(Debug, Error)]
pub enum ReviewError {
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Retrain-and-predict could not complete. Bucket state is unchanged.
    #[error("training failed: {0}")]
    TrainingFailed(#[source] ClassifierError),

    #[error("export failed: {0}")]
    Export(#[from] ExportError),
}
