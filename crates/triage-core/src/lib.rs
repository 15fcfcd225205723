//! Core triage types: documents, buckets, the review loop, and the classifier contract.

pub mod bucket;
pub mod classifier;
pub mod config;
pub mod document;
mod error;
pub mod events;
pub mod export;
pub mod metrics;
pub mod review;
pub mod store;

pub use bucket::{Bucket, Category};
pub use classifier::{ClassifierError, TextClassifier};
pub use config::SessionConfig;
pub use document::{DocId, Document};
pub use error::{CoreError, ReviewError};
pub use events::{ReviewEvent, ReviewObserver};
pub use export::{ExportError, ExportRecord};
pub use metrics::{ConfusionMatrix, Evaluation};
pub use review::{ReviewLoop, TrainingReport};
pub use store::{BucketChange, DocumentStore, Entry};
