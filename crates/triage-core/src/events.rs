//! Change notifications published by the review loop.

use crate::{Bucket, DocId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewEvent {
    /// Fired exactly once per successful move.
    BucketChanged { doc: DocId, from: Bucket, to: Bucket },
    SelectionChanged(Option<DocId>),
    /// Fired at the end of every retrain attempt. `disagreements` is empty on failure.
    TrainingCompleted {
        success: bool,
        disagreements: Vec<DocId>,
    },
}

/// Subscriber to [`ReviewEvent`]s. Events arrive after the state change is applied.
pub trait ReviewObserver {
    fn notify(&mut self, event: &ReviewEvent);
}

impl<F: FnMut(&ReviewEvent)> ReviewObserver for F {
    fn notify(&mut self, event: &ReviewEvent) {
        self(event)
    }
}
