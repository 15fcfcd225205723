//! The review loop: manual moves, selection, and the retrain-and-predict cycle.
//!
//! Commands run to completion one at a time. Observers hear about every
//! applied change after it has happened. Nothing the classifier does can
//! move a confirmed document.

use std::path::Path;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::classifier::{ClassifierError, TextClassifier};
use crate::export::{self, ExportRecord};
use crate::metrics::{ConfusionMatrix, Evaluation};
use crate::store::{BucketChange, DocumentStore, Entry};
use crate::{Bucket, Category, CoreError, DocId, Document, ReviewError, ReviewEvent, ReviewObserver};

/// Outcome of a successful retrain-and-predict cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrainingReport {
    /// Confirmed documents used as training examples.
    pub trained_on: usize,
    /// Uncategorized documents re-bucketed by the new predictions.
    pub moved: usize,
    /// Confirmed documents whose prediction disagrees, in insertion order.
    pub disagreements: Vec<DocId>,
    /// Document count per bucket id after the cycle.
    pub bucket_counts: Vec<usize>,
}

pub struct ReviewLoop<C> {
    store: DocumentStore,
    classifier: C,
    selection: Option<DocId>,
    observers: Vec<Box<dyn ReviewObserver>>,
}

impl<C: TextClassifier> ReviewLoop<C> {
    pub fn new(categories: usize, classifier: C) -> Result<Self, CoreError> {
        Ok(Self {
            store: DocumentStore::new(categories)?,
            classifier,
            selection: None,
            observers: Vec::new(),
        })
    }

    /// Build a session from seed documents, in order.
    pub fn from_documents(
        categories: usize,
        classifier: C,
        documents: impl IntoIterator<Item = Document>,
    ) -> Result<Self, CoreError> {
        let mut review = Self::new(categories, classifier)?;
        for document in documents {
            review.create(document)?;
        }
        info!(
            documents = review.store.len(),
            seeds = review.store.entries().filter(|e| e.bucket().is_confirmed()).count(),
            categories,
            "review session ready"
        );
        Ok(review)
    }

    pub fn subscribe(&mut self, observer: impl ReviewObserver + 'static) {
        self.observers.push(Box::new(observer));
    }

    pub fn create(&mut self, document: Document) -> Result<Bucket, CoreError> {
        self.store.create(document)
    }

    pub fn store(&self) -> &DocumentStore {
        &self.store
    }

    pub fn classifier(&self) -> &C {
        &self.classifier
    }

    pub fn classifier_mut(&mut self) -> &mut C {
        &mut self.classifier
    }

    pub fn categories(&self) -> usize {
        self.store.categories()
    }

    pub fn bucket_of(&self, id: &str) -> Result<Bucket, CoreError> {
        self.store.bucket_of(id)
    }

    pub fn is_flagged(&self, id: &str) -> Result<bool, CoreError> {
        self.store
            .get(id)
            .map(Entry::is_flagged)
            .ok_or_else(|| CoreError::UnknownDocument(id.into()))
    }

    pub fn disagreements(&self) -> Vec<DocId> {
        self.store.flagged().cloned().collect()
    }

    // ── Selection ──

    pub fn selection(&self) -> Option<&DocId> {
        self.selection.as_ref()
    }

    pub fn selected(&self) -> Option<&Entry> {
        self.selection.as_ref().and_then(|id| self.store.get(id.as_str()))
    }

    /// Select a document, replacing any previous selection.
    pub fn select(&mut self, id: &str) -> Result<(), CoreError> {
        let doc = self
            .store
            .get(id)
            .map(|e| e.id().clone())
            .ok_or_else(|| CoreError::UnknownDocument(id.into()))?;
        if self.selection.as_ref() == Some(&doc) {
            return Ok(());
        }
        self.selection = Some(doc.clone());
        self.emit(ReviewEvent::SelectionChanged(Some(doc)));
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        if self.selection.take().is_some() {
            self.emit(ReviewEvent::SelectionChanged(None));
        }
    }

    // ── Manual moves ──

    /// Move a document to a flat bucket id. `None` means it was already there.
    pub fn move_document(&mut self, id: &str, to: usize) -> Result<Option<BucketChange>, CoreError> {
        let change = self.store.move_document(id, to)?;
        if let Some(change) = &change {
            self.emit_change(change);
        }
        Ok(change)
    }

    /// Confirm a document as `category`, from any state.
    pub fn move_in(&mut self, id: &str, category: Category) -> Result<Option<BucketChange>, CoreError> {
        let to = Bucket::Confirmed(category).id(self.categories());
        self.move_document(id, to)
    }

    /// Demote a confirmed document to the uncategorized bucket of the same
    /// category. No-op for documents that are not confirmed.
    pub fn move_out(&mut self, id: &str) -> Result<Option<BucketChange>, CoreError> {
        match self.store.bucket_of(id)? {
            bucket @ Bucket::Confirmed(_) => {
                let to = bucket.demoted().id(self.categories());
                self.move_document(id, to)
            }
            Bucket::Uncategorized(_) => Ok(None),
        }
    }

    pub fn move_selected_in(&mut self, category: Category) -> Result<Option<BucketChange>, CoreError> {
        match self.selection.clone() {
            Some(id) => self.move_in(id.as_str(), category),
            None => Ok(None),
        }
    }

    pub fn move_selected_out(&mut self) -> Result<Option<BucketChange>, CoreError> {
        match self.selection.clone() {
            Some(id) => self.move_out(id.as_str()),
            None => Ok(None),
        }
    }

    // ── Retrain and predict ──

    /// Fit the classifier on confirmed documents and re-bucket the rest.
    ///
    /// Uncategorized documents move to the uncategorized bucket of their
    /// predicted category. Confirmed documents stay put; their disagreement
    /// flag is set when the prediction differs from the confirmed category.
    /// On failure the assignment map is left exactly as it was.
    pub fn retrain_and_predict(&mut self) -> Result<TrainingReport, ReviewError> {
        let (trained_on, predictions) = match self.fit_and_predict() {
            Ok(result) => result,
            Err(err) => {
                warn!(classifier = self.classifier.name(), error = %err, "retrain failed; buckets unchanged");
                self.emit(ReviewEvent::TrainingCompleted {
                    success: false,
                    disagreements: Vec::new(),
                });
                return Err(ReviewError::TrainingFailed(err));
            }
        };

        let mut changes = Vec::new();
        for (idx, &predicted) in predictions.iter().enumerate() {
            match self.store.entry_at(idx).bucket() {
                Bucket::Uncategorized(_) => {
                    if let Some(change) = self.store.set_bucket_at(idx, Bucket::Uncategorized(predicted)) {
                        changes.push(change);
                    }
                    self.store.set_flag_at(idx, false);
                }
                Bucket::Confirmed(category) => {
                    self.store.set_flag_at(idx, predicted != category);
                }
            }
        }

        let report = TrainingReport {
            trained_on,
            moved: changes.len(),
            disagreements: self.disagreements(),
            bucket_counts: self.store.counts(),
        };
        info!(
            classifier = self.classifier.name(),
            trained_on,
            moved = report.moved,
            disagreements = report.disagreements.len(),
            "retrain complete"
        );

        for change in &changes {
            self.emit_change(change);
        }
        self.emit(ReviewEvent::TrainingCompleted {
            success: true,
            disagreements: report.disagreements.clone(),
        });
        Ok(report)
    }

    /// Run the classifier without touching the store. Returns the training
    /// set size and one validated prediction per document.
    fn fit_and_predict(&mut self) -> Result<(usize, Vec<Category>), ClassifierError> {
        let categories = self.store.categories();
        let mut train_texts = Vec::new();
        let mut train_labels = Vec::new();
        let mut all_texts = Vec::with_capacity(self.store.len());

        for entry in self.store.entries() {
            let body = entry.document().body.as_str();
            all_texts.push(body);
            if let Bucket::Confirmed(category) = entry.bucket() {
                train_texts.push(body);
                train_labels.push(category);
            }
        }

        self.classifier.fit(&train_texts, &train_labels, categories)?;
        let predictions = self.classifier.predict(&all_texts)?;

        if predictions.len() != all_texts.len() {
            return Err(ClassifierError::InvalidOutput(format!(
                "{} predictions for {} documents",
                predictions.len(),
                all_texts.len()
            )));
        }
        if let Some(&bad) = predictions.iter().find(|&&p| p >= categories) {
            return Err(ClassifierError::InvalidOutput(format!(
                "predicted category {bad} outside 0..{categories}"
            )));
        }
        Ok((train_texts.len(), predictions))
    }

    // ── Export and evaluation ──

    /// `(title, bucket id)` for every document, in insertion order.
    pub fn snapshot(&self) -> Vec<ExportRecord> {
        let categories = self.categories();
        self.store
            .entries()
            .map(|e| ExportRecord {
                title: e.document().title.clone(),
                bucket: e.bucket().id(categories),
            })
            .collect()
    }

    /// Write the snapshot to `path`, overwriting it. Returns the record count.
    pub fn export(&self, path: &Path) -> Result<usize, ReviewError> {
        let records = self.snapshot();
        export::write_file(path, &records)?;
        info!(path = %path.display(), records = records.len(), "exported results");
        Ok(records.len())
    }

    /// Score current categories against ground-truth labels.
    ///
    /// Labels outside `0..k` are skipped. `None` when no document carries a
    /// usable ground-truth label.
    pub fn evaluate(&self) -> Option<Evaluation> {
        let k = self.categories();
        let mut matrix = ConfusionMatrix::new(k);
        let mut scored = 0usize;
        for entry in self.store.entries() {
            match entry.document().label {
                Some(truth) if truth < k => {
                    matrix.add(truth, entry.bucket().category());
                    scored += 1;
                }
                Some(truth) => {
                    debug!(doc = %entry.id(), label = truth, categories = k, "label out of range, not scored");
                }
                None => {}
            }
        }
        (scored > 0).then(|| Evaluation::from_matrix(matrix))
    }

    fn emit_change(&mut self, change: &BucketChange) {
        self.emit(ReviewEvent::BucketChanged {
            doc: change.doc.clone(),
            from: change.from,
            to: change.to,
        });
    }

    fn emit(&mut self, event: ReviewEvent) {
        for observer in &mut self.observers {
            observer.notify(&event);
        }
    }
}
