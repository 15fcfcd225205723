//! Document store: the assignment map from document id to bucket.
//!
//! Every registered document sits in exactly one bucket. Entries keep
//! insertion order so that listings and exports are deterministic.

use std::collections::HashMap;

use tracing::debug;

use crate::{Bucket, CoreError, DocId, Document};

/// A registered document with its current placement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    document: Document,
    bucket: Bucket,
    flagged: bool,
}

impl Entry {
    pub fn id(&self) -> &DocId {
        &self.document.id
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn bucket(&self) -> Bucket {
        self.bucket
    }

    /// Latest model prediction disagreed with the confirmed category.
    pub fn is_flagged(&self) -> bool {
        self.flagged
    }
}

/// Notification produced by a successful move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketChange {
    pub doc: DocId,
    pub from: Bucket,
    pub to: Bucket,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentStore {
    categories: usize,
    entries: Vec<Entry>,
    index: HashMap<DocId, usize>,
}

impl DocumentStore {
    /// A store for `categories` categories; at least one is required.
    pub fn new(categories: usize) -> Result<Self, CoreError> {
        if categories == 0 {
            return Err(CoreError::InvalidConfig(
                "at least one category is required".into(),
            ));
        }
        Ok(Self {
            categories,
            entries: Vec::new(),
            index: HashMap::new(),
        })
    }

    pub fn categories(&self) -> usize {
        self.categories
    }

    pub fn bucket_count(&self) -> usize {
        self.categories * 2
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Register a document and return the bucket it was placed in.
    ///
    /// Seed examples go straight into the confirmed bucket of their label;
    /// everything else starts in uncategorized bucket 0.
    pub fn create(&mut self, document: Document) -> Result<Bucket, CoreError> {
        if self.index.contains_key(&document.id) {
            return Err(CoreError::DuplicateDocument(document.id));
        }
        let bucket = if document.seed {
            match document.label {
                Some(label) if label < self.categories => Bucket::Confirmed(label),
                label => {
                    return Err(CoreError::InvalidSeedLabel {
                        id: document.id,
                        label,
                        categories: self.categories,
                    });
                }
            }
        } else {
            Bucket::Uncategorized(0)
        };

        self.index.insert(document.id.clone(), self.entries.len());
        self.entries.push(Entry {
            document,
            bucket,
            flagged: false,
        });
        Ok(bucket)
    }

    /// Move a document to bucket id `to`.
    ///
    /// Returns `None` when the document is already there; nothing changes in
    /// that case. A successful move clears the disagreement flag.
    pub fn move_document(&mut self, id: &str, to: usize) -> Result<Option<BucketChange>, CoreError> {
        let idx = self.position(id)?;
        let target = Bucket::from_id(to, self.categories)?;
        Ok(self.set_bucket_at(idx, target))
    }

    pub fn bucket_of(&self, id: &str) -> Result<Bucket, CoreError> {
        self.get(id)
            .map(Entry::bucket)
            .ok_or_else(|| CoreError::UnknownDocument(id.into()))
    }

    pub fn get(&self, id: &str) -> Option<&Entry> {
        self.index.get(id).map(|&idx| &self.entries[idx])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// All entries in insertion order.
    pub fn entries(&self) -> impl Iterator<Item = &Entry> {
        self.entries.iter()
    }

    /// Entries currently in `bucket`, in insertion order.
    pub fn bucket_contents(&self, bucket: Bucket) -> impl Iterator<Item = &Entry> {
        self.entries.iter().filter(move |e| e.bucket == bucket)
    }

    /// Document count per bucket id.
    pub fn counts(&self) -> Vec<usize> {
        let mut counts = vec![0; self.bucket_count()];
        for entry in &self.entries {
            counts[entry.bucket.id(self.categories)] += 1;
        }
        counts
    }

    /// Ids of flagged documents, in insertion order.
    pub fn flagged(&self) -> impl Iterator<Item = &DocId> {
        self.entries.iter().filter(|e| e.flagged).map(Entry::id)
    }

    pub(crate) fn position(&self, id: &str) -> Result<usize, CoreError> {
        self.index
            .get(id)
            .copied()
            .ok_or_else(|| CoreError::UnknownDocument(id.into()))
    }

    pub(crate) fn entry_at(&self, idx: usize) -> &Entry {
        &self.entries[idx]
    }

    /// Place the entry at `idx` into `bucket`. `bucket` must be valid for this store.
    pub(crate) fn set_bucket_at(&mut self, idx: usize, bucket: Bucket) -> Option<BucketChange> {
        let entry = &mut self.entries[idx];
        if entry.bucket == bucket {
            return None;
        }
        let from = entry.bucket;
        entry.bucket = bucket;
        entry.flagged = false;
        debug!(doc = %entry.document.id, %from, to = %bucket, "moved document");
        Some(BucketChange {
            doc: entry.document.id.clone(),
            from,
            to: bucket,
        })
    }

    pub(crate) fn set_flag_at(&mut self, idx: usize, flagged: bool) {
        self.entries[idx].flagged = flagged;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(id: &str) -> Document {
        Document::new(id, format!("title {id}"), format!("body {id}"), None, false)
    }

    fn seed(id: &str, label: usize) -> Document {
        Document::new(id, id, id, Some(label), true)
    }

    #[test]
    fn plain_documents_start_uncategorized_zero() {
        let mut store = DocumentStore::new(3).unwrap();
        assert_eq!(store.create(doc("a")).unwrap(), Bucket::Uncategorized(0));
        assert_eq!(store.bucket_of("a").unwrap(), Bucket::Uncategorized(0));
    }

    #[test]
    fn seed_documents_start_confirmed() {
        let mut store = DocumentStore::new(3).unwrap();
        assert_eq!(store.create(seed("s", 2)).unwrap(), Bucket::Confirmed(2));
        assert_eq!(store.bucket_of("s").unwrap().id(3), 5);
    }

    #[test]
    fn seed_without_valid_label_rejected() {
        let mut store = DocumentStore::new(3).unwrap();
        let err = store.create(Document::new("s", "", "", None, true)).unwrap_err();
        assert!(matches!(err, CoreError::InvalidSeedLabel { label: None, .. }));
        let err = store.create(seed("t", 3)).unwrap_err();
        assert!(matches!(err, CoreError::InvalidSeedLabel { label: Some(3), .. }));
        assert!(store.is_empty());
    }

    #[test]
    fn duplicate_id_rejected() {
        let mut store = DocumentStore::new(2).unwrap();
        store.create(doc("a")).unwrap();
        assert_eq!(
            store.create(doc("a")),
            Err(CoreError::DuplicateDocument("a".into()))
        );
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn move_reports_change() {
        let mut store = DocumentStore::new(3).unwrap();
        store.create(doc("a")).unwrap();
        let change = store.move_document("a", 4).unwrap().unwrap();
        assert_eq!(change.from, Bucket::Uncategorized(0));
        assert_eq!(change.to, Bucket::Confirmed(1));
        assert_eq!(store.bucket_of("a").unwrap(), Bucket::Confirmed(1));
    }

    #[test]
    fn move_to_same_bucket_is_noop() {
        let mut store = DocumentStore::new(3).unwrap();
        store.create(doc("a")).unwrap();
        let before = store.clone();
        assert_eq!(store.move_document("a", 0).unwrap(), None);
        assert_eq!(store, before);
    }

    #[test]
    fn move_unknown_document() {
        let mut store = DocumentStore::new(3).unwrap();
        assert_eq!(
            store.move_document("nope", 1),
            Err(CoreError::UnknownDocument("nope".into()))
        );
    }

    #[test]
    fn move_to_invalid_bucket() {
        let mut store = DocumentStore::new(3).unwrap();
        store.create(doc("a")).unwrap();
        assert_eq!(
            store.move_document("a", 6),
            Err(CoreError::InvalidBucket {
                bucket: 6,
                bucket_count: 6
            })
        );
        assert_eq!(store.bucket_of("a").unwrap(), Bucket::Uncategorized(0));
    }

    #[test]
    fn entries_keep_insertion_order() {
        let mut store = DocumentStore::new(2).unwrap();
        for id in ["c", "a", "b"] {
            store.create(doc(id)).unwrap();
        }
        store.move_document("a", 3).unwrap();
        let ids: Vec<&str> = store.entries().map(|e| e.id().as_str()).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
    }

    #[test]
    fn counts_and_bucket_contents() {
        let mut store = DocumentStore::new(2).unwrap();
        store.create(doc("a")).unwrap();
        store.create(doc("b")).unwrap();
        store.create(seed("s", 1)).unwrap();
        assert_eq!(store.counts(), vec![2, 0, 0, 1]);
        let confirmed: Vec<&str> = store
            .bucket_contents(Bucket::Confirmed(1))
            .map(|e| e.id().as_str())
            .collect();
        assert_eq!(confirmed, vec!["s"]);
    }

    #[test]
    fn move_clears_flag() {
        let mut store = DocumentStore::new(2).unwrap();
        store.create(seed("s", 1)).unwrap();
        store.set_flag_at(0, true);
        assert_eq!(store.flagged().count(), 1);
        store.move_document("s", 1).unwrap();
        assert_eq!(store.flagged().count(), 0);
    }

    #[test]
    fn zero_categories_rejected() {
        let err = DocumentStore::new(0).unwrap_err();
        assert!(matches!(err, CoreError::InvalidConfig(_)));
    }
}
