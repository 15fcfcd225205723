//! Re-seeding from a previous session's export, and the named-label report.

use std::path::Path;

use tracing::info;
use triage_core::{Bucket, Document, ExportRecord, SessionConfig};

use crate::StoreError;

/// Apply a previous export to freshly imported documents, matched by position.
///
/// A confirmed bucket (`>= k`) makes the document a seed with that category as
/// its label. An uncategorized bucket sets the label only. Nothing is changed
/// unless every record is valid.
pub fn apply_prior_results(
    documents: &mut [Document],
    prior: &[ExportRecord],
    categories: usize,
) -> Result<(), StoreError> {
    if documents.len() != prior.len() {
        return Err(StoreError::Mismatch {
            documents: documents.len(),
            results: prior.len(),
        });
    }

    let buckets = prior
        .iter()
        .enumerate()
        .map(|(index, record)| {
            Bucket::from_id(record.bucket, categories).map_err(|_| StoreError::InvalidBucket {
                index,
                bucket: record.bucket,
                bucket_count: categories * 2,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    for (doc, bucket) in documents.iter_mut().zip(&buckets) {
        doc.label = Some(bucket.category());
        doc.seed = bucket.is_confirmed();
    }
    info!(
        documents = documents.len(),
        seeds = buckets.iter().filter(|b| b.is_confirmed()).count(),
        "applied prior results"
    );
    Ok(())
}

/// `Review_ID, Is_Labeled, Label` header plus one row per document.
pub fn render_labelled(documents: &[Document], config: &SessionConfig) -> String {
    let mut lines = Vec::with_capacity(documents.len() + 1);
    lines.push("Review_ID, Is_Labeled, Label".to_string());
    for (i, doc) in documents.iter().enumerate() {
        let name = doc.label.map(|c| config.name(c)).unwrap_or_default();
        lines.push(format!("{i}, {}, {name}", doc.seed));
    }
    lines.join("\n")
}

pub fn write_labelled(
    path: &Path,
    documents: &[Document],
    config: &SessionConfig,
) -> Result<(), StoreError> {
    std::fs::write(path, render_labelled(documents, config))?;
    info!(path = %path.display(), rows = documents.len(), "wrote labelled report");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn docs(n: usize) -> Vec<Document> {
        (0..n)
            .map(|i| Document::new(format!("d{i}"), format!("t{i}"), "", None, false))
            .collect()
    }

    fn rec(bucket: usize) -> ExportRecord {
        ExportRecord {
            title: String::new(),
            bucket,
        }
    }

    #[test]
    fn confirmed_buckets_become_seeds() {
        let mut d = docs(3);
        apply_prior_results(&mut d, &[rec(0), rec(5), rec(3)], 3).unwrap();
        assert_eq!((d[0].label, d[0].seed), (Some(0), false));
        assert_eq!((d[1].label, d[1].seed), (Some(2), true));
        assert_eq!((d[2].label, d[2].seed), (Some(0), true));
    }

    #[test]
    fn uncategorized_bucket_clears_seed() {
        let mut d = vec![Document::new("a", "t", "", Some(1), true)];
        apply_prior_results(&mut d, &[rec(2)], 3).unwrap();
        assert_eq!((d[0].label, d[0].seed), (Some(2), false));
    }

    #[test]
    fn count_mismatch() {
        let mut d = docs(2);
        let err = apply_prior_results(&mut d, &[rec(0)], 3).unwrap_err();
        assert!(matches!(
            err,
            StoreError::Mismatch {
                documents: 2,
                results: 1
            }
        ));
    }

    #[test]
    fn out_of_range_bucket_changes_nothing() {
        let mut d = docs(2);
        let err = apply_prior_results(&mut d, &[rec(4), rec(6)], 3).unwrap_err();
        assert!(matches!(err, StoreError::InvalidBucket { index: 1, bucket: 6, .. }));
        assert!(d.iter().all(|doc| doc.label.is_none() && !doc.seed));
    }

    #[test]
    fn labelled_report_uses_names() {
        let config = SessionConfig::new(
            3,
            vec!["BankApp".into(), "Maybe".into(), "Hotel".into()],
        )
        .unwrap();
        let d = vec![
            Document::new("a", "t", "", Some(0), true),
            Document::new("b", "t", "", Some(2), false),
            Document::new("c", "t", "", None, false),
        ];
        assert_eq!(
            render_labelled(&d, &config),
            "Review_ID, Is_Labeled, Label\n0, true, BankApp\n1, false, Hotel\n2, false, "
        );
    }

    #[test]
    fn labelled_report_falls_back_to_index() {
        let config = SessionConfig::new(2, vec![]).unwrap();
        let d = vec![Document::new("a", "t", "", Some(1), false)];
        assert_eq!(
            render_labelled(&d, &config),
            "Review_ID, Is_Labeled, Label\n0, false, 1"
        );
    }
}
