mod common;

use common::FakeClassifier;
use triage_core::{ClassifierError, Document, ReviewError, ReviewLoop, export};

#[test]
fn export_then_parse_recovers_pairs_in_order() {
    let docs = vec![
        Document::new("1", "Late checkout, friendly staff", "...", Some(2), true),
        Document::new("2", "App\nwon't load", "...", None, false),
        Document::new("3", "back\\slash", "...", None, false),
    ];
    let mut review = ReviewLoop::from_documents(3, FakeClassifier::new(vec![2, 0, 1]), docs).unwrap();
    review.move_in("2", 0).unwrap();
    review.retrain_and_predict().unwrap();

    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("sort_results.csv");
    assert_eq!(review.export(&path).unwrap(), 3);

    let parsed = export::read_file(&path).unwrap();
    assert_eq!(parsed, review.snapshot());
    let pairs: Vec<(&str, usize)> = parsed.iter().map(|r| (r.title.as_str(), r.bucket)).collect();
    assert_eq!(
        pairs,
        vec![
            ("Late checkout, friendly staff", 5),
            ("App\nwon't load", 3),
            ("back\\slash", 1),
        ]
    );
}

#[test]
fn export_is_read_only() {
    let docs = vec![Document::new("a", "a", "a", None, false)];
    let review = ReviewLoop::from_documents(2, FakeClassifier::new(vec![]), docs).unwrap();
    let before = review.store().clone();
    let dir = tempfile::TempDir::new().unwrap();
    review.export(&dir.path().join("out.csv")).unwrap();
    assert_eq!(*review.store(), before);
}

#[test]
fn retrain_without_confirmed_documents_changes_nothing() {
    let docs = (0..4).map(|i| Document::new(format!("d{i}"), "t", "b", None, false));
    let mut review = ReviewLoop::from_documents(3, FakeClassifier::new(vec![1, 1, 1, 1]), docs).unwrap();
    let before = review.snapshot();
    assert!(review.retrain_and_predict().is_err());
    assert_eq!(review.snapshot(), before);
}

#[test]
fn prediction_failure_keeps_previous_export() {
    let docs = vec![
        Document::new("s", "seed", "b", Some(1), true),
        Document::new("d", "doc", "b", None, false),
    ];
    let mut review = ReviewLoop::from_documents(2, FakeClassifier::new(vec![1, 1]), docs).unwrap();
    review.retrain_and_predict().unwrap();
    let before = review.snapshot();

    review.classifier_mut().predictions = vec![0, 0];
    review.classifier_mut().fail_predict = true;
    let err = review.retrain_and_predict().unwrap_err();
    assert!(matches!(
        err,
        ReviewError::TrainingFailed(ClassifierError::ModelNotTrained)
    ));
    assert_eq!(review.snapshot(), before);
    assert!(review.disagreements().is_empty());
}
