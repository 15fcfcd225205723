//! Plain-text rendering for the review shell and one-shot commands.

use std::io::Write;

use triage_core::metrics::Evaluation;
use triage_core::{Bucket, DocumentStore, Entry, ReviewEvent, SessionConfig, TrainingReport};

/// Longest `display_line` shown in a bucket listing.
const LINE_WIDTH: usize = 96;

/// `confirmed BankApp` style label.
pub fn bucket_label(bucket: Bucket, config: &SessionConfig) -> String {
    format!("{} {}", bucket.status_str(), config.name(bucket.category()))
}

// ── Buckets ──

/// Document count per bucket, uncategorized slots first.
pub fn write_summary(
    out: &mut impl Write,
    store: &DocumentStore,
    config: &SessionConfig,
) -> std::io::Result<()> {
    let counts = store.counts();
    writeln!(out, "Buckets")?;
    for bucket in Bucket::all(config.categories()) {
        let id = bucket.id(config.categories());
        writeln!(
            out,
            "  [{id}] {:<22} {}",
            bucket_label(bucket, config),
            counts.get(id).copied().unwrap_or(0)
        )?;
    }
    writeln!(out)
}

/// List a bucket's contents. The selected document is marked with `>` and
/// flagged documents with `!`; a document can carry both.
pub fn write_bucket(
    out: &mut impl Write,
    store: &DocumentStore,
    bucket: Bucket,
    config: &SessionConfig,
    selected: Option<&str>,
) -> std::io::Result<()> {
    let entries: Vec<&Entry> = store.bucket_contents(bucket).collect();
    writeln!(
        out,
        "=== [{}] {} ({}) ===",
        bucket.id(config.categories()),
        bucket_label(bucket, config),
        entries.len()
    )?;
    for entry in entries {
        let marker = match (Some(entry.id().as_str()) == selected, entry.is_flagged()) {
            (true, true) => ">!",
            (true, false) => "> ",
            (false, true) => " !",
            (false, false) => "  ",
        };
        writeln!(
            out,
            "{marker} {:<12} {}",
            entry.id().as_str(),
            truncate(&entry.document().display_line(), LINE_WIDTH)
        )?;
    }
    writeln!(out)
}

// ── Documents ──

/// Vertical card for one document.
pub fn write_card(out: &mut impl Write, entry: &Entry, config: &SessionConfig) -> std::io::Result<()> {
    let doc = entry.document();
    writeln!(out, "=== {} ===", doc.id)?;
    if !doc.title.is_empty() {
        writeln!(out, "{}", doc.title)?;
    }
    writeln!(out)?;
    writeln!(out, "  {:<26} {}", "bucket", bucket_label(entry.bucket(), config))?;
    writeln!(out, "  {:<26} {}", "bucket_id", entry.bucket().id(config.categories()))?;
    if let Some(label) = doc.label {
        writeln!(out, "  {:<26} {}", "ground_truth", config.name(label))?;
    }
    writeln!(out, "  {:<26} {}", "seed", if doc.seed { "yes" } else { "no" })?;
    if entry.is_flagged() {
        writeln!(out, "  {:<26} {}", "disagreement", "model predicts another category")?;
    }
    writeln!(out)?;
    for line in doc.body.lines() {
        writeln!(out, "  {line}")?;
    }
    writeln!(out)
}

// ── Training and evaluation ──

pub fn write_report(
    out: &mut impl Write,
    report: &TrainingReport,
    config: &SessionConfig,
) -> std::io::Result<()> {
    writeln!(out, "Retrain")?;
    writeln!(out, "  {:<26} {}", "trained_on", report.trained_on)?;
    writeln!(out, "  {:<26} {}", "moved", report.moved)?;
    writeln!(out, "  {:<26} {}", "disagreements", report.disagreements.len())?;
    for bucket in Bucket::all(config.categories()) {
        let id = bucket.id(config.categories());
        writeln!(
            out,
            "  {:<26} {}",
            bucket_label(bucket, config),
            report.bucket_counts.get(id).copied().unwrap_or(0)
        )?;
    }
    writeln!(out)
}

/// Accuracy, confusion matrix (rows = truth), and per-class precision/recall.
pub fn write_evaluation(
    out: &mut impl Write,
    eval: &Evaluation,
    config: &SessionConfig,
) -> std::io::Result<()> {
    let k = config.categories();
    writeln!(out, "Evaluation")?;
    writeln!(out, "  {:<26} {}", "documents", eval.evaluated())?;
    writeln!(out, "  {:<26} {:.3}", "accuracy", eval.accuracy)?;
    writeln!(out)?;

    write!(out, "  {:<12}", "truth \\ pred")?;
    for c in 0..k {
        write!(out, " {:>10}", truncate(&config.name(c), 10))?;
    }
    writeln!(out)?;
    for truth in 0..k {
        write!(out, "  {:<12}", truncate(&config.name(truth), 12))?;
        for predicted in 0..k {
            write!(out, " {:>10}", eval.matrix.get(truth, predicted))?;
        }
        writeln!(out)?;
    }
    writeln!(out)?;

    for (c, stats) in eval.per_class.iter().enumerate() {
        writeln!(
            out,
            "  {:<26} precision {:.3}  recall {:.3}  support {}",
            config.name(c),
            stats.precision,
            stats.recall,
            stats.support
        )?;
    }
    writeln!(out)
}

// ── Events ──

pub fn event_line(event: &ReviewEvent, config: &SessionConfig) -> String {
    match event {
        ReviewEvent::BucketChanged { doc, from, to } => format!(
            "* {doc}: {} -> {}",
            bucket_label(*from, config),
            bucket_label(*to, config)
        ),
        ReviewEvent::SelectionChanged(Some(doc)) => format!("* selected {doc}"),
        ReviewEvent::SelectionChanged(None) => "* selection cleared".to_string(),
        ReviewEvent::TrainingCompleted {
            success: true,
            disagreements,
        } => format!("* training complete, {} disagreement(s)", disagreements.len()),
        ReviewEvent::TrainingCompleted { success: false, .. } => {
            "* training failed, buckets unchanged".to_string()
        }
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let cut: String = s.chars().take(max.saturating_sub(3)).collect();
    format!("{cut}...")
}

#[cfg(test)]
mod tests {
    use super::*;
    use triage_core::{Category, ClassifierError, Document, ReviewLoop, TextClassifier};

    fn config() -> SessionConfig {
        SessionConfig::new(2, vec!["App".into(), "Hotel".into()]).unwrap()
    }

    fn render(f: impl FnOnce(&mut Vec<u8>) -> std::io::Result<()>) -> String {
        let mut buf = Vec::new();
        f(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn summary_lists_every_bucket() {
        let mut store = DocumentStore::new(2).unwrap();
        store.create(Document::new("a", "t", "b", Some(1), true)).unwrap();
        store.create(Document::new("b", "t", "b", None, false)).unwrap();
        let text = render(|out| write_summary(out, &store, &config()));
        assert!(text.contains("[0] uncategorized App"));
        assert!(text.contains("[3] confirmed Hotel"));
        assert_eq!(text.lines().count(), 6);
    }

    #[test]
    fn bucket_listing_marks_selection() {
        let mut store = DocumentStore::new(2).unwrap();
        store.create(Document::new("a", "A", "x", None, false)).unwrap();
        store.create(Document::new("b", "B", "y", None, false)).unwrap();
        let text = render(|out| {
            write_bucket(out, &store, Bucket::Uncategorized(0), &config(), Some("b"))
        });
        assert!(text.starts_with("=== [0] uncategorized App (2) ==="));
        assert!(text.contains("\n>  b "));
        assert!(text.contains("\n   a "));
    }

    /// Predicts category 0 for everything.
    struct AlwaysZero;

    impl TextClassifier for AlwaysZero {
        fn fit(&mut self, _: &[&str], _: &[Category], _: usize) -> Result<(), ClassifierError> {
            Ok(())
        }

        fn predict(&mut self, texts: &[&str]) -> Result<Vec<Category>, ClassifierError> {
            Ok(vec![0; texts.len()])
        }
    }

    #[test]
    fn selected_flagged_document_shows_both_markers() {
        let docs = vec![
            Document::new("s", "S", "x", Some(1), true),
            Document::new("t", "T", "y", Some(1), true),
        ];
        let mut review = ReviewLoop::from_documents(2, AlwaysZero, docs).unwrap();
        review.retrain_and_predict().unwrap();
        review.select("s").unwrap();
        assert!(review.is_flagged("s").unwrap());

        let text = render(|out| {
            write_bucket(out, review.store(), Bucket::Confirmed(1), &config(), Some("s"))
        });
        assert!(text.contains("\n>! s "));
        assert!(text.contains("\n ! t "));
    }

    #[test]
    fn event_lines_use_names() {
        let line = event_line(
            &ReviewEvent::BucketChanged {
                doc: "r1".into(),
                from: Bucket::Uncategorized(0),
                to: Bucket::Confirmed(1),
            },
            &config(),
        );
        assert_eq!(line, "* r1: uncategorized App -> confirmed Hotel");
    }

    #[test]
    fn truncate_long_lines() {
        assert_eq!(truncate("abcdef", 10), "abcdef");
        assert_eq!(truncate("abcdefghijkl", 6), "abc...");
    }
}
