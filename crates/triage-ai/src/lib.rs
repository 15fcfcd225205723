//! Classifier adapters: embedding backends plus trainable heads that satisfy
//! the [`TextClassifier`](triage_core::TextClassifier) contract.

mod centroid;
mod embed;
#[cfg(feature = "onnx")]
mod embedder;
mod logistic;
#[cfg_attr(not(feature = "onnx"), allow(dead_code))]
mod pooling;

pub use centroid::CentroidClassifier;
pub use embed::{Embed, HashEmbedder, cosine_sim, normalize};
#[cfg(feature = "onnx")]
pub use embedder::OnnxEmbedder;
pub use logistic::{LogisticClassifier, TrainOptions};

use triage_core::{Category, ClassifierError};

/// Training sets smaller than this are padded by whole-set duplication.
pub const MIN_DATASET_SIZE: usize = 50;

/// Texts per embedding call.
const EMBED_BATCH_SIZE: usize = 256;

/// Embed `texts` in fixed-size chunks, mapping backend failures into the
/// classifier error space.
fn embed_all<E: Embed>(embedder: &mut E, texts: &[&str]) -> Result<Vec<Vec<f32>>, ClassifierError> {
    let mut out = Vec::with_capacity(texts.len());
    for chunk in texts.chunks(EMBED_BATCH_SIZE) {
        let batch = embedder
            .embed_batch(chunk)
            .map_err(|e| ClassifierError::Backend(format!("{e:#}")))?;
        if batch.len() != chunk.len() {
            return Err(ClassifierError::Backend(format!(
                "embedder returned {} vectors for {} texts",
                batch.len(),
                chunk.len()
            )));
        }
        out.extend(batch);
    }
    Ok(out)
}

/// Repeat the whole training set until it holds at least `min_samples` rows.
fn pad_to_minimum<T: Clone>(
    rows: Vec<T>,
    labels: Vec<Category>,
    min_samples: usize,
) -> (Vec<T>, Vec<Category>) {
    if rows.is_empty() || rows.len() >= min_samples {
        return (rows, labels);
    }
    let copies = min_samples / rows.len() + 1;
    let padded_rows = rows.iter().cloned().cycle().take(rows.len() * copies).collect();
    let padded_labels = labels.iter().copied().cycle().take(labels.len() * copies).collect();
    (padded_rows, padded_labels)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn padding_repeats_whole_set() {
        let (rows, labels) = pad_to_minimum(vec!["a", "b", "c"], vec![0, 1, 2], 10);
        // 10 / 3 + 1 = 4 copies.
        assert_eq!(rows.len(), 12);
        assert_eq!(&rows[3..6], &["a", "b", "c"]);
        assert_eq!(&labels[9..], &[0, 1, 2]);
    }

    #[test]
    fn no_padding_when_large_enough() {
        let (rows, _) = pad_to_minimum(vec![1; 60], vec![0; 60], MIN_DATASET_SIZE);
        assert_eq!(rows.len(), 60);
    }

    #[test]
    fn embed_all_chunks_large_inputs() {
        let mut embedder = HashEmbedder::new(16);
        let texts: Vec<String> = (0..600).map(|i| format!("text number {i}")).collect();
        let refs: Vec<&str> = texts.iter().map(String::as_str).collect();
        let vecs = embed_all(&mut embedder, &refs).unwrap();
        assert_eq!(vecs.len(), 600);
    }
}
