//! Centroid-based classification.
//!
//! Averages the embeddings of each category's training documents into a
//! normalized centroid and assigns new documents to the centroid with the
//! highest cosine similarity.

use tracing::info;
use triage_core::classifier::validate_training_input;
use triage_core::{Category, ClassifierError, TextClassifier};

use crate::embed::{Embed, cosine_sim, normalize};
use crate::embed_all;

/// Nearest-centroid classifier over an embedding backend.
///
/// Only categories that had at least one training document get a centroid,
/// so only those can be predicted.
pub struct CentroidClassifier<E> {
    embedder: E,
    /// Indexed by category; `None` for categories without training data.
    centroids: Option<Vec<Option<Vec<f32>>>>,
}

impl<E: Embed> CentroidClassifier<E> {
    pub fn new(embedder: E) -> Self {
        Self {
            embedder,
            centroids: None,
        }
    }

    pub fn is_trained(&self) -> bool {
        self.centroids.is_some()
    }

    /// Number of categories with a centroid.
    pub fn centroid_count(&self) -> usize {
        self.centroids
            .as_ref()
            .map_or(0, |c| c.iter().filter(|v| v.is_some()).count())
    }

    /// Best category and its similarity for one embedding.
    fn best_match(centroids: &[Option<Vec<f32>>], embedding: &[f32]) -> (Category, f32) {
        let mut best = 0;
        let mut best_sim = f32::NEG_INFINITY;
        for (category, centroid) in centroids.iter().enumerate() {
            if let Some(centroid) = centroid {
                let sim = cosine_sim(embedding, centroid);
                if sim > best_sim {
                    best_sim = sim;
                    best = category;
                }
            }
        }
        (best, best_sim)
    }
}

/// Mean of each category's rows, L2-normalized.
fn compute_centroids(
    embeddings: &[Vec<f32>],
    labels: &[Category],
    categories: usize,
    dim: usize,
) -> Vec<Option<Vec<f32>>> {
    let mut accum: Vec<(Vec<f32>, usize)> = vec![(vec![0.0f32; dim], 0); categories];
    for (emb, &label) in embeddings.iter().zip(labels) {
        let entry = &mut accum[label];
        for (acc, &val) in entry.0.iter_mut().zip(emb) {
            *acc += val;
        }
        entry.1 += 1;
    }

    accum
        .into_iter()
        .map(|(mut sum, count)| {
            if count == 0 {
                return None;
            }
            for v in &mut sum {
                *v /= count as f32;
            }
            normalize(&mut sum);
            Some(sum)
        })
        .collect()
}

impl<E: Embed> TextClassifier for CentroidClassifier<E> {
    fn fit(
        &mut self,
        texts: &[&str],
        labels: &[Category],
        categories: usize,
    ) -> Result<(), ClassifierError> {
        validate_training_input(texts, labels, categories)?;
        let embeddings = embed_all(&mut self.embedder, texts)?;
        let centroids = compute_centroids(&embeddings, labels, categories, self.embedder.dim());

        let present = centroids.iter().filter(|c| c.is_some()).count();
        info!(
            examples = texts.len(),
            centroids = present,
            categories,
            model = self.embedder.model_name(),
            "computed category centroids"
        );
        self.centroids = Some(centroids);
        Ok(())
    }

    fn predict(&mut self, texts: &[&str]) -> Result<Vec<Category>, ClassifierError> {
        let Some(centroids) = self.centroids.as_ref() else {
            return Err(ClassifierError::ModelNotTrained);
        };
        let embeddings = embed_all(&mut self.embedder, texts)?;
        Ok(embeddings
            .iter()
            .map(|emb| Self::best_match(centroids, emb).0)
            .collect())
    }

    fn name(&self) -> &str {
        "centroid"
    }
}
