//! Softmax logistic regression over document embeddings.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tracing::info;
use triage_core::classifier::validate_training_input;
use triage_core::{Category, ClassifierError, TextClassifier};

use crate::embed::Embed;
use crate::{MIN_DATASET_SIZE, embed_all, pad_to_minimum};

/// Training options for the logistic head.
#[derive(Debug, Clone)]
pub struct TrainOptions {
    pub epochs: usize,
    pub learning_rate: f32,
    pub l2: f32,
    pub batch_size: usize,
    /// Seeds weight initialisation and per-epoch shuffling.
    pub seed: u64,
    /// Weight examples inversely to their category frequency.
    pub balance_classes: bool,
    /// Smaller training sets are padded by duplication up to this size.
    pub min_samples: usize,
}

impl Default for TrainOptions {
    fn default() -> Self {
        Self {
            epochs: 30,
            learning_rate: 0.5,
            l2: 1e-4,
            batch_size: 32,
            seed: 42,
            balance_classes: true,
            min_samples: MIN_DATASET_SIZE,
        }
    }
}

/// Row-major `categories x dim` weights plus per-category bias.
#[derive(Debug, Clone)]
struct Model {
    dim: usize,
    weights: Vec<f32>,
    bias: Vec<f32>,
}

impl Model {
    fn predict(&self, x: &[f32]) -> Category {
        let logits = logits(&self.weights, &self.bias, self.dim, x);
        let mut best = 0;
        let mut best_val = f32::NEG_INFINITY;
        for (c, &v) in logits.iter().enumerate() {
            if v > best_val {
                best_val = v;
                best = c;
            }
        }
        best
    }
}

pub struct LogisticClassifier<E> {
    embedder: E,
    options: TrainOptions,
    model: Option<Model>,
}

impl<E: Embed> LogisticClassifier<E> {
    pub fn new(embedder: E, options: TrainOptions) -> Self {
        Self {
            embedder,
            options,
            model: None,
        }
    }

    pub fn is_trained(&self) -> bool {
        self.model.is_some()
    }

    pub fn options(&self) -> &TrainOptions {
        &self.options
    }
}

impl<E: Embed> TextClassifier for LogisticClassifier<E> {
    fn fit(
        &mut self,
        texts: &[&str],
        labels: &[Category],
        categories: usize,
    ) -> Result<(), ClassifierError> {
        validate_training_input(texts, labels, categories)?;
        let original = texts.len();
        let embeddings = embed_all(&mut self.embedder, texts)?;
        let (x, y) = pad_to_minimum(embeddings, labels.to_vec(), self.options.min_samples);
        let model = train(&x, &y, categories, self.embedder.dim(), &self.options);

        info!(
            examples = original,
            padded = x.len(),
            categories,
            epochs = self.options.epochs,
            model = self.embedder.model_name(),
            "trained logistic head"
        );
        self.model = Some(model);
        Ok(())
    }

    fn predict(&mut self, texts: &[&str]) -> Result<Vec<Category>, ClassifierError> {
        let Some(model) = self.model.as_ref() else {
            return Err(ClassifierError::ModelNotTrained);
        };
        let embeddings = embed_all(&mut self.embedder, texts)?;
        Ok(embeddings.iter().map(|x| model.predict(x)).collect())
    }

    fn name(&self) -> &str {
        "logreg"
    }
}

/// Mini-batch gradient descent on softmax cross-entropy.
fn train(
    x: &[Vec<f32>],
    y: &[Category],
    categories: usize,
    dim: usize,
    options: &TrainOptions,
) -> Model {
    let mut rng = StdRng::seed_from_u64(options.seed);
    let mut weights: Vec<f32> = (0..categories * dim)
        .map(|_| (rng.random::<f32>() - 0.5) * 0.01)
        .collect();
    let mut bias = vec![0.0f32; categories];

    let class_weights = if options.balance_classes {
        let mut counts = vec![0f32; categories];
        for &label in y {
            counts[label] += 1.0;
        }
        let total: f32 = counts.iter().sum();
        counts
            .into_iter()
            .map(|count| {
                if count == 0.0 {
                    0.0
                } else {
                    total / (categories as f32 * count)
                }
            })
            .collect()
    } else {
        vec![1.0; categories]
    };

    let mut indices: Vec<usize> = (0..x.len()).collect();
    let batch_size = options.batch_size.max(1);
    let lr = options.learning_rate;
    let l2 = options.l2.max(0.0);

    for _epoch in 0..options.epochs {
        indices.shuffle(&mut rng);
        for chunk in indices.chunks(batch_size) {
            let mut grad_w = vec![0.0f32; weights.len()];
            let mut grad_b = vec![0.0f32; categories];
            let mut batch_weight = 0.0f32;

            for &idx in chunk {
                let (row, label) = (&x[idx], y[idx]);
                let weight = class_weights[label];
                if weight == 0.0 {
                    continue;
                }
                let probs = softmax(&logits(&weights, &bias, dim, row));
                for c in 0..categories {
                    let diff = probs[c] - if c == label { 1.0 } else { 0.0 };
                    let base = c * dim;
                    for (i, &v) in row.iter().enumerate() {
                        grad_w[base + i] += diff * v * weight;
                    }
                    grad_b[c] += diff * weight;
                }
                batch_weight += weight;
            }

            if batch_weight == 0.0 {
                continue;
            }
            let inv = 1.0 / batch_weight;
            for (w, g) in weights.iter_mut().zip(&grad_w) {
                *w -= lr * (g * inv + l2 * *w);
            }
            for (b, g) in bias.iter_mut().zip(&grad_b) {
                *b -= lr * g * inv;
            }
        }
    }

    Model {
        dim,
        weights,
        bias,
    }
}

fn logits(weights: &[f32], bias: &[f32], dim: usize, x: &[f32]) -> Vec<f32> {
    bias.iter()
        .enumerate()
        .map(|(c, b)| {
            let row = &weights[c * dim..(c + 1) * dim];
            b + row.iter().zip(x).map(|(w, v)| w * v).sum::<f32>()
        })
        .collect()
}

fn softmax(logits: &[f32]) -> Vec<f32> {
    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = logits.iter().map(|&v| (v - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    if sum == 0.0 || !sum.is_finite() {
        return vec![1.0 / logits.len() as f32; logits.len()];
    }
    exps.into_iter().map(|v| v / sum).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::HashEmbedder;

    fn fitted() -> LogisticClassifier<HashEmbedder> {
        let mut clf = LogisticClassifier::new(HashEmbedder::default(), TrainOptions::default());
        clf.fit(
            &[
                "mobile banking app crashes on login",
                "app login password reset broken",
                "transfer failed in the banking app",
                "hotel room was clean and staff friendly",
                "great hotel breakfast and friendly staff",
                "pool at the hotel was lovely",
            ],
            &[0, 0, 0, 2, 2, 2],
            3,
        )
        .unwrap();
        clf
    }

    #[test]
    fn separates_topics() {
        let mut clf = fitted();
        let predicted = clf
            .predict(&["banking app login keeps failing", "friendly hotel staff and pool"])
            .unwrap();
        assert_eq!(predicted, vec![0, 2]);
    }

    #[test]
    fn predictions_stay_in_range() {
        let mut clf = fitted();
        let predicted = clf.predict(&["", "completely unrelated words"]).unwrap();
        assert!(predicted.iter().all(|&c| c < 3));
    }

    #[test]
    fn predict_before_fit() {
        let mut clf = LogisticClassifier::new(HashEmbedder::new(8), TrainOptions::default());
        assert_eq!(clf.predict(&["x"]), Err(ClassifierError::ModelNotTrained));
    }

    #[test]
    fn rejects_bad_labels() {
        let mut clf = LogisticClassifier::new(HashEmbedder::new(8), TrainOptions::default());
        let err = clf.fit(&["a b"], &[5], 3).unwrap_err();
        assert!(matches!(err, ClassifierError::InvalidInput(_)));
        assert!(!clf.is_trained());
    }

    #[test]
    fn softmax_sums_to_one() {
        let p = softmax(&[1.0, 2.0, 3.0]);
        assert!((p.iter().sum::<f32>() - 1.0).abs() < 1e-6);
        assert!(p[2] > p[1] && p[1] > p[0]);
    }
}
