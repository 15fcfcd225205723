//! Accuracy and confusion statistics against ground-truth labels.

use serde::Serialize;

use crate::Category;

/// Confusion matrix for a `k`-category session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfusionMatrix {
    pub categories: usize,
    /// Row-major `k x k` counts (`truth * k + predicted`).
    pub counts: Vec<u32>,
}

impl ConfusionMatrix {
    pub fn new(categories: usize) -> Self {
        Self {
            categories,
            counts: vec![0; categories * categories],
        }
    }

    /// Out-of-range pairs are ignored.
    pub fn add(&mut self, truth: Category, predicted: Category) {
        if truth >= self.categories || predicted >= self.categories {
            return;
        }
        let idx = truth * self.categories + predicted;
        self.counts[idx] = self.counts[idx].saturating_add(1);
    }

    pub fn get(&self, truth: Category, predicted: Category) -> u32 {
        self.counts[truth * self.categories + predicted]
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().map(|&c| c as u64).sum()
    }

    pub fn accuracy(&self) -> f32 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        let correct: u64 = (0..self.categories).map(|c| self.get(c, c) as u64).sum();
        correct as f32 / total as f32
    }

    pub fn per_class(&self) -> Vec<ClassStats> {
        let k = self.categories;
        (0..k)
            .map(|class| {
                let tp = self.get(class, class) as f32;
                let support: u32 = (0..k).map(|j| self.get(class, j)).sum();
                let predicted: u32 = (0..k).map(|i| self.get(i, class)).sum();
                let precision = if predicted == 0 { 0.0 } else { tp / predicted as f32 };
                let recall = if support == 0 { 0.0 } else { tp / support as f32 };
                ClassStats {
                    precision,
                    recall,
                    support,
                }
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassStats {
    /// `TP / (TP + FP)`.
    pub precision: f32,
    /// `TP / (TP + FN)`.
    pub recall: f32,
    pub support: u32,
}

/// Current category assignments scored against ground truth.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Evaluation {
    pub matrix: ConfusionMatrix,
    pub accuracy: f32,
    pub per_class: Vec<ClassStats>,
}

impl Evaluation {
    pub fn from_matrix(matrix: ConfusionMatrix) -> Self {
        Self {
            accuracy: matrix.accuracy(),
            per_class: matrix.per_class(),
            matrix,
        }
    }

    /// Number of documents scored.
    pub fn evaluated(&self) -> u64 {
        self.matrix.total()
    }
}
