//! The contract every trainable text classifier satisfies.
//!
//! Implementations live outside this crate. The review loop only sees this
//! trait, so tests can substitute a scripted classifier.

use thiserror::Error;

use crate::Category;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClassifierError {
    /// Too few training examples to fit anything.
    #[error("insufficient training data: got {got} examples, need at least {need}")]
    InsufficientData { got: usize, need: usize },

    #[error("predict called before a successful fit")]
    ModelNotTrained,

    #[error("invalid training input: {0}")]
    InvalidInput(String),

    /// The classifier returned something that breaks this contract.
    #[error("invalid classifier output: {0}")]
    InvalidOutput(String),

    #[error("classifier backend error: {0}")]
    Backend(String),
}

/// A text classifier with a fit/predict lifecycle.
///
/// `predict` must return exactly one category in `0..categories` per input, in
/// input order. Results may differ between fits on identical input.
pub trait TextClassifier {
    /// Train on `texts[i]` labelled `labels[i]`. A failed fit keeps any
    /// previously trained model.
    fn fit(
        &mut self,
        texts: &[&str],
        labels: &[Category],
        categories: usize,
    ) -> Result<(), ClassifierError>;

    fn predict(&mut self, texts: &[&str]) -> Result<Vec<Category>, ClassifierError>;

    /// Short human-readable name, used in logs.
    fn name(&self) -> &str {
        "classifier"
    }
}

impl<T: TextClassifier + ?Sized> TextClassifier for Box<T> {
    fn fit(
        &mut self,
        texts: &[&str],
        labels: &[Category],
        categories: usize,
    ) -> Result<(), ClassifierError> {
        (**self).fit(texts, labels, categories)
    }

    fn predict(&mut self, texts: &[&str]) -> Result<Vec<Category>, ClassifierError> {
        (**self).predict(texts)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Check the arguments of [`TextClassifier::fit`] against the contract.
pub fn validate_training_input(
    texts: &[&str],
    labels: &[Category],
    categories: usize,
) -> Result<(), ClassifierError> {
    if texts.len() != labels.len() {
        return Err(ClassifierError::InvalidInput(format!(
            "{} texts but {} labels",
            texts.len(),
            labels.len()
        )));
    }
    if categories == 0 {
        return Err(ClassifierError::InvalidInput("zero categories".into()));
    }
    if let Some(&bad) = labels.iter().find(|&&l| l >= categories) {
        return Err(ClassifierError::InvalidInput(format!(
            "label {bad} outside 0..{categories}"
        )));
    }
    if texts.is_empty() {
        return Err(ClassifierError::InsufficientData { got: 0, need: 1 });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_well_formed_input() {
        assert!(validate_training_input(&["a", "b"], &[0, 1], 2).is_ok());
    }

    #[test]
    fn rejects_length_mismatch() {
        let err = validate_training_input(&["a"], &[0, 1], 2).unwrap_err();
        assert!(matches!(err, ClassifierError::InvalidInput(_)));
    }

    #[test]
    fn rejects_label_out_of_range() {
        let err = validate_training_input(&["a"], &[3], 3).unwrap_err();
        assert!(matches!(err, ClassifierError::InvalidInput(_)));
    }

    #[test]
    fn empty_training_set_is_insufficient() {
        let err = validate_training_input(&[], &[], 3).unwrap_err();
        assert_eq!(err, ClassifierError::InsufficientData { got: 0, need: 1 });
    }
}
