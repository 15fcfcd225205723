use triage_core::{Category, ClassifierError, TextClassifier};

/// Test double: predicts a scripted category per document. `fail_predict`
/// makes prediction fail after a successful fit.
pub struct FakeClassifier {
    pub predictions: Vec<Category>,
    pub fail_predict: bool,
    trained: bool,
}

impl FakeClassifier {
    pub fn new(predictions: Vec<Category>) -> Self {
        Self {
            predictions,
            fail_predict: false,
            trained: false,
        }
    }
}

impl TextClassifier for FakeClassifier {
    fn fit(
        &mut self,
        texts: &[&str],
        _labels: &[Category],
        _categories: usize,
    ) -> Result<(), ClassifierError> {
        if texts.is_empty() {
            return Err(ClassifierError::InsufficientData {
                got: texts.len(),
                need: 1,
            });
        }
        self.trained = true;
        Ok(())
    }

    fn predict(&mut self, texts: &[&str]) -> Result<Vec<Category>, ClassifierError> {
        if self.fail_predict || !self.trained {
            return Err(ClassifierError::ModelNotTrained);
        }
        Ok(texts
            .iter()
            .enumerate()
            .map(|(i, _)| self.predictions.get(i).copied().unwrap_or(0))
            .collect())
    }

    fn name(&self) -> &str {
        "fake"
    }
}
