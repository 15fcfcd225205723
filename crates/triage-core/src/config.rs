//! Validated per-session settings.

use crate::{Category, CoreError};

/// Number of categories and their optional display names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    categories: usize,
    names: Vec<String>,
}

impl SessionConfig {
    /// `names`, when non-empty, must have exactly `categories` entries.
    pub fn new(categories: usize, names: Vec<String>) -> Result<Self, CoreError> {
        if categories == 0 {
            return Err(CoreError::InvalidConfig(
                "at least one category is required".into(),
            ));
        }
        if !names.is_empty() && names.len() != categories {
            return Err(CoreError::InvalidConfig(format!(
                "{} category names given for {categories} categories",
                names.len()
            )));
        }
        Ok(Self { categories, names })
    }

    pub fn categories(&self) -> usize {
        self.categories
    }

    pub fn bucket_count(&self) -> usize {
        self.categories * 2
    }

    /// Display name of a category; falls back to its index.
    pub fn name(&self, category: Category) -> String {
        self.names
            .get(category)
            .cloned()
            .unwrap_or_else(|| category.to_string())
    }
}
