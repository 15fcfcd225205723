//! Bucket numbering for a session with `k` categories.
//!
//! Bucket ids `0..k` are the uncategorized (candidate) slots, one per category.
//! Bucket ids `k..2k` are the confirmed slots whose contents train the next model.
//! A confirmed bucket `k + c` and its uncategorized twin `c` share category `c`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::CoreError;

/// Category index in `0..k`.
pub type Category = usize;

/// Placement of a document: category crossed with confirmation status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "status", content = "category", rename_all = "snake_case")]
pub enum Bucket {
    /// Automatically assigned or not yet reviewed.
    Uncategorized(Category),
    /// Manually verified; used as ground truth for the next retrain.
    Confirmed(Category),
}

impl Bucket {
    /// Decode a flat bucket id for a session with `categories` categories.
    pub fn from_id(id: usize, categories: usize) -> Result<Self, CoreError> {
        if id < categories {
            Ok(Self::Uncategorized(id))
        } else if id < categories.saturating_mul(2) {
            Ok(Self::Confirmed(id - categories))
        } else {
            Err(CoreError::InvalidBucket {
                bucket: id,
                bucket_count: categories.saturating_mul(2),
            })
        }
    }

    /// Flat bucket id: uncategorized slots first, then confirmed slots.
    pub fn id(self, categories: usize) -> usize {
        match self {
            Self::Uncategorized(c) => c,
            Self::Confirmed(c) => categories.saturating_add(c),
        }
    }

    pub fn category(self) -> Category {
        match self {
            Self::Uncategorized(c) | Self::Confirmed(c) => c,
        }
    }

    pub fn is_confirmed(self) -> bool {
        matches!(self, Self::Confirmed(_))
    }

    /// Drop confirmation status, keeping the category.
    pub fn demoted(self) -> Self {
        Self::Uncategorized(self.category())
    }

    /// Every bucket of a session, in id order.
    pub fn all(categories: usize) -> impl Iterator<Item = Bucket> {
        (0..categories)
            .map(Self::Uncategorized)
            .chain((0..categories).map(Self::Confirmed))
    }

    pub fn status_str(self) -> &'static str {
        match self {
            Self::Uncategorized(_) => "uncategorized",
            Self::Confirmed(_) => "confirmed",
        }
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.status_str(), self.category())
    }
}
