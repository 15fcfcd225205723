//! Documents under review. Created once at session start and never mutated.

use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::Category;

/// Stable document identity, unique within a session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocId(String);

impl DocId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for DocId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for DocId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for DocId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// A text document to be triaged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocId,
    pub title: String,
    pub body: String,
    /// Ground-truth category, when known.
    pub label: Option<Category>,
    /// Part of the initial labelled seed; placed directly into its confirmed bucket.
    pub seed: bool,
}

impl Document {
    pub fn new(
        id: impl Into<DocId>,
        title: impl Into<String>,
        body: impl Into<String>,
        label: Option<Category>,
        seed: bool,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            body: body.into(),
            label,
            seed,
        }
    }

    /// One-line rendering for list views: `label|title|body`, or `title|body`
    /// when no ground truth is known. Body newlines are escaped.
    pub fn display_line(&self) -> String {
        let body = self.body.replace('\n', "\\n");
        match self.label {
            Some(label) => format!("{label}|{}|{body}", self.title),
            None => format!("{}|{body}", self.title),
        }
    }
}
