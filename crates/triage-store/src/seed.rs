//! JSON Lines seed import.
//!
//! One object per line: `{"id": .., "title": .., "body": .., "label": 2, "seed": true}`.
//! `label` and `seed` are optional; `id` may be a string or an integer.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;
use triage_core::{Category, Document};

use crate::StoreError;

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Number(u64),
}

impl From<RawId> for String {
    fn from(id: RawId) -> Self {
        match id {
            RawId::Text(s) => s,
            RawId::Number(n) => n.to_string(),
        }
    }
}

/// One row of a seed file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedRecord {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub label: Option<Category>,
    #[serde(default)]
    pub seed: bool,
}

fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    RawId::deserialize(deserializer).map(String::from)
}

impl From<SeedRecord> for Document {
    fn from(r: SeedRecord) -> Self {
        Document::new(r.id, r.title, r.body, r.label, r.seed)
    }
}

/// Parse JSON Lines text. Blank lines are skipped; errors carry 1-based line numbers.
pub fn parse_seed_jsonl(text: &str) -> Result<Vec<Document>, StoreError> {
    let mut documents = Vec::new();
    for (i, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let record: SeedRecord = serde_json::from_str(line).map_err(|source| StoreError::Json {
            line: i + 1,
            source,
        })?;
        documents.push(record.into());
    }
    Ok(documents)
}

pub fn read_seed_jsonl(path: &Path) -> Result<Vec<Document>, StoreError> {
    let text = std::fs::read_to_string(path)?;
    let documents = parse_seed_jsonl(&text)?;
    info!(
        path = %path.display(),
        documents = documents.len(),
        seeds = documents.iter().filter(|d| d.seed).count(),
        "read seed file"
    );
    Ok(documents)
}
