//! Flat export of the assignment map: one `title, bucket` line per document.
//!
//! Lines are joined with `\n` with no trailing newline. Backslashes, newlines
//! and carriage returns in titles are escaped so that a file always parses
//! back to the records that produced it.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("line {line}: {reason}")]
    Malformed { line: usize, reason: String },
}

/// One exported row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportRecord {
    pub title: String,
    /// Flat bucket id (`0..2k`).
    pub bucket: usize,
}

pub fn render(records: &[ExportRecord]) -> String {
    records
        .iter()
        .map(|r| format!("{}, {}", escape(&r.title), r.bucket))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Write `records` to `path`, replacing any previous contents.
pub fn write_file(path: &Path, records: &[ExportRecord]) -> Result<(), ExportError> {
    std::fs::write(path, render(records))?;
    Ok(())
}

pub fn parse(text: &str) -> Result<Vec<ExportRecord>, ExportError> {
    let mut records = Vec::new();
    for (i, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let (title, bucket) = line.rsplit_once(',').ok_or_else(|| ExportError::Malformed {
            line: i + 1,
            reason: "missing ',' separator".into(),
        })?;
        let bucket = bucket
            .trim()
            .parse::<usize>()
            .map_err(|e| ExportError::Malformed {
                line: i + 1,
                reason: format!("bad bucket id {:?}: {e}", bucket.trim()),
            })?;
        records.push(ExportRecord {
            title: unescape(title),
            bucket,
        });
    }
    Ok(records)
}

pub fn read_file(path: &Path) -> Result<Vec<ExportRecord>, ExportError> {
    let text = std::fs::read_to_string(path)?;
    parse(&text)
}

fn escape(title: &str) -> String {
    let mut out = String::with_capacity(title.len());
    for c in title.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            c => out.push(c),
        }
    }
    out
}

fn unescape(title: &str) -> String {
    let mut out = String::with_capacity(title.len());
    let mut chars = title.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}
