//! JSON import/export document format.
//!
//! # Responsibility
//! - Serialize the collection as a pretty-printed array of records.
//! - Parse user-supplied documents, dropping invalid elements.
//! - Name export files with a UTC timestamp.
//!
//! # Invariants
//! - A document that is not valid JSON or not a top-level array is rejected
//!   whole; nothing is imported from it.
//! - Element-level validation mirrors startup load: a string, non-blank
//!   `text` is required; a non-string `category` falls back to the default.

use crate::model::quote::{normalize_category, QuoteRecord};
use chrono::{DateTime, Utc};
use log::{info, warn};
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

const EXPORT_FILE_PREFIX: &str = "quotes-export";

/// Import/export failures.
#[derive(Debug)]
pub enum ImportError {
    /// Document is not valid JSON.
    Malformed(serde_json::Error),
    /// Document parsed but its top level is not an array.
    NotAList,
    Io(std::io::Error),
}

impl Display for ImportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Malformed(err) => write!(f, "invalid JSON document: {err}"),
            Self::NotAList => write!(f, "imported JSON must be an array of quotes"),
            Self::Io(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ImportError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Malformed(err) => Some(err),
            Self::NotAList => None,
            Self::Io(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for ImportError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

/// Parsed import document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportBatch {
    pub records: Vec<QuoteRecord>,
    /// Elements present in the document but rejected by validation.
    pub dropped: usize,
}

/// Parses an import document, keeping only valid elements.
pub fn parse_import(json: &str) -> Result<ImportBatch, ImportError> {
    let value: Value = serde_json::from_str(json).map_err(ImportError::Malformed)?;
    let Value::Array(items) = value else {
        return Err(ImportError::NotAList);
    };

    let total = items.len();
    let records: Vec<QuoteRecord> = items.iter().filter_map(record_from_value).collect();
    let dropped = total - records.len();
    if dropped > 0 {
        warn!("event=import_parse module=transfer status=partial total={total} dropped={dropped}");
    }
    Ok(ImportBatch { records, dropped })
}

/// Reads and parses an import document from disk.
pub fn read_import(path: impl AsRef<Path>) -> Result<ImportBatch, ImportError> {
    let json = std::fs::read_to_string(path)?;
    parse_import(&json)
}

/// Pretty-prints records as a JSON array.
pub fn export_json(records: &[QuoteRecord]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(records)
}

/// File name for an export taken at `now`, e.g. `quotes-export-20240131-235959.json`.
pub fn export_file_name(now: DateTime<Utc>) -> String {
    format!("{EXPORT_FILE_PREFIX}-{}.json", now.format("%Y%m%d-%H%M%S"))
}

/// Writes an export document into `dir` and returns the created path.
pub fn write_export(
    dir: impl AsRef<Path>,
    records: &[QuoteRecord],
    now: DateTime<Utc>,
) -> Result<PathBuf, ImportError> {
    let json = export_json(records).map_err(ImportError::Malformed)?;
    std::fs::create_dir_all(dir.as_ref())?;
    let path = dir.as_ref().join(export_file_name(now));
    std::fs::write(&path, json)?;
    info!(
        "event=export_write module=transfer status=ok count={}",
        records.len()
    );
    Ok(path)
}

/// Converts one JSON element into a record when it carries a usable `text`.
pub(crate) fn record_from_value(value: &Value) -> Option<QuoteRecord> {
    let object = value.as_object()?;
    let text = object.get("text")?.as_str()?.trim();
    if text.is_empty() {
        return None;
    }
    let category = object
        .get("category")
        .and_then(Value::as_str)
        .map(normalize_category)
        .unwrap_or_else(|| normalize_category(""));
    Some(QuoteRecord::new(text, category))
}
