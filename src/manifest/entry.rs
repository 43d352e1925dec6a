//! Manifest entry schema and the validating parser used at the read boundary.

use crate::error::ApiError;
use crate::naming::derive_title;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::warn;

/// One qualifying document as recorded by the builder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    /// Exact on-disk file name; unique within a manifest.
    pub filename: String,
    pub title: String,
    /// URL path the file is served under (raw, not percent-encoded).
    pub path: String,
}

impl ManifestEntry {
    pub fn from_filename(filename: &str, url_prefix: &str) -> Self {
        Self {
            filename: filename.to_string(),
            title: derive_title(filename),
            path: join_url_path(url_prefix, filename),
        }
    }
}

/// `prefix` + `/` + `filename`, without doubling the separator.
pub fn join_url_path(prefix: &str, filename: &str) -> String {
    format!("{}/{}", prefix.trim_end_matches('/'), filename)
}

/// Loosely-typed entry as it may appear on the wire.
#[derive(Debug, Deserialize)]
struct RawEntry {
    filename: String,
    #[serde(default)]
    title: Option<String>,
    #[serde(default, alias = "pdfPath")]
    path: Option<String>,
}

/// Result of parsing a manifest document.
#[derive(Debug, Clone, Default)]
pub struct ParsedManifest {
    pub entries: Vec<ManifestEntry>,
    /// One human-readable reason per rejected element.
    pub skipped: Vec<String>,
}

impl ParsedManifest {
    pub fn filenames(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.filename.clone()).collect()
    }
}

/// Parse a manifest document.
///
/// The top level must be a JSON array. Elements are validated one by one:
/// anything without a non-empty string `filename` is skipped, as are later
/// duplicates of a filename. A missing `title` is re-derived and a missing
/// `path` falls back to the bare filename.
pub fn parse_manifest(bytes: &[u8]) -> Result<ParsedManifest, ApiError> {
    let value: serde_json::Value = serde_json::from_slice(bytes)
        .map_err(|e| ApiError::ManifestError(format!("invalid JSON: {}", e)))?;
    let items = match value {
        serde_json::Value::Array(items) => items,
        other => {
            return Err(ApiError::ManifestError(format!(
                "expected a JSON array, found {}",
                json_kind(&other)
            )))
        }
    };

    let mut parsed = ParsedManifest::default();
    let mut seen = HashSet::new();
    for (index, item) in items.into_iter().enumerate() {
        let raw: RawEntry = match serde_json::from_value(item) {
            Ok(raw) => raw,
            Err(e) => {
                parsed.skipped.push(format!("entry {}: {}", index, e));
                continue;
            }
        };
        if raw.filename.trim().is_empty() {
            parsed.skipped.push(format!("entry {}: empty filename", index));
            continue;
        }
        if !seen.insert(raw.filename.clone()) {
            parsed
                .skipped
                .push(format!("entry {}: duplicate filename {}", index, raw.filename));
            continue;
        }
        let title = raw.title.unwrap_or_else(|| derive_title(&raw.filename));
        let path = raw.path.unwrap_or_else(|| raw.filename.clone());
        parsed.entries.push(ManifestEntry {
            filename: raw.filename,
            title,
            path,
        });
    }

    for reason in &parsed.skipped {
        warn!(reason = %reason, "Skipped malformed manifest entry");
    }

    Ok(parsed)
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}
