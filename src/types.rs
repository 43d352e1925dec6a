//! Core types shared by the manifest builder and the document watcher.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed set of document kinds a detected file can have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Pdf,
    Ppt,
    Pptx,
    Doc,
    Docx,
}

impl DocumentKind {
    pub const ALL: [DocumentKind; 5] = [
        DocumentKind::Pdf,
        DocumentKind::Ppt,
        DocumentKind::Pptx,
        DocumentKind::Doc,
        DocumentKind::Docx,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentKind::Pdf => "pdf",
            DocumentKind::Ppt => "ppt",
            DocumentKind::Pptx => "pptx",
            DocumentKind::Doc => "doc",
            DocumentKind::Docx => "docx",
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A candidate confirmed to exist on the file host during one scan cycle.
///
/// Instances are rebuilt on every scan; two scans that see the same file
/// produce equal but distinct values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectedFile {
    /// Source filename as listed in the manifest.
    pub name: String,
    /// Resolved URL the file was probed at.
    pub path: String,
    pub display_name: String,
    #[serde(rename = "type")]
    pub kind: DocumentKind,
    /// Byte length from `Content-Length`, `0` when absent.
    pub size: u64,
    /// From `Last-Modified`, or the probe time when absent.
    pub last_modified: DateTime<Utc>,
}
