//! Document Views
//!
//! Presentation metadata derived from a detected file's name: category,
//! embedded date, description, icon, and cover image location. Everything
//! here is a pure function of the filename except the cover existence check.

use crate::config::ScannerConfig;
use crate::error::ApiError;
use crate::naming::strip_extension;
use crate::scanner::{ProbeOutcome, Prober};
use crate::types::{DetectedFile, DocumentKind};
use chrono::{DateTime, NaiveDate, Utc};
use futures::stream::{self, StreamExt};
use reqwest::Url;
use serde::Serialize;
use std::fmt;
use tracing::debug;

/// Category inferred from filename keywords.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DocumentCategory {
    #[serde(rename = "CV")]
    Cv,
    Portfolio,
    Analysis,
    Report,
    Presentation,
    #[serde(rename = "Finance Document")]
    FinanceDocument,
}

impl DocumentCategory {
    /// Keyword table, checked in order; first match wins.
    const KEYWORDS: [(&'static str, DocumentCategory); 5] = [
        ("cv", DocumentCategory::Cv),
        ("portfolio", DocumentCategory::Portfolio),
        ("analysis", DocumentCategory::Analysis),
        ("report", DocumentCategory::Report),
        ("presentation", DocumentCategory::Presentation),
    ];

    pub fn from_filename(filename: &str) -> Self {
        let lower = filename.to_lowercase();
        Self::KEYWORDS
            .iter()
            .find(|(keyword, _)| lower.contains(keyword))
            .map(|(_, category)| *category)
            .unwrap_or(DocumentCategory::FinanceDocument)
    }

    pub fn label(&self) -> &'static str {
        match self {
            DocumentCategory::Cv => "CV",
            DocumentCategory::Portfolio => "Portfolio",
            DocumentCategory::Analysis => "Analysis",
            DocumentCategory::Report => "Report",
            DocumentCategory::Presentation => "Presentation",
            DocumentCategory::FinanceDocument => "Finance Document",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            DocumentCategory::Cv => {
                "Professional finance curriculum vitae showcasing experience and achievements"
            }
            DocumentCategory::Portfolio => {
                "Comprehensive collection of finance projects and case studies"
            }
            DocumentCategory::Analysis => {
                "Detailed financial analysis with insights and recommendations"
            }
            DocumentCategory::Report => "Professional finance report with findings and conclusions",
            DocumentCategory::Presentation => {
                "Finance presentation with key insights and data visualization"
            }
            DocumentCategory::FinanceDocument => {
                "Professional finance document with confidential content"
            }
        }
    }
}

impl fmt::Display for DocumentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentMetadata {
    pub category: DocumentCategory,
    pub date: Option<NaiveDate>,
}

/// Category and embedded `DDMMYYYY` date for `filename`.
pub fn extract_metadata(filename: &str) -> DocumentMetadata {
    DocumentMetadata {
        category: DocumentCategory::from_filename(filename),
        date: embedded_date(strip_extension(filename)),
    }
}

/// First run of eight ASCII digits read as day, month, year.
///
/// Impossible dates (`31022024`) yield `None`.
fn embedded_date(stem: &str) -> Option<NaiveDate> {
    let bytes = stem.as_bytes();
    let start = bytes
        .windows(8)
        .position(|w| w.iter().all(u8::is_ascii_digit))?;
    let digits = &stem[start..start + 8];

    let day: u32 = digits[0..2].parse().ok()?;
    let month: u32 = digits[2..4].parse().ok()?;
    let year: i32 = digits[4..8].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

pub fn icon(kind: DocumentKind) -> &'static str {
    match kind {
        DocumentKind::Pdf => "📄",
        DocumentKind::Ppt | DocumentKind::Pptx => "📊",
        DocumentKind::Doc | DocumentKind::Docx => "📝",
    }
}

/// Site-relative cover image path: `{covers_prefix}/{stem}.jpg`.
pub fn cover_path(filename: &str, covers_prefix: &str) -> String {
    format!(
        "{}/{}.jpg",
        covers_prefix.trim_end_matches('/'),
        strip_extension(filename)
    )
}

/// HEAD-check a cover path relative to `site`. Any failure means no cover.
pub async fn check_cover_exists(prober: &dyn Prober, site: &Url, cover_path: &str) -> bool {
    let url = match site.join(cover_path) {
        Ok(url) => url,
        Err(e) => {
            debug!(cover = %cover_path, error = %e, "Cannot resolve cover URL");
            return false;
        }
    };
    matches!(prober.probe(&url).await, ProbeOutcome::Found(_))
}

/// Cover locations checked against a site origin.
#[derive(Debug, Clone)]
pub struct CoverSettings {
    /// Any URL on the site; cover paths are resolved against its origin
    pub site: Url,
    pub covers_prefix: String,
    pub default_cover: String,
}

impl CoverSettings {
    pub fn from_config(config: &ScannerConfig) -> Result<Self, ApiError> {
        let site = Url::parse(&config.watch_url).map_err(|e| {
            ApiError::ConfigError(format!("Invalid watch URL {}: {}", config.watch_url, e))
        })?;
        Ok(Self {
            site,
            covers_prefix: config.covers_prefix.clone(),
            default_cover: config.default_cover.clone(),
        })
    }
}

/// The document's own cover when the site serves it, else the default.
pub async fn resolve_cover_path(
    prober: &dyn Prober,
    covers: &CoverSettings,
    filename: &str,
) -> String {
    let candidate = cover_path(filename, &covers.covers_prefix);
    if check_cover_exists(prober, &covers.site, &candidate).await {
        candidate
    } else {
        debug!(cover = %candidate, "Cover missing, using default");
        covers.default_cover.clone()
    }
}

/// Everything a renderer needs to show one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentCard {
    pub name: String,
    pub display_name: String,
    #[serde(rename = "type")]
    pub kind: DocumentKind,
    pub icon: &'static str,
    pub category: DocumentCategory,
    pub date: Option<NaiveDate>,
    pub description: &'static str,
    pub cover_path: String,
    pub size: u64,
    pub last_modified: DateTime<Utc>,
    pub path: String,
}

impl DocumentCard {
    pub fn from_file(file: &DetectedFile, covers_prefix: &str) -> Self {
        let metadata = extract_metadata(&file.name);
        Self {
            name: file.name.clone(),
            display_name: file.display_name.clone(),
            kind: file.kind,
            icon: icon(file.kind),
            category: metadata.category,
            date: metadata.date,
            description: metadata.category.description(),
            cover_path: cover_path(&file.name, covers_prefix),
            size: file.size,
            last_modified: file.last_modified,
            path: file.path.clone(),
        }
    }

    /// Card with its cover checked against the site.
    pub async fn from_file_checked(
        file: &DetectedFile,
        prober: &dyn Prober,
        covers: &CoverSettings,
    ) -> Self {
        let mut card = Self::from_file(file, &covers.covers_prefix);
        card.cover_path = resolve_cover_path(prober, covers, &file.name).await;
        card
    }

    /// Cards for `files` in order, checking at most `concurrency` covers at once.
    pub async fn build_all(
        files: &[DetectedFile],
        prober: &dyn Prober,
        covers: &CoverSettings,
        concurrency: usize,
    ) -> Vec<Self> {
        stream::iter(files)
            .map(|file| Self::from_file_checked(file, prober, covers))
            .buffered(concurrency.max(1))
            .collect()
            .await
    }

    /// Size in whole kilobytes, rounded.
    pub fn size_kb(&self) -> u64 {
        self.size.saturating_add(512) / 1024
    }
}
