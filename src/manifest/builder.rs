//! Manifest builder: scans the source directory and writes the JSON index.

use super::entry::ManifestEntry;
use crate::config::ManifestConfig;
use crate::error::{ApiError, StorageError};
use crate::naming::matches_extension;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Outcome of one build.
#[derive(Debug, Clone, Serialize)]
pub struct BuildReport {
    pub entries: Vec<ManifestEntry>,
    pub output_path: PathBuf,
    /// Hex BLAKE3 digest of the written bytes.
    pub fingerprint: String,
    /// Whether the source directory had to be created.
    pub created_source_dir: bool,
}

/// Builds the manifest for one source directory.
#[derive(Debug, Clone)]
pub struct ManifestBuilder {
    source_dir: PathBuf,
    output_path: PathBuf,
    url_prefix: String,
    extensions: Vec<String>,
}

impl ManifestBuilder {
    pub fn new(config: &ManifestConfig) -> Self {
        Self {
            source_dir: config.source_dir.clone(),
            output_path: config.output_path.clone(),
            url_prefix: config.url_prefix.clone(),
            extensions: config.extensions.clone(),
        }
    }

    pub fn source_dir(&self) -> &Path {
        &self.source_dir
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    /// Ensure the source directory exists, creating it when missing.
    ///
    /// Returns `true` if it was created.
    pub fn ensure_source_dir(&self) -> Result<bool, ApiError> {
        if self.source_dir.is_dir() {
            return Ok(false);
        }
        fs::create_dir_all(&self.source_dir)
            .map_err(|e| StorageError::at(&self.source_dir, e))?;
        info!(dir = %self.source_dir.display(), "Created missing document directory");
        Ok(true)
    }

    /// Qualifying entries of the source directory, sorted by filename.
    ///
    /// Only immediate regular files (or symlinks to them) are considered.
    pub fn collect(&self) -> Result<Vec<ManifestEntry>, ApiError> {
        let mut names = Vec::new();
        for entry in WalkDir::new(&self.source_dir).min_depth(1).max_depth(1) {
            let entry = entry.map_err(|e| {
                let path = e
                    .path()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| self.source_dir.clone());
                StorageError::at(path, std::io::Error::from(e))
            })?;
            let is_file = entry.file_type().is_file()
                || (entry.path_is_symlink() && entry.path().is_file());
            if !is_file {
                continue;
            }
            let Some(name) = entry.file_name().to_str() else {
                warn!(path = %entry.path().display(), "Skipping non-UTF-8 filename");
                continue;
            };
            if matches_extension(name, &self.extensions) {
                names.push(name.to_string());
            } else {
                debug!(file = %name, "Ignoring non-qualifying file");
            }
        }
        names.sort();

        Ok(names
            .iter()
            .map(|name| ManifestEntry::from_filename(name, &self.url_prefix))
            .collect())
    }

    /// Pretty-printed JSON for `entries` (2-space indent, no trailing newline).
    pub fn render(entries: &[ManifestEntry]) -> Result<String, ApiError> {
        serde_json::to_string_pretty(entries)
            .map_err(|e| StorageError::Serialization(e.to_string()).into())
    }

    /// Run a full build: ensure the directory, collect, and overwrite the manifest.
    pub fn build(&self) -> Result<BuildReport, ApiError> {
        let created_source_dir = self.ensure_source_dir()?;
        let entries = self.collect()?;
        let rendered = Self::render(&entries)?;

        if let Some(parent) = self.output_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| StorageError::at(parent, e))?;
            }
        }
        fs::write(&self.output_path, rendered.as_bytes())
            .map_err(|e| StorageError::at(&self.output_path, e))?;

        let fingerprint = hex::encode(blake3::hash(rendered.as_bytes()).as_bytes());
        info!(
            entries = entries.len(),
            output = %self.output_path.display(),
            fingerprint = %&fingerprint[..12],
            "Manifest written"
        );

        Ok(BuildReport {
            entries,
            output_path: self.output_path.clone(),
            fingerprint,
            created_source_dir,
        })
    }
}
