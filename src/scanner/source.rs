//! Candidate acquisition: where the filenames to probe come from.

use crate::config::is_http_location;
use crate::error::ApiError;
use crate::manifest::{parse_manifest, ParsedManifest};
use async_trait::async_trait;
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

/// What a manifest source produced.
#[derive(Debug, Clone)]
pub enum ManifestLoad {
    /// The manifest exists and parsed; it may be empty.
    Loaded(ParsedManifest),
    /// The manifest does not exist at its location.
    Absent,
}

/// Loads the build-time manifest.
///
/// `Err` means the candidate set cannot be determined and fails the whole scan.
#[async_trait]
pub trait ManifestSource: Send + Sync {
    async fn load(&self) -> Result<ManifestLoad, ApiError>;

    fn describe(&self) -> String;
}

/// Manifest fetched over HTTP. 404 is `Absent`; any other non-2xx is an error.
pub struct HttpManifestSource {
    client: reqwest::Client,
    url: String,
}

impl HttpManifestSource {
    pub fn new(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

#[async_trait]
impl ManifestSource for HttpManifestSource {
    async fn load(&self) -> Result<ManifestLoad, ApiError> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| ApiError::ManifestError(format!("fetch {} failed: {}", self.url, e)))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            debug!(url = %self.url, "Manifest not found");
            return Ok(ManifestLoad::Absent);
        }
        if !status.is_success() {
            return Err(ApiError::ManifestError(format!(
                "fetch {} returned {}",
                self.url, status
            )));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| ApiError::ManifestError(format!("read {} failed: {}", self.url, e)))?;
        Ok(ManifestLoad::Loaded(parse_manifest(&body)?))
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}

/// Manifest read from the local filesystem. A missing file is `Absent`.
pub struct FileManifestSource {
    path: PathBuf,
}

impl FileManifestSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl ManifestSource for FileManifestSource {
    async fn load(&self) -> Result<ManifestLoad, ApiError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(ManifestLoad::Loaded(parse_manifest(&bytes)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(ManifestLoad::Absent),
            Err(e) => Err(ApiError::ManifestError(format!(
                "read {} failed: {}",
                self.path.display(),
                e
            ))),
        }
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Pick the source implementation for a configured location.
pub fn manifest_source(location: &str, client: reqwest::Client) -> Arc<dyn ManifestSource> {
    if is_http_location(location) {
        Arc::new(HttpManifestSource::new(client, location))
    } else {
        Arc::new(FileManifestSource::new(location))
    }
}

/// Where a scan's candidates came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CandidateOrigin {
    Manifest,
    Fallback,
}

/// Ordered, de-duplicated candidate filenames for one scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidatePlan {
    pub candidates: Vec<String>,
    pub origin: CandidateOrigin,
}

/// A non-empty manifest wins; an empty or absent one yields the fallback list.
pub fn resolve_candidates(load: ManifestLoad, fallback: &[String]) -> CandidatePlan {
    let (names, origin) = match load {
        ManifestLoad::Loaded(parsed) if !parsed.entries.is_empty() => {
            (parsed.filenames(), CandidateOrigin::Manifest)
        }
        ManifestLoad::Loaded(_) => (fallback.to_vec(), CandidateOrigin::Fallback),
        ManifestLoad::Absent => {
            info!(fallback = fallback.len(), "Manifest absent, using fallback candidates");
            (fallback.to_vec(), CandidateOrigin::Fallback)
        }
    };

    let mut seen = HashSet::new();
    let candidates = names
        .into_iter()
        .filter(|name| !name.trim().is_empty() && seen.insert(name.clone()))
        .collect();

    CandidatePlan { candidates, origin }
}
