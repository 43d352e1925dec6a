//! Configuration
//!
//! Typed settings loaded once at startup and passed explicitly to the manifest
//! builder, the dev-mode watcher, and the document watcher.
//!
//! Precedence (lowest to highest): built-in defaults, global file
//! (`<config dir>/docket/config.toml`), project file (`<root>/docket.toml`),
//! environment (`DOCKET__SECTION__KEY`).

mod facade;
mod merge;
mod sources;

pub use facade::ConfigLoader;

use crate::error::ApiError;
use crate::logging::LoggingConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Project config file name looked up under the root directory.
pub const PROJECT_CONFIG_FILE: &str = "docket.toml";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocketConfig {
    #[serde(default)]
    pub manifest: ManifestConfig,

    #[serde(default)]
    pub scanner: ScannerConfig,

    #[serde(default)]
    pub watch: WatchSettings,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Manifest builder settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestConfig {
    /// Directory scanned for qualifying documents
    #[serde(default = "default_source_dir")]
    pub source_dir: PathBuf,

    /// Where the JSON manifest is written
    #[serde(default = "default_output_path")]
    pub output_path: PathBuf,

    /// Public URL prefix the source directory is served under
    #[serde(default = "default_url_prefix")]
    pub url_prefix: String,

    /// Qualifying extensions, matched case-insensitively
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
}

fn default_source_dir() -> PathBuf {
    PathBuf::from("public/projects/finance/protected")
}

fn default_output_path() -> PathBuf {
    PathBuf::from("src/generated/financeManifest.json")
}

fn default_url_prefix() -> String {
    "/projects/finance/protected".to_string()
}

fn default_extensions() -> Vec<String> {
    vec!["pdf".to_string()]
}

impl Default for ManifestConfig {
    fn default() -> Self {
        Self {
            source_dir: default_source_dir(),
            output_path: default_output_path(),
            url_prefix: default_url_prefix(),
            extensions: default_extensions(),
        }
    }
}

/// Document watcher settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScannerConfig {
    /// Base URL each candidate filename is appended to
    #[serde(default = "default_watch_url")]
    pub watch_url: String,

    /// Manifest location: an http(s) URL or a filesystem path
    #[serde(default = "default_manifest_location")]
    pub manifest_location: String,

    /// Delay between periodic scans
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,

    /// Back off on consecutive scan failures instead of a fixed interval
    #[serde(default)]
    pub backoff: bool,

    /// Upper bound on the backed-off delay
    #[serde(default = "default_max_backoff_secs")]
    pub max_backoff_secs: u64,

    #[serde(default = "default_probe_timeout_ms")]
    pub probe_timeout_ms: u64,

    #[serde(default = "default_max_concurrent_probes")]
    pub max_concurrent_probes: usize,

    /// Candidates used when the manifest is absent or empty
    #[serde(default)]
    pub fallback: Vec<String>,

    /// URL prefix for per-document cover images
    #[serde(default = "default_covers_prefix")]
    pub covers_prefix: String,

    /// Cover used when a document has no image of its own
    #[serde(default = "default_default_cover")]
    pub default_cover: String,
}

fn default_watch_url() -> String {
    "http://localhost:5173/projects/finance/protected".to_string()
}

fn default_manifest_location() -> String {
    "http://localhost:5173/src/generated/financeManifest.json".to_string()
}

fn default_interval_secs() -> u64 {
    30
}

fn default_max_backoff_secs() -> u64 {
    300
}

fn default_probe_timeout_ms() -> u64 {
    5000
}

fn default_max_concurrent_probes() -> usize {
    4
}

fn default_covers_prefix() -> String {
    "/projects/covers".to_string()
}

fn default_default_cover() -> String {
    "/projects/covers/default-finance.jpg".to_string()
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            watch_url: default_watch_url(),
            manifest_location: default_manifest_location(),
            interval_secs: default_interval_secs(),
            backoff: false,
            max_backoff_secs: default_max_backoff_secs(),
            probe_timeout_ms: default_probe_timeout_ms(),
            max_concurrent_probes: default_max_concurrent_probes(),
            fallback: Vec::new(),
            covers_prefix: default_covers_prefix(),
            default_cover: default_default_cover(),
        }
    }
}

impl ScannerConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }
}

/// Dev-mode directory watch settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchSettings {
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    #[serde(default = "default_batch_window_ms")]
    pub batch_window_ms: u64,
}

fn default_debounce_ms() -> u64 {
    100
}

fn default_batch_window_ms() -> u64 {
    50
}

impl Default for WatchSettings {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            batch_window_ms: default_batch_window_ms(),
        }
    }
}

pub(crate) fn is_http_location(location: &str) -> bool {
    location.starts_with("http://") || location.starts_with("https://")
}

impl DocketConfig {
    /// Resolve relative filesystem paths against `root`.
    pub fn resolve_paths(&mut self, root: &Path) {
        if self.manifest.source_dir.is_relative() {
            self.manifest.source_dir = root.join(&self.manifest.source_dir);
        }
        if self.manifest.output_path.is_relative() {
            self.manifest.output_path = root.join(&self.manifest.output_path);
        }
        if !is_http_location(&self.scanner.manifest_location) {
            let path = PathBuf::from(&self.scanner.manifest_location);
            if path.is_relative() {
                self.scanner.manifest_location = root.join(path).to_string_lossy().to_string();
            }
        }
    }

    /// Validate settings that would otherwise fail deep inside a scan or build.
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.manifest.extensions.iter().all(|e| e.trim_start_matches('.').is_empty()) {
            return Err(ApiError::ConfigError(
                "manifest.extensions must name at least one extension".to_string(),
            ));
        }
        if self.scanner.interval_secs == 0 {
            return Err(ApiError::ConfigError(
                "scanner.interval_secs must be greater than zero".to_string(),
            ));
        }
        if self.scanner.max_concurrent_probes == 0 {
            return Err(ApiError::ConfigError(
                "scanner.max_concurrent_probes must be at least 1".to_string(),
            ));
        }
        if self.scanner.max_backoff_secs < self.scanner.interval_secs {
            return Err(ApiError::ConfigError(format!(
                "scanner.max_backoff_secs ({}) must not be below scanner.interval_secs ({})",
                self.scanner.max_backoff_secs, self.scanner.interval_secs
            )));
        }
        reqwest::Url::parse(&self.scanner.watch_url).map_err(|e| {
            ApiError::ConfigError(format!(
                "Invalid scanner.watch_url {}: {}",
                self.scanner.watch_url, e
            ))
        })?;
        Ok(())
    }
}
