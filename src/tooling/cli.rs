//! CLI Tooling
//!
//! Command-line interface for building the manifest and scanning the file host.
//! Every command returns its output as a string; the binary decides where it goes.

use crate::config::{ConfigLoader, DocketConfig};
use crate::error::{ApiError, StorageError};
use crate::manifest::{parse_manifest, ManifestBuilder, ManifestWatchConfig, ManifestWatchDaemon};
use crate::scanner::{DocumentWatcher, HttpProber, WatchSnapshot};
use crate::tooling::format::{
    format_build_report_text, format_manifest_text, format_scan_text, format_transition,
};
use crate::views::{CoverSettings, DocumentCard};
use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::json;
use std::path::PathBuf;
use tracing::info;

/// Docket CLI - document discovery for static hosts
#[derive(Parser)]
#[command(name = "docket")]
#[command(about = "Build document manifests and reconcile them against a file host")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Project root; relative config paths resolve against it
    #[arg(long, default_value = ".")]
    pub root: PathBuf,

    /// Configuration file path (replaces global and project config files)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file, file+stderr, both)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (if output includes "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scan the source directory and write the manifest once
    Build {
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Build the manifest, then rebuild it whenever qualifying files change
    Dev {
        /// Quiet period in milliseconds before a batch of changes is rebuilt
        #[arg(long)]
        debounce_ms: Option<u64>,
        /// Batch window in milliseconds
        #[arg(long)]
        batch_window_ms: Option<u64>,
    },
    /// Parse the manifest on disk and list its entries
    Inspect {
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Run one scan cycle against the file host
    Scan {
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Poll the file host and print changes until interrupted
    Watch {
        /// Override the scan interval in seconds
        #[arg(long)]
        interval_secs: Option<u64>,
        /// Stop after this many completed scans
        #[arg(long)]
        cycles: Option<u64>,
    },
}

/// CLI context holding the resolved configuration
pub struct CliContext {
    root: PathBuf,
    config: DocketConfig,
}

impl CliContext {
    /// Create a new CLI context, loading configuration for `root`.
    pub fn new(root: PathBuf, config_path: Option<PathBuf>) -> Result<Self, ApiError> {
        let config = match config_path {
            Some(ref path) => ConfigLoader::load_from_file(path, &root).map_err(|e| {
                ApiError::ConfigError(format!(
                    "Failed to load config from {}: {}",
                    path.display(),
                    e
                ))
            })?,
            None => ConfigLoader::load(&root)?,
        };
        Ok(Self { root, config })
    }

    /// Create a context from an already resolved configuration.
    pub fn with_config(root: PathBuf, config: DocketConfig) -> Self {
        Self { root, config }
    }

    pub fn root(&self) -> &PathBuf {
        &self.root
    }

    pub fn config(&self) -> &DocketConfig {
        &self.config
    }

    /// Execute a CLI command
    pub fn execute(&self, command: &Commands) -> Result<String, ApiError> {
        match command {
            Commands::Build { format } => {
                let json = wants_json(format)?;
                let report = ManifestBuilder::new(&self.config.manifest).build()?;
                if json {
                    to_json(&report)
                } else {
                    Ok(format_build_report_text(&report))
                }
            }
            Commands::Dev {
                debounce_ms,
                batch_window_ms,
            } => self.handle_dev(*debounce_ms, *batch_window_ms),
            Commands::Inspect { format } => {
                let json = wants_json(format)?;
                let path = &self.config.manifest.output_path;
                let bytes = std::fs::read(path).map_err(|e| StorageError::at(path, e))?;
                let manifest = parse_manifest(&bytes)?;
                if json {
                    to_json(&json!({
                        "path": path,
                        "entries": manifest.entries,
                        "skipped": manifest.skipped,
                    }))
                } else {
                    Ok(format_manifest_text(path, &manifest))
                }
            }
            Commands::Scan { format } => {
                let json = wants_json(format)?;
                let (snapshot, cards) = self.scan_once(json)?;
                if json {
                    to_json(&json!({
                        "count": cards.len(),
                        "files": cards,
                    }))
                } else {
                    Ok(format_scan_text(&snapshot, &self.config.scanner.covers_prefix))
                }
            }
            Commands::Watch {
                interval_secs,
                cycles,
            } => self.handle_watch(*interval_secs, *cycles),
        }
    }

    fn handle_dev(
        &self,
        debounce_ms: Option<u64>,
        batch_window_ms: Option<u64>,
    ) -> Result<String, ApiError> {
        let mut watch_config = ManifestWatchConfig::from(&self.config.watch);
        if let Some(ms) = debounce_ms {
            watch_config.debounce_ms = ms;
        }
        if let Some(ms) = batch_window_ms {
            watch_config.batch_window_ms = ms;
        }

        let daemon =
            ManifestWatchDaemon::new(ManifestBuilder::new(&self.config.manifest), watch_config);

        // Ctrl-C clears the daemon's running flag; the daemon loop blocks this thread.
        let rt = runtime(1)?;
        let handle = daemon.handle();
        rt.spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Interrupt received, stopping dev watcher");
                handle.stop();
            }
        });

        info!(
            source_dir = %self.config.manifest.source_dir.display(),
            "Starting manifest dev watcher"
        );
        let initial = daemon.start()?;
        Ok(format!(
            "Dev watcher stopped ({} initial entries, {} rebuilds)",
            initial.entries.len(),
            daemon.rebuild_count()
        ))
    }

    /// One scan cycle; with `cards`, also build cards with checked covers.
    fn scan_once(&self, cards: bool) -> Result<(WatchSnapshot, Vec<DocumentCard>), ApiError> {
        let rt = runtime(2)?;
        let scanner = self.config.scanner.clone();
        rt.block_on(async move {
            let watcher = DocumentWatcher::from_config(&scanner)?;
            watcher.scan().await?;
            let snapshot = watcher.snapshot();
            if !cards {
                return Ok((snapshot, Vec::new()));
            }

            let covers = CoverSettings::from_config(&scanner)?;
            let client = reqwest::Client::builder()
                .timeout(scanner.probe_timeout())
                .build()?;
            let prober = HttpProber::new(client);
            let cards = DocumentCard::build_all(
                &snapshot.files,
                &prober,
                &covers,
                scanner.max_concurrent_probes,
            )
            .await;
            Ok::<_, ApiError>((snapshot, cards))
        })
    }

    fn handle_watch(
        &self,
        interval_secs: Option<u64>,
        cycles: Option<u64>,
    ) -> Result<String, ApiError> {
        let mut scanner = self.config.scanner.clone();
        if let Some(secs) = interval_secs {
            if secs == 0 {
                return Err(ApiError::ConfigError(
                    "--interval-secs must be greater than 0".to_string(),
                ));
            }
            scanner.interval_secs = secs;
            scanner.max_backoff_secs = scanner.max_backoff_secs.max(secs);
        }

        let rt = runtime(2)?;
        rt.block_on(async move {
            let watcher = DocumentWatcher::from_config(&scanner)?;
            let mut rx = watcher.subscribe();
            let mut previous = rx.borrow_and_update().clone();
            watcher.start();

            let interrupt = tokio::signal::ctrl_c();
            tokio::pin!(interrupt);
            loop {
                tokio::select! {
                    changed = rx.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        let current = rx.borrow_and_update().clone();
                        for line in format_transition(&previous, &current) {
                            println!("{}", line);
                        }
                        previous = current;
                        if cycles.map_or(false, |limit| previous.scans_completed >= limit) {
                            break;
                        }
                    }
                    _ = &mut interrupt => {
                        info!("Interrupt received, stopping document watcher");
                        break;
                    }
                }
            }

            watcher.stop().await;
            Ok::<_, ApiError>(format!(
                "Watcher stopped after {} scan(s)",
                previous.scans_completed
            ))
        })
    }
}

fn wants_json(format: &str) -> Result<bool, ApiError> {
    match format {
        "json" => Ok(true),
        "text" => Ok(false),
        other => Err(ApiError::ConfigError(format!(
            "Unknown format '{}': expected text or json",
            other
        ))),
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<String, ApiError> {
    serde_json::to_string_pretty(value)
        .map_err(|e| ApiError::StorageError(StorageError::Serialization(e.to_string())))
}

/// Runtime for async commands. Fails when called from inside another runtime.
fn runtime(workers: usize) -> Result<tokio::runtime::Runtime, ApiError> {
    if tokio::runtime::Handle::try_current().is_ok() {
        return Err(ApiError::WatchError(
            "Cannot start a runtime from within an async context".to_string(),
        ));
    }
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(workers)
        .enable_all()
        .build()
        .map_err(|e| ApiError::WatchError(format!("Failed to create runtime: {}", e)))
}
