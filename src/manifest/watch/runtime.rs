//! Watch daemon and runtime logic.

use super::events::{ChangeEvent, EventBatcher, ManifestWatchConfig};
use crate::error::ApiError;
use crate::manifest::builder::{BuildReport, ManifestBuilder};
use notify::{Event, EventKind, RecursiveMode, Watcher};
use parking_lot::RwLock;
use std::sync::mpsc;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, info, warn};

/// Cloneable stop switch for a running daemon.
#[derive(Clone)]
pub struct WatchHandle {
    running: Arc<RwLock<bool>>,
}

impl WatchHandle {
    pub fn stop(&self) {
        *self.running.write() = false;
    }

    pub fn is_running(&self) -> bool {
        *self.running.read()
    }
}

/// Rebuilds the manifest whenever qualifying files in the source directory change.
pub struct ManifestWatchDaemon {
    builder: ManifestBuilder,
    config: ManifestWatchConfig,
    running: Arc<RwLock<bool>>,
    rebuilds: Arc<RwLock<u64>>,
}

impl ManifestWatchDaemon {
    pub fn new(builder: ManifestBuilder, config: ManifestWatchConfig) -> Self {
        Self {
            builder,
            config,
            running: Arc::new(RwLock::new(true)),
            rebuilds: Arc::new(RwLock::new(0)),
        }
    }

    pub fn handle(&self) -> WatchHandle {
        WatchHandle {
            running: Arc::clone(&self.running),
        }
    }

    /// Number of rebuilds triggered by change events so far.
    pub fn rebuild_count(&self) -> u64 {
        *self.rebuilds.read()
    }

    /// Stop the watch daemon
    pub fn stop(&self) {
        self.handle().stop();
    }

    /// Build once, then block watching the source directory until stopped.
    ///
    /// A daemon stopped before `start` still performs the initial build.
    pub fn start(&self) -> Result<BuildReport, ApiError> {
        let initial = self.builder.build()?;
        info!(entries = initial.entries.len(), "Initial manifest built");

        let (tx, rx) = mpsc::channel();
        let mut watcher = notify::recommended_watcher(move |res| {
            if let Err(e) = tx.send(res) {
                error!("Error sending watch event: {}", e);
            }
        })
        .map_err(|e| ApiError::WatchError(format!("Failed to create watcher: {}", e)))?;

        let watch_dir = dunce::canonicalize(self.builder.source_dir())
            .unwrap_or_else(|_| self.builder.source_dir().to_path_buf());
        watcher
            .watch(&watch_dir, RecursiveMode::NonRecursive)
            .map_err(|e| {
                ApiError::WatchError(format!(
                    "Failed to watch directory {}: {}",
                    watch_dir.display(),
                    e
                ))
            })?;

        info!(dir = %watch_dir.display(), "Watching document directory");

        let mut batcher =
            EventBatcher::new(self.config.clone(), self.builder.extensions().to_vec());
        let tick = Duration::from_millis(self.config.batch_window_ms.max(10));

        while *self.running.read() {
            match rx.recv_timeout(tick) {
                Ok(Ok(event)) => {
                    for change in Self::convert_event(event) {
                        batcher.add_event(change, Instant::now());
                    }
                }
                Ok(Err(e)) => {
                    warn!("Watch error: {}", e);
                }
                Err(mpsc::RecvTimeoutError::Timeout) => {}
                Err(mpsc::RecvTimeoutError::Disconnected) => {
                    error!("Watcher channel disconnected");
                    break;
                }
            }

            if batcher.is_ready(Instant::now()) {
                self.process_events(batcher.take_batch());
            }
        }

        if !batcher.is_empty() {
            self.process_events(batcher.take_batch());
        }
        drop(watcher);
        info!("Stopped watching document directory");
        Ok(initial)
    }

    fn convert_event(event: Event) -> Vec<ChangeEvent> {
        match event.kind {
            EventKind::Create(_) => event.paths.into_iter().map(ChangeEvent::Created).collect(),
            EventKind::Modify(notify::event::ModifyKind::Name(_)) => {
                let mut paths = event.paths.into_iter();
                match (paths.next(), paths.next()) {
                    (Some(from), Some(to)) => vec![ChangeEvent::Renamed { from, to }],
                    (Some(path), None) => vec![ChangeEvent::Modified(path)],
                    _ => Vec::new(),
                }
            }
            EventKind::Modify(_) => event.paths.into_iter().map(ChangeEvent::Modified).collect(),
            EventKind::Remove(_) => event.paths.into_iter().map(ChangeEvent::Removed).collect(),
            _ => Vec::new(),
        }
    }

    /// One full rebuild per batch. Failures are logged and watching continues.
    fn process_events(&self, events: Vec<ChangeEvent>) {
        if events.is_empty() {
            return;
        }
        for event in &events {
            info!(kind = event.kind(), event = ?event, "Document change");
        }

        match self.builder.build() {
            Ok(report) => {
                *self.rebuilds.write() += 1;
                info!(
                    event_count = events.len(),
                    entries = report.entries.len(),
                    "Manifest regenerated"
                );
            }
            Err(e) => {
                error!(error = %e, "Manifest regeneration failed");
            }
        }
    }
}
