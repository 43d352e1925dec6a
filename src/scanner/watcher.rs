//! Document watcher: scan cycles, polling loop, and cancellation.

use super::policy::{policy_from_config, PollPolicy};
use super::probe::{resolve_candidate_url, HttpProber, ProbeOutcome, Prober};
use super::source::{manifest_source, resolve_candidates, ManifestSource};
use super::state::WatchSnapshot;
use crate::config::ScannerConfig;
use crate::error::ApiError;
use crate::naming::{derive_display_name, infer_type};
use crate::types::DetectedFile;
use chrono::Utc;
use futures::stream::{self, StreamExt};
use parking_lot::{Mutex, RwLock};
use reqwest::Url;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Notify};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Per-scan settings.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Base URL candidates are resolved against
    pub watch_url: Url,
    /// Candidates used when the manifest is absent or empty
    pub fallback: Vec<String>,
    pub probe_timeout: Duration,
    /// 1 probes strictly one after another
    pub max_concurrent_probes: usize,
}

impl ScanOptions {
    pub fn new(watch_url: Url) -> Self {
        Self {
            watch_url,
            fallback: Vec::new(),
            probe_timeout: Duration::from_secs(5),
            max_concurrent_probes: 4,
        }
    }

    pub fn from_config(config: &ScannerConfig) -> Result<Self, ApiError> {
        let watch_url = Url::parse(&config.watch_url).map_err(|e| {
            ApiError::ConfigError(format!("Invalid watch URL {}: {}", config.watch_url, e))
        })?;
        Ok(Self {
            watch_url,
            fallback: config.fallback.clone(),
            probe_timeout: config.probe_timeout(),
            max_concurrent_probes: config.max_concurrent_probes.max(1),
        })
    }
}

struct Inner {
    source: Arc<dyn ManifestSource>,
    prober: Arc<dyn Prober>,
    policy: Arc<dyn PollPolicy>,
    options: ScanOptions,
    state: watch::Sender<WatchSnapshot>,
    /// Cleared by `stop`; no state is published once false.
    running: RwLock<bool>,
    /// Serializes scans so a manual refetch never interleaves with a periodic one.
    scan_lock: tokio::sync::Mutex<()>,
    wake: Notify,
    consecutive_failures: AtomicU32,
}

/// Polls the file host for the documents named by the manifest.
///
/// Consumers read [`WatchSnapshot`] values through [`DocumentWatcher::snapshot`]
/// or [`DocumentWatcher::subscribe`]; every published snapshot holds a
/// complete file list.
pub struct DocumentWatcher {
    inner: Arc<Inner>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl DocumentWatcher {
    pub fn new(
        source: Arc<dyn ManifestSource>,
        prober: Arc<dyn Prober>,
        policy: Arc<dyn PollPolicy>,
        options: ScanOptions,
    ) -> Self {
        let (state, _) = watch::channel(WatchSnapshot::default());
        Self {
            inner: Arc::new(Inner {
                source,
                prober,
                policy,
                options,
                state,
                running: RwLock::new(true),
                scan_lock: tokio::sync::Mutex::new(()),
                wake: Notify::new(),
                consecutive_failures: AtomicU32::new(0),
            }),
            task: Mutex::new(None),
        }
    }

    /// HTTP-backed watcher built from scanner settings.
    pub fn from_config(config: &ScannerConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.probe_timeout())
            .build()?;
        let source = manifest_source(&config.manifest_location, client.clone());
        let prober = Arc::new(HttpProber::new(client));
        Ok(Self::new(
            source,
            prober,
            policy_from_config(config),
            ScanOptions::from_config(config)?,
        ))
    }

    pub fn snapshot(&self) -> WatchSnapshot {
        self.inner.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<WatchSnapshot> {
        self.inner.state.subscribe()
    }

    pub fn is_running(&self) -> bool {
        *self.inner.running.read()
    }

    /// Run one scan cycle and publish its result.
    ///
    /// Returns the new file list, or the error that left the previous list in
    /// place.
    pub async fn scan(&self) -> Result<Arc<Vec<DetectedFile>>, ApiError> {
        self.inner.scan().await
    }

    /// Manual refresh: scan now and return the resulting snapshot.
    pub async fn refetch(&self) -> WatchSnapshot {
        let _ = self.inner.scan().await;
        self.snapshot()
    }

    /// Spawn the polling loop: an immediate scan, then one per policy delay.
    ///
    /// Must be called within a tokio runtime. Calling it twice is a no-op.
    pub fn start(&self) {
        let mut task = self.task.lock();
        if task.is_some() || !self.is_running() {
            return;
        }
        let inner = Arc::clone(&self.inner);
        *task = Some(tokio::spawn(async move {
            inner.poll_loop().await;
        }));
        info!(watch_url = %self.inner.options.watch_url, "Document watcher started");
    }

    /// Stop polling. After this returns no scan, including one already in
    /// flight, changes the published snapshot.
    pub async fn stop(&self) {
        *self.inner.running.write() = false;
        self.inner.wake.notify_waiters();
        let handle = self.task.lock().take();
        if let Some(handle) = handle {
            handle.abort();
            let _ = handle.await;
        }
        info!("Document watcher stopped");
    }
}

impl Drop for DocumentWatcher {
    fn drop(&mut self) {
        *self.inner.running.write() = false;
        if let Some(handle) = self.task.get_mut().take() {
            handle.abort();
        }
    }
}

impl Inner {
    async fn poll_loop(&self) {
        let _ = self.scan().await;
        loop {
            let failures = self.consecutive_failures.load(Ordering::Relaxed);
            let delay = self.policy.next_delay(failures);
            debug!(delay_ms = delay.as_millis() as u64, "Next scan scheduled");
            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = self.wake.notified() => {}
            }
            if !*self.running.read() {
                break;
            }
            let _ = self.scan().await;
        }
    }

    /// Apply `update` unless the watcher has been stopped.
    fn publish(&self, update: impl FnOnce(&mut WatchSnapshot)) -> bool {
        let running = self.running.read();
        if !*running {
            return false;
        }
        self.state.send_modify(update);
        true
    }

    async fn scan(&self) -> Result<Arc<Vec<DetectedFile>>, ApiError> {
        let _guard = self.scan_lock.lock().await;

        let initial = self.state.borrow().scans_completed == 0;
        self.publish(|s| {
            s.loading = initial;
            s.is_refreshing = !initial;
            s.error = None;
        });

        let result = self.collect().await;
        let finished_at = Utc::now();
        match &result {
            Ok(files) => {
                self.consecutive_failures.store(0, Ordering::Relaxed);
                let published = self.publish(|s| {
                    s.files = Arc::clone(files);
                    s.loading = false;
                    s.is_refreshing = false;
                    s.error = None;
                    s.scans_completed += 1;
                    s.last_scan_at = Some(finished_at);
                });
                if published {
                    info!(files = files.len(), initial, "Scan completed");
                }
            }
            Err(e) => {
                self.consecutive_failures.fetch_add(1, Ordering::Relaxed);
                let message = e.to_string();
                let published = self.publish(|s| {
                    s.loading = false;
                    s.is_refreshing = false;
                    s.error = Some(message);
                    s.scans_completed += 1;
                    s.last_scan_at = Some(finished_at);
                });
                if published {
                    warn!(error = %e, "Scan failed, keeping previous file list");
                }
            }
        }
        result
    }

    async fn collect(&self) -> Result<Arc<Vec<DetectedFile>>, ApiError> {
        let load = self.source.load().await?;
        let plan = resolve_candidates(load, &self.options.fallback);
        debug!(
            candidates = plan.candidates.len(),
            origin = ?plan.origin,
            source = %self.source.describe(),
            "Resolved candidates"
        );

        let detected: Vec<Option<DetectedFile>> = stream::iter(plan.candidates)
            .map(|name| self.probe_candidate(name))
            .buffered(self.options.max_concurrent_probes.max(1))
            .collect()
            .await;

        Ok(Arc::new(detected.into_iter().flatten().collect()))
    }

    async fn probe_candidate(&self, name: String) -> Option<DetectedFile> {
        let url = match resolve_candidate_url(&self.options.watch_url, &name) {
            Ok(url) => url,
            Err(e) => {
                debug!(file = %name, error = %e, "Cannot resolve candidate URL");
                return None;
            }
        };

        let outcome =
            match tokio::time::timeout(self.options.probe_timeout, self.prober.probe(&url)).await {
                Ok(outcome) => outcome,
                Err(_) => ProbeOutcome::missing(format!(
                    "timed out after {}ms",
                    self.options.probe_timeout.as_millis()
                )),
            };

        match outcome {
            ProbeOutcome::Found(hit) => Some(DetectedFile {
                display_name: derive_display_name(&name),
                kind: infer_type(&name),
                size: hit.content_length.unwrap_or(0),
                last_modified: hit.last_modified.unwrap_or_else(Utc::now),
                path: url.to_string(),
                name,
            }),
            ProbeOutcome::Missing { reason } => {
                debug!(file = %name, reason = %reason, "Candidate not available");
                None
            }
        }
    }
}
