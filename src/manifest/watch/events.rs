//! Watch events, batching, and configuration.

use crate::config::WatchSettings;
use crate::naming::matches_extension;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Watch mode configuration
#[derive(Debug, Clone)]
pub struct ManifestWatchConfig {
    /// Quiet period after the last event before a batch is released
    pub debounce_ms: u64,
    /// How often the loop wakes to check for a ready batch
    pub batch_window_ms: u64,
    /// Release a batch early once it holds this many paths
    pub max_batch_size: usize,
}

impl Default for ManifestWatchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 100,
            batch_window_ms: 50,
            max_batch_size: 100,
        }
    }
}

impl From<&WatchSettings> for ManifestWatchConfig {
    fn from(settings: &WatchSettings) -> Self {
        Self {
            debounce_ms: settings.debounce_ms,
            batch_window_ms: settings.batch_window_ms,
            ..Self::default()
        }
    }
}

/// Filesystem change event
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ChangeEvent {
    Created(PathBuf),
    Modified(PathBuf),
    Removed(PathBuf),
    Renamed { from: PathBuf, to: PathBuf },
}

impl ChangeEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            ChangeEvent::Created(_) => "created",
            ChangeEvent::Modified(_) => "modified",
            ChangeEvent::Removed(_) => "removed",
            ChangeEvent::Renamed { .. } => "renamed",
        }
    }

    /// True if any path involved carries a qualifying extension. A rename
    /// from `a.pdf` to `a.tmp` still changes the manifest.
    pub fn touches_qualifying(&self, extensions: &[String]) -> bool {
        let qualifies = |p: &Path| {
            p.file_name()
                .and_then(|n| n.to_str())
                .map(|n| matches_extension(n, extensions))
                .unwrap_or(false)
        };
        match self {
            ChangeEvent::Created(p) | ChangeEvent::Modified(p) | ChangeEvent::Removed(p) => {
                qualifies(p)
            }
            ChangeEvent::Renamed { from, to } => qualifies(from) || qualifies(to),
        }
    }

    fn key(&self) -> &Path {
        match self {
            ChangeEvent::Created(p) | ChangeEvent::Modified(p) | ChangeEvent::Removed(p) => p,
            ChangeEvent::Renamed { to, .. } => to,
        }
    }
}

/// Groups qualifying events and releases them once the directory goes quiet.
pub(crate) struct EventBatcher {
    config: ManifestWatchConfig,
    extensions: Vec<String>,
    pending_events: HashMap<PathBuf, ChangeEvent>,
    last_event_time: Option<Instant>,
}

impl EventBatcher {
    pub(crate) fn new(config: ManifestWatchConfig, extensions: Vec<String>) -> Self {
        Self {
            config,
            extensions,
            pending_events: HashMap::new(),
            last_event_time: None,
        }
    }

    /// Record an event. Returns false if it was filtered out.
    pub(crate) fn add_event(&mut self, event: ChangeEvent, now: Instant) -> bool {
        if !event.touches_qualifying(&self.extensions) {
            return false;
        }
        self.pending_events.insert(event.key().to_path_buf(), event);
        self.last_event_time = Some(now);
        true
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.pending_events.is_empty()
    }

    /// A batch is ready after the debounce quiet period or when full.
    pub(crate) fn is_ready(&self, now: Instant) -> bool {
        if self.pending_events.is_empty() {
            return false;
        }
        if self.pending_events.len() >= self.config.max_batch_size {
            return true;
        }
        let debounce = Duration::from_millis(self.config.debounce_ms);
        self.last_event_time
            .map(|last| now.duration_since(last) >= debounce)
            .unwrap_or(true)
    }

    pub(crate) fn take_batch(&mut self) -> Vec<ChangeEvent> {
        self.last_event_time = None;
        self.pending_events.drain().map(|(_, event)| event).collect()
    }
}
