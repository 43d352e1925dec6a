//! Published watcher state.

use crate::types::DetectedFile;
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::sync::Arc;

/// Read-only view of the watcher, replaced as a whole on every transition.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WatchSnapshot {
    /// Files confirmed by the most recent successful scan.
    pub files: Arc<Vec<DetectedFile>>,
    /// True only while the very first scan runs.
    pub loading: bool,
    /// True while any later scan runs.
    pub is_refreshing: bool,
    pub error: Option<String>,
    /// Scans finished, successful or not.
    pub scans_completed: u64,
    pub last_scan_at: Option<DateTime<Utc>>,
}

impl WatchSnapshot {
    pub fn is_scanning(&self) -> bool {
        self.loading || self.is_refreshing
    }

    /// A finished, error-free scan that confirmed nothing.
    pub fn is_empty_state(&self) -> bool {
        self.scans_completed > 0 && !self.is_scanning() && self.error.is_none() && self.files.is_empty()
    }

    /// Filenames added and removed relative to `previous`.
    pub fn diff(&self, previous: &WatchSnapshot) -> SnapshotDiff {
        let before: HashSet<&str> = previous.files.iter().map(|f| f.name.as_str()).collect();
        let after: HashSet<&str> = self.files.iter().map(|f| f.name.as_str()).collect();

        SnapshotDiff {
            added: self
                .files
                .iter()
                .filter(|f| !before.contains(f.name.as_str()))
                .map(|f| f.name.clone())
                .collect(),
            removed: previous
                .files
                .iter()
                .filter(|f| !after.contains(f.name.as_str()))
                .map(|f| f.name.clone())
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SnapshotDiff {
    pub added: Vec<String>,
    pub removed: Vec<String>,
}

impl SnapshotDiff {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}
