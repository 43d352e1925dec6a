//! Document Watcher
//!
//! Reconciles manifest candidates against the live file host. Each scan cycle
//! loads candidates, probes each one with HEAD, and atomically replaces the
//! published file list. Consumers observe [`WatchSnapshot`] values and never
//! see a partially updated list.

mod policy;
mod probe;
mod source;
mod state;
mod watcher;

pub use policy::{policy_from_config, Backoff, FixedInterval, PollPolicy};
pub use probe::{parse_http_date, resolve_candidate_url, HttpProber, ProbeHit, ProbeOutcome, Prober};
pub use source::{
    manifest_source, resolve_candidates, CandidateOrigin, CandidatePlan, FileManifestSource,
    HttpManifestSource, ManifestLoad, ManifestSource,
};
pub use state::{SnapshotDiff, WatchSnapshot};
pub use watcher::{DocumentWatcher, ScanOptions};
