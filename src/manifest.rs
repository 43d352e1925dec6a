//! Manifest: the build-time index of qualifying documents.
//!
//! Static file hosts cannot list directories, so the builder writes a JSON
//! array of `{filename, title, path}` that the document watcher reads back
//! through the validated schema in [`entry`].

mod builder;
mod entry;
mod watch;

pub use builder::{BuildReport, ManifestBuilder};
pub use entry::{join_url_path, parse_manifest, ManifestEntry, ParsedManifest};
pub use watch::{ChangeEvent, ManifestWatchConfig, ManifestWatchDaemon, WatchHandle};
