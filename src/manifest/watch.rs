//! Dev-mode regeneration: rebuild the manifest when qualifying files change.

mod events;
mod runtime;

pub use events::{ChangeEvent, ManifestWatchConfig};
pub use runtime::{ManifestWatchDaemon, WatchHandle};
