//! Tooling & Integration Layer
//!
//! CLI entry points and terminal formatting for the manifest builder and the
//! document watcher.

pub mod cli;
pub mod format;

pub use cli::{Cli, CliContext, Commands};
