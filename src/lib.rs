//! Docket: Document Discovery for Static Hosts
//!
//! A build-time manifest builder that indexes a directory of documents, and a
//! client-side watcher that reconciles the manifest against what the file host
//! actually serves.

pub mod config;
pub mod error;
pub mod logging;
pub mod manifest;
pub mod naming;
pub mod scanner;
pub mod tooling;
pub mod types;
pub mod views;
