//! Integration tests for docket

mod cli_contracts;
mod http_scan;
mod manifest_build;
mod support;
