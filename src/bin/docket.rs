//! Docket CLI Binary
//!
//! Command-line interface for building document manifests and scanning the
//! file host that serves them.

use anyhow::Context;
use clap::Parser;
use docket::logging::init_logging;
use docket::tooling::cli::{Cli, CliContext};
use std::process;

fn main() {
    let cli = Cli::parse();

    let context = match setup(&cli) {
        Ok(ctx) => ctx,
        Err(e) => {
            eprintln!("Error initializing docket: {:#}", e);
            process::exit(1);
        }
    };

    match context.execute(&cli.command) {
        Ok(output) => {
            println!("{}", output);
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}

/// Load configuration and install the tracing subscriber.
fn setup(cli: &Cli) -> anyhow::Result<CliContext> {
    let context = CliContext::new(cli.root.clone(), cli.config.clone())
        .with_context(|| format!("loading configuration for {}", cli.root.display()))?;

    let logging = context.config().logging.clone().with_overrides(
        cli.log_level.clone(),
        cli.log_format.clone(),
        cli.log_output.clone(),
        cli.log_file.clone(),
    );
    init_logging(Some(&logging)).context("initializing logging")?;

    Ok(context)
}
