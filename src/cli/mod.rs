//! Command line interface for the HISE exporter.
//!
//! This module provides the CLI front-end: argument parsing, settings and
//! queue files, command execution and terminal output.

mod args;
pub mod commands;
pub mod config;
mod output;

pub use args::{Args, Command, PlatformArg, RuntimeConfig};
pub use output::OutputManager;

use crate::error::Result;

/// Main CLI entry point
pub async fn run() -> Result<i32> {
    let args = Args::parse_args();
    init_logging(args.verbose);

    let config = RuntimeConfig::from(&args);
    match &args.command {
        Command::Run { queue } => commands::run(&args, queue, &config).await,
        Command::Validate { queue } => commands::validate(&args, queue, &config).await,
        Command::Info { project } => commands::info(project, &config).await,
    }
}

/// `RUST_LOG` wins; otherwise `info`, or `debug` with `--verbose`.
fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default))
        .try_init();
}
