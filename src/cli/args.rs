//! Command line argument parsing and validation.
//!
//! This module provides CLI argument parsing using clap.

use crate::exporter::{HostPlatform, PlatformProfile};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Queue-driven export of HISE projects
#[derive(Parser, Debug)]
#[command(
    name = "hise_exporter",
    version,
    about = "Build, package, sign and notarize HISE projects from a job queue",
    long_about = "Exports HISE projects as standalone apps, plugins and installers.

Jobs are read from a TOML queue file ([[job]] tables) and run one at a time:
HISE export, native compile, packaging, then code signing and notarization on macOS.

Usage:
  hise_exporter validate queue.toml
  hise_exporter run queue.toml
  hise_exporter info ~/Projects/MySynth

Exit code 0 = every job finished; 1 = a job failed; 130 = cancelled."
)]
pub struct Args {
    /// Settings file (default: <config dir>/hise-exporter/config.toml)
    #[arg(short, long, global = true, value_name = "PATH", env = "HISE_EXPORTER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Platform profile to use instead of the host's
    #[arg(long, global = true, value_enum, value_name = "PLATFORM")]
    pub platform: Option<PlatformArg>,

    /// Show debug output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Write progress and results as JSON lines
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Validate and queue every job in QUEUE, then run the queue
    Run {
        /// Queue file with [[job]] tables
        #[arg(value_name = "QUEUE")]
        queue: PathBuf,
    },

    /// Validate the jobs in QUEUE and check SDKs and tools, without running
    Validate {
        /// Queue file with [[job]] tables
        #[arg(value_name = "QUEUE")]
        queue: PathBuf,
    },

    /// Print name, version and plugin code from a project's project_info.xml
    Info {
        /// HISE project folder
        #[arg(value_name = "PROJECT_DIR")]
        project: PathBuf,
    },
}

/// `--platform` values.
#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum PlatformArg {
    Linux,
    Macos,
    Windows,
}

impl From<PlatformArg> for HostPlatform {
    fn from(arg: PlatformArg) -> Self {
        match arg {
            PlatformArg::Linux => HostPlatform::Linux,
            PlatformArg::Macos => HostPlatform::Macos,
            PlatformArg::Windows => HostPlatform::Windows,
        }
    }
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Profile selected by `--platform`, else the host's.
    pub fn profile(&self) -> PlatformProfile {
        match self.platform {
            Some(platform) => PlatformProfile::for_platform(platform.into()),
            None => PlatformProfile::host(),
        }
    }
}

/// Configuration derived from command line arguments
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Output manager for colored terminal output
    output: super::OutputManager,
}

impl From<&Args> for RuntimeConfig {
    fn from(args: &Args) -> Self {
        let output = super::OutputManager::new(args.verbose, false).with_json(args.json);
        Self { output }
    }
}

impl RuntimeConfig {
    /// Get a reference to the output manager
    pub fn output(&self) -> &super::OutputManager {
        &self.output
    }
}
