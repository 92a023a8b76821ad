//! Export pipeline for HISE projects.
//!
//! A [`QueueEngine`] takes validated [`Job`]s and, one at a time, exports them
//! with the HISE CLI, compiles the generated native project, copies the binary
//! into `<project>/Packaging/<platform>/`, builds installers, and signs and
//! notarizes on macOS.
//!
//! # Module Organization
//!
//! - [`settings`] - session settings, job descriptors and the platform profile
//! - [`process`] - external tool execution and kill-on-cancel tracking
//! - [`project`] - `project_info.xml` and the generated `.jucer` file
//! - [`build`] - HISE CLI calls, project resave and native compilation
//! - [`platform`] - installer packaging per platform
//! - [`sign`] - code signing and notarization
//! - [`queue`] - the job queue and its engine
//! - [`preflight`] - SDK and tool checks before jobs are queued
//! - [`clock`] - injectable timer for the notarization poll
//! - [`utils`] - filesystem and checksum helpers

pub mod build;
pub mod clock;
pub mod error;
pub mod platform;
pub mod preflight;
pub mod process;
pub mod project;
pub mod queue;
pub mod settings;
pub mod sign;
pub mod utils;

pub use clock::{Clock, FakeClock, SystemClock};
pub use error::{Context, Error, ErrorExt, Result};
pub use preflight::{Preflight, PreflightIssue};
pub use process::{ProcessRunner, ProcessTracker, SystemRunner, ToolCategory, ToolCommand, ToolOutput};
pub use project::{BuildProjectFile, ProjectDescriptor};
pub use queue::{
    CancelHandle, EngineState, JobQueue, Phase, ProgressEvent, ProgressSink, ProgressUpdate,
    QueueEngine, RunOutcome, RunSummary,
};
pub use settings::{
    Arch, ExportSettings, FeatureFlags, HostPlatform, InstallerAssets, Job, PlatformProfile,
    PluginFormat, ProjectType, SettingsBuilder,
};
pub use sign::{CredentialStore, EnvCredentialStore, MemoryCredentialStore, SigningClient};

use std::path::PathBuf;

/// A file produced by a finished job.
#[derive(Clone, Debug, Eq, PartialEq, serde::Serialize)]
pub struct ExportedArtifact {
    /// Location inside the packaging folder.
    pub path: PathBuf,
    /// Size in bytes (summed for bundle directories).
    pub size: u64,
    /// SHA-256, hex encoded.
    pub checksum: String,
}
