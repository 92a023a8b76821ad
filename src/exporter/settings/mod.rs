//! Configuration structures for export runs.
//!
//! Session settings ([`ExportSettings`]), per-job descriptors ([`Job`]) and the
//! per-OS [`PlatformProfile`] every component is parameterized with.

mod arch;
mod builder;
mod core;
mod job;
mod platform;

pub use arch::Arch;
pub use builder::SettingsBuilder;
pub use core::{DEFAULT_CREDENTIAL_SERVICE, ExportSettings, default_build_jobs};
pub use job::{FeatureFlags, InstallerAssets, Job, PluginFormat, ProjectType};
pub use platform::{
    HostPlatform, LEGACY_SUFFIX, NativeBuild, OutputLayout, PackagerKind, PlatformProfile,
};
