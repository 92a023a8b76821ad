//! Build invoker: HISE CLI calls, project resave and native compilation.

mod compile;
mod hise;
pub mod output;
mod resave;

pub use hise::ExportArgs;
pub use output::{BinaryLocation, BuildConfiguration};

use crate::exporter::{
    process::ProcessRunner,
    settings::{ExportSettings, PlatformProfile},
};
use std::{path::PathBuf, sync::Arc};

/// Drives the external build tool chain for one platform.
///
/// Every operation is one or more process invocations; exit code 0 is the
/// only success.
#[derive(Clone)]
pub struct BuildInvoker {
    runner: Arc<dyn ProcessRunner>,
    profile: PlatformProfile,
    msbuild: PathBuf,
    ide_jobs: usize,
}

impl BuildInvoker {
    pub fn new(
        runner: Arc<dyn ProcessRunner>,
        profile: PlatformProfile,
        settings: &ExportSettings,
    ) -> Self {
        Self {
            runner,
            profile,
            msbuild: settings.msbuild().to_path_buf(),
            ide_jobs: settings.build_jobs(),
        }
    }

    pub fn profile(&self) -> &PlatformProfile {
        &self.profile
    }
}
