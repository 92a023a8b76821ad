//! Core ExportSettings struct and implementations.

use std::path::{Path, PathBuf};

/// Keychain service name the app-specific password is stored under.
pub const DEFAULT_CREDENTIAL_SERVICE: &str = "hise-exporter";

/// Session-wide settings shared by every job of a run.
///
/// Constructed via [`SettingsBuilder`](super::SettingsBuilder). Per-job values
/// live on [`Job`](super::Job); everything here is machine or account level.
///
/// # Examples
///
/// ```no_run
/// use hise_exporter::exporter::SettingsBuilder;
///
/// # fn example() -> hise_exporter::exporter::Result<()> {
/// let settings = SettingsBuilder::new()
///     .hise_executable("/opt/hise/HISE")
///     .hise_source("/opt/hise/source")
///     .assets_dir("/usr/share/hise-exporter")
///     .company_name("Acme Audio")
///     .build()?;
/// assert_eq!(settings.company_name(), Some("Acme Audio"));
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct ExportSettings {
    /// Path of the HISE executable driving export.
    hise_executable: PathBuf,

    /// HISE source tree (holds `tools/projucer`).
    hise_source: PathBuf,

    /// Folder with makeself, installer templates and runtime libraries.
    assets_dir: PathBuf,

    /// Company name, required for installer jobs.
    company_name: Option<String>,

    /// Company e-mail written into generated build projects.
    company_email: Option<String>,

    /// Apple ID used for notarization.
    apple_id: Option<String>,

    /// Apple developer team, as in `Name (TEAMID)`.
    apple_team_id: Option<String>,

    /// Inno Setup compiler (`ISCC.exe`).
    inno_setup_compiler: PathBuf,

    /// MSBuild executable.
    msbuild: PathBuf,

    /// Parallel jobs for Xcode builds. `None` uses `2 * cores - 1`.
    ide_jobs: Option<usize>,

    /// Credential store service holding the app-specific password.
    credential_service: String,
}

impl ExportSettings {
    /// Returns the HISE executable path.
    pub fn hise_executable(&self) -> &Path {
        &self.hise_executable
    }

    /// Returns the HISE source folder.
    pub fn hise_source(&self) -> &Path {
        &self.hise_source
    }

    /// Returns the assets folder.
    pub fn assets_dir(&self) -> &Path {
        &self.assets_dir
    }

    /// Returns the company name.
    pub fn company_name(&self) -> Option<&str> {
        self.company_name.as_deref()
    }

    /// Returns the company e-mail.
    pub fn company_email(&self) -> Option<&str> {
        self.company_email.as_deref()
    }

    /// Returns the Apple ID.
    pub fn apple_id(&self) -> Option<&str> {
        self.apple_id.as_deref()
    }

    /// Returns the Apple developer team.
    pub fn apple_team_id(&self) -> Option<&str> {
        self.apple_team_id.as_deref()
    }

    /// Returns the Inno Setup compiler path.
    pub fn inno_setup_compiler(&self) -> &Path {
        &self.inno_setup_compiler
    }

    /// Returns the MSBuild path.
    pub fn msbuild(&self) -> &Path {
        &self.msbuild
    }

    /// Parallel job count for native builds: the configured IDE job count,
    /// otherwise `2 * logical_cores - 1`.
    pub fn build_jobs(&self) -> usize {
        self.ide_jobs.unwrap_or_else(default_build_jobs)
    }

    /// Returns the credential service name.
    pub fn credential_service(&self) -> &str {
        &self.credential_service
    }

    /// Creates a new ExportSettings instance (used by SettingsBuilder).
    #[allow(clippy::too_many_arguments)]
    pub(super) fn new(
        hise_executable: PathBuf,
        hise_source: PathBuf,
        assets_dir: PathBuf,
        company_name: Option<String>,
        company_email: Option<String>,
        apple_id: Option<String>,
        apple_team_id: Option<String>,
        inno_setup_compiler: PathBuf,
        msbuild: PathBuf,
        ide_jobs: Option<usize>,
        credential_service: String,
    ) -> Self {
        Self {
            hise_executable,
            hise_source,
            assets_dir,
            company_name,
            company_email,
            apple_id,
            apple_team_id,
            inno_setup_compiler,
            msbuild,
            ide_jobs,
            credential_service,
        }
    }
}

/// `2 * logical_cores - 1`, never below one.
pub fn default_build_jobs() -> usize {
    (num_cpus::get() * 2).saturating_sub(1).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_jobs_is_odd_and_positive() {
        let jobs = default_build_jobs();
        assert!(jobs >= 1);
        assert_eq!(jobs % 2, 1);
    }
}
