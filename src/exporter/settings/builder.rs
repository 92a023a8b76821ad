//! Builder for constructing ExportSettings.

use super::{ExportSettings, core::DEFAULT_CREDENTIAL_SERVICE};
use std::path::{Path, PathBuf};

const DEFAULT_MSBUILD: &str =
    "C:/Program Files (x86)/Microsoft Visual Studio/2017/Community/MSBuild/15.0/Bin/MSBuild.exe";

/// Builder for constructing [`ExportSettings`].
///
/// # Examples
///
/// ```
/// use hise_exporter::exporter::SettingsBuilder;
///
/// let settings = SettingsBuilder::new()
///     .hise_executable("/opt/hise/HISE")
///     .hise_source("/opt/hise/source")
///     .assets_dir("/opt/exporter/assets")
///     .ide_jobs(4)
///     .build()
///     .unwrap();
/// assert_eq!(settings.build_jobs(), 4);
/// ```
#[derive(Default)]
pub struct SettingsBuilder {
    hise_executable: Option<PathBuf>,
    hise_source: Option<PathBuf>,
    assets_dir: Option<PathBuf>,
    company_name: Option<String>,
    company_email: Option<String>,
    apple_id: Option<String>,
    apple_team_id: Option<String>,
    inno_setup_compiler: Option<PathBuf>,
    msbuild: Option<PathBuf>,
    ide_jobs: Option<usize>,
    credential_service: Option<String>,
}

impl SettingsBuilder {
    /// Creates a new settings builder.
    pub fn new() -> Self {
        Default::default()
    }

    /// Sets the HISE executable.
    ///
    /// # Required
    pub fn hise_executable<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.hise_executable = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets the HISE source folder.
    ///
    /// # Required
    pub fn hise_source<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.hise_source = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets the assets folder (makeself, templates, runtime libraries).
    ///
    /// # Required
    pub fn assets_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.assets_dir = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets the company name used by installers.
    pub fn company_name(mut self, name: impl Into<String>) -> Self {
        self.company_name = Some(name.into());
        self
    }

    /// Sets the company e-mail written into build projects.
    pub fn company_email(mut self, email: impl Into<String>) -> Self {
        self.company_email = Some(email.into());
        self
    }

    /// Sets the Apple ID used for notarization.
    pub fn apple_id(mut self, id: impl Into<String>) -> Self {
        self.apple_id = Some(id.into());
        self
    }

    /// Sets the Apple developer team (`Name (TEAMID)`).
    pub fn apple_team_id(mut self, team: impl Into<String>) -> Self {
        self.apple_team_id = Some(team.into());
        self
    }

    /// Overrides the Inno Setup compiler location.
    ///
    /// Default: `<local data dir>/Programs/Inno Setup 6/ISCC.exe`
    pub fn inno_setup_compiler<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.inno_setup_compiler = Some(path.as_ref().to_path_buf());
        self
    }

    /// Overrides the MSBuild location.
    ///
    /// Default: Visual Studio 2017 Community MSBuild.
    pub fn msbuild<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.msbuild = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets the Xcode parallel job count.
    ///
    /// Default: `2 * cores - 1`
    pub fn ide_jobs(mut self, jobs: usize) -> Self {
        self.ide_jobs = Some(jobs);
        self
    }

    /// Sets the credential service name.
    ///
    /// Default: `hise-exporter`
    pub fn credential_service(mut self, service: impl Into<String>) -> Self {
        self.credential_service = Some(service.into());
        self
    }

    /// Builds the settings.
    ///
    /// # Errors
    ///
    /// Returns an error if required fields are missing:
    /// - `hise_executable`
    /// - `hise_source`
    /// - `assets_dir`
    pub fn build(self) -> crate::exporter::Result<ExportSettings> {
        use crate::exporter::error::Context;

        let inno_setup_compiler = self
            .inno_setup_compiler
            .unwrap_or_else(default_inno_setup_compiler);

        Ok(ExportSettings::new(
            self.hise_executable
                .context("hise_executable is required")?,
            self.hise_source.context("hise_source is required")?,
            self.assets_dir.context("assets_dir is required")?,
            non_empty(self.company_name),
            non_empty(self.company_email),
            non_empty(self.apple_id),
            non_empty(self.apple_team_id),
            inno_setup_compiler,
            self.msbuild.unwrap_or_else(|| PathBuf::from(DEFAULT_MSBUILD)),
            self.ide_jobs.filter(|jobs| *jobs > 0),
            self.credential_service
                .unwrap_or_else(|| DEFAULT_CREDENTIAL_SERVICE.to_string()),
        ))
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn default_inno_setup_compiler() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_default()
        .join("Programs")
        .join("Inno Setup 6")
        .join("ISCC.exe")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> SettingsBuilder {
        SettingsBuilder::new()
            .hise_executable("/hise")
            .hise_source("/src")
            .assets_dir("/assets")
    }

    #[test]
    fn missing_required_field_fails() {
        let err = SettingsBuilder::new()
            .hise_source("/src")
            .assets_dir("/assets")
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("hise_executable"));
    }

    #[test]
    fn blank_optional_values_are_treated_as_unset() {
        let settings = base().company_email("  ").apple_id("").build().unwrap();
        assert_eq!(settings.company_email(), None);
        assert_eq!(settings.apple_id(), None);
    }

    #[test]
    fn defaults_are_filled_in() {
        let settings = base().build().unwrap();
        assert_eq!(settings.credential_service(), "hise-exporter");
        assert!(settings.inno_setup_compiler().ends_with("ISCC.exe"));
        assert!(settings.msbuild().ends_with("MSBuild.exe"));
    }
}
