//! Job descriptors: one queued unit of compile/package/sign/notarize work.

use super::{Arch, PlatformProfile};
use crate::exporter::error::{Error, Result};
use std::{
    fmt,
    path::{Path, PathBuf},
};

/// What a job produces.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectType {
    /// Standalone application.
    Standalone,
    /// Instrument plugin.
    Instrument,
    /// Effect plugin.
    Effect,
    /// Installer wrapping previously built binaries.
    Installer,
}

impl ProjectType {
    /// Name passed to the export CLI (`-t:instrument`).
    pub fn as_str(self) -> &'static str {
        match self {
            ProjectType::Standalone => "standalone",
            ProjectType::Instrument => "instrument",
            ProjectType::Effect => "effect",
            ProjectType::Installer => "installer",
        }
    }

    /// Instrument or effect.
    pub fn is_plugin(self) -> bool {
        matches!(self, ProjectType::Instrument | ProjectType::Effect)
    }
}

impl fmt::Display for ProjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Plugin format of an instrument or effect job.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, serde::Deserialize, serde::Serialize)]
pub enum PluginFormat {
    /// VST 2.x
    #[serde(rename = "VST2")]
    Vst2,
    /// VST 3
    #[serde(rename = "VST3")]
    Vst3,
    /// Audio Unit (macOS only)
    #[serde(rename = "AU")]
    Au,
    /// Avid Audio eXtension
    #[serde(rename = "AAX")]
    Aax,
}

impl PluginFormat {
    /// Display name, also the `Compiled/<name>` folder on Windows.
    pub fn as_str(self) -> &'static str {
        match self {
            PluginFormat::Vst2 => "VST2",
            PluginFormat::Vst3 => "VST3",
            PluginFormat::Au => "AU",
            PluginFormat::Aax => "AAX",
        }
    }

    /// Flag value understood by the export CLI; the VST family collapses to `VST`.
    pub fn cli_flag(self) -> &'static str {
        match self {
            PluginFormat::Vst2 | PluginFormat::Vst3 => "VST",
            PluginFormat::Au => "AU",
            PluginFormat::Aax => "AAX",
        }
    }

    /// Build-project attribute holding the plugin categories, if the format has one.
    pub fn category_attribute(self) -> Option<&'static str> {
        match self {
            PluginFormat::Vst2 => Some("pluginVSTCategory"),
            PluginFormat::Vst3 => Some("pluginVST3Category"),
            PluginFormat::Aax => Some("pluginAAXCategory"),
            PluginFormat::Au => None,
        }
    }
}

impl fmt::Display for PluginFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Build feature flags.
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash, serde::Deserialize, serde::Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct FeatureFlags {
    /// Target older CPU instruction sets.
    pub legacy_cpu: bool,
    /// Link the vectorized math library (IPP).
    pub ipp: bool,
    /// Build the Debug configuration instead of Release.
    pub debug: bool,
    /// Ship the bundled animation (rlottie) runtime libraries.
    pub rlottie: bool,
}

/// Optional files folded into an installer.
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash, serde::Deserialize, serde::Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct InstallerAssets {
    /// License text, required for installer jobs.
    pub license: Option<PathBuf>,
    /// User manual (PDF).
    pub manual: Option<PathBuf>,
    /// Read-me shown by the macOS installer.
    pub readme: Option<PathBuf>,
    /// Post-install script.
    pub post_install_script: Option<PathBuf>,
}

/// A validated, immutable-once-queued unit of work.
///
/// Two jobs with identical field-for-field content are duplicates.
///
/// # Examples
///
/// ```
/// use hise_exporter::exporter::{Arch, Job, PlatformProfile, PluginFormat, ProjectType};
///
/// let job = Job {
///     project_type: ProjectType::Instrument,
///     plugin_format: Some(PluginFormat::Vst3),
///     arch: Some(Arch::X64),
///     project_file: Some("Harp.xml".into()),
///     ..Job::new("/work/harp", "Harp", "1.0.0")
/// };
/// assert!(job.validate(&PlatformProfile::linux()).is_ok());
/// ```
#[derive(Clone, Debug, Eq, PartialEq, Hash, serde::Deserialize, serde::Serialize)]
#[serde(deny_unknown_fields)]
pub struct Job {
    /// Project folder (contains `project_info.xml`).
    pub project_path: PathBuf,
    /// Project name written to the descriptor and used for file names.
    pub project_name: String,
    /// Project version written to the descriptor.
    pub project_version: String,
    /// Project file exported by the CLI (`.xml` backup or `.hip` preset).
    #[serde(default)]
    pub project_file: Option<String>,
    /// Job type.
    pub project_type: ProjectType,
    /// Plugin format for instrument/effect jobs.
    #[serde(default)]
    pub plugin_format: Option<PluginFormat>,
    /// Plugin categories written into the build-project file.
    #[serde(default)]
    pub plugin_categories: Vec<String>,
    /// Target architecture for compilation jobs.
    #[serde(default)]
    pub arch: Option<Arch>,
    /// Build feature flags.
    #[serde(default)]
    pub features: FeatureFlags,
    /// Installer resources.
    #[serde(default)]
    pub installer: InstallerAssets,
    /// Sign the produced artifact.
    #[serde(default)]
    pub codesign: bool,
    /// Notarize and staple the produced artifact.
    #[serde(default)]
    pub notarize: bool,
    /// Primary bundle identifier submitted for notarization.
    #[serde(default)]
    pub bundle_id: Option<String>,
}

impl Job {
    /// A standalone job skeleton for `project_path`; use struct update syntax for the rest.
    pub fn new(
        project_path: impl Into<PathBuf>,
        project_name: impl Into<String>,
        project_version: impl Into<String>,
    ) -> Self {
        Self {
            project_path: project_path.into(),
            project_name: project_name.into(),
            project_version: project_version.into(),
            project_file: None,
            project_type: ProjectType::Standalone,
            plugin_format: None,
            plugin_categories: Vec::new(),
            arch: None,
            features: FeatureFlags::default(),
            installer: InstallerAssets::default(),
            codesign: false,
            notarize: false,
            bundle_id: None,
        }
    }

    /// Installer jobs package; every other type compiles.
    pub fn is_installer(&self) -> bool {
        self.project_type == ProjectType::Installer
    }

    /// Check the type-specific required-field rules.
    pub fn validate(&self, profile: &PlatformProfile) -> Result<()> {
        let fail = |msg: &str| Err(Error::Validation(msg.to_string()));

        if self.project_path.as_os_str().is_empty() {
            return fail("No project selected");
        }
        if self.project_name.trim().is_empty() {
            return fail("Project name is empty");
        }
        if self.project_version.trim().is_empty() {
            return fail("Project version is empty");
        }

        if self.is_installer() {
            if self.installer.license.is_none() {
                return fail("License file missing.");
            }
        } else {
            if self.project_file.as_deref().is_none_or(str::is_empty) {
                return fail("No project XML file selected");
            }
            if self.arch.is_none() {
                return fail("Architecture was not specified.");
            }
        }

        if self.project_type.is_plugin() {
            let Some(format) = self.plugin_format else {
                return fail("Plugin format was not specified.");
            };
            if !profile.supports_format(format) {
                return Err(Error::Validation(format!(
                    "{format} plugins cannot be built on {}",
                    profile.platform
                )));
            }
            if format == PluginFormat::Vst2 && self.plugin_categories.len() > 1 {
                return fail("VST2 plugins take a single category.");
            }
        } else if self.plugin_format.is_some() {
            return Err(Error::Validation(format!(
                "{} jobs do not take a plugin format",
                self.project_type
            )));
        }

        if self.notarize && !self.codesign {
            return fail("Code signing must be enabled for notarization.");
        }
        if (self.codesign || self.notarize) && !profile.supports_code_signing {
            return Err(Error::Validation(format!(
                "code signing is not available on {}",
                profile.platform
            )));
        }
        if self.notarize && self.bundle_id.as_deref().is_none_or(str::is_empty) {
            return fail("Bundle identifier is required for notarization.");
        }

        Ok(())
    }

    /// Location of the project file handed to the export CLI.
    ///
    /// `.xml` files are read from `XmlPresetBackups/`, everything else from `Presets/`.
    pub fn export_file_path(&self) -> Option<PathBuf> {
        let file = self.project_file.as_deref()?;
        let folder = match Path::new(file).extension().and_then(|e| e.to_str()) {
            Some("xml") => "XmlPresetBackups",
            _ => "Presets",
        };
        Some(self.project_path.join(folder).join(file))
    }
}

impl fmt::Display for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match (self.project_type, self.plugin_format) {
            (ProjectType::Instrument | ProjectType::Effect, Some(format)) => format.to_string(),
            (ty, _) => ty.to_string(),
        };
        let arch = self.arch.map(Arch::as_str).unwrap_or("N/A");
        write!(f, "{} [{kind}, {arch}]", self.project_name)?;
        if self.features.legacy_cpu {
            f.write_str(" legacy")?;
        }
        if self.features.ipp {
            f.write_str(" ipp")?;
        }
        if self.features.rlottie {
            f.write_str(" rlottie")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plugin_job() -> Job {
        Job {
            project_type: ProjectType::Effect,
            plugin_format: Some(PluginFormat::Vst3),
            arch: Some(Arch::X64),
            project_file: Some("Delay.xml".into()),
            ..Job::new("/p", "Delay", "1.2.0")
        }
    }

    #[test]
    fn plugin_job_requires_format() {
        let job = Job {
            plugin_format: None,
            ..plugin_job()
        };
        let err = job.validate(&PlatformProfile::linux()).unwrap_err();
        assert!(matches!(err, Error::Validation(m) if m.contains("Plugin format")));
    }

    #[test]
    fn installer_requires_license() {
        let job = Job {
            project_type: ProjectType::Installer,
            ..Job::new("/p", "Delay", "1.2.0")
        };
        assert!(job.validate(&PlatformProfile::linux()).is_err());

        let job = Job {
            installer: InstallerAssets {
                license: Some("/p/License.txt".into()),
                ..Default::default()
            },
            ..job
        };
        assert!(job.validate(&PlatformProfile::linux()).is_ok());
    }

    #[test]
    fn compilation_requires_arch_and_project_file() {
        let no_arch = Job {
            arch: None,
            ..plugin_job()
        };
        assert!(no_arch.validate(&PlatformProfile::linux()).is_err());

        let no_file = Job {
            project_file: None,
            ..plugin_job()
        };
        assert!(no_file.validate(&PlatformProfile::linux()).is_err());
    }

    #[test]
    fn au_rejected_off_macos() {
        let job = Job {
            plugin_format: Some(PluginFormat::Au),
            ..plugin_job()
        };
        assert!(job.validate(&PlatformProfile::windows()).is_err());
        assert!(job.validate(&PlatformProfile::macos()).is_ok());
    }

    #[test]
    fn notarize_implies_codesign() {
        let job = Job {
            notarize: true,
            bundle_id: Some("com.acme.delay".into()),
            ..plugin_job()
        };
        assert!(job.validate(&PlatformProfile::macos()).is_err());
        let job = Job {
            codesign: true,
            ..job
        };
        assert!(job.validate(&PlatformProfile::macos()).is_ok());
        assert!(job.validate(&PlatformProfile::linux()).is_err());
    }

    #[test]
    fn export_file_resolves_by_extension() {
        let job = plugin_job();
        assert_eq!(
            job.export_file_path().unwrap(),
            Path::new("/p/XmlPresetBackups/Delay.xml")
        );
        let job = Job {
            project_file: Some("Delay.hip".into()),
            ..job
        };
        assert_eq!(
            job.export_file_path().unwrap(),
            Path::new("/p/Presets/Delay.hip")
        );
    }

    #[test]
    fn vst_family_collapses_to_vst_flag() {
        assert_eq!(PluginFormat::Vst2.cli_flag(), "VST");
        assert_eq!(PluginFormat::Vst3.cli_flag(), "VST");
        assert_eq!(PluginFormat::Aax.cli_flag(), "AAX");
    }

    #[test]
    fn deserializes_from_queue_toml() {
        let job: Job = toml::from_str(
            r#"
            project_path = "/p"
            project_name = "Delay"
            project_version = "1.2.0"
            project_file = "Delay.xml"
            project_type = "effect"
            plugin_format = "VST3"
            plugin_categories = ["Fx", "Delay"]
            arch = "x64"
            [features]
            legacy_cpu = true
            "#,
        )
        .unwrap();
        assert_eq!(job.plugin_format, Some(PluginFormat::Vst3));
        assert!(job.features.legacy_cpu);
        assert!(!job.features.ipp);
    }
}
