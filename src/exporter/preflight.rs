//! Environment checks run before jobs are queued.
//!
//! Jobs are rejected when a required SDK or packaging tool is missing, so a
//! run does not fail halfway through on something detectable up front.

use crate::exporter::{
    error::{Error, Result},
    settings::{ExportSettings, HostPlatform, Job, PackagerKind, PlatformProfile, PluginFormat},
};
use std::path::{Path, PathBuf};

/// One missing prerequisite.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PreflightIssue {
    pub what: &'static str,
    pub path: Option<PathBuf>,
}

impl std::fmt::Display for PreflightIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.path {
            Some(path) => write!(f, "{} not found ({})", self.what, path.display()),
            None => write!(f, "{} not found", self.what),
        }
    }
}

/// Prerequisite checks against the configured HISE installation.
#[derive(Clone, Copy, Debug)]
pub struct Preflight<'a> {
    settings: &'a ExportSettings,
    profile: &'a PlatformProfile,
}

impl<'a> Preflight<'a> {
    pub fn new(settings: &'a ExportSettings, profile: &'a PlatformProfile) -> Self {
        Self { settings, profile }
    }

    fn sdk(&self) -> PathBuf {
        self.settings.hise_source().join("tools").join("SDK")
    }

    pub fn asio_sdk(&self) -> PathBuf {
        self.sdk().join("ASIOSDK2.3").join("common")
    }

    pub fn vst2_sdk(&self) -> PathBuf {
        self.sdk()
            .join("VST3 SDK")
            .join("pluginterfaces")
            .join("vst2.x")
            .join("aeffect.h")
    }

    pub fn vst3_sdk(&self) -> PathBuf {
        self.settings
            .hise_source()
            .join("JUCE")
            .join("modules")
            .join("juce_audio_processors")
            .join("format_types")
            .join("VST3_SDK")
    }

    pub fn aax_sdk(&self) -> PathBuf {
        self.sdk().join("AAX").join("Libs")
    }

    pub fn makeself(&self) -> PathBuf {
        self.settings.assets_dir().join("makeself").join("makeself.sh")
    }

    /// Checks that apply to every job: HISE itself.
    pub fn check_environment(&self) -> Vec<PreflightIssue> {
        let mut issues = Vec::new();
        require_path(&mut issues, "HISE executable", self.settings.hise_executable());
        require_path(&mut issues, "HISE source folder", self.settings.hise_source());
        issues
    }

    /// Prerequisites of `job`, returning the first missing one as a
    /// validation error.
    pub fn check_job(&self, job: &Job) -> Result<()> {
        let mut issues = self.check_environment();

        if job.is_installer() {
            self.check_packager(&mut issues);
        } else if self.profile.requires_asio_sdk {
            require_path(&mut issues, "ASIO SDK", &self.asio_sdk());
        }

        match job.plugin_format {
            Some(PluginFormat::Vst2) => require_path(&mut issues, "VST2 SDK", &self.vst2_sdk()),
            Some(PluginFormat::Vst3) => require_path(&mut issues, "VST3 SDK", &self.vst3_sdk()),
            Some(PluginFormat::Aax) => require_path(&mut issues, "AAX SDK", &self.aax_sdk()),
            Some(PluginFormat::Au) | None => {}
        }

        if (job.codesign || job.notarize) && self.profile.platform == HostPlatform::Macos {
            require_tool(&mut issues, "codesign");
            require_tool(&mut issues, "xcrun");
        }

        match issues.into_iter().next() {
            Some(issue) => Err(Error::Validation(format!("{issue}."))),
            None => Ok(()),
        }
    }

    fn check_packager(&self, issues: &mut Vec<PreflightIssue>) {
        match self.profile.packager {
            PackagerKind::Makeself => require_path(issues, "makeself", &self.makeself()),
            PackagerKind::ProductBuild => {
                require_tool(issues, "pkgbuild");
                require_tool(issues, "productbuild");
            }
            PackagerKind::InnoSetup => require_path(
                issues,
                "Inno Setup 6 installation",
                self.settings.inno_setup_compiler(),
            ),
        }
    }
}

fn require_path(issues: &mut Vec<PreflightIssue>, what: &'static str, path: &Path) {
    if !path.exists() {
        issues.push(PreflightIssue {
            what,
            path: Some(path.to_path_buf()),
        });
    }
}

fn require_tool(issues: &mut Vec<PreflightIssue>, tool: &'static str) {
    match which::which(tool) {
        Ok(path) => log::debug!("Found {tool} at: {}", path.display()),
        Err(_) => issues.push(PreflightIssue {
            what: tool,
            path: None,
        }),
    }
}
