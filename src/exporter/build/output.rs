//! Where the native build leaves a binary and what it is called.
//!
//! These must match the native build systems exactly: the engine copies
//! from the computed path straight after compilation.

use crate::exporter::settings::{
    Arch, Job, LEGACY_SUFFIX, OutputLayout, PlatformProfile, PluginFormat, ProjectType,
};
use std::path::{Path, PathBuf};

/// Native build configuration.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BuildConfiguration {
    Release,
    Debug,
}

impl BuildConfiguration {
    pub fn for_job(job: &Job) -> Self {
        if job.features.debug {
            BuildConfiguration::Debug
        } else {
            BuildConfiguration::Release
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BuildConfiguration::Release => "Release",
            BuildConfiguration::Debug => "Debug",
        }
    }
}

/// Extension of the built artifact, including the leading dot.
///
/// VST3, AU and AAX are the same on every platform; standalone and VST2
/// come from the profile. Installer jobs build no binary.
pub fn binary_extension(
    profile: &PlatformProfile,
    project_type: ProjectType,
    format: Option<PluginFormat>,
) -> &'static str {
    match (project_type, format) {
        (ProjectType::Installer, _) => "",
        (_, Some(PluginFormat::Vst3)) => ".vst3",
        (_, Some(PluginFormat::Au)) => ".component",
        (_, Some(PluginFormat::Aax)) => ".aaxplugin",
        (_, Some(PluginFormat::Vst2)) => profile.vst2_extension,
        (ProjectType::Standalone, None) => profile.standalone_extension,
        (_, None) => "",
    }
}

/// Folder the native build writes the artifact into.
pub fn output_directory(
    profile: &PlatformProfile,
    project_path: &Path,
    project_type: ProjectType,
    format: Option<PluginFormat>,
    configuration: BuildConfiguration,
) -> PathBuf {
    let binaries = project_path.join("Binaries");
    match profile.output_layout {
        OutputLayout::SingleBuildDir => binaries
            .join("Builds")
            .join(profile.build_folder)
            .join("build"),
        OutputLayout::CompiledOrConfigDir => {
            if project_type == ProjectType::Standalone {
                binaries.join("Compiled")
            } else {
                binaries
                    .join("Builds")
                    .join(profile.build_folder)
                    .join("build")
                    .join(configuration.as_str())
            }
        }
        OutputLayout::CompiledPerFormat => {
            let compiled = binaries.join("Compiled");
            match (project_type, format) {
                (ProjectType::Standalone, _) | (_, None) => compiled.join("App"),
                (_, Some(PluginFormat::Vst2)) => compiled.join("VST"),
                (_, Some(format)) => compiled.join(format.as_str()),
            }
        }
    }
}

/// Base name of the built artifact, without extension.
pub fn output_name(profile: &PlatformProfile, project_name: &str, arch: Option<Arch>) -> String {
    match arch {
        Some(arch) if profile.output_name_includes_arch => format!("{project_name} {arch}"),
        _ => project_name.to_string(),
    }
}

/// Staged name of an artifact: the vectorization suffix where the platform
/// marks such builds, then the legacy-CPU suffix.
pub fn derived_filename(
    profile: &PlatformProfile,
    base_name: &str,
    vectorized: bool,
    legacy: bool,
) -> String {
    let mut name = base_name.to_string();
    if vectorized && let Some(suffix) = profile.vectorization_suffix {
        name.push_str(suffix);
    }
    if legacy {
        name.push_str(LEGACY_SUFFIX);
    }
    name
}

/// True when a staged file name marks a legacy-CPU build.
pub fn is_legacy_artifact(file_name: &str) -> bool {
    Path::new(file_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .is_some_and(|stem| stem.ends_with(LEGACY_SUFFIX))
}

/// Source and staged destination of a compiled binary.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BinaryLocation {
    pub origin: PathBuf,
    pub destination: PathBuf,
}

impl BinaryLocation {
    pub fn for_job(profile: &PlatformProfile, job: &Job) -> Self {
        let extension =
            binary_extension(profile, job.project_type, job.plugin_format);
        let built_name = output_name(profile, &job.project_name, job.arch);
        let staged_name = derived_filename(
            profile,
            &built_name,
            job.features.ipp,
            job.features.legacy_cpu,
        );
        let directory = output_directory(
            profile,
            &job.project_path,
            job.project_type,
            job.plugin_format,
            BuildConfiguration::for_job(job),
        );

        Self {
            origin: directory.join(format!("{built_name}{extension}")),
            destination: profile
                .staging_dir(&job.project_path)
                .join(format!("{staged_name}{extension}")),
        }
    }
}
