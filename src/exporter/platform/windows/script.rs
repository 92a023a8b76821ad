//! Inno Setup script generation.
//!
//! The staging folder is scanned for built binaries; every detected file
//! enables its line in the script. Normal and legacy-CPU builds go into two
//! separate scripts.

use super::{template::ISS_TEMPLATE, utils};
use crate::exporter::{
    build::output::is_legacy_artifact,
    error::Result,
    platform::{InstallerRequest, Packager, render},
    settings::LEGACY_SUFFIX,
};
use std::path::{Path, PathBuf};

/// Binaries present for one installer variant.
#[derive(Clone, Debug, Default, Eq, PartialEq, serde::Serialize)]
pub struct InnoFiles {
    pub app_32: bool,
    pub app_64: bool,
    pub vst2_32: bool,
    pub vst2_64: bool,
    pub vst3_32: bool,
    pub vst3_64: bool,
    pub aax_32: bool,
    pub aax_64: bool,
}

impl InnoFiles {
    pub fn any(&self) -> bool {
        self.any_32() || self.any_64()
    }

    fn any_32(&self) -> bool {
        self.app_32 || self.vst2_32 || self.vst3_32 || self.aax_32
    }

    fn any_64(&self) -> bool {
        self.app_64 || self.vst2_64 || self.vst3_64 || self.aax_64
    }

    fn mark(&mut self, extension: &str, is_32_bit: bool) {
        let slot = match (extension, is_32_bit) {
            ("exe", true) => &mut self.app_32,
            ("exe", false) => &mut self.app_64,
            ("dll", true) => &mut self.vst2_32,
            ("dll", false) => &mut self.vst2_64,
            ("vst3", true) => &mut self.vst3_32,
            ("vst3", false) => &mut self.vst3_64,
            ("aaxplugin", true) => &mut self.aax_32,
            ("aaxplugin", false) => &mut self.aax_64,
            _ => return,
        };
        *slot = true;
    }
}

/// What the staging folder holds for a project.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct StagingScan {
    pub normal: InnoFiles,
    pub legacy: InnoFiles,
    pub user_manual: Option<String>,
    pub animation_libraries: Vec<String>,
}

/// Classify staged file names belonging to `project_name`.
///
/// Only `<Project> x64` / `<Project> x86` binaries (optionally legacy) count.
/// Installers from earlier runs and other projects sharing a name prefix are
/// ignored.
pub fn scan(file_names: &[String], project_name: &str) -> StagingScan {
    let mut result = StagingScan::default();
    let manual_prefix = format!("{project_name} User Manual.");

    for name in file_names {
        if name.starts_with("rlottie") {
            result.animation_libraries.push(name.clone());
            continue;
        }
        if name.starts_with(&manual_prefix) {
            result.user_manual = Some(name.clone());
            continue;
        }

        let path = Path::new(name);
        let (Some(stem), Some(extension)) = (
            path.file_stem().and_then(|s| s.to_str()),
            path.extension().and_then(|e| e.to_str()),
        ) else {
            continue;
        };
        let Some(is_32_bit) = binary_arch(stem.trim_end_matches(LEGACY_SUFFIX), project_name)
        else {
            continue;
        };

        let variant = if is_legacy_artifact(name) {
            &mut result.legacy
        } else {
            &mut result.normal
        };
        variant.mark(extension, is_32_bit);
    }

    result
}

/// `Some(true)` for `<Project> x86`, `Some(false)` for `<Project> x64`.
fn binary_arch(stem: &str, project_name: &str) -> Option<bool> {
    match stem.strip_prefix(project_name)? {
        " x86" => Some(true),
        " x64" => Some(false),
        _ => None,
    }
}

#[derive(serde::Serialize)]
struct IssData<'a> {
    app_name: &'a str,
    app_version: &'a str,
    publisher: &'a str,
    default_dir: String,
    output_dir: String,
    output_base_name: String,
    file_suffix: &'static str,
    license_file: Option<&'a str>,
    user_manual: Option<&'a str>,
    animation_libraries: bool,
    any_64: bool,
    app_any: bool,
    aax_dir_64: String,
    aax_dir_32: String,
    icon_name: String,
    app_exe: String,
    #[serde(flatten)]
    files: &'a InnoFiles,
}

/// Script paths written for this run.
#[derive(Clone, Debug, Default)]
pub struct GeneratedScripts {
    pub normal: Option<(PathBuf, PathBuf)>,
    pub legacy: Option<(PathBuf, PathBuf)>,
}

/// Render `installer.iss` and/or `legacy-installer.iss` into `staging`.
///
/// Each entry pairs the script with the installer it will produce.
pub async fn generate_scripts(
    packager: &Packager,
    request: &InstallerRequest<'_>,
    staging: &Path,
    scan: &StagingScan,
    license_file: Option<&str>,
) -> Result<GeneratedScripts> {
    let template = packager.template("inno-template.iss", ISS_TEMPLATE).await?;
    let mut scripts = GeneratedScripts::default();

    for (files, legacy) in [(&scan.normal, false), (&scan.legacy, true)] {
        if !files.any() {
            continue;
        }

        let output_base_name = format!(
            "{} {}{}",
            request.project_name,
            request.version,
            if legacy { " Legacy CPU" } else { "" }
        );
        let data = IssData {
            app_name: request.project_name,
            app_version: request.version,
            publisher: request.company_name,
            default_dir: format!(
                "{{autopf}}\\{}\\{}",
                request.company_name, request.project_name
            ),
            output_dir: staging.display().to_string(),
            output_base_name: output_base_name.clone(),
            file_suffix: if legacy { LEGACY_SUFFIX } else { "" },
            license_file,
            user_manual: scan.user_manual.as_deref(),
            animation_libraries: !scan.animation_libraries.is_empty(),
            any_64: files.any_64(),
            app_any: files.app_32 || files.app_64,
            aax_dir_64: format!(
                "{{commoncf64}}\\Avid\\Audio\\Plug-Ins\\{}.aaxplugin",
                request.project_name
            ),
            aax_dir_32: format!(
                "{{commoncf32}}\\Avid\\Audio\\Plug-Ins\\{}.aaxplugin",
                request.project_name
            ),
            icon_name: format!("{{group}}\\{}", request.project_name),
            app_exe: format!("{{app}}\\{}.exe", request.project_name),
            files,
        };

        let script_name = if legacy {
            "legacy-installer.iss"
        } else {
            "installer.iss"
        };
        let rendered = render("inno-setup-script", &template, &data)?;
        let script = staging.join(script_name);
        log::info!("Writing Inno Setup script {script_name}");
        utils::write_utf8_bom(&script, &rendered).await?;

        let installer = staging.join(format!("{output_base_name}.exe"));
        if legacy {
            scripts.legacy = Some((script, installer));
        } else {
            scripts.normal = Some((script, installer));
        }
    }

    Ok(scripts)
}
