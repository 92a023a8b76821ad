//! Installer packaging, one tool chain per platform.
//!
//! # Module Organization
//!
//! - `linux` - self-extracting `.run` archive via makeself
//! - `macos` - pkgbuild/productbuild distribution package
//! - `windows` - Inno Setup installers (normal and legacy-CPU)
//!
//! Every packager copies the optional resources into the staging folder,
//! renders its template, runs the external tool and then removes the staged
//! resources again, whether or not the tool succeeded.

pub mod linux;
pub mod macos;
pub mod windows;

use crate::exporter::{
    error::{ErrorExt, Result},
    process::ProcessRunner,
    settings::{ExportSettings, InstallerAssets, PackagerKind, PlatformProfile},
    utils::fs,
};
use handlebars::Handlebars;
use std::{
    path::{Path, PathBuf},
    sync::Arc,
};
use tokio_util::sync::CancellationToken;

/// Arguments shared by every platform packager.
#[derive(Clone, Copy, Debug)]
pub struct InstallerRequest<'a> {
    pub project_path: &'a Path,
    pub project_name: &'a str,
    pub version: &'a str,
    pub company_name: &'a str,
    pub assets: &'a InstallerAssets,
}

/// Builds installers from the contents of the staging folder.
#[derive(Clone)]
pub struct Packager {
    runner: Arc<dyn ProcessRunner>,
    profile: PlatformProfile,
    assets_dir: PathBuf,
    inno_setup_compiler: PathBuf,
}

impl Packager {
    pub fn new(
        runner: Arc<dyn ProcessRunner>,
        profile: PlatformProfile,
        settings: &ExportSettings,
    ) -> Self {
        Self {
            runner,
            profile,
            assets_dir: settings.assets_dir().to_path_buf(),
            inno_setup_compiler: settings.inno_setup_compiler().to_path_buf(),
        }
    }

    /// Build the installer(s) for the profile's platform.
    ///
    /// Returns the produced artifacts; the Windows packager may produce a
    /// normal and a legacy-CPU installer.
    pub async fn package_for_platform(
        &self,
        request: &InstallerRequest<'_>,
        cancel: &CancellationToken,
    ) -> Result<Vec<PathBuf>> {
        let staging = self.profile.staging_dir(request.project_path);
        fs::create_dir_all(&staging).await?;

        log::info!(
            "Packaging {} {} for {}",
            request.project_name,
            request.version,
            self.profile.platform
        );

        let mut staged = StagedFiles::default();
        let result = match self.profile.packager {
            PackagerKind::Makeself => {
                linux::package(self, request, &staging, &mut staged, cancel).await
            }
            PackagerKind::ProductBuild => {
                macos::package(self, request, &staging, &mut staged, cancel).await
            }
            PackagerKind::InnoSetup => {
                windows::package(self, request, &staging, &mut staged, cancel).await
            }
        };
        staged.cleanup().await;
        result
    }

    pub(crate) fn runner(&self) -> &dyn ProcessRunner {
        self.runner.as_ref()
    }

    pub(crate) fn assets_dir(&self) -> &Path {
        &self.assets_dir
    }

    pub(crate) fn inno_setup_compiler(&self) -> &Path {
        &self.inno_setup_compiler
    }

    /// Template text: `<assets>/<file_name>` when present, else the built-in one.
    pub(crate) async fn template(&self, file_name: &str, builtin: &'static str) -> Result<String> {
        let custom = self.assets_dir.join(file_name);
        if custom.is_file() {
            log::debug!("Using template override {}", custom.display());
            return tokio::fs::read_to_string(&custom)
                .await
                .fs_context("failed to read template", &custom);
        }
        Ok(builtin.to_string())
    }
}

/// Copy the profile's animation runtime libraries from `<assets>/rlottie` to
/// the staging folder.
pub async fn copy_animation_libraries(
    profile: &PlatformProfile,
    assets_dir: &Path,
    staging: &Path,
) -> Result<Vec<PathBuf>> {
    let source = assets_dir.join("rlottie");
    let mut copied = Vec::with_capacity(profile.animation_libraries.len());
    for library in profile.animation_libraries {
        let destination = staging.join(library);
        fs::copy_file(&source.join(library), &destination).await?;
        copied.push(destination);
    }
    Ok(copied)
}

/// Intermediate files placed next to the artifacts; removed after packaging.
#[derive(Debug, Default)]
pub(crate) struct StagedFiles {
    paths: Vec<PathBuf>,
}

impl StagedFiles {
    pub(crate) fn push(&mut self, path: impl Into<PathBuf>) {
        self.paths.push(path.into());
    }

    /// Copy `from` to `to` and remember `to` for cleanup.
    pub(crate) async fn copy(&mut self, from: &Path, to: PathBuf) -> Result<PathBuf> {
        fs::copy_file(from, &to).await?;
        self.push(to.clone());
        Ok(to)
    }

    /// Write `contents` to `to` and remember it for cleanup.
    pub(crate) async fn write(&mut self, to: PathBuf, contents: &[u8]) -> Result<PathBuf> {
        tokio::fs::write(&to, contents)
            .await
            .fs_context("failed to write staged file", &to)?;
        self.push(to.clone());
        Ok(to)
    }

    async fn cleanup(self) {
        for path in self.paths.iter().rev() {
            if let Err(e) = fs::remove_path_if_exists(path).await {
                log::warn!("Failed to clean up {}: {e}", path.display());
            }
        }
    }
}

/// Handlebars renderer without HTML escaping: templates are shell scripts
/// and installer scripts, not markup.
pub(crate) fn render<T: serde::Serialize>(
    name: &'static str,
    template: &str,
    data: &T,
) -> Result<String> {
    let mut handlebars = Handlebars::new();
    handlebars.register_escape_fn(handlebars::no_escape);
    handlebars
        .register_template_string(name, template)
        .map_err(|e| crate::exporter::Error::Template {
            name,
            message: e.to_string(),
        })?;
    handlebars
        .render(name, data)
        .map_err(|e| crate::exporter::Error::Template {
            name,
            message: e.to_string(),
        })
}

/// File names directly inside `dir`, sorted.
pub(crate) async fn list_file_names(dir: &Path) -> Result<Vec<String>> {
    let mut entries = tokio::fs::read_dir(dir)
        .await
        .fs_context("failed to read staging directory", dir)?;
    let mut names = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .fs_context("failed to read staging directory", dir)?
    {
        names.push(entry.file_name().to_string_lossy().into_owned());
    }
    names.sort();
    Ok(names)
}
