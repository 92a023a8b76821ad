//! macOS distribution package.
//!
//! 1. `pkgbuild` one component package per staged bundle (and the manual)
//! 2. `productbuild --synthesize` a distribution manifest from them
//! 3. edit the manifest (license, readme, choice titles)
//! 4. `productbuild --distribution` the final `<Name> unsigned.pkg`

pub mod components;
pub mod distribution;

use super::{InstallerRequest, Packager, StagedFiles, list_file_names};
use crate::exporter::{
    build::output::is_legacy_artifact,
    error::{Context, Result},
    process::{ToolCategory, ToolCommand},
    utils::fs,
};
use components::{Component, ComponentKind};
use distribution::DistributionResources;
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;

const DISTRIBUTION: &str = "distribution.plist";
const LICENSE: &str = "License.txt";
const README: &str = "Read Me.txt";

pub(super) async fn package(
    packager: &Packager,
    request: &InstallerRequest<'_>,
    staging: &Path,
    staged: &mut StagedFiles,
    cancel: &CancellationToken,
) -> Result<Vec<PathBuf>> {
    let resources_dir = staging.join("Resources");
    let scripts_dir = staging.join("Scripts");
    let docs_dir = staging.join("Documentation");
    for dir in [&resources_dir, &scripts_dir] {
        fs::create_dir_all(dir).await?;
        staged.push(dir.clone());
    }

    let mut resources = DistributionResources::default();
    if let Some(license) = request.assets.license.as_deref() {
        staged.copy(license, resources_dir.join(LICENSE)).await?;
        resources.license = Some(LICENSE);
    }
    if let Some(readme) = request.assets.readme.as_deref() {
        staged.copy(readme, resources_dir.join(README)).await?;
        resources.readme = Some(README);
    }
    if let Some(script) = request.assets.post_install_script.as_deref() {
        let target = staged.copy(script, scripts_dir.join("postinstall")).await?;
        make_executable(&target).await?;
    }

    let mut components: Vec<Component> = list_file_names(staging)
        .await?
        .iter()
        .filter_map(|name| Component::new(request.company_name, request.project_name, name))
        .filter(|c| c.kind != ComponentKind::Documentation)
        .collect();

    if let Some(manual) = request.assets.manual.as_deref()
        && manual.extension().and_then(|e| e.to_str()) == Some("pdf")
    {
        let name = format!("{} User Manual.pdf", request.project_name);
        fs::create_dir_all(&docs_dir).await?;
        staged.push(docs_dir.clone());
        staged.copy(manual, docs_dir.join(&name)).await?;
        components.extend(Component::new(
            request.company_name,
            request.project_name,
            &name,
        ));
    }

    if components.is_empty() {
        crate::bail!(
            "nothing to package in {}: no built binaries were found",
            staging.display()
        );
    }

    log::info!("Building component packages");
    for component in &components {
        let package = staging.join(component.package_name());
        staged.push(package.clone());

        let mut cmd = ToolCommand::new("pkgbuild", ToolCategory::Packager)
            .arg("--install-location")
            .arg(&component.install_location)
            .arg("--version")
            .arg(request.version)
            .arg("--identifier")
            .arg(&component.identifier);
        cmd = if component.kind == ComponentKind::Documentation {
            cmd.arg("--root").arg(&docs_dir)
        } else {
            cmd.arg("--component").arg(staging.join(&component.file_name))
        };
        let cmd = cmd.arg(&package).current_dir(staging);

        packager
            .runner()
            .run(&cmd, cancel)
            .await
            .with_context(|| format!("pkgbuild failed for {}", component.file_name))?;
    }

    log::info!("Making distribution manifest");
    let manifest = staging.join(DISTRIBUTION);
    staged.push(manifest.clone());
    let mut cmd = ToolCommand::new("productbuild", ToolCategory::Packager).arg("--synthesize");
    for component in &components {
        cmd = cmd.arg("--package").arg(component.package_name());
    }
    let cmd = cmd.arg(&manifest).current_dir(staging);
    packager
        .runner()
        .run(&cmd, cancel)
        .await
        .context("productbuild --synthesize failed")?;

    distribution::edit(&manifest, &components, resources).await?;

    log::info!("Building distribution package");
    let output = staging.join(format!("{} unsigned.pkg", request.project_name));
    fs::remove_file_if_exists(&output).await?;
    let cmd = ToolCommand::new("productbuild", ToolCategory::Packager)
        .arg("--distribution")
        .arg(&manifest)
        .arg("--package-path")
        .arg(staging)
        .arg("--resources")
        .arg(&resources_dir)
        .arg("--scripts")
        .arg(&scripts_dir)
        .arg(&output)
        .current_dir(staging);
    packager
        .runner()
        .run(&cmd, cancel)
        .await
        .context("productbuild failed")?;

    Ok(vec![output])
}

/// Builds carrying a legacy, IPP or debug marker next to a normal build.
fn is_variant(file_name: &str) -> bool {
    is_legacy_artifact(file_name) || file_name.contains("IPP") || file_name.contains("Debug")
}

#[cfg(unix)]
async fn make_executable(path: &Path) -> Result<()> {
    use crate::exporter::error::ErrorExt;
    use std::os::unix::fs::PermissionsExt;
    tokio::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755))
        .await
        .fs_context("failed to make postinstall script executable", path)
}

#[cfg(not(unix))]
async fn make_executable(_path: &Path) -> Result<()> {
    Ok(())
}
