//! Windows installers via Inno Setup.
//!
//! # Module Organization
//!
//! - `template` - Inno Setup script template
//! - `script` - staging scan and script generation
//! - `utils` - BOM-prefixed script writing

mod script;
mod template;
mod utils;

pub use script::{InnoFiles, StagingScan, scan};

use super::{InstallerRequest, Packager, StagedFiles, list_file_names};
use crate::exporter::{
    error::{Context, Result},
    process::{ToolCategory, ToolCommand},
};
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;

pub(super) async fn package(
    packager: &Packager,
    request: &InstallerRequest<'_>,
    staging: &Path,
    staged: &mut StagedFiles,
    cancel: &CancellationToken,
) -> Result<Vec<PathBuf>> {
    let license = match request.assets.license.as_deref() {
        Some(license) => {
            staged.copy(license, staging.join("License.txt")).await?;
            Some("License.txt")
        }
        None => None,
    };

    if let Some(manual) = request.assets.manual.as_deref() {
        let extension = manual
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy()))
            .unwrap_or_default();
        let name = format!("{} User Manual{extension}", request.project_name);
        staged.copy(manual, staging.join(name)).await?;
    }

    let scan = scan(&list_file_names(staging).await?, request.project_name);
    for library in &scan.animation_libraries {
        staged.push(staging.join(library));
    }
    if !scan.normal.any() && !scan.legacy.any() {
        crate::bail!(
            "nothing to package in {}: no built binaries for {} were found",
            staging.display(),
            request.project_name
        );
    }

    let scripts = script::generate_scripts(packager, request, staging, &scan, license).await?;

    let mut installers = Vec::new();
    for (label, entry) in [("installer", scripts.normal), ("legacy CPU installer", scripts.legacy)] {
        let Some((script, installer)) = entry else {
            continue;
        };
        staged.push(script.clone());

        log::info!("Building {label}");
        let cmd = ToolCommand::new(packager.inno_setup_compiler(), ToolCategory::Packager)
            .arg(&script)
            .current_dir(staging);
        packager
            .runner()
            .run(&cmd, cancel)
            .await
            .with_context(|| format!("Inno Setup failed for {}", script.display()))?;
        installers.push(installer);
    }

    Ok(installers)
}
