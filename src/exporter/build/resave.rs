//! Resave of the generated build project through the Projucer helper.

use super::BuildInvoker;
use crate::exporter::{
    error::{Context, ErrorExt, Result},
    process::{ToolCategory, ToolCommand},
    project::BUILD_PROJECT_FILE,
};
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;

impl BuildInvoker {
    /// Location of the resave helper inside the HISE source tree.
    pub fn resave_helper(&self, hise_source: &Path) -> PathBuf {
        self.profile
            .resave_helper
            .iter()
            .fold(hise_source.join("tools").join("projucer"), |path, segment| {
                path.join(segment)
            })
    }

    /// `Projucer --resave AutogeneratedProject.jucer`, run in `<project>/Binaries`.
    pub async fn resave_project_file(
        &self,
        hise_source: &Path,
        project_path: &Path,
        cancel: &CancellationToken,
    ) -> Result<()> {
        let helper = self.resave_helper(hise_source);
        ensure_executable(&helper).await?;

        log::info!("Resaving {BUILD_PROJECT_FILE}");
        let cmd = ToolCommand::new(&helper, ToolCategory::BuildTool)
            .args(["--resave", BUILD_PROJECT_FILE])
            .current_dir(project_path.join("Binaries"));
        self.runner
            .run(&cmd, cancel)
            .await
            .context("failed to resave build project")?;
        Ok(())
    }
}

#[cfg(unix)]
async fn ensure_executable(helper: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let metadata = tokio::fs::metadata(helper)
        .await
        .fs_context("resave helper not found", helper)?;
    if metadata.permissions().mode() & 0o111 == 0 {
        log::debug!("Adding executable permission to {}", helper.display());
        tokio::fs::set_permissions(helper, std::fs::Permissions::from_mode(0o775))
            .await
            .fs_context("failed to make resave helper executable", helper)?;
    }
    Ok(())
}

#[cfg(not(unix))]
async fn ensure_executable(helper: &Path) -> Result<()> {
    tokio::fs::metadata(helper)
        .await
        .fs_context("resave helper not found", helper)?;
    Ok(())
}
