//! Native compilation: make, xcodebuild or MSBuild.

use super::{BuildConfiguration, BuildInvoker};
use crate::exporter::{
    error::{Context, Error, Result},
    process::{ToolCategory, ToolCommand},
    settings::{Arch, NativeBuild, default_build_jobs},
};
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;

impl BuildInvoker {
    /// Native build command for the generated project of `project_path`.
    pub fn compile_command(
        &self,
        project_path: &Path,
        arch: Arch,
        configuration: BuildConfiguration,
    ) -> Result<ToolCommand> {
        let build_dir = project_path
            .join("Binaries")
            .join("Builds")
            .join(self.profile.build_folder);
        let config = configuration.as_str();

        let cmd = match self.profile.native_build {
            NativeBuild::Make => ToolCommand::new("make", ToolCategory::Compiler).args([
                format!("CONFIG={config}"),
                "AR=gcc-ar".to_string(),
                "-j".to_string(),
                default_build_jobs().to_string(),
            ]),
            NativeBuild::Xcode => {
                let project = find_xcode_project(&build_dir)?;
                ToolCommand::new("xcodebuild", ToolCategory::Compiler)
                    .arg("-project")
                    .arg(&project)
                    .args([
                        "-configuration".to_string(),
                        config.to_string(),
                        "-jobs".to_string(),
                        self.ide_jobs.to_string(),
                    ])
            }
            NativeBuild::MsBuild => ToolCommand::new(&self.msbuild, ToolCategory::Compiler).args([
                "-ignore:.vcxproj".to_string(),
                "-nr:false".to_string(),
                format!("/p:Configuration={config}"),
                format!("/p:Platform={}", arch.msbuild_platform()),
                format!("-maxcpucount:{}", default_build_jobs()),
                "-fl".to_string(),
                "-flp:logfile=BuildOutput.log;verbosity=minimal".to_string(),
            ]),
        };

        Ok(cmd.current_dir(build_dir))
    }

    /// Compile the generated project. Rejects with the tool's exit code.
    pub async fn compile(
        &self,
        project_path: &Path,
        arch: Arch,
        configuration: BuildConfiguration,
        cancel: &CancellationToken,
    ) -> Result<()> {
        let cmd = self.compile_command(project_path, arch, configuration)?;
        log::info!("Compiling {} ({arch}, {})", project_path.display(), configuration.as_str());
        self.runner
            .run(&cmd, cancel)
            .await
            .context("native build failed")?;
        Ok(())
    }
}

/// First `*.xcodeproj` in `build_dir`, as a file name relative to it.
fn find_xcode_project(build_dir: &Path) -> Result<PathBuf> {
    let pattern = build_dir.join("*.xcodeproj");
    let pattern = pattern
        .to_str()
        .ok_or_else(|| Error::NonUtf8Path(pattern.clone()))?;

    let found = glob::glob(pattern)
        .map_err(|e| Error::GenericError(format!("invalid glob pattern {pattern}: {e}")))?
        .filter_map(|entry| entry.ok())
        .next()
        .with_context(|| format!("no .xcodeproj found in {}", build_dir.display()))?;

    Ok(found
        .file_name()
        .map(PathBuf::from)
        .unwrap_or(found))
}
