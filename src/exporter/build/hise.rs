//! HISE command-line calls.

use super::BuildInvoker;
use crate::exporter::{
    error::{Context, Result},
    process::{ToolCategory, ToolCommand},
    settings::{Arch, Job, PluginFormat, ProjectType},
};
use std::path::Path;
use tokio_util::sync::CancellationToken;

/// Structured arguments of an `export_ci` call.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ExportArgs {
    pub project_type: ProjectType,
    pub plugin_format: Option<PluginFormat>,
    pub arch: Option<Arch>,
    pub vectorized: bool,
    pub legacy_cpu: bool,
}

impl ExportArgs {
    pub fn from_job(job: &Job) -> Self {
        Self {
            project_type: job.project_type,
            plugin_format: job.plugin_format,
            arch: job.arch,
            vectorized: job.features.ipp,
            legacy_cpu: job.features.legacy_cpu,
        }
    }

    /// Flag syntax understood by the CLI: `-t:<type> -p:<format> -a:<arch> [-ipp] [-l]`.
    pub fn to_cli_args(&self) -> Vec<String> {
        let mut args = vec![format!("-t:{}", self.project_type)];
        if let Some(format) = self.plugin_format {
            args.push(format!("-p:{}", format.cli_flag()));
        }
        if let Some(arch) = self.arch {
            args.push(format!("-a:{arch}"));
        }
        if self.vectorized {
            args.push("-ipp".to_string());
        }
        if self.legacy_cpu {
            args.push("-l".to_string());
        }
        args
    }
}

impl BuildInvoker {
    /// Point HISE at its source tree, the project folder and the project version.
    pub async fn configure_environment(
        &self,
        hise: &Path,
        hise_source: &Path,
        project_path: &Path,
        version: &str,
        cancel: &CancellationToken,
    ) -> Result<()> {
        log::info!("Setting HISE source folder");
        let cmd = ToolCommand::new(hise, ToolCategory::BuildTool)
            .arg("set_hise_folder")
            .prefixed_path("-p:", hise_source);
        self.runner
            .run(&cmd, cancel)
            .await
            .context("failed to set HISE source folder")?;

        log::info!("Setting project folder");
        let cmd = ToolCommand::new(hise, ToolCategory::BuildTool)
            .arg("set_project_folder")
            .prefixed_path("-p:", project_path);
        self.runner
            .run(&cmd, cancel)
            .await
            .context("failed to set project folder")?;

        log::info!("Setting project version");
        let cmd = ToolCommand::new(hise, ToolCategory::BuildTool)
            .arg("set_version")
            .arg(format!("-v:{version}"));
        self.runner
            .run(&cmd, cancel)
            .await
            .context("failed to set project version")?;

        Ok(())
    }

    pub async fn clean_build_directory(
        &self,
        hise: &Path,
        project_path: &Path,
        cancel: &CancellationToken,
    ) -> Result<()> {
        log::info!("Cleaning build directory");
        let cmd = ToolCommand::new(hise, ToolCategory::BuildTool)
            .arg("clean")
            .prefixed_path("-p:", project_path)
            .arg("--all");
        self.runner
            .run(&cmd, cancel)
            .await
            .context("failed to clean build directory")?;
        Ok(())
    }

    /// `export_ci <project file> <flags>`.
    pub async fn export(
        &self,
        hise: &Path,
        project_file: &Path,
        args: &ExportArgs,
        cancel: &CancellationToken,
    ) -> Result<()> {
        log::info!("Running HISE export of {}", project_file.display());
        let cmd = ToolCommand::new(hise, ToolCategory::BuildTool)
            .arg("export_ci")
            .arg(project_file)
            .args(args.to_cli_args());
        self.runner
            .run(&cmd, cancel)
            .await
            .context("HISE export failed")?;
        Ok(())
    }
}
