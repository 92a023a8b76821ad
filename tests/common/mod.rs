//! Shared fixtures for integration tests: a scripted process runner and
//! throwaway HISE project trees.

#![allow(dead_code)]

use async_trait::async_trait;
use hise_exporter::exporter::{
    Arch, Error, ExportSettings, Job, PlatformProfile, PluginFormat, ProcessRunner,
    ProjectType, Result, SettingsBuilder, ToolCommand, ToolOutput,
    build::BinaryLocation,
};
use parking_lot::Mutex;
use std::{
    path::{Path, PathBuf},
    sync::Arc,
};
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

type Responder = dyn Fn(&ToolCommand) -> Result<ToolOutput> + Send + Sync;

/// Records every command and answers from a script. Commands without a
/// scripted answer succeed with empty output.
#[derive(Clone)]
pub struct ScriptedRunner {
    calls: Arc<Mutex<Vec<ToolCommand>>>,
    responder: Arc<Responder>,
}

impl Default for ScriptedRunner {
    fn default() -> Self {
        Self::new(|_| Ok(ToolOutput::default()))
    }
}

impl ScriptedRunner {
    pub fn new(responder: impl Fn(&ToolCommand) -> Result<ToolOutput> + Send + Sync + 'static) -> Self {
        Self {
            calls: Arc::default(),
            responder: Arc::new(responder),
        }
    }

    pub fn calls(&self) -> Vec<ToolCommand> {
        self.calls.lock().clone()
    }

    /// `program arg0 arg1 ...` per call, program reduced to its file name.
    pub fn command_lines(&self) -> Vec<String> {
        self.calls()
            .iter()
            .map(|c| {
                let mut line = c.program_name();
                for arg in c.args_lossy() {
                    line.push(' ');
                    line.push_str(&arg);
                }
                line
            })
            .collect()
    }

    /// Number of calls whose first argument is `verb`.
    pub fn count(&self, verb: &str) -> usize {
        self.calls()
            .iter()
            .filter(|c| c.args_lossy().first().map(String::as_str) == Some(verb))
            .count()
    }
}

#[async_trait]
impl ProcessRunner for ScriptedRunner {
    async fn run(&self, command: &ToolCommand, cancel: &CancellationToken) -> Result<ToolOutput> {
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }
        self.calls.lock().push(command.clone());
        (self.responder)(command)
    }
}

pub fn tool_failure(command: &ToolCommand, code: i32) -> Error {
    Error::ToolFailed {
        command: command.to_string(),
        code,
        stderr: "scripted failure".into(),
    }
}

pub fn output(stdout: &str) -> ToolOutput {
    ToolOutput {
        code: 0,
        stdout: stdout.to_string(),
        stderr: String::new(),
    }
}

/// A temporary HISE installation plus any number of projects.
pub struct Workspace {
    pub dir: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let ws = Self { dir };
        std::fs::create_dir_all(ws.hise_source()).unwrap();
        std::fs::write(ws.root().join("HISE"), "").unwrap();
        std::fs::create_dir_all(ws.root().join("assets")).unwrap();
        ws
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn hise_source(&self) -> PathBuf {
        self.root().join("hise")
    }

    pub fn settings(&self) -> SettingsBuilder {
        SettingsBuilder::new()
            .hise_executable(self.root().join("HISE"))
            .hise_source(self.hise_source())
            .assets_dir(self.root().join("assets"))
            .company_name("Acme Audio")
            .company_email("dev@acme.audio")
    }

    pub fn build_settings(&self) -> ExportSettings {
        self.settings().build().unwrap()
    }

    /// Resave helper for `profile`, executable.
    pub fn install_resave_helper(&self, profile: &PlatformProfile) {
        let helper = profile
            .resave_helper
            .iter()
            .fold(self.hise_source().join("tools").join("projucer"), |p, s| p.join(s));
        std::fs::create_dir_all(helper.parent().unwrap()).unwrap();
        std::fs::write(&helper, "#!/bin/sh\n").unwrap();
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&helper, std::fs::Permissions::from_mode(0o755)).unwrap();
        }
    }

    /// Project folder with a descriptor and a generated build project.
    pub fn project(&self, name: &str) -> PathBuf {
        let path = self.root().join("projects").join(name);
        std::fs::create_dir_all(path.join("Binaries")).unwrap();
        std::fs::write(
            path.join("project_info.xml"),
            format!(
                r#"<?xml version="1.0" encoding="UTF-8"?>

<ProjectSettings>
  <Name value="{name}"/>
  <Version value="0.1.0"/>
  <Description value="Keep me"/>
  <PluginCode value="Abcd"/>
</ProjectSettings>
"#
            ),
        )
        .unwrap();
        std::fs::write(
            path.join("Binaries").join("AutogeneratedProject.jucer"),
            format!(r#"<JUCERPROJECT name="{name}" companyName="Acme Audio"/>"#),
        )
        .unwrap();
        path
    }
}

/// Compilation job for `project`.
pub fn plugin_job(project: &Path, name: &str, format: PluginFormat) -> Job {
    Job {
        project_type: ProjectType::Instrument,
        plugin_format: Some(format),
        plugin_categories: vec!["Synth".into()],
        arch: Some(Arch::X64),
        project_file: Some(format!("{name}.xml")),
        ..Job::new(project, name, "1.0.0")
    }
}

pub fn standalone_job(project: &Path, name: &str) -> Job {
    Job {
        project_type: ProjectType::Standalone,
        arch: Some(Arch::X64),
        project_file: Some(format!("{name}.xml")),
        ..Job::new(project, name, "1.0.0")
    }
}

/// Create the binary the native build of `job` would produce.
pub fn fake_build_output(profile: &PlatformProfile, job: &Job) -> PathBuf {
    let origin = BinaryLocation::for_job(profile, job).origin;
    std::fs::create_dir_all(origin.parent().unwrap()).unwrap();
    std::fs::write(&origin, format!("binary of {}", job.project_name)).unwrap();
    origin
}
