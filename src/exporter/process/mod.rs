//! External tool execution.
//!
//! Every tool the pipeline drives (HISE, make/xcodebuild/MSBuild, codesign,
//! installer builders) runs through a [`ProcessRunner`] as a structured
//! argument vector. No shell is involved, so paths with spaces need no quoting.

mod runner;
mod tracker;

pub use runner::SystemRunner;
pub use tracker::ProcessTracker;

use crate::exporter::error::Result;
use async_trait::async_trait;
use std::{
    ffi::{OsStr, OsString},
    fmt,
    path::{Path, PathBuf},
};
use tokio_util::sync::CancellationToken;

/// Long-running tool category. At most one process per category is live.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum ToolCategory {
    /// HISE CLI and the project resave helper.
    BuildTool,
    /// Native compiler / build system.
    Compiler,
    /// codesign, productsign, notarization tooling.
    Signer,
    /// Installer builders.
    Packager,
}

impl fmt::Display for ToolCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ToolCategory::BuildTool => "build tool",
            ToolCategory::Compiler => "compiler",
            ToolCategory::Signer => "signer",
            ToolCategory::Packager => "packager",
        })
    }
}

/// A program invocation: executable, argument vector and working directory.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ToolCommand {
    program: OsString,
    args: Vec<OsString>,
    cwd: Option<PathBuf>,
    category: ToolCategory,
}

impl ToolCommand {
    pub fn new(program: impl AsRef<OsStr>, category: ToolCategory) -> Self {
        Self {
            program: program.as_ref().to_os_string(),
            args: Vec::new(),
            cwd: None,
            category,
        }
    }

    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args
            .extend(args.into_iter().map(|a| a.as_ref().to_os_string()));
        self
    }

    /// `<flag><path>` as a single argument, e.g. `-p:/work/project`.
    pub fn prefixed_path(self, flag: &str, path: &Path) -> Self {
        let mut arg = OsString::from(flag);
        arg.push(path.as_os_str());
        self.arg(arg)
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    pub fn program(&self) -> &OsStr {
        &self.program
    }

    pub fn get_args(&self) -> &[OsString] {
        &self.args
    }

    pub fn cwd(&self) -> Option<&Path> {
        self.cwd.as_deref()
    }

    pub fn category(&self) -> ToolCategory {
        self.category
    }

    /// Program file name without directories (`make`, `ISCC.exe`).
    pub fn program_name(&self) -> String {
        Path::new(&self.program)
            .file_name()
            .unwrap_or(&self.program)
            .to_string_lossy()
            .into_owned()
    }

    /// Arguments as lossy UTF-8, convenient for assertions and logs.
    pub fn args_lossy(&self) -> Vec<String> {
        self.args
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }
}

impl fmt::Display for ToolCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.to_string_lossy())?;
        for arg in &self.args {
            write!(f, " {}", arg.to_string_lossy())?;
        }
        Ok(())
    }
}

/// Captured output of a successful (exit code 0) invocation.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ToolOutput {
    pub code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl ToolOutput {
    /// stdout when non-empty, otherwise stderr. Some tools (altool) report on stderr.
    pub fn text(&self) -> &str {
        if self.stdout.trim().is_empty() {
            &self.stderr
        } else {
            &self.stdout
        }
    }
}

/// Executes external tools.
///
/// A nonzero exit code is [`Error::ToolFailed`](crate::exporter::Error::ToolFailed);
/// a triggered `cancel` token kills the process and yields
/// [`Error::Cancelled`](crate::exporter::Error::Cancelled).
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    async fn run(&self, command: &ToolCommand, cancel: &CancellationToken) -> Result<ToolOutput>;
}
