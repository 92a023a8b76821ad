//! Process runner backed by `tokio::process`.

use super::{ProcessRunner, ProcessTracker, ToolCommand, ToolOutput};
use crate::exporter::error::{Error, Result};
use async_trait::async_trait;
use std::process::{ExitStatus, Stdio};
use tokio::{
    io::{AsyncBufReadExt, AsyncRead, BufReader},
    process::{Child, Command},
};
use tokio_util::sync::CancellationToken;

/// Spawns real processes, streams their output to the log and registers
/// them with a [`ProcessTracker`] while they run.
#[derive(Clone, Debug, Default)]
pub struct SystemRunner {
    tracker: ProcessTracker,
}

impl SystemRunner {
    pub fn new(tracker: ProcessTracker) -> Self {
        Self { tracker }
    }

    pub fn tracker(&self) -> &ProcessTracker {
        &self.tracker
    }
}

#[async_trait]
impl ProcessRunner for SystemRunner {
    async fn run(&self, command: &ToolCommand, cancel: &CancellationToken) -> Result<ToolOutput> {
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }

        log::debug!("Running: {command}");

        let mut cmd = Command::new(command.program());
        cmd.args(command.get_args())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(cwd) = command.cwd() {
            cmd.current_dir(cwd);
        }
        // Own process group so cancellation can take down every descendant.
        #[cfg(unix)]
        cmd.process_group(0);

        let mut child = cmd.spawn().map_err(|error| Error::CommandFailed {
            command: command.to_string(),
            error,
        })?;

        let category = command.category();
        let pid = child.id();
        if let Some(pid) = pid {
            self.tracker.track(category, pid);
        }

        let name = command.program_name();
        let finished = tokio::select! {
            result = collect(&mut child, &name) => Some(result),
            _ = cancel.cancelled() => None,
        };

        let Some((status, stdout, stderr)) = finished else {
            if let Some(pid) = pid {
                self.tracker.kill(category, pid);
            }
            if let Err(e) = child.kill().await {
                log::debug!("{name} already exited: {e}");
            }
            return Err(Error::Cancelled);
        };

        if let Some(pid) = pid {
            self.tracker.untrack(category, pid);
        }

        let status = status.map_err(|error| Error::CommandFailed {
            command: command.to_string(),
            error,
        })?;

        let code = status.code().unwrap_or(-1);
        if !status.success() {
            if cancel.is_cancelled() {
                return Err(Error::Cancelled);
            }
            return Err(Error::ToolFailed {
                command: command.to_string(),
                code,
                stderr,
            });
        }

        Ok(ToolOutput {
            code,
            stdout,
            stderr,
        })
    }
}

/// Drain stdout and stderr concurrently, then wait for exit.
async fn collect(
    child: &mut Child,
    name: &str,
) -> (std::io::Result<ExitStatus>, String, String) {
    let stdout = child.stdout.take();
    let stderr = child.stderr.take();

    let (stdout, stderr) = tokio::join!(drain(stdout, name, "stdout"), drain(stderr, name, "stderr"));
    let status = child.wait().await;
    (status, stdout, stderr)
}

async fn drain<R>(reader: Option<R>, name: &str, stream: &str) -> String
where
    R: AsyncRead + Unpin,
{
    let Some(reader) = reader else {
        return String::new();
    };

    let mut lines = BufReader::new(reader).lines();
    let mut captured = String::new();
    while let Ok(Some(line)) = lines.next_line().await {
        log::debug!("{name} {stream}: {line}");
        captured.push_str(&line);
        captured.push('\n');
    }
    captured
}
