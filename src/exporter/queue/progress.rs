//! Progress reporting from a queue run to whoever drives it.

use std::fmt;
use tokio::sync::mpsc::UnboundedSender;

/// Current task of the running job.
#[derive(Clone, Copy, Debug, Eq, PartialEq, serde::Serialize)]
pub enum Phase {
    Exporting,
    SavingProject,
    Signing,
    Notarizing,
}

impl Phase {
    pub fn label(self) -> &'static str {
        match self {
            Phase::Exporting => "Exporting",
            Phase::SavingProject => "Saving Project XML",
            Phase::Signing => "Signing",
            Phase::Notarizing => "Notarizing",
        }
    }
}

/// One status line: `<Task>: <current>/<total> <Project> | <detail>`.
#[derive(Clone, Debug, Eq, PartialEq, serde::Serialize)]
pub struct ProgressUpdate {
    pub phase: Phase,
    pub current: usize,
    pub total: usize,
    pub project: String,
    pub detail: String,
}

impl fmt::Display for ProgressUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {}/{} {}",
            self.phase.label(),
            self.current,
            self.total,
            self.project
        )?;
        if !self.detail.is_empty() {
            write!(f, " | {}", self.detail)?;
        }
        Ok(())
    }
}

/// Everything a run reports, as sent over a channel.
#[derive(Clone, Debug, Eq, PartialEq, serde::Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ProgressEvent {
    Progress(ProgressUpdate),
    Notice { message: String },
    /// The run ended; progress display should be cleared.
    Idle,
}

/// Receiver of run progress.
pub trait ProgressSink: Send + Sync {
    fn report(&self, update: &ProgressUpdate);

    /// A user-visible message that does not stop the run by itself.
    fn notice(&self, message: &str);

    fn idle(&self) {}
}

/// Writes progress to the log only.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogProgress;

impl ProgressSink for LogProgress {
    fn report(&self, update: &ProgressUpdate) {
        log::info!("{update}");
    }

    fn notice(&self, message: &str) {
        log::warn!("{message}");
    }
}

impl ProgressSink for UnboundedSender<ProgressEvent> {
    fn report(&self, update: &ProgressUpdate) {
        let _ = self.send(ProgressEvent::Progress(update.clone()));
    }

    fn notice(&self, message: &str) {
        let _ = self.send(ProgressEvent::Notice {
            message: message.to_string(),
        });
    }

    fn idle(&self) {
        let _ = self.send(ProgressEvent::Idle);
    }
}
