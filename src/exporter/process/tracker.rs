//! Live process bookkeeping for kill-on-cancel.

use super::ToolCategory;
use parking_lot::Mutex;
use std::{collections::HashMap, sync::Arc};

/// Tracks the one live process per [`ToolCategory`].
///
/// Processes are spawned as their own process group leader, so killing the
/// tracked pid's group also takes down the compilers and linkers it started.
#[derive(Clone, Debug, Default)]
pub struct ProcessTracker {
    live: Arc<Mutex<HashMap<ToolCategory, u32>>>,
}

impl ProcessTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `pid` as the live process for `category`.
    pub fn track(&self, category: ToolCategory, pid: u32) {
        if let Some(previous) = self.live.lock().insert(category, pid) {
            log::warn!("{category} process {previous} was still tracked when {pid} started");
        }
    }

    /// Forget the live process for `category` if it is `pid`.
    pub fn untrack(&self, category: ToolCategory, pid: u32) {
        let mut live = self.live.lock();
        if live.get(&category) == Some(&pid) {
            live.remove(&category);
        }
    }

    /// Currently tracked processes.
    pub fn live(&self) -> Vec<(ToolCategory, u32)> {
        self.live.lock().iter().map(|(c, p)| (*c, *p)).collect()
    }

    /// Kill the process group of `pid`.
    pub fn kill(&self, category: ToolCategory, pid: u32) -> bool {
        let killed = kill_group(pid);
        if killed {
            log::info!("Killed {category} process group {pid}");
        }
        self.untrack(category, pid);
        killed
    }

    /// Kill every tracked process group. Returns how many were signalled.
    pub fn kill_all(&self) -> usize {
        let drained: Vec<_> = self.live.lock().drain().collect();
        drained
            .into_iter()
            .filter(|(category, pid)| {
                let killed = kill_group(*pid);
                if killed {
                    log::info!("Killed {category} process group {pid}");
                } else {
                    log::debug!("{category} process {pid} is not active");
                }
                killed
            })
            .count()
    }
}

#[cfg(unix)]
fn kill_group(pid: u32) -> bool {
    use nix::{
        errno::Errno,
        sys::signal::{Signal, killpg},
        unistd::Pid,
    };

    let Ok(raw) = i32::try_from(pid) else {
        return false;
    };
    match killpg(Pid::from_raw(raw), Signal::SIGKILL) {
        Ok(()) => true,
        Err(Errno::ESRCH) => false,
        Err(e) => {
            log::warn!("Failed to kill process group {pid}: {e}");
            false
        }
    }
}

#[cfg(not(unix))]
fn kill_group(pid: u32) -> bool {
    std::process::Command::new("taskkill")
        .args(["/T", "/F", "/PID", &pid.to_string()])
        .status()
        .map(|status| status.success())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn untrack_ignores_stale_pid() {
        let tracker = ProcessTracker::new();
        tracker.track(ToolCategory::Compiler, 10);
        tracker.track(ToolCategory::Compiler, 11);
        tracker.untrack(ToolCategory::Compiler, 10);
        assert_eq!(tracker.live(), vec![(ToolCategory::Compiler, 11)]);
        tracker.untrack(ToolCategory::Compiler, 11);
        assert!(tracker.live().is_empty());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn kill_all_terminates_tracked_group() {
        use std::os::unix::process::ExitStatusExt;

        let mut child = tokio::process::Command::new("sleep")
            .arg("30")
            .process_group(0)
            .spawn()
            .unwrap();
        let tracker = ProcessTracker::new();
        tracker.track(ToolCategory::Compiler, child.id().unwrap());

        assert_eq!(tracker.kill_all(), 1);
        let status = child.wait().await.unwrap();
        assert_eq!(status.signal(), Some(9));
        assert!(tracker.live().is_empty());
    }
}
