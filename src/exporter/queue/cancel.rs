//! Cooperative cancellation of a queue run.

use crate::exporter::process::ProcessTracker;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Cloneable handle that stops the running queue.
///
/// Cancelling prevents the next step from starting and kills whatever
/// external process is tracked, so the step awaiting it fails promptly.
/// Every run starts with a fresh token: a cancel issued while the engine is
/// idle does not carry over into the next run.
#[derive(Clone, Debug, Default)]
pub struct CancelHandle {
    token: Arc<Mutex<CancellationToken>>,
    tracker: ProcessTracker,
}

impl CancelHandle {
    pub fn new(tracker: ProcessTracker) -> Self {
        Self {
            token: Arc::default(),
            tracker,
        }
    }

    pub fn cancel(&self) {
        log::info!("Cancelling export");
        self.token.lock().cancel();
        let killed = self.tracker.kill_all();
        if killed > 0 {
            log::debug!("Killed {killed} running process(es)");
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.lock().is_cancelled()
    }

    /// Token for the current run.
    pub fn token(&self) -> CancellationToken {
        self.token.lock().clone()
    }

    pub fn tracker(&self) -> &ProcessTracker {
        &self.tracker
    }

    /// Install a fresh token for a new run and return it. Any earlier
    /// cancel is discarded.
    pub(crate) fn begin_run(&self) -> CancellationToken {
        let fresh = CancellationToken::new();
        *self.token.lock() = fresh.clone();
        fresh
    }
}
