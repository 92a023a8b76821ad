//! Job queue and the engine that works through it.
//!
//! # Module Organization
//!
//! - [`job_queue`] - ordered storage with stable slots and duplicate rejection
//! - [`engine`] - the sequential, cancellable run
//! - [`progress`] - status lines and notices for the front-end
//! - [`cancel`] - cancel handle shared with signal handlers

pub mod cancel;
pub mod engine;
pub mod job_queue;
pub mod progress;

pub use cancel::CancelHandle;
pub use engine::{EngineState, QueueEngine, RunOutcome, RunSummary};
pub use job_queue::JobQueue;
pub use progress::{LogProgress, Phase, ProgressEvent, ProgressSink, ProgressUpdate};
