//! `run`: queue every valid job and process the queue.

use super::{EXIT_CANCELLED, EXIT_FAILED, EXIT_OK, validate::admit};
use crate::{
    cli::{Args, RuntimeConfig, config},
    error::Result,
    exporter::{
        Preflight, ProcessTracker, ProgressEvent, QueueEngine, RunOutcome, SystemRunner,
    },
};
use std::{path::Path, sync::Arc};
use tokio::sync::mpsc;

pub async fn run(args: &Args, queue: &Path, runtime: &RuntimeConfig) -> Result<i32> {
    let output = *runtime.output();
    let settings = config::load_settings(args.config.as_deref())?;
    let profile = args.profile();
    let jobs = config::load_queue(queue)?;

    let (events, mut receiver) = mpsc::unbounded_channel::<ProgressEvent>();
    let tracker = ProcessTracker::new();
    let runner = Arc::new(SystemRunner::new(tracker.clone()));
    let mut engine = QueueEngine::new(settings.clone(), profile.clone(), runner, tracker)
        .with_progress(Arc::new(events));

    output.section(&format!("Queueing {} job(s) for {}", jobs.len(), profile.platform))?;
    let preflight = Preflight::new(&settings, &profile);
    for (index, job) in jobs.into_iter().enumerate() {
        let label = job.to_string();
        match admit(&mut engine, &preflight, job) {
            Ok(slot) => output.verbose(&format!("{label} queued in slot {slot}"))?,
            Err(e) => output.warn(&format!("Job {} ({label}) skipped: {e}", index + 1))?,
        }
    }
    if engine.queue().is_empty() {
        output.error("No valid jobs to run")?;
        return Ok(EXIT_FAILED);
    }

    let cancel = engine.cancel_handle();
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel.cancel();
        }
    });
    let printer = tokio::spawn(async move {
        while let Some(event) = receiver.recv().await {
            if let Err(e) = output.event(&event) {
                log::debug!("Failed to print progress: {e}");
            }
        }
    });

    output.section("Exporting")?;
    let summary = engine.run().await;
    interrupt.abort();
    let remaining = engine.queue().len();
    drop(engine);
    if let Err(e) = printer.await {
        log::debug!("Progress printer stopped: {e}");
    }
    let summary = summary?;

    if output.is_json() {
        for artifact in &summary.artifacts {
            output.json_line(artifact)?;
        }
    } else {
        for artifact in &summary.artifacts {
            output.indent(&format!(
                "{} ({} bytes, sha256 {})",
                artifact.path.display(),
                artifact.size,
                artifact.checksum
            ))?;
        }
    }

    let code = match &summary.outcome {
        RunOutcome::Completed => {
            output.success(&format!(
                "{} job(s) exported in {}s",
                summary.completed.len(),
                summary.elapsed().num_seconds()
            ))?;
            EXIT_OK
        }
        RunOutcome::Cancelled => {
            output.warn(&format!("Export cancelled; {remaining} job(s) left in queue"))?;
            EXIT_CANCELLED
        }
        RunOutcome::Failed { slot, error } => {
            output.error(&format!("Job in slot {slot} failed: {error}"))?;
            output.indent(&format!("{remaining} job(s) left in queue"))?;
            EXIT_FAILED
        }
    };
    Ok(code)
}
