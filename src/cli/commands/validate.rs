//! `validate`: job validation and preflight, no side effects.

use super::{EXIT_FAILED, EXIT_OK};
use crate::{
    cli::{Args, RuntimeConfig, config},
    error::Result,
    exporter::{Job, Preflight, ProcessTracker, QueueEngine, SystemRunner},
};
use std::{path::Path, sync::Arc};

#[derive(serde::Serialize)]
struct JobCheck {
    index: usize,
    job: String,
    error: Option<String>,
}

pub async fn validate(args: &Args, queue: &Path, runtime: &RuntimeConfig) -> Result<i32> {
    let output = runtime.output();
    let settings = config::load_settings(args.config.as_deref())?;
    let profile = args.profile();
    let jobs = config::load_queue(queue)?;

    output.section(&format!(
        "Validating {} job(s) for {}",
        jobs.len(),
        profile.platform
    ))?;

    let tracker = ProcessTracker::new();
    let runner = Arc::new(SystemRunner::new(tracker.clone()));
    let mut engine = QueueEngine::new(settings.clone(), profile.clone(), runner, tracker);
    let preflight = Preflight::new(&settings, &profile);

    let mut failed = 0;
    for (index, job) in jobs.into_iter().enumerate() {
        let check = JobCheck {
            index: index + 1,
            job: job.to_string(),
            error: admit(&mut engine, &preflight, job).err().map(|e| e.to_string()),
        };
        if check.error.is_some() {
            failed += 1;
        }
        report(runtime, &check)?;
    }

    if failed > 0 {
        output.error(&format!("{failed} job(s) failed validation"))?;
        return Ok(EXIT_FAILED);
    }
    output.success(&format!("{} job(s) ready", engine.queue().len()))?;
    Ok(EXIT_OK)
}

/// Preflight and enqueue `job`.
pub(super) fn admit(
    engine: &mut QueueEngine,
    preflight: &Preflight<'_>,
    job: Job,
) -> crate::exporter::Result<usize> {
    preflight.check_job(&job)?;
    engine.enqueue(job)
}

fn report(runtime: &RuntimeConfig, check: &JobCheck) -> std::io::Result<()> {
    let output = runtime.output();
    if output.is_json() {
        return output.json_line(check);
    }
    match &check.error {
        None => output.indent(&format!("{}. {} ok", check.index, check.job)),
        Some(error) => output.warn(&format!("{}. {}: {error}", check.index, check.job)),
    }
}
