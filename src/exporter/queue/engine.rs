//! Sequential queue run: export, compile, package, sign and notarize.

use super::{CancelHandle, JobQueue, Phase, ProgressSink, ProgressUpdate, progress::LogProgress};
use crate::exporter::{
    ExportedArtifact,
    build::{BinaryLocation, BuildConfiguration, BuildInvoker, ExportArgs},
    clock::{Clock, SystemClock},
    error::{Context, Error, Result},
    platform::{InstallerRequest, Packager, copy_animation_libraries},
    process::{ProcessRunner, ProcessTracker},
    project::{BuildProjectFile, ProjectDescriptor},
    settings::{ExportSettings, Job, PlatformProfile, PluginFormat, ProjectType},
    sign::{APP_PASSWORD_ACCOUNT, CredentialStore, EnvCredentialStore, NotaryAccount, SigningClient},
    utils::{checksum::describe_artifact, fs},
};
use chrono::{DateTime, Utc};
use std::{
    path::{Path, PathBuf},
    sync::Arc,
};
use tokio_util::sync::CancellationToken;

/// Engine state between and during runs.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum EngineState {
    #[default]
    Idle,
    Running,
}

/// How a run ended.
#[derive(Debug)]
pub enum RunOutcome {
    /// Every job present at the start finished.
    Completed,
    /// Cancelled before or during a job. Unstarted jobs stay queued.
    Cancelled,
    /// A step failed; the job in `slot` and all after it stay queued.
    Failed { slot: usize, error: Error },
}

impl RunOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, RunOutcome::Completed)
    }
}

/// Result of one [`QueueEngine::run`].
#[derive(Debug)]
pub struct RunSummary {
    pub outcome: RunOutcome,
    /// Slots of the jobs finished in this run, in order.
    pub completed: Vec<usize>,
    pub artifacts: Vec<ExportedArtifact>,
    pub notices: Vec<String>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl RunSummary {
    /// Wall-clock duration of the run.
    pub fn elapsed(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }
}

/// Identifying fields of the last finished job, for skipping setup and clean.
#[derive(Clone, Debug, Eq, PartialEq)]
struct LastJob {
    project_name: String,
    project_type: ProjectType,
}

impl From<&Job> for LastJob {
    fn from(job: &Job) -> Self {
        Self {
            project_name: job.project_name.clone(),
            project_type: job.project_type,
        }
    }
}

#[derive(Clone, Copy)]
struct Step<'a> {
    job: &'a Job,
    current: usize,
    total: usize,
}

/// Owns the job queue and drives it through the export pipeline, one job
/// at a time.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use hise_exporter::exporter::{
///     Job, PlatformProfile, ProcessTracker, QueueEngine, SettingsBuilder, SystemRunner,
/// };
///
/// # async fn example() -> hise_exporter::exporter::Result<()> {
/// let settings = SettingsBuilder::new()
///     .hise_executable("/opt/hise/HISE")
///     .hise_source("/opt/hise/source")
///     .assets_dir("/usr/share/hise-exporter")
///     .build()?;
/// let tracker = ProcessTracker::new();
/// let runner = Arc::new(SystemRunner::new(tracker.clone()));
/// let mut engine = QueueEngine::new(settings, PlatformProfile::host(), runner, tracker);
///
/// engine.enqueue(Job::new("/projects/Harp", "Harp", "1.0.0"))?;
/// let summary = engine.run().await?;
/// println!("{} artifact(s)", summary.artifacts.len());
/// # Ok(())
/// # }
/// ```
pub struct QueueEngine {
    queue: JobQueue,
    settings: ExportSettings,
    profile: PlatformProfile,
    builder: BuildInvoker,
    packager: Packager,
    runner: Arc<dyn ProcessRunner>,
    signer: SigningClient,
    credentials: Arc<dyn CredentialStore>,
    progress: Arc<dyn ProgressSink>,
    cancel: CancelHandle,
    state: EngineState,
    last_job: Option<LastJob>,
}

impl QueueEngine {
    pub fn new(
        settings: ExportSettings,
        profile: PlatformProfile,
        runner: Arc<dyn ProcessRunner>,
        tracker: ProcessTracker,
    ) -> Self {
        Self {
            queue: JobQueue::new(),
            builder: BuildInvoker::new(runner.clone(), profile.clone(), &settings),
            packager: Packager::new(runner.clone(), profile.clone(), &settings),
            signer: SigningClient::new(runner.clone(), Arc::new(SystemClock)),
            runner,
            settings,
            profile,
            credentials: Arc::new(EnvCredentialStore::new()),
            progress: Arc::new(LogProgress),
            cancel: CancelHandle::new(tracker),
            state: EngineState::Idle,
            last_job: None,
        }
    }

    /// Replace the clock driving the notarization poll.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.signer = SigningClient::new(self.runner.clone(), clock);
        self
    }

    pub fn with_credentials(mut self, credentials: Arc<dyn CredentialStore>) -> Self {
        self.credentials = credentials;
        self
    }

    pub fn with_progress(mut self, progress: Arc<dyn ProgressSink>) -> Self {
        self.progress = progress;
        self
    }

    pub fn queue(&self) -> &JobQueue {
        &self.queue
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn profile(&self) -> &PlatformProfile {
        &self.profile
    }

    /// Handle for cancelling a run from another task.
    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Validate `job` and append it to the queue. Returns its slot.
    pub fn enqueue(&mut self, job: Job) -> Result<usize> {
        job.validate(&self.profile)?;
        if job.is_installer() && self.settings.company_name().is_none() {
            return Err(Error::Validation(
                "Company name is required to build installers.".into(),
            ));
        }
        let slot = self.queue.push(job)?;
        log::debug!("Queued job in slot {slot}");
        Ok(slot)
    }

    /// Drop a job that has not run yet.
    pub fn remove(&mut self, slot: usize) -> Option<Job> {
        self.queue.remove(slot)
    }

    /// Process every queued job in order.
    ///
    /// Fails only when the queue is empty. Job failures and cancellation end
    /// the run early and are reported through [`RunSummary::outcome`]; the
    /// failed or unstarted jobs stay queued. Cancellation only applies to a
    /// run in progress; [`CancelHandle::cancel`] before `run` is discarded.
    pub async fn run(&mut self) -> Result<RunSummary> {
        if self.queue.is_empty() {
            return Err(Error::EmptyQueue);
        }

        let cancel = self.cancel.begin_run();
        self.state = EngineState::Running;
        self.last_job = None;

        let slots = self.queue.slots();
        let total = slots.len();
        log::info!("Starting export of {total} job(s)");

        let mut summary = RunSummary {
            outcome: RunOutcome::Completed,
            completed: Vec::new(),
            artifacts: Vec::new(),
            notices: Vec::new(),
            started_at: Utc::now(),
            finished_at: Utc::now(),
        };

        for (index, slot) in slots.into_iter().enumerate() {
            if cancel.is_cancelled() {
                summary.outcome = RunOutcome::Cancelled;
                break;
            }
            let Some(job) = self.queue.get(slot).cloned() else {
                continue;
            };
            let step = Step {
                job: &job,
                current: index + 1,
                total,
            };

            match self.process(step, &cancel, &mut summary.notices).await {
                Ok(_) if cancel.is_cancelled() => {
                    summary.outcome = RunOutcome::Cancelled;
                    break;
                }
                Ok(artifacts) => {
                    self.queue.remove(slot);
                    self.last_job = Some(LastJob::from(&job));
                    summary.completed.push(slot);
                    summary.artifacts.extend(artifacts);
                }
                Err(e) if e.is_cancelled() || cancel.is_cancelled() => {
                    log::warn!("Export of {} cancelled", job.project_name);
                    summary.outcome = RunOutcome::Cancelled;
                    break;
                }
                Err(error) => {
                    log::error!("EXPORT ABORTED: {} failed: {error}", job.project_name);
                    summary.outcome = RunOutcome::Failed { slot, error };
                    break;
                }
            }
        }

        self.teardown(&summary.outcome);
        summary.finished_at = Utc::now();
        Ok(summary)
    }

    fn teardown(&mut self, outcome: &RunOutcome) {
        if !outcome.is_completed() {
            let killed = self.cancel.tracker().kill_all();
            if killed > 0 {
                log::debug!("Killed {killed} leftover process(es)");
            }
        }
        self.last_job = None;
        self.state = EngineState::Idle;
        self.progress.idle();
        log::info!("Export finished: {outcome:?}");
    }

    fn report(&self, step: Step<'_>, phase: Phase, detail: impl Into<String>) {
        self.progress.report(&ProgressUpdate {
            phase,
            current: step.current,
            total: step.total,
            project: step.job.project_name.clone(),
            detail: detail.into(),
        });
    }

    fn notice(&self, notices: &mut Vec<String>, message: String) {
        self.progress.notice(&message);
        notices.push(message);
    }

    async fn process(
        &self,
        step: Step<'_>,
        cancel: &CancellationToken,
        notices: &mut Vec<String>,
    ) -> Result<Vec<ExportedArtifact>> {
        let job = step.job;
        fs::create_dir_all(&self.profile.staging_dir(&job.project_path)).await?;

        let outputs = if job.is_installer() {
            self.package(step, cancel).await?
        } else {
            vec![self.compile(step, cancel).await?]
        };

        let outputs = self.sign_and_notarize(step, outputs, cancel, notices).await?;

        let mut artifacts = Vec::with_capacity(outputs.len());
        for output in &outputs {
            artifacts.push(describe_artifact(output).await?);
        }
        Ok(artifacts)
    }

    async fn package(&self, step: Step<'_>, cancel: &CancellationToken) -> Result<Vec<PathBuf>> {
        let job = step.job;
        let company_name = self
            .settings
            .company_name()
            .context("Company name is required to build installers.")?;

        self.report(step, Phase::Exporting, "Building installer");
        let request = InstallerRequest {
            project_path: &job.project_path,
            project_name: &job.project_name,
            version: &job.project_version,
            company_name,
            assets: &job.installer,
        };
        self.packager.package_for_platform(&request, cancel).await
    }

    async fn compile(&self, step: Step<'_>, cancel: &CancellationToken) -> Result<PathBuf> {
        let job = step.job;
        let hise = self.settings.hise_executable();
        let project_path = job.project_path.as_path();
        let arch = job.arch.context("Architecture was not specified.")?;
        let project_file = job
            .export_file_path()
            .context("No project XML file selected")?;

        self.report(step, Phase::SavingProject, "Updating project_info.xml");
        self.update_descriptor(job).await?;

        let last = self.last_job.as_ref();
        let same_project = last.is_some_and(|l| l.project_name == job.project_name);
        let same_build = same_project && last.is_some_and(|l| l.project_type == job.project_type);

        if same_project {
            log::debug!("Skipping environment setup for {}", job.project_name);
        } else {
            self.report(step, Phase::Exporting, "Setting up environment");
            self.builder
                .configure_environment(
                    hise,
                    self.settings.hise_source(),
                    project_path,
                    &job.project_version,
                    cancel,
                )
                .await?;
        }

        if same_build {
            log::debug!("Skipping clean for {} ({})", job.project_name, job.project_type);
        } else {
            self.report(step, Phase::Exporting, "Cleaning build directory");
            self.builder
                .clean_build_directory(hise, project_path, cancel)
                .await?;
        }

        self.check_cancel(cancel)?;
        self.report(step, Phase::Exporting, "Running HISE export");
        self.builder
            .export(hise, &project_file, &ExportArgs::from_job(job), cancel)
            .await?;

        self.check_cancel(cancel)?;
        self.report(step, Phase::Exporting, "Updating build project");
        self.patch_build_project(job).await?;
        self.builder
            .resave_project_file(self.settings.hise_source(), project_path, cancel)
            .await?;

        self.check_cancel(cancel)?;
        self.report(step, Phase::Exporting, "Compiling");
        self.builder
            .compile(project_path, arch, BuildConfiguration::for_job(job), cancel)
            .await?;

        self.check_cancel(cancel)?;
        self.report(step, Phase::Exporting, "Copying binary to packaging folder");
        let location = BinaryLocation::for_job(&self.profile, job);
        fs::copy_artifact(&location.origin, &location.destination).await?;

        if job.features.rlottie {
            let staging = self.profile.staging_dir(project_path);
            copy_animation_libraries(&self.profile, self.settings.assets_dir(), &staging).await?;
        }

        Ok(location.destination)
    }

    async fn update_descriptor(&self, job: &Job) -> Result<()> {
        let mut descriptor = ProjectDescriptor::load(&job.project_path).await?;
        descriptor.set("Name", &job.project_name);
        descriptor.set("Version", &job.project_version);
        descriptor.set_flag(
            "VST3Support",
            self.profile.vst3_support && job.plugin_format == Some(PluginFormat::Vst3),
        );
        descriptor.save().await
    }

    async fn patch_build_project(&self, job: &Job) -> Result<()> {
        let mut project = BuildProjectFile::load(&job.project_path).await?;
        if job.project_type != ProjectType::Standalone
            && let Some(format) = job.plugin_format
        {
            project.set_plugin_categories(format, &job.plugin_categories);
        }
        if let Some(email) = self.settings.company_email() {
            project.set_company_email(email);
        }
        project.save().await
    }

    async fn sign_and_notarize(
        &self,
        step: Step<'_>,
        outputs: Vec<PathBuf>,
        cancel: &CancellationToken,
        notices: &mut Vec<String>,
    ) -> Result<Vec<PathBuf>> {
        let job = step.job;
        if !self.profile.supports_code_signing || !(job.codesign || job.notarize) {
            return Ok(outputs);
        }
        let team = match self.signing_team() {
            Ok(team) => team,
            Err(e) => {
                self.notice(
                    notices,
                    format!("Code signing skipped for {}: {e}", job.project_name),
                );
                return Ok(outputs);
            }
        };

        let mut signed = Vec::with_capacity(outputs.len());
        for output in outputs {
            self.check_cancel(cancel)?;
            self.report(step, Phase::Signing, file_name(&output));
            let output = if job.is_installer() {
                let target = signed_installer_path(&output);
                self.signer
                    .sign_installer(team, &output, &target, cancel)
                    .await?;
                fs::remove_file_if_exists(&output).await?;
                target
            } else {
                self.signer.sign_binary(team, &output, cancel).await?;
                output
            };

            if job.notarize {
                self.notarize(step, &output, cancel, notices).await?;
            }
            signed.push(output);
        }
        Ok(signed)
    }

    async fn notarize(
        &self,
        step: Step<'_>,
        file: &Path,
        cancel: &CancellationToken,
        notices: &mut Vec<String>,
    ) -> Result<()> {
        let job = step.job;
        let account = match self.notary_account() {
            Ok(account) => account,
            Err(e) => {
                self.notice(
                    notices,
                    format!("Notarization skipped for {}: {e}", job.project_name),
                );
                return Ok(());
            }
        };
        let bundle_id = job
            .bundle_id
            .as_deref()
            .context("Bundle identifier is required for notarization.")?;

        self.report(step, Phase::Notarizing, "Uploading: This could take a while...");
        let result = async {
            let request_id = self.signer.notarize(file, bundle_id, &account, cancel).await?;
            self.report(step, Phase::Notarizing, "Waiting for notarization result");
            self.signer
                .wait_and_staple(file, &request_id, &account, cancel)
                .await
        }
        .await;

        if let Err(e) = &result
            && !e.is_cancelled()
        {
            self.notice(
                notices,
                "Notarization Failed, check log file for details.".to_string(),
            );
        }
        result
    }

    fn signing_team(&self) -> Result<&str> {
        self.settings
            .apple_team_id()
            .ok_or_else(|| Error::MissingCredentials("Apple team ID has not been set.".into()))
    }

    fn notary_account(&self) -> Result<NotaryAccount> {
        let apple_id = self
            .settings
            .apple_id()
            .ok_or_else(|| Error::MissingCredentials("Apple ID has not been set.".into()))?;
        let app_password = self
            .credentials
            .get(self.settings.credential_service(), APP_PASSWORD_ACCOUNT)
            .ok_or_else(|| {
                Error::MissingCredentials("App-specific password has not been set.".into())
            })?;
        Ok(NotaryAccount {
            apple_id: apple_id.to_string(),
            app_password,
        })
    }

    fn check_cancel(&self, cancel: &CancellationToken) -> Result<()> {
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }
        Ok(())
    }
}

/// `<Name> unsigned.pkg` becomes `<Name> signed.pkg`.
fn signed_installer_path(unsigned: &Path) -> PathBuf {
    let name = file_name(unsigned);
    let signed = if name.contains("unsigned") {
        name.replacen("unsigned", "signed", 1)
    } else {
        format!("signed {name}")
    };
    unsigned.with_file_name(signed)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signed_installer_replaces_marker() {
        assert_eq!(
            signed_installer_path(Path::new("/p/Packaging/MacOS/Harp unsigned.pkg")),
            PathBuf::from("/p/Packaging/MacOS/Harp signed.pkg")
        );
        assert_eq!(
            signed_installer_path(Path::new("/p/Harp.pkg")),
            PathBuf::from("/p/signed Harp.pkg")
        );
    }

    #[test]
    fn last_job_compares_name_and_type() {
        let job = Job::new("/p", "Harp", "1.0.0");
        let memo = LastJob::from(&job);
        assert_eq!(memo.project_name, "Harp");
        assert_eq!(memo.project_type, ProjectType::Standalone);
    }
}
