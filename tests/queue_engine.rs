mod common;

use common::{ScriptedRunner, Workspace, fake_build_output, output, plugin_job, standalone_job, tool_failure};
use hise_exporter::exporter::{
    BuildProjectFile, CancelHandle, EngineState, Error, ExportSettings, FakeClock, Job,
    MemoryCredentialStore, PlatformProfile, PluginFormat, ProcessTracker, ProgressSink,
    ProgressUpdate, ProjectDescriptor, ProjectType, QueueEngine, RunOutcome, ToolCategory,
    settings::DEFAULT_CREDENTIAL_SERVICE, sign::APP_PASSWORD_ACCOUNT,
};
use parking_lot::Mutex;
use std::{
    path::PathBuf,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
};

fn new_engine(
    settings: ExportSettings,
    profile: PlatformProfile,
    runner: &ScriptedRunner,
) -> QueueEngine {
    QueueEngine::new(settings, profile, Arc::new(runner.clone()), ProcessTracker::new())
}

/// Project files passed to `export_ci`, in call order.
fn exported(runner: &ScriptedRunner) -> Vec<PathBuf> {
    runner
        .calls()
        .iter()
        .filter(|c| c.args_lossy().first().map(String::as_str) == Some("export_ci"))
        .map(|c| PathBuf::from(&c.args_lossy()[1]))
        .collect()
}

/// Cancels the run when job number `at` (1-based) reports its first step.
struct CancelAt {
    at: usize,
    handle: CancelHandle,
}

impl ProgressSink for CancelAt {
    fn report(&self, update: &ProgressUpdate) {
        if update.current == self.at {
            self.handle.cancel();
        }
    }

    fn notice(&self, _message: &str) {}
}

#[derive(Default)]
struct Recorder {
    labels: Mutex<Vec<String>>,
    notices: Mutex<Vec<String>>,
    idle: AtomicUsize,
}

impl ProgressSink for Recorder {
    fn report(&self, update: &ProgressUpdate) {
        self.labels.lock().push(update.to_string());
    }

    fn notice(&self, message: &str) {
        self.notices.lock().push(message.to_string());
    }

    fn idle(&self) {
        self.idle.fetch_add(1, Ordering::SeqCst);
    }
}

#[tokio::test]
async fn empty_queue_is_rejected_without_side_effects() {
    let ws = Workspace::new();
    let runner = ScriptedRunner::default();
    let mut engine = new_engine(ws.build_settings(), PlatformProfile::linux(), &runner);

    let err = engine.run().await.unwrap_err();
    assert!(matches!(err, Error::EmptyQueue));
    assert!(runner.calls().is_empty());
    assert_eq!(engine.state(), EngineState::Idle);
}

#[tokio::test]
async fn jobs_run_in_insertion_order_and_leave_queue_empty() {
    let ws = Workspace::new();
    let profile = PlatformProfile::linux();
    ws.install_resave_helper(&profile);
    let harp = ws.project("Harp");
    let drums = ws.project("Drums");

    let jobs = vec![
        plugin_job(&harp, "Harp", PluginFormat::Vst3),
        standalone_job(&drums, "Drums"),
        plugin_job(&harp, "Harp", PluginFormat::Vst2),
    ];
    for job in &jobs {
        fake_build_output(&profile, job);
    }

    let runner = ScriptedRunner::default();
    let recorder = Arc::new(Recorder::default());
    let mut engine =
        new_engine(ws.build_settings(), profile.clone(), &runner).with_progress(recorder.clone());
    for job in jobs.clone() {
        engine.enqueue(job).unwrap();
    }

    let summary = engine.run().await.unwrap();

    assert!(summary.outcome.is_completed());
    assert_eq!(summary.completed, vec![0, 1, 2]);
    assert!(engine.queue().is_empty());
    assert_eq!(
        exported(&runner),
        vec![
            harp.join("XmlPresetBackups/Harp.xml"),
            drums.join("XmlPresetBackups/Drums.xml"),
            harp.join("XmlPresetBackups/Harp.xml"),
        ]
    );

    let staging = profile.staging_dir(&harp);
    assert_eq!(summary.artifacts.len(), 3);
    assert_eq!(summary.artifacts[0].path, staging.join("Harp.vst3"));
    assert_eq!(summary.artifacts[2].path, staging.join("Harp.so"));
    assert!(staging.join("Harp.vst3").exists());
    assert_eq!(summary.artifacts[0].checksum.len(), 64);

    let labels = recorder.labels.lock().clone();
    assert!(labels.contains(&"Saving Project XML: 1/3 Harp | Updating project_info.xml".to_string()));
    assert!(labels.contains(&"Exporting: 2/3 Drums | Compiling".to_string()));
    assert_eq!(recorder.idle.load(Ordering::SeqCst), 1);
    assert_eq!(engine.state(), EngineState::Idle);
}

#[tokio::test]
async fn duplicate_job_is_rejected() {
    let ws = Workspace::new();
    let harp = ws.project("Harp");
    let runner = ScriptedRunner::default();
    let mut engine = new_engine(ws.build_settings(), PlatformProfile::linux(), &runner);

    engine.enqueue(plugin_job(&harp, "Harp", PluginFormat::Vst3)).unwrap();
    let err = engine
        .enqueue(plugin_job(&harp, "Harp", PluginFormat::Vst3))
        .unwrap_err();

    assert!(matches!(err, Error::DuplicateJob));
    assert_eq!(engine.queue().len(), 1);
}

#[tokio::test]
async fn invalid_job_never_enters_the_queue() {
    let ws = Workspace::new();
    let harp = ws.project("Harp");
    let runner = ScriptedRunner::default();
    let mut engine = new_engine(ws.build_settings(), PlatformProfile::linux(), &runner);

    let mut job = plugin_job(&harp, "Harp", PluginFormat::Au);
    assert!(matches!(engine.enqueue(job.clone()), Err(Error::Validation(_))));
    job.plugin_format = None;
    assert!(matches!(engine.enqueue(job), Err(Error::Validation(_))));
    assert!(engine.queue().is_empty());
}

#[tokio::test]
async fn installer_jobs_need_a_company_name() {
    let ws = Workspace::new();
    let harp = ws.project("Harp");
    let runner = ScriptedRunner::default();
    let settings = ws
        .settings()
        .company_name("")
        .build()
        .unwrap();
    let mut engine = new_engine(settings, PlatformProfile::linux(), &runner);

    let mut job = Job::new(&harp, "Harp", "1.0.0");
    job.project_type = ProjectType::Installer;
    job.installer.license = Some(harp.join("License.txt"));

    let err = engine.enqueue(job).unwrap_err();
    assert!(err.to_string().contains("Company name"));
}

#[tokio::test]
async fn cancellation_before_a_job_keeps_it_and_later_jobs_queued() {
    let ws = Workspace::new();
    let profile = PlatformProfile::linux();
    ws.install_resave_helper(&profile);

    let jobs: Vec<_> = ["Harp", "Drums", "Bass"]
        .iter()
        .map(|name| standalone_job(&ws.project(name), name))
        .collect();
    for job in &jobs {
        fake_build_output(&profile, job);
    }

    let runner = ScriptedRunner::default();
    let engine = new_engine(ws.build_settings(), profile, &runner);
    let handle = engine.cancel_handle();
    let mut engine = engine.with_progress(Arc::new(CancelAt { at: 2, handle }));
    let slots: Vec<_> = jobs
        .into_iter()
        .map(|job| engine.enqueue(job).unwrap())
        .collect();

    let summary = engine.run().await.unwrap();

    assert!(matches!(summary.outcome, RunOutcome::Cancelled));
    assert_eq!(summary.completed, vec![slots[0]]);
    assert_eq!(engine.queue().slots(), vec![slots[1], slots[2]]);
    assert_eq!(exported(&runner).len(), 1);
    assert_eq!(engine.state(), EngineState::Idle);
}

#[tokio::test]
async fn tool_failure_aborts_the_run_and_keeps_the_failed_job() {
    let ws = Workspace::new();
    let profile = PlatformProfile::linux();
    ws.install_resave_helper(&profile);

    let jobs: Vec<_> = ["Harp", "Drums", "Bass"]
        .iter()
        .map(|name| standalone_job(&ws.project(name), name))
        .collect();
    for job in &jobs {
        fake_build_output(&profile, job);
    }

    let makes = Arc::new(AtomicUsize::new(0));
    let runner = {
        let makes = makes.clone();
        ScriptedRunner::new(move |cmd| {
            if cmd.program_name() == "make" && makes.fetch_add(1, Ordering::SeqCst) == 1 {
                return Err(tool_failure(cmd, 2));
            }
            Ok(output(""))
        })
    };
    let mut engine = new_engine(ws.build_settings(), profile, &runner);
    let slots: Vec<_> = jobs
        .into_iter()
        .map(|job| engine.enqueue(job).unwrap())
        .collect();

    let summary = engine.run().await.unwrap();

    match &summary.outcome {
        RunOutcome::Failed { slot, error } => {
            assert_eq!(*slot, slots[1]);
            assert!(error.to_string().contains("native build failed"));
        }
        other => panic!("expected failure, got {other:?}"),
    }
    assert_eq!(engine.queue().slots(), vec![slots[1], slots[2]]);
    assert_eq!(exported(&runner).len(), 2);
    assert_eq!(makes.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn consecutive_jobs_of_one_project_skip_setup_and_clean() {
    let ws = Workspace::new();
    let profile = PlatformProfile::linux();
    ws.install_resave_helper(&profile);
    let harp = ws.project("Harp");

    let vst3 = plugin_job(&harp, "Harp", PluginFormat::Vst3);
    let vst2 = plugin_job(&harp, "Harp", PluginFormat::Vst2);
    let app = standalone_job(&harp, "Harp");
    for job in [&vst3, &vst2, &app] {
        fake_build_output(&profile, job);
    }

    let runner = ScriptedRunner::default();
    let mut engine = new_engine(ws.build_settings(), profile.clone(), &runner);
    engine.enqueue(vst3).unwrap();
    engine.enqueue(vst2.clone()).unwrap();
    engine.enqueue(app).unwrap();
    let summary = engine.run().await.unwrap();
    assert!(summary.outcome.is_completed());

    // Same name: setup once. Same name and type: clean skipped for the VST2 job only.
    assert_eq!(runner.count("set_hise_folder"), 1);
    assert_eq!(runner.count("clean"), 2);
    assert_eq!(runner.count("export_ci"), 3);

    // Running the skipped steps again on their own gives the same artifact.
    let rerun = ScriptedRunner::default();
    let mut engine = new_engine(ws.build_settings(), profile, &rerun);
    engine.enqueue(vst2).unwrap();
    let again = engine.run().await.unwrap();
    assert_eq!(rerun.count("clean"), 1);
    assert_eq!(rerun.count("set_hise_folder"), 1);
    assert_eq!(again.artifacts[0].path, summary.artifacts[1].path);
    assert_eq!(again.artifacts[0].checksum, summary.artifacts[1].checksum);
}

#[tokio::test]
async fn descriptor_and_build_project_are_updated_before_building() {
    let ws = Workspace::new();
    let profile = PlatformProfile::windows();
    ws.install_resave_helper(&profile);
    let harp = ws.project("Harp");

    let mut job = plugin_job(&harp, "Harp", PluginFormat::Vst3);
    job.project_version = "2.0.0".into();
    job.plugin_categories = vec!["Instrument".into(), "Synth".into()];
    fake_build_output(&profile, &job);

    let runner = ScriptedRunner::default();
    let mut engine = new_engine(ws.build_settings(), profile.clone(), &runner);
    engine.enqueue(job).unwrap();
    let summary = engine.run().await.unwrap();
    assert!(summary.outcome.is_completed());

    let descriptor = ProjectDescriptor::load(&harp).await.unwrap();
    assert_eq!(descriptor.version(), Some("2.0.0"));
    assert_eq!(descriptor.get("VST3Support"), Some("1"));
    assert_eq!(descriptor.get("Description"), Some("Keep me"));

    let jucer = BuildProjectFile::load(&harp).await.unwrap();
    assert_eq!(jucer.attribute("pluginVST3Category"), Some("Instrument,Synth"));
    assert_eq!(jucer.attribute("companyEmail"), Some("dev@acme.audio"));

    let msbuild = runner
        .calls()
        .into_iter()
        .find(|c| c.category() == ToolCategory::Compiler)
        .unwrap();
    assert!(msbuild.args_lossy().contains(&"/p:Platform=x64".to_string()));
    assert_eq!(summary.artifacts[0].path, profile.staging_dir(&harp).join("Harp x64.vst3"));
}

#[tokio::test]
async fn stale_vst3_flag_is_cleared_where_vst3_export_is_off() {
    let ws = Workspace::new();
    let profile = PlatformProfile::linux();
    ws.install_resave_helper(&profile);
    let harp = ws.project("Harp");

    let mut descriptor = ProjectDescriptor::load(&harp).await.unwrap();
    descriptor.set_flag("VST3Support", true);
    descriptor.save().await.unwrap();

    let job = plugin_job(&harp, "Harp", PluginFormat::Vst2);
    fake_build_output(&profile, &job);
    let runner = ScriptedRunner::default();
    let mut engine = new_engine(ws.build_settings(), profile, &runner);
    engine.enqueue(job).unwrap();
    assert!(engine.run().await.unwrap().outcome.is_completed());

    let descriptor = ProjectDescriptor::load(&harp).await.unwrap();
    assert_eq!(descriptor.get("VST3Support"), Some("0"));
}

#[tokio::test]
async fn cancel_while_idle_does_not_stop_the_next_run() {
    let ws = Workspace::new();
    let profile = PlatformProfile::linux();
    ws.install_resave_helper(&profile);
    let job = standalone_job(&ws.project("Harp"), "Harp");
    fake_build_output(&profile, &job);

    let runner = ScriptedRunner::default();
    let mut engine = new_engine(ws.build_settings(), profile, &runner);
    engine.enqueue(job).unwrap();
    engine.cancel();

    let summary = engine.run().await.unwrap();
    assert!(summary.outcome.is_completed());
    assert!(engine.queue().is_empty());
}

#[cfg(unix)]
#[tokio::test]
async fn cancel_kills_the_running_tool_and_keeps_jobs_queued() {
    use hise_exporter::exporter::SystemRunner;
    use std::{os::unix::fs::PermissionsExt, time::Duration};

    let ws = Workspace::new();
    let profile = PlatformProfile::linux();
    let pid_file = ws.root().join("hise.pid");
    let hise = ws.root().join("HISE");
    std::fs::write(
        &hise,
        format!("#!/bin/sh\necho $$ > '{}'\nexec sleep 30\n", pid_file.display()),
    )
    .unwrap();
    std::fs::set_permissions(&hise, std::fs::Permissions::from_mode(0o755)).unwrap();

    let tracker = ProcessTracker::new();
    let mut engine = QueueEngine::new(
        ws.build_settings(),
        profile,
        Arc::new(SystemRunner::new(tracker.clone())),
        tracker.clone(),
    );
    let slots: Vec<_> = ["Harp", "Drums"]
        .iter()
        .map(|name| engine.enqueue(standalone_job(&ws.project(name), name)).unwrap())
        .collect();

    let handle = engine.cancel_handle();
    let watcher = {
        let tracker = tracker.clone();
        let pid_file = pid_file.clone();
        tokio::spawn(async move {
            let pid_written = |path: &PathBuf| {
                std::fs::read_to_string(path).is_ok_and(|pid| pid.ends_with('\n'))
            };
            while tracker.live().is_empty() || !pid_written(&pid_file) {
                tokio::time::sleep(Duration::from_millis(20)).await;
            }
            handle.cancel();
        })
    };

    let started = std::time::Instant::now();
    let summary = tokio::time::timeout(Duration::from_secs(20), engine.run())
        .await
        .expect("run did not stop after cancel")
        .unwrap();
    watcher.await.unwrap();

    assert!(matches!(summary.outcome, RunOutcome::Cancelled));
    assert!(started.elapsed() < Duration::from_secs(20));
    assert!(summary.completed.is_empty());
    assert_eq!(engine.queue().slots(), slots);
    assert!(tracker.live().is_empty());
    assert_eq!(engine.state(), EngineState::Idle);

    let pid = std::fs::read_to_string(&pid_file).unwrap();
    let alive = std::process::Command::new("kill")
        .args(["-0", pid.trim()])
        .status()
        .unwrap()
        .success();
    assert!(!alive, "HISE process {} survived cancellation", pid.trim());
}

fn macos_workspace() -> (Workspace, PlatformProfile, PathBuf) {
    let ws = Workspace::new();
    let profile = PlatformProfile::macos();
    ws.install_resave_helper(&profile);
    let harp = ws.project("Harp");
    std::fs::create_dir_all(harp.join("Binaries/Builds/MacOSX/Harp.xcodeproj")).unwrap();
    (ws, profile, harp)
}

#[tokio::test]
async fn missing_team_id_skips_signing_with_a_notice() {
    let (ws, profile, harp) = macos_workspace();
    let mut job = plugin_job(&harp, "Harp", PluginFormat::Au);
    job.codesign = true;
    fake_build_output(&profile, &job);

    let runner = ScriptedRunner::default();
    let recorder = Arc::new(Recorder::default());
    let mut engine = new_engine(ws.build_settings(), profile, &runner).with_progress(recorder.clone());
    engine.enqueue(job).unwrap();
    let summary = engine.run().await.unwrap();

    assert!(summary.outcome.is_completed());
    assert!(engine.queue().is_empty());
    assert_eq!(summary.notices.len(), 1);
    assert!(summary.notices[0].contains("Apple team ID"));
    assert_eq!(recorder.notices.lock().len(), 1);
    assert!(runner.calls().iter().all(|c| c.program_name() != "codesign"));
}

#[tokio::test]
async fn binaries_are_signed_in_place() {
    let (ws, profile, harp) = macos_workspace();
    let mut job = plugin_job(&harp, "Harp", PluginFormat::Vst3);
    job.codesign = true;
    fake_build_output(&profile, &job);

    let runner = ScriptedRunner::default();
    let settings = ws.settings().apple_team_id("Acme Audio (ABCDE12345)").build().unwrap();
    let mut engine = new_engine(settings, profile.clone(), &runner);
    engine.enqueue(job).unwrap();
    let summary = engine.run().await.unwrap();

    assert!(summary.outcome.is_completed());
    let staged = profile.staging_dir(&harp).join("Harp.vst3");
    let sign = runner
        .command_lines()
        .into_iter()
        .find(|l| l.starts_with("codesign"))
        .unwrap();
    assert_eq!(
        sign,
        format!(
            "codesign --deep --force --options runtime --sign Developer ID Application: Acme Audio (ABCDE12345) {} --timestamp",
            staged.display()
        )
    );
    assert_eq!(summary.artifacts[0].path, staged);
}

#[tokio::test]
async fn rejected_notarization_fails_the_job_with_a_notice() {
    let (ws, profile, harp) = macos_workspace();
    let mut job = plugin_job(&harp, "Harp", PluginFormat::Vst3);
    job.codesign = true;
    job.notarize = true;
    job.bundle_id = Some("com.acme.harp".into());
    fake_build_output(&profile, &job);

    let runner = ScriptedRunner::new(|cmd| {
        let args = cmd.args_lossy();
        Ok(match args.get(1).map(String::as_str) {
            Some("--notarize-app") => output("RequestUUID = 1234-abcd"),
            Some("--notarization-info") => output("Status: invalid"),
            _ => output(""),
        })
    });
    let clock = FakeClock::new();
    let credentials = MemoryCredentialStore::new().with_secret(
        DEFAULT_CREDENTIAL_SERVICE,
        APP_PASSWORD_ACCOUNT,
        "abcd-efgh",
    );
    let settings = ws
        .settings()
        .apple_id("dev@acme.audio")
        .apple_team_id("Acme Audio (ABCDE12345)")
        .build()
        .unwrap();
    let mut engine = new_engine(settings, profile, &runner)
        .with_clock(Arc::new(clock.clone()))
        .with_credentials(Arc::new(credentials));
    let slot = engine.enqueue(job).unwrap();
    let summary = engine.run().await.unwrap();

    assert!(matches!(
        summary.outcome,
        RunOutcome::Failed { slot: s, error: Error::NotarizationInvalid { .. } } if s == slot
    ));
    assert_eq!(engine.queue().slots(), vec![slot]);
    assert!(summary.notices.iter().any(|n| n.contains("Notarization Failed")));
    assert_eq!(clock.sleeps().len(), 1);
    assert!(!runner.command_lines().iter().any(|l| l.contains("stapler")));
}

#[tokio::test]
async fn missing_app_password_skips_notarization_only() {
    let (ws, profile, harp) = macos_workspace();
    let mut job = plugin_job(&harp, "Harp", PluginFormat::Vst3);
    job.codesign = true;
    job.notarize = true;
    job.bundle_id = Some("com.acme.harp".into());
    fake_build_output(&profile, &job);

    let runner = ScriptedRunner::default();
    let settings = ws
        .settings()
        .apple_id("dev@acme.audio")
        .apple_team_id("Acme Audio (ABCDE12345)")
        .build()
        .unwrap();
    let mut engine = new_engine(settings, profile, &runner)
        .with_credentials(Arc::new(MemoryCredentialStore::new()));
    engine.enqueue(job).unwrap();
    let summary = engine.run().await.unwrap();

    assert!(summary.outcome.is_completed());
    assert!(summary.notices[0].contains("App-specific password"));
    assert!(runner.command_lines().iter().any(|l| l.starts_with("codesign")));
    assert!(!runner.command_lines().iter().any(|l| l.contains("altool")));
}
