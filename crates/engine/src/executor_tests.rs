// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use grove_adapters::{FakeProviderAdapter, FakeShellAdapter, ScriptedRun};
use grove_core::FakeClock;
use grove_storage::load_plan;
use std::path::Path;
use tempfile::tempdir;

fn write_job(dir: &Path, filename: &str, content: &str) {
    std::fs::write(dir.join(filename), content).expect("write job");
}

fn deps_for(
    dir: &Path,
    shell: FakeShellAdapter,
    provider: FakeProviderAdapter,
) -> ExecutorDeps<FakeShellAdapter, FakeProviderAdapter, FakeClock> {
    ExecutorDeps {
        shell: Arc::new(shell),
        provider: Arc::new(provider),
        clock: FakeClock::new(),
        persister: PlanHandle::new(dir),
        layout: ArtifactLayout::new(dir),
        project_root: dir.to_path_buf(),
    }
}

#[tokio::test]
async fn shell_job_completes_and_writes_its_log() {
    let dir = tempdir().expect("tmpdir");
    write_job(dir.path(), "01-build.md", "---\nid: build-aaaa\ntitle: Build\ntype: shell\nstatus: pending\n---\necho hi\n");
    let mut plan = load_plan(dir.path()).expect("load");

    let shell = FakeShellAdapter::new();
    shell.script("echo hi", ScriptedRun { chunks: vec![b"hello\n".to_vec()], exit_code: 0 });
    let executor = JobExecutor::new(deps_for(dir.path(), shell, FakeProviderAdapter::new()));
    let cancel = CancellationToken::new();

    let status = executor.run(&mut plan, "01-build.md", &cancel).await.expect("run");
    assert_eq!(status, JobStatus::Completed);

    let job = plan.find_by_filename("01-build.md").expect("job");
    assert_eq!(job.status, JobStatus::Completed);
    let log = std::fs::read_to_string(ArtifactLayout::new(dir.path()).job_log_path(job)).expect("log");
    assert!(log.contains("hello"));
    assert!(log.contains("exit code: 0"));
}

#[tokio::test]
async fn shell_job_nonzero_exit_fails_with_error_section() {
    let dir = tempdir().expect("tmpdir");
    write_job(dir.path(), "01-build.md", "---\nid: build-aaaa\ntitle: Build\ntype: shell\nstatus: pending\n---\nexit 1\n");
    let mut plan = load_plan(dir.path()).expect("load");

    let shell = FakeShellAdapter::new();
    shell.script("exit 1", ScriptedRun { chunks: Vec::new(), exit_code: 1 });
    let executor = JobExecutor::new(deps_for(dir.path(), shell, FakeProviderAdapter::new()));
    let cancel = CancellationToken::new();

    let status = executor.run(&mut plan, "01-build.md", &cancel).await.expect("run");
    assert_eq!(status, JobStatus::Failed);
    let job = plan.find_by_filename("01-build.md").expect("job");
    assert!(job.prompt_body.contains("## Error"));
    assert!(job.prompt_body.contains("exited with code 1"));
}

#[tokio::test]
async fn oneshot_job_completes_with_output_section() {
    let dir = tempdir().expect("tmpdir");
    write_job(dir.path(), "01-ask.md", "---\nid: ask-aaaa\ntitle: Ask\ntype: oneshot\nstatus: pending\n---\nwhat is 6*7?\n");
    let mut plan = load_plan(dir.path()).expect("load");

    let provider = FakeProviderAdapter::new();
    provider.script("01-ask.md", "42");
    let executor = JobExecutor::new(deps_for(dir.path(), FakeShellAdapter::new(), provider));
    let cancel = CancellationToken::new();

    let status = executor.run(&mut plan, "01-ask.md", &cancel).await.expect("run");
    assert_eq!(status, JobStatus::Completed);
    let job = plan.find_by_filename("01-ask.md").expect("job");
    assert!(job.prompt_body.contains("## Output"));
    assert!(job.prompt_body.contains('4') && job.prompt_body.contains('2'));
}

#[tokio::test]
async fn oneshot_job_provider_failure_fails_the_job() {
    let dir = tempdir().expect("tmpdir");
    write_job(dir.path(), "01-ask.md", "---\nid: ask-aaaa\ntitle: Ask\ntype: oneshot\nstatus: pending\n---\nprompt\n");
    let mut plan = load_plan(dir.path()).expect("load");

    let provider = FakeProviderAdapter::new();
    provider.fail_for("01-ask.md");
    let executor = JobExecutor::new(deps_for(dir.path(), FakeShellAdapter::new(), provider));
    let cancel = CancellationToken::new();

    let status = executor.run(&mut plan, "01-ask.md", &cancel).await.expect("run");
    assert_eq!(status, JobStatus::Failed);
    let job = plan.find_by_filename("01-ask.md").expect("job");
    assert!(job.prompt_body.contains("## Error"));
}

#[tokio::test]
async fn generate_recipe_materializes_new_job_files() {
    let dir = tempdir().expect("tmpdir");
    write_job(
        dir.path(),
        "00-generate.md",
        "---\nid: generate-aaaa\ntitle: Generate\ntype: generate_recipe\nstatus: pending\n---\nbreak this down\n",
    );
    let mut plan = load_plan(dir.path()).expect("load");

    let response = "---\ntitle: Sub Task One\ntype: shell\nstatus: pending\n---\necho one\n\n\
                     ===\n\
                     ---\ntitle: Sub Task Two\ntype: shell\nstatus: pending\n---\necho two\n";
    let provider = FakeProviderAdapter::new();
    provider.script("00-generate.md", response);
    let executor = JobExecutor::new(deps_for(dir.path(), FakeShellAdapter::new(), provider));
    let cancel = CancellationToken::new();

    let status = executor.run(&mut plan, "00-generate.md", &cancel).await.expect("run");
    assert_eq!(status, JobStatus::Completed);
    assert_eq!(plan.len(), 3);
    assert!(plan.find_by_filename("01-sub-task-one.md").is_some());
    assert!(plan.find_by_filename("02-sub-task-two.md").is_some());
    assert!(dir.path().join("01-sub-task-one.md").exists());

    let generate = plan.find_by_filename("00-generate.md").expect("generate job");
    assert!(generate.prompt_body.contains("01-sub-task-one.md"));
}

#[tokio::test]
async fn interactive_agent_job_stays_running_and_holds_its_lock() {
    let dir = tempdir().expect("tmpdir");
    write_job(
        dir.path(),
        "01-pair.md",
        "---\nid: pair-aaaa\ntitle: Pair\ntype: interactive_agent\nstatus: pending\n---\nwork with me on this\n",
    );
    let mut plan = load_plan(dir.path()).expect("load");
    let executor =
        JobExecutor::new(deps_for(dir.path(), FakeShellAdapter::new(), FakeProviderAdapter::new()));
    let cancel = CancellationToken::new();

    let status = executor.run(&mut plan, "01-pair.md", &cancel).await.expect("run");
    assert_eq!(status, JobStatus::Running);

    let job = plan.find_by_filename("01-pair.md").expect("job");
    assert_eq!(job.status, JobStatus::Running);
    let lock_path = grove_core::lock_path_for(&dir.path().join("01-pair.md"));
    assert!(lock_path.exists(), "lock must stay held while the job is running");

    let layout = ArtifactLayout::new(dir.path());
    let artifact_dir = layout.job_artifact_dir(job);
    let briefing_written = std::fs::read_dir(&artifact_dir)
        .expect("artifact dir")
        .any(|e| e.expect("entry").file_name().to_string_lossy().starts_with("briefing-"));
    assert!(briefing_written);

    executor.complete_interactive(&mut plan, "01-pair.md").expect("complete");
    let job = plan.find_by_filename("01-pair.md").expect("job");
    assert_eq!(job.status, JobStatus::Completed);
    assert!(!lock_path.exists(), "complete must release the lock");
}

#[tokio::test]
async fn already_running_job_is_rejected() {
    let dir = tempdir().expect("tmpdir");
    write_job(dir.path(), "01-build.md", "---\nid: build-aaaa\ntitle: Build\ntype: shell\nstatus: pending\n---\necho hi\n");
    let mut plan = load_plan(dir.path()).expect("load");

    let lock_path = grove_core::lock_path_for(&dir.path().join("01-build.md"));
    std::fs::write(
        &lock_path,
        serde_yaml::to_string(&grove_core::LockFile { pid: std::process::id(), session: "other".to_string() })
            .expect("yaml"),
    )
    .expect("write lock");

    let executor =
        JobExecutor::new(deps_for(dir.path(), FakeShellAdapter::new(), FakeProviderAdapter::new()));
    let cancel = CancellationToken::new();

    let err = executor.run(&mut plan, "01-build.md", &cancel).await.unwrap_err();
    assert!(matches!(err, Error::JobAlreadyRunning { .. }));
}

#[tokio::test]
async fn cancelled_token_fails_the_job_before_it_runs() {
    let dir = tempdir().expect("tmpdir");
    write_job(dir.path(), "01-build.md", "---\nid: build-aaaa\ntitle: Build\ntype: shell\nstatus: pending\n---\necho hi\n");
    let mut plan = load_plan(dir.path()).expect("load");

    let executor =
        JobExecutor::new(deps_for(dir.path(), FakeShellAdapter::new(), FakeProviderAdapter::new()));
    let cancel = CancellationToken::new();
    cancel.cancel();

    let status = executor.run(&mut plan, "01-build.md", &cancel).await.expect("run");
    assert_eq!(status, JobStatus::Failed);
    let job = plan.find_by_filename("01-build.md").expect("job");
    assert!(job.prompt_body.contains(CANCELLED_SENTINEL));
}

#[tokio::test]
async fn unknown_filename_is_reported_as_job_not_found() {
    let dir = tempdir().expect("tmpdir");
    let mut plan = load_plan(dir.path()).expect("load");
    let executor =
        JobExecutor::new(deps_for(dir.path(), FakeShellAdapter::new(), FakeProviderAdapter::new()));
    let cancel = CancellationToken::new();

    let err = executor.run(&mut plan, "nope.md", &cancel).await.unwrap_err();
    assert!(matches!(err, Error::JobNotFound { .. }));
}

#[tokio::test]
async fn completed_job_is_rejected_as_not_runnable() {
    let dir = tempdir().expect("tmpdir");
    write_job(dir.path(), "01-build.md", "---\nid: build-aaaa\ntitle: Build\ntype: shell\nstatus: completed\n---\necho hi\n");
    let mut plan = load_plan(dir.path()).expect("load");
    let executor =
        JobExecutor::new(deps_for(dir.path(), FakeShellAdapter::new(), FakeProviderAdapter::new()));
    let cancel = CancellationToken::new();

    let err = executor.run(&mut plan, "01-build.md", &cancel).await.unwrap_err();
    assert!(matches!(err, Error::JobNotRunnable { .. }));
}

#[tokio::test]
async fn job_with_unsatisfied_dependency_is_rejected_as_not_runnable() {
    let dir = tempdir().expect("tmpdir");
    write_job(dir.path(), "01-setup.md", "---\nid: setup-aaaa\ntitle: Setup\ntype: shell\nstatus: pending\n---\ntrue\n");
    write_job(
        dir.path(),
        "02-build.md",
        "---\nid: build-aaaa\ntitle: Build\ntype: shell\nstatus: pending\ndepends_on:\n  - 01-setup.md\n---\necho hi\n",
    );
    let mut plan = load_plan(dir.path()).expect("load");
    let executor =
        JobExecutor::new(deps_for(dir.path(), FakeShellAdapter::new(), FakeProviderAdapter::new()));
    let cancel = CancellationToken::new();

    let err = executor.run(&mut plan, "02-build.md", &cancel).await.unwrap_err();
    assert!(matches!(err, Error::JobNotRunnable { .. }));

    let job = plan.find_by_filename("02-build.md").expect("job");
    assert_eq!(job.status, JobStatus::Pending, "status must be untouched by a rejected run");
}

#[tokio::test]
async fn file_type_jobs_are_not_runnable() {
    let dir = tempdir().expect("tmpdir");
    write_job(dir.path(), "01-notes.md", "---\nid: notes-aaaa\ntitle: Notes\ntype: file\nstatus: completed\n---\nsome notes\n");
    let mut plan = load_plan(dir.path()).expect("load");
    let executor =
        JobExecutor::new(deps_for(dir.path(), FakeShellAdapter::new(), FakeProviderAdapter::new()));
    let cancel = CancellationToken::new();

    let err = executor.run(&mut plan, "01-notes.md", &cancel).await.unwrap_err();
    assert!(matches!(err, Error::JobNotRunnable { .. }));
}

#[tokio::test]
async fn oneshot_job_appends_aggregated_concepts_when_flagged() {
    let dir = tempdir().expect("tmpdir");
    write_job(
        dir.path(),
        "01-ask.md",
        "---\nid: ask-aaaa\ntitle: Ask\ntype: oneshot\nstatus: pending\ngather_concept_notes: true\n---\nwhat next?\n",
    );
    let mut plan = load_plan(dir.path()).expect("load");

    let layout = ArtifactLayout::new(dir.path());
    let job = plan.find_by_filename("01-ask.md").expect("job").clone();
    let concepts_path = layout.aggregated_concepts_path(&job);
    std::fs::create_dir_all(concepts_path.parent().expect("parent")).expect("mkdir");
    std::fs::write(&concepts_path, "concept: widgets are load-bearing").expect("write concepts");

    let provider = FakeProviderAdapter::new();
    provider.script("01-ask.md", "ack");
    let executor = JobExecutor::new(deps_for(dir.path(), FakeShellAdapter::new(), provider.clone()));
    let cancel = CancellationToken::new();

    let status = executor.run(&mut plan, "01-ask.md", &cancel).await.expect("run");
    assert_eq!(status, JobStatus::Completed);

    let sent = provider.calls();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].prompt.contains("what next?"));
    assert!(sent[0].prompt.contains("concept: widgets are load-bearing"), "prompt: {}", sent[0].prompt);
}

#[tokio::test]
async fn oneshot_job_ignores_missing_aggregated_concepts_file() {
    let dir = tempdir().expect("tmpdir");
    write_job(
        dir.path(),
        "01-ask.md",
        "---\nid: ask-aaaa\ntitle: Ask\ntype: oneshot\nstatus: pending\ngather_concept_plans: true\n---\nwhat next?\n",
    );
    let mut plan = load_plan(dir.path()).expect("load");

    let provider = FakeProviderAdapter::new();
    provider.script("01-ask.md", "ack");
    let executor = JobExecutor::new(deps_for(dir.path(), FakeShellAdapter::new(), provider.clone()));
    let cancel = CancellationToken::new();

    let status = executor.run(&mut plan, "01-ask.md", &cancel).await.expect("run");
    assert_eq!(status, JobStatus::Completed);

    let sent = provider.calls();
    assert_eq!(sent[0].prompt.trim(), "what next?");
}
