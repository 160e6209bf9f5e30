// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::loader::load_plan;
use tempfile::tempdir;

fn write_job(dir: &std::path::Path, filename: &str, content: &str) {
    std::fs::write(dir.join(filename), content).expect("write job");
}

#[test]
fn update_job_status_is_idempotent_for_abandon() {
    let dir = tempdir().expect("tmpdir");
    write_job(
        dir.path(),
        "01-setup.md",
        "---\nid: setup-aaaa\ntitle: Setup\ntype: shell\nstatus: pending\n---\nbody\n",
    );
    let mut plan = load_plan(dir.path()).expect("load");
    let handle = PlanHandle::new(dir.path());
    let layout = ArtifactLayout::new(dir.path());
    let r = DepRef::new("01-setup.md");

    handle.update_job_status(&mut plan, &r, JobStatus::Abandoned, &layout).expect("first");
    handle.update_job_status(&mut plan, &r, JobStatus::Abandoned, &layout).expect("second");

    let job = plan.find(&r).expect("job");
    assert_eq!(job.status, JobStatus::Abandoned);
    assert_eq!(job.prompt_body.matches(ABANDONED_SENTINEL).count(), 1);

    // Reload from disk to make sure the write actually landed, not just
    // the in-memory Plan.
    let reloaded = load_plan(dir.path()).expect("reload");
    let job = reloaded.find(&r).expect("job");
    assert_eq!(job.prompt_body.matches(ABANDONED_SENTINEL).count(), 1);
}

#[test]
fn update_job_status_only_touches_front_matter_for_plain_transitions() {
    let dir = tempdir().expect("tmpdir");
    write_job(
        dir.path(),
        "01-setup.md",
        "---\nid: setup-aaaa\ntitle: Setup\ntype: shell\nstatus: pending\n---\noriginal body\n",
    );
    let mut plan = load_plan(dir.path()).expect("load");
    let handle = PlanHandle::new(dir.path());
    let layout = ArtifactLayout::new(dir.path());
    let r = DepRef::new("01-setup.md");

    handle.update_job_status(&mut plan, &r, JobStatus::Running, &layout).expect("transition");
    let job = plan.find(&r).expect("job");
    assert_eq!(job.prompt_body, "original body\n");
}

#[test]
fn update_job_status_completed_appends_transcript_for_interactive_agent() {
    let dir = tempdir().expect("tmpdir");
    write_job(
        dir.path(),
        "01-chat.md",
        "---\nid: chat-aaaa\ntitle: Chat\ntype: interactive_agent\nstatus: running\n---\nprompt body\n",
    );
    let mut plan = load_plan(dir.path()).expect("load");
    let handle = PlanHandle::new(dir.path());
    let layout = ArtifactLayout::new(dir.path());
    let r = DepRef::new("01-chat.md");

    handle.update_job_status(&mut plan, &r, JobStatus::Completed, &layout).expect("complete");
    let job = plan.find(&r).expect("job");
    assert!(job.prompt_body.contains(TRANSCRIPT_HEADING));
    assert!(job.prompt_body.contains("(no transcript captured)"));

    // Calling again must not duplicate the section.
    handle.update_job_status(&mut plan, &r, JobStatus::Completed, &layout).expect("complete again");
    let job = plan.find(&r).expect("job");
    assert_eq!(job.prompt_body.matches(TRANSCRIPT_HEADING).count(), 1);
}

#[test]
fn update_job_status_reads_transcript_from_log_file_when_present() {
    let dir = tempdir().expect("tmpdir");
    write_job(
        dir.path(),
        "01-chat.md",
        "---\nid: chat-aaaa\ntitle: Chat\ntype: interactive_agent\nstatus: running\n---\nprompt body\n",
    );
    let mut plan = load_plan(dir.path()).expect("load");
    let handle = PlanHandle::new(dir.path());
    let layout = ArtifactLayout::new(dir.path());
    let job = plan.find_by_filename("01-chat.md").expect("job").clone();
    let log_dir = layout.job_artifact_dir(&job);
    std::fs::create_dir_all(&log_dir).expect("mkdir");
    std::fs::write(log_dir.join("job.log"), "session transcript content").expect("write log");

    let r = DepRef::new("01-chat.md");
    handle.update_job_status(&mut plan, &r, JobStatus::Completed, &layout).expect("complete");
    let job = plan.find(&r).expect("job");
    assert!(job.prompt_body.contains("session transcript content"));
}

#[test]
fn rename_updates_filename_and_cascades_dependent_refs() {
    let dir = tempdir().expect("tmpdir");
    write_job(
        dir.path(),
        "01-setup.md",
        "---\nid: setup-aaaa\ntitle: Setup\ntype: shell\nstatus: pending\n---\nsetup\n",
    );
    write_job(
        dir.path(),
        "02-build.md",
        "---\nid: build-bbbb\ntitle: Build\ntype: shell\nstatus: pending\ndepends_on:\n  - 01-setup.md\n---\nbuild\n",
    );
    write_job(
        dir.path(),
        "03-run-tests.md",
        "---\nid: tests-cccc\ntitle: Run Tests\ntype: shell\nstatus: pending\ndepends_on:\n  - 02-build.md\n---\ntest\n",
    );

    let mut plan = load_plan(dir.path()).expect("load");
    let handle = PlanHandle::new(dir.path());
    handle.rename(&mut plan, &DepRef::new("02-build.md"), "Build Artifacts").expect("rename");

    let reloaded = load_plan(dir.path()).expect("reload");
    assert!(reloaded.find_by_filename("02-build-artifacts.md").is_some());
    assert!(reloaded.find_by_filename("02-build.md").is_none());

    let tests = reloaded.find_by_filename("03-run-tests.md").expect("tests job");
    assert_eq!(tests.depends_on, vec![DepRef::new("02-build-artifacts.md")]);

    let setup = reloaded.find_by_filename("01-setup.md").expect("setup job");
    assert_eq!(setup.prompt_body, "setup\n");
}

#[test]
fn rename_preserves_reference_form_filename_vs_id() {
    let dir = tempdir().expect("tmpdir");
    write_job(
        dir.path(),
        "01-setup.md",
        "---\nid: setup-aaaa\ntitle: Setup\ntype: shell\nstatus: pending\n---\nsetup\n",
    );
    write_job(
        dir.path(),
        "02-build.md",
        "---\nid: build-bbbb\ntitle: Build\ntype: shell\nstatus: pending\ndepends_on:\n  - setup-aaaa\n---\nbuild\n",
    );

    let mut plan = load_plan(dir.path()).expect("load");
    let handle = PlanHandle::new(dir.path());
    handle.rename(&mut plan, &DepRef::new("01-setup.md"), "Bootstrap").expect("rename");

    // The id doesn't change on rename, so a dependent that referenced by id
    // still resolves without any rewrite needed.
    let reloaded = load_plan(dir.path()).expect("reload");
    let build = reloaded.find_by_filename("02-build.md").expect("build job");
    assert_eq!(build.depends_on, vec![DepRef::new("setup-aaaa")]);
}

#[test]
fn update_deps_validates_and_writes() {
    let dir = tempdir().expect("tmpdir");
    write_job(
        dir.path(),
        "01-setup.md",
        "---\nid: setup-aaaa\ntitle: Setup\ntype: shell\nstatus: pending\n---\nsetup\n",
    );
    write_job(
        dir.path(),
        "02-build.md",
        "---\nid: build-bbbb\ntitle: Build\ntype: shell\nstatus: pending\n---\nbuild\n",
    );
    let mut plan = load_plan(dir.path()).expect("load");
    let handle = PlanHandle::new(dir.path());
    handle
        .update_deps(&mut plan, &DepRef::new("02-build.md"), vec![DepRef::new("01-setup.md")])
        .expect("update deps");

    let reloaded = load_plan(dir.path()).expect("reload");
    let build = reloaded.find_by_filename("02-build.md").expect("build job");
    assert_eq!(build.depends_on, vec![DepRef::new("01-setup.md")]);
}

#[test]
fn update_deps_rejects_unresolved_reference() {
    let dir = tempdir().expect("tmpdir");
    write_job(
        dir.path(),
        "01-setup.md",
        "---\nid: setup-aaaa\ntitle: Setup\ntype: shell\nstatus: pending\n---\nsetup\n",
    );
    let mut plan = load_plan(dir.path()).expect("load");
    let handle = PlanHandle::new(dir.path());
    let err = handle
        .update_deps(&mut plan, &DepRef::new("01-setup.md"), vec![DepRef::new("nope.md")])
        .unwrap_err();
    assert!(matches!(err, Error::UnresolvedDependency { .. }));
}

#[test]
fn update_deps_empty_clears_field() {
    let dir = tempdir().expect("tmpdir");
    write_job(
        dir.path(),
        "01-setup.md",
        "---\nid: setup-aaaa\ntitle: Setup\ntype: shell\nstatus: pending\n---\nsetup\n",
    );
    write_job(
        dir.path(),
        "02-build.md",
        "---\nid: build-bbbb\ntitle: Build\ntype: shell\nstatus: pending\ndepends_on:\n  - 01-setup.md\n---\nbuild\n",
    );
    let mut plan = load_plan(dir.path()).expect("load");
    let handle = PlanHandle::new(dir.path());
    handle.update_deps(&mut plan, &DepRef::new("02-build.md"), Vec::new()).expect("clear");

    let reloaded = load_plan(dir.path()).expect("reload");
    let build = reloaded.find_by_filename("02-build.md").expect("build job");
    assert!(build.depends_on.is_empty());
}

#[test]
fn archive_moves_file_preserving_ordinal_prefix() {
    let dir = tempdir().expect("tmpdir");
    write_job(
        dir.path(),
        "01-setup.md",
        "---\nid: setup-aaaa\ntitle: Setup\ntype: shell\nstatus: completed\n---\nsetup\n",
    );
    let mut plan = load_plan(dir.path()).expect("load");
    let handle = PlanHandle::new(dir.path());
    let layout = ArtifactLayout::new(dir.path());
    handle.archive(&mut plan, &DepRef::new("01-setup.md"), &layout).expect("archive");

    assert!(!dir.path().join("01-setup.md").exists());
    assert!(dir.path().join(".archive/01-setup.md").exists());
    assert_eq!(plan.len(), 0);
}

#[test]
fn record_output_appends_a_fresh_section_each_call() {
    let dir = tempdir().expect("tmpdir");
    write_job(
        dir.path(),
        "01-ask.md",
        "---\nid: ask-aaaa\ntitle: Ask\ntype: oneshot\nstatus: pending\n---\nprompt\n",
    );
    let mut plan = load_plan(dir.path()).expect("load");
    let handle = PlanHandle::new(dir.path());
    let r = DepRef::new("01-ask.md");

    handle.record_output(&mut plan, &r, "Output", "first answer").expect("record 1");
    handle.record_output(&mut plan, &r, "Output", "second answer").expect("record 2");

    let job = plan.find(&r).expect("job");
    assert_eq!(job.prompt_body.matches("## Output").count(), 2);
    assert!(job.prompt_body.contains("first answer"));
    assert!(job.prompt_body.contains("second answer"));
}

#[test]
fn record_error_appends_an_error_section() {
    let dir = tempdir().expect("tmpdir");
    write_job(
        dir.path(),
        "01-ask.md",
        "---\nid: ask-aaaa\ntitle: Ask\ntype: oneshot\nstatus: pending\n---\nprompt\n",
    );
    let mut plan = load_plan(dir.path()).expect("load");
    let handle = PlanHandle::new(dir.path());
    let r = DepRef::new("01-ask.md");

    handle.record_error(&mut plan, &r, "provider timed out").expect("record error");
    let job = plan.find(&r).expect("job");
    assert!(job.prompt_body.contains("## Error"));
    assert!(job.prompt_body.contains("provider timed out"));
}

#[test]
fn create_job_writes_the_file_and_adds_it_to_the_plan() {
    let dir = tempdir().expect("tmpdir");
    let mut plan = load_plan(dir.path()).expect("load empty");
    let handle = PlanHandle::new(dir.path());

    let job = grove_core::Job::builder()
        .filename("01-new.md")
        .title("New Job")
        .job_type(grove_core::JobType::Shell)
        .build();
    handle.create_job(&mut plan, job).expect("create");

    assert!(dir.path().join("01-new.md").exists());
    assert_eq!(plan.len(), 1);

    let reloaded = load_plan(dir.path()).expect("reload");
    assert!(reloaded.find_by_filename("01-new.md").is_some());
}

#[test]
fn update_job_status_unknown_reference_fails() {
    let dir = tempdir().expect("tmpdir");
    let mut plan = load_plan(dir.path()).expect("load");
    let handle = PlanHandle::new(dir.path());
    let layout = ArtifactLayout::new(dir.path());
    let err = handle
        .update_job_status(&mut plan, &DepRef::new("nope.md"), JobStatus::Completed, &layout)
        .unwrap_err();
    assert!(matches!(err, Error::JobNotFound { .. }));
}
