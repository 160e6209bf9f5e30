// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Single-job executor: runs one job to a terminal status by dispatching
//! on its `type`, fanning its output through the log bus, and persisting
//! every status transition through the state persister.
//!
//! The lock protocol brackets every run: acquired right before the status
//! write to `running`, released on every terminal path — including the
//! `interactive_agent`/`headless_agent` case, where the job stays
//! `running` and the lock stays held past the end of this function,
//! reclaimed only by the matching `complete` call.

use crate::briefing;
use crate::log_bus::LogBus;
use grove_adapters::{LockGuard, ProviderAdapter, ShellAdapter};
use grove_core::{Clock, DepRef, Error, Job, JobStatus, JobType, Plan};
use grove_storage::{ArtifactLayout, PlanHandle};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

const CANCELLED_SENTINEL: &str = "cancelled by user";

/// Everything the executor needs that isn't the job/plan themselves: the
/// provider seams, the persister, the artifact layout, and a clock for
/// briefing timestamps.
#[derive(Clone)]
pub struct ExecutorDeps<Sh: ShellAdapter, Pr: ProviderAdapter, C: Clock> {
    pub shell: Arc<Sh>,
    pub provider: Arc<Pr>,
    pub clock: C,
    pub persister: PlanHandle,
    pub layout: ArtifactLayout,
    /// Project working directory `shell` jobs run in.
    pub project_root: std::path::PathBuf,
}

/// Runs one job at a time. Stateless beyond its deps — every call takes
/// the `Plan` it should mutate, so a `BatchRunner` can own many of these
/// running concurrently against the same in-memory `Plan` as long as each
/// call only touches its own job's file.
pub struct JobExecutor<Sh: ShellAdapter, Pr: ProviderAdapter, C: Clock> {
    deps: ExecutorDeps<Sh, Pr, C>,
}

impl<Sh: ShellAdapter, Pr: ProviderAdapter, C: Clock> JobExecutor<Sh, Pr, C> {
    pub fn new(deps: ExecutorDeps<Sh, Pr, C>) -> Self {
        Self { deps }
    }

    /// Runs `filename` to a terminal status (or to `running`, for
    /// interactive agent types — see module docs). Returns the status the
    /// job ended up in.
    pub async fn run(
        &self,
        plan: &mut Plan,
        filename: &str,
        cancel: &CancellationToken,
    ) -> Result<JobStatus, Error> {
        let reference = DepRef::new(filename.to_string());
        let job = plan
            .find(&reference)
            .cloned()
            .ok_or_else(|| Error::JobNotFound { reference: filename.to_string() })?;

        if job.job_type == JobType::File {
            return Err(Error::JobNotRunnable {
                job: filename.to_string(),
                reason: "file jobs are always completed and never run".to_string(),
            });
        }
        if job.job_type == JobType::Chat {
            return Err(Error::JobNotRunnable {
                job: filename.to_string(),
                reason: "chat jobs are driven by the user, not the executor".to_string(),
            });
        }
        if job.status == JobStatus::Completed {
            return Err(Error::JobNotRunnable {
                job: filename.to_string(),
                reason: "job is already completed".to_string(),
            });
        }
        // A job already `running` is not blocked here — it falls through to
        // the lock check below, which is what actually distinguishes a live
        // in-flight run (`JobAlreadyRunning`) from a crash-orphaned one
        // (reclaimed silently).
        if job.status != JobStatus::Running {
            let blocked = job.depends_on.iter().any(|dep| match plan.dep_status(dep) {
                Some(status) => !status.satisfies_dependents(),
                None => true,
            });
            if blocked {
                return Err(Error::JobNotRunnable {
                    job: filename.to_string(),
                    reason: "blocked by one or more unsatisfied dependencies".to_string(),
                });
            }
        }

        let job_path = self.deps.persister.root.join(&job.filename);
        let session = uuid::Uuid::new_v4().to_string();
        let lock = LockGuard::acquire(&job_path, &job.filename, std::process::id(), &session)?;

        self.deps.persister.update_job_status(plan, &reference, JobStatus::Running, &self.deps.layout)?;

        if cancel.is_cancelled() {
            return self.fail_cancelled(plan, &reference);
        }

        let outcome = match job.job_type {
            JobType::Shell => self.run_shell(plan, &job, cancel).await,
            JobType::Oneshot => self.run_oneshot(plan, &job, cancel).await,
            JobType::GenerateRecipe => self.run_generate_recipe(plan, &job, cancel).await,
            JobType::InteractiveAgent | JobType::HeadlessAgent => {
                let result = self.run_interactive(plan, &job).await;
                // The job stays `running`: hand the lock off to the caller
                // instead of releasing it when this function returns.
                if result.is_ok() {
                    lock.persist();
                }
                return result;
            }
            JobType::File | JobType::Chat => unreachable!("rejected above"),
        };

        drop(lock);
        outcome
    }

    async fn run_shell(&self, plan: &mut Plan, job: &Job, cancel: &CancellationToken) -> Result<JobStatus, Error> {
        let reference = DepRef::new(job.filename.clone());
        let bus = LogBus::create(self.deps.layout.job_log_path(job))?;
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel::<Vec<u8>>();

        let pump = tokio::spawn({
            let bus = bus.clone();
            async move {
                while let Some(chunk) = rx.recv().await {
                    let _ = bus.append(&chunk);
                }
            }
        });

        let run = self.deps.shell.run(&job.prompt_body, &self.deps.project_root, tx);
        tokio::select! {
            biased;
            () = cancel.cancelled() => {
                let _ = pump.await;
                return self.fail_cancelled(plan, &reference);
            }
            result = run => {
                let _ = pump.await;
                match result {
                    Ok(output) => {
                        let _ = bus.append(format!("\n[exit code: {}]\n", output.exit_code).as_bytes());
                        if output.succeeded() {
                            self.complete(plan, &reference, JobStatus::Completed)
                        } else {
                            self.record_failure(plan, &reference, &format!("exited with code {}", output.exit_code))
                        }
                    }
                    Err(e) => self.record_failure(plan, &reference, &e.to_string()),
                }
            }
        }
    }

    async fn run_oneshot(&self, plan: &mut Plan, job: &Job, cancel: &CancellationToken) -> Result<JobStatus, Error> {
        let reference = DepRef::new(job.filename.clone());
        let prompt = self.build_prompt(plan, job);

        tokio::select! {
            biased;
            () = cancel.cancelled() => self.fail_cancelled(plan, &reference),
            result = self.deps.provider.complete(&job.filename, &prompt) => match result {
                Ok(response) => {
                    self.deps.persister.record_output(plan, &reference, "Output", &response)?;
                    self.complete(plan, &reference, JobStatus::Completed)
                }
                Err(e) => self.record_failure(plan, &reference, &e.to_string()),
            },
        }
    }

    async fn run_generate_recipe(
        &self,
        plan: &mut Plan,
        job: &Job,
        cancel: &CancellationToken,
    ) -> Result<JobStatus, Error> {
        let reference = DepRef::new(job.filename.clone());
        let prompt = self.build_prompt(plan, job);

        let response = tokio::select! {
            biased;
            () = cancel.cancelled() => return self.fail_cancelled(plan, &reference),
            result = self.deps.provider.complete(&job.filename, &prompt) => match result {
                Ok(response) => response,
                Err(e) => return self.record_failure(plan, &reference, &e.to_string()),
            },
        };

        let created = match materialize_generated_jobs(plan, &response) {
            Ok(created) => created,
            Err(detail) => return self.record_failure(plan, &reference, &detail),
        };
        let names = created.iter().map(|j| j.filename.clone()).collect::<Vec<_>>().join(", ");
        for new_job in created {
            self.deps.persister.create_job(plan, new_job)?;
        }

        let summary =
            if names.is_empty() { "no jobs were generated".to_string() } else { format!("created: {names}") };
        self.deps.persister.record_output(plan, &reference, "Output", &summary)?;
        self.complete(plan, &reference, JobStatus::Completed)
    }

    /// Runs the generated-plan sub-phase and writes the briefing for
    /// `interactive_agent`/`headless_agent`. Leaves the job in `running`;
    /// terminal completion happens out-of-band via [`Self::complete_interactive`].
    async fn run_interactive(&self, plan: &mut Plan, job: &Job) -> Result<JobStatus, Error> {
        let context = self.dependency_context(plan, job);
        let timestamp = self.deps.clock.epoch_ms();

        let generated_plan = if job.generate_plan_from.unwrap_or(false) {
            let source = self.dependency_context(plan, job);
            let generated = self
                .deps
                .provider
                .complete(&job.filename, &format!("Generate an XML plan from:\n\n{source}"))
                .await?;
            let path = self.deps.layout.generated_plan_briefing_path(job, timestamp);
            write_artifact(&path, &generated)?;
            Some(generated)
        } else {
            None
        };

        let briefing_xml = briefing::render(&job.prompt_body, &context, generated_plan.as_deref());
        let briefing_path = self.deps.layout.briefing_path(job, timestamp);
        write_artifact(&briefing_path, &briefing_xml)?;

        // Status is already `running` (set by `run` before dispatch); no
        // further front-matter write is needed here.
        Ok(JobStatus::Running)
    }

    /// The external completion operation for interactive-agent jobs.
    /// Appends the transcript, writes `completed`, and releases the lock
    /// the original `run` call handed off.
    pub fn complete_interactive(&self, plan: &mut Plan, filename: &str) -> Result<(), Error> {
        let reference = DepRef::new(filename.to_string());
        let status = plan
            .find(&reference)
            .ok_or_else(|| Error::JobNotFound { reference: filename.to_string() })?
            .status;
        if status != JobStatus::Running {
            return Err(Error::JobNotRunnable {
                job: filename.to_string(),
                reason: format!("job is {status}, not running"),
            });
        }
        let job_path = self.deps.persister.root.join(filename);

        self.deps.persister.update_job_status(plan, &reference, JobStatus::Completed, &self.deps.layout)?;

        let lock_path = grove_core::lock_path_for(&job_path);
        if let Err(e) = std::fs::remove_file(&lock_path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                return Err(Error::io(&lock_path, e));
            }
        }
        Ok(())
    }

    fn complete(&self, plan: &mut Plan, reference: &DepRef, status: JobStatus) -> Result<JobStatus, Error> {
        self.deps.persister.update_job_status(plan, reference, status, &self.deps.layout)?;
        Ok(status)
    }

    fn record_failure(&self, plan: &mut Plan, reference: &DepRef, detail: &str) -> Result<JobStatus, Error> {
        self.deps.persister.record_error(plan, reference, detail)?;
        self.complete(plan, reference, JobStatus::Failed)
    }

    fn fail_cancelled(&self, plan: &mut Plan, reference: &DepRef) -> Result<JobStatus, Error> {
        self.record_failure(plan, reference, CANCELLED_SENTINEL)
    }

    /// Builds an `oneshot`/`generate_recipe` prompt: the job's own body,
    /// optionally prefixed by dependency bodies when `prepend_dependencies`
    /// or `prompt_source` applies, optionally appended with aggregated
    /// concept context when `gather_concept_notes`/`gather_concept_plans`
    /// is set.
    fn build_prompt(&self, plan: &Plan, job: &Job) -> String {
        let context = self.dependency_context(plan, job);
        let mut prompt =
            if context.is_empty() { job.prompt_body.clone() } else { format!("{context}\n\n{}", job.prompt_body) };
        if let Some(concepts) = self.concept_context(job) {
            prompt.push_str("\n\n");
            prompt.push_str(&concepts);
        }
        prompt
    }

    /// Concatenated bodies of `prompt_source` entries, or of `depends_on`
    /// when `prepend_dependencies` is set, in the order each list is
    /// declared.
    fn dependency_context(&self, plan: &Plan, job: &Job) -> String {
        let refs: Vec<&DepRef> = if !job.prompt_source.is_empty() {
            job.prompt_source.iter().collect()
        } else if job.prepend_dependencies.unwrap_or(false) {
            job.depends_on.iter().collect()
        } else {
            Vec::new()
        };
        let bodies: Vec<&str> = refs.iter().filter_map(|r| plan.find(r)).map(|j| j.prompt_body.as_str()).collect();
        briefing::join_dependency_bodies(&bodies)
    }

    /// Reads this job's aggregated-concepts artifact, if
    /// `gather_concept_notes` or `gather_concept_plans` is set. Gathering
    /// the concepts themselves (walking a notebook, selecting which notes
    /// or plans are relevant) is the external collaborator's job per
    /// spec §1; the engine's half of that interface is just reading
    /// whatever the collaborator already wrote to
    /// `<plan>/.artifacts/<job-artifact-key>/aggregated-concepts.md` and
    /// folding it into the prompt. No file there (the collaborator never
    /// ran, or found nothing) means no concept context is appended.
    fn concept_context(&self, job: &Job) -> Option<String> {
        if !(job.gather_concept_notes.unwrap_or(false) || job.gather_concept_plans.unwrap_or(false)) {
            return None;
        }
        let path = self.deps.layout.aggregated_concepts_path(job);
        std::fs::read_to_string(path).ok().filter(|s| !s.trim().is_empty())
    }
}

fn write_artifact(path: &std::path::Path, content: &str) -> Result<(), Error> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }
    std::fs::write(path, content).map_err(|e| Error::io(path, e))
}

/// Parses a `generate_recipe` LLM response into one or more new [`Job`]s.
///
/// Blocks are separated by a line containing only `===`, each one shaped
/// like a job file (front matter + body), the same shape the codec parses
/// from disk. Filenames are assigned sequential ordinals starting at the
/// plan's next free one.
fn materialize_generated_jobs(plan: &Plan, response: &str) -> Result<Vec<Job>, String> {
    let mut ordinal = plan.next_ordinal();
    let mut jobs = Vec::new();
    for block in response.split("\n===\n") {
        let block = block.trim();
        if block.is_empty() {
            continue;
        }
        let (fields, body) = grove_storage::parse_front_matter(std::path::Path::new("<generated>"), block)
            .map_err(|e| e.to_string())?;
        let title = fields.get("title").and_then(|v| v.as_str()).unwrap_or("Generated Job").to_string();
        let filename = grove_core::job_filename(ordinal, &title);
        ordinal += 1;
        let job = Job::from_front_matter(filename, fields, body).map_err(|e| e.to_string())?;
        jobs.push(job);
    }
    Ok(jobs)
}

#[cfg(test)]
#[path = "executor_tests.rs"]
mod tests;
