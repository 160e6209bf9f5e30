// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Batch runner: repeatedly dispatches every currently runnable job,
//! bounded to a fixed amount of parallelism, until a pass over the plan
//! produces no further runnable work.
//!
//! Each wave runs its jobs against an independent clone of the `Plan`
//! snapshot and merges only that job's own record back once it reaches a
//! result — two jobs in the same wave are independent by construction (a
//! job only becomes runnable once every dependency is already terminal),
//! so no wave ever contains two jobs racing to write the same file.

use crate::executor::JobExecutor;
use crate::readiness::{runnable_jobs, runnable_within};
use grove_adapters::{ProviderAdapter, ShellAdapter};
use grove_core::{Clock, Error, JobStatus, Plan};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

/// Tally of where every job in a batch run ended up.
#[derive(Debug, Default, Clone)]
pub struct BatchOutcome {
    pub completed: Vec<String>,
    pub failed: Vec<String>,
    /// Interactive-agent jobs a wave started that are still `running`
    /// when the batch returns — they outlive the call that started them.
    pub running: Vec<String>,
    /// Jobs whose executor call itself errored out, rather than ending in
    /// a normal terminal status (panics, unexpected I/O failures).
    pub errors: Vec<(String, String)>,
}

impl BatchOutcome {
    fn record(&mut self, filename: String, status: JobStatus) {
        match status {
            JobStatus::Completed => self.completed.push(filename),
            JobStatus::Failed => self.failed.push(filename),
            JobStatus::Running => self.running.push(filename),
            other => {
                tracing::warn!(job = %filename, status = %other, "batch job ended in an unexpected status");
            }
        }
    }
}

/// Runs a plan's jobs to exhaustion with at most `max_parallel` jobs
/// in flight at once.
pub struct BatchRunner<Sh: ShellAdapter, Pr: ProviderAdapter, C: Clock> {
    executor: Arc<JobExecutor<Sh, Pr, C>>,
    max_parallel: usize,
}

impl<Sh: ShellAdapter, Pr: ProviderAdapter, C: Clock + 'static> BatchRunner<Sh, Pr, C> {
    pub fn new(executor: JobExecutor<Sh, Pr, C>, max_parallel: usize) -> Self {
        Self { executor: Arc::new(executor), max_parallel: max_parallel.max(1) }
    }

    /// Runs every runnable job to a terminal (or `running`, for
    /// interactive types) status, recomputing the frontier after each
    /// wave, until nothing more becomes runnable or the plan is exhausted.
    ///
    /// `run_set`, when given, restricts execution to that closed set of
    /// filenames — every name must resolve to a job already in the plan.
    pub async fn run(
        &self,
        plan: &mut Plan,
        run_set: Option<&[String]>,
        cancel: &CancellationToken,
    ) -> Result<BatchOutcome, Error>
    where
        Sh: 'static,
        Pr: 'static,
    {
        if let Some(set) = run_set {
            for filename in set {
                if plan.find_by_filename(filename).is_none() {
                    return Err(Error::JobNotFound { reference: filename.clone() });
                }
            }
        }

        let mut outcome = BatchOutcome::default();
        loop {
            let frontier: Vec<String> = match run_set {
                Some(set) => runnable_within(plan, set).into_iter().map(|j| j.filename.clone()).collect(),
                None => runnable_jobs(plan).into_iter().map(|j| j.filename.clone()).collect(),
            };
            if frontier.is_empty() {
                break;
            }

            let semaphore = Arc::new(Semaphore::new(self.max_parallel));
            let mut wave: JoinSet<(String, Plan, Result<JobStatus, Error>)> = JoinSet::new();
            for filename in frontier {
                let snapshot = plan.clone();
                let executor = Arc::clone(&self.executor);
                let permit_holder = Arc::clone(&semaphore);
                let cancel = cancel.clone();
                wave.spawn(async move {
                    let _permit = permit_holder.acquire_owned().await;
                    let mut local_plan = snapshot;
                    let result = executor.run(&mut local_plan, &filename, &cancel).await;
                    (filename, local_plan, result)
                });
            }

            let mut progressed = false;
            while let Some(joined) = wave.join_next().await {
                match joined {
                    Ok((filename, local_plan, result)) => {
                        if let Some(updated) = local_plan.find_by_filename(&filename).cloned() {
                            if let Some(slot) = plan.find_by_filename_mut(&filename) {
                                *slot = updated;
                            } else {
                                plan.push(updated);
                            }
                        }
                        progressed = true;
                        match result {
                            Ok(status) => outcome.record(filename, status),
                            Err(e) => {
                                tracing::warn!(job = %filename, error = %e, "job executor returned an error");
                                outcome.errors.push((filename, e.to_string()));
                            }
                        }
                    }
                    Err(join_err) => {
                        tracing::error!(error = %join_err, "batch task panicked before reporting a result");
                        outcome.errors.push(("<unknown>".to_string(), join_err.to_string()));
                    }
                }
            }

            if !progressed || cancel.is_cancelled() {
                break;
            }
        }

        Ok(outcome)
    }
}

#[cfg(test)]
#[path = "batch_tests.rs"]
mod tests;
