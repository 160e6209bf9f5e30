// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Readiness resolution: given a loaded plan, the ordered set of jobs
//! whose dependencies are satisfied and whose status permits execution.
//! `Job::is_runnable` (grove-core) already carries the per-job
//! predicate; this module just applies it plan-wide in filename order and
//! exposes the `--next` single-job shortcut.

use grove_core::{Job, Plan};

/// Every runnable job in the plan, in filename order.
pub fn runnable_jobs(plan: &Plan) -> Vec<&Job> {
    plan.jobs_in_order().iter().filter(|job| plan.is_runnable(job)).collect()
}

/// The `--next` shortcut: the first runnable job, or `None` if the plan
/// has no runnable work right now.
pub fn next_runnable(plan: &Plan) -> Option<&Job> {
    plan.jobs_in_order().iter().find(|job| plan.is_runnable(job))
}

/// Runnable jobs restricted to an explicit run set: a job outside
/// `run_set` is never returned here even if it would otherwise be
/// runnable.
pub fn runnable_within<'a>(plan: &'a Plan, run_set: &[String]) -> Vec<&'a Job> {
    plan.jobs_in_order()
        .iter()
        .filter(|job| run_set.iter().any(|f| f == &job.filename))
        .filter(|job| plan.is_runnable(job))
        .collect()
}

#[cfg(test)]
#[path = "readiness_tests.rs"]
mod tests;
