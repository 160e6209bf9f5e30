// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The in-memory plan: a loaded directory's worth of jobs plus its
//! config.

use crate::config::PlanConfig;
use crate::depref::DepRef;
use crate::job::{Job, JobStatus};
use std::path::PathBuf;

/// A directory of jobs, loaded and validated elsewhere; this type just
/// holds the result.
#[derive(Debug, Clone)]
pub struct Plan {
    pub root: PathBuf,
    pub config: PlanConfig,
    jobs: Vec<Job>,
}

impl Plan {
    /// Construct from already-loaded, already-validated jobs. Jobs are
    /// sorted by filename so [`Plan::jobs_in_order`] and iteration agree:
    /// jobs are kept sorted lexicographically by filename.
    pub fn new(root: PathBuf, config: PlanConfig, mut jobs: Vec<Job>) -> Self {
        jobs.sort_by(|a, b| a.filename.cmp(&b.filename));
        Plan { root, config, jobs }
    }

    /// Jobs sorted lexicographically by filename.
    pub fn jobs_in_order(&self) -> &[Job] {
        &self.jobs
    }

    pub fn jobs_in_order_mut(&mut self) -> &mut Vec<Job> {
        &mut self.jobs
    }

    /// Resolve a dependency reference to the job it names, matching on
    /// either filename or id per the entry's own form.
    pub fn find(&self, reference: &DepRef) -> Option<&Job> {
        self.jobs.iter().find(|j| j.matches_ref(reference))
    }

    pub fn find_mut(&mut self, reference: &DepRef) -> Option<&mut Job> {
        self.jobs.iter_mut().find(|j| j.matches_ref(reference))
    }

    pub fn find_by_filename(&self, filename: &str) -> Option<&Job> {
        self.jobs.iter().find(|j| j.filename == filename)
    }

    pub fn find_by_filename_mut(&mut self, filename: &str) -> Option<&mut Job> {
        self.jobs.iter_mut().find(|j| j.filename == filename)
    }

    pub fn find_by_id(&self, id: &str) -> Option<&Job> {
        self.jobs.iter().find(|j| j.id.as_str() == id)
    }

    /// The status a dependent sees for a given reference, if it resolves.
    pub fn dep_status(&self, reference: &DepRef) -> Option<JobStatus> {
        self.find(reference).map(|j| j.status)
    }

    /// Whether the given job is runnable right now, resolving its
    /// dependencies against this plan.
    pub fn is_runnable(&self, job: &Job) -> bool {
        job.is_runnable(|r| self.dep_status(r))
    }

    /// Every job in the plan, in filename order, that depends directly on
    /// `target` (by either filename or id, matching however each dependent
    /// wrote its own reference).
    pub fn direct_dependents<'a>(&'a self, target: &'a Job) -> impl Iterator<Item = &'a Job> + 'a {
        self.jobs.iter().filter(move |j| j.depends_on.iter().any(|d| target.matches_ref(d)))
    }

    pub fn push(&mut self, job: Job) {
        self.jobs.push(job);
        self.jobs.sort_by(|a, b| a.filename.cmp(&b.filename));
    }

    pub fn remove_by_filename(&mut self, filename: &str) -> Option<Job> {
        let idx = self.jobs.iter().position(|j| j.filename == filename)?;
        Some(self.jobs.remove(idx))
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// The ordinal a newly-added job file should use: one past the highest
    /// existing numeric prefix, or `0` for the first job in an empty plan.
    pub fn next_ordinal(&self) -> u32 {
        self.jobs
            .iter()
            .filter_map(|j| j.filename.split('-').next().and_then(|s| s.parse::<u32>().ok()))
            .max()
            .map(|n| n + 1)
            .unwrap_or(0)
    }
}

#[cfg(test)]
#[path = "plan_tests.rs"]
mod tests;
