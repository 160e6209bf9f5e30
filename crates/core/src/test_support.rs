// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for building fixture plans across crates.
//!
//! Gated behind `#[cfg(any(test, feature = "test-support"))]`.

use crate::config::PlanConfig;
use crate::depref::DepRef;
use crate::job::{Job, JobStatus, JobType};
use crate::plan::Plan;
use std::path::PathBuf;

/// Build a minimal shell job for fixtures, with filename/id derived from
/// `ordinal` + `title` the same way the loader would.
pub fn fixture_job(ordinal: u32, title: &str, status: JobStatus, depends_on: &[&str]) -> Job {
    let filename = crate::slug::job_filename(ordinal, title);
    let slug = crate::slug::slugify(title, crate::slug::MAX_FILENAME_SLUG_LEN);
    Job::builder()
        .filename(filename)
        .title(title)
        .job_type(JobType::Shell)
        .status(status)
        .depends_on(depends_on.iter().map(|d| DepRef::new(*d)).collect())
        .build()
        .with_derived_id(&slug)
}

impl Job {
    /// Test-only helper: re-derive `id` from a slug, for fixtures that want
    /// deterministic ids without going through the front-matter parser.
    #[cfg(any(test, feature = "test-support"))]
    pub fn with_derived_id(mut self, slug: &str) -> Self {
        self.id = crate::id::JobId::derive(slug);
        self
    }
}

/// Build a fixture `Plan` from a root path and a list of jobs.
pub fn fixture_plan(root: impl Into<PathBuf>, jobs: Vec<Job>) -> Plan {
    Plan::new(root.into(), PlanConfig::default(), jobs)
}
