// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Helpers shared by the read-only views (`list`, `status`, `graph`).

use grove_core::{Job, JobStatus, Plan};
use serde::Serialize;

/// One row of a job listing, in the shape both the text table and the
/// `--json` branch render from.
#[derive(Debug, Clone, Serialize)]
pub struct JobRow {
    pub filename: String,
    pub id: String,
    pub title: String,
    pub r#type: String,
    pub status: String,
    pub depends_on: Vec<String>,
}

impl From<&Job> for JobRow {
    fn from(job: &Job) -> Self {
        JobRow {
            filename: job.filename.clone(),
            id: job.id.as_str().to_string(),
            title: job.title.clone(),
            r#type: job.job_type.to_string(),
            status: job.status.to_string(),
            depends_on: job.depends_on.iter().map(|d| d.as_str().to_string()).collect(),
        }
    }
}

/// Ordered so the text summary line is deterministic across runs: `list`
/// must print the literal substring `1 abandoned` when exactly one job
/// is abandoned.
const STATUS_ORDER: &[JobStatus] = &[
    JobStatus::Pending,
    JobStatus::Todo,
    JobStatus::Hold,
    JobStatus::PendingUser,
    JobStatus::Running,
    JobStatus::Completed,
    JobStatus::Failed,
    JobStatus::Abandoned,
    JobStatus::Review,
];

/// Renders the `"N jobs: X completed, Y abandoned, ..."` summary line used
/// by both `list` and `status`.
pub fn summary_line(plan: &Plan) -> String {
    let jobs = plan.jobs_in_order();
    let mut parts = Vec::new();
    for status in STATUS_ORDER {
        let count = jobs.iter().filter(|j| j.status == *status).count();
        if count > 0 {
            parts.push(format!("{count} {status}"));
        }
    }
    if parts.is_empty() {
        format!("{} jobs", jobs.len())
    } else {
        format!("{} jobs: {}", jobs.len(), parts.join(", "))
    }
}
