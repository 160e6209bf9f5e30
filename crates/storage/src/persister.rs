// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! State persister: single-job status transitions, body annotation
//! rules, renames with dependency-reference cascades, and archival.
//! Every write goes through the front-matter codec and the
//! write-to-tempfile-then-rename primitive.

use crate::artifacts::ArtifactLayout;
use crate::codec::serialize_front_matter;
use crate::fs_atomic::write_atomic;
use grove_core::{DepRef, Error, Job, JobStatus, Plan};
use std::path::PathBuf;

pub const ABANDONED_SENTINEL: &str = "This job was abandoned by the user";
pub const TRANSCRIPT_HEADING: &str = "## Transcript";
const NO_TRANSCRIPT: &str = "(no transcript captured)";

/// Wraps a plan's root directory and performs the write operations the
/// spec assigns to the state persister. Holds no in-memory state of its
/// own — every call reads the `Job` it's given, writes the file, and
/// updates the same `Job` in the caller's `Plan` so the in-memory copy
/// stays consistent with disk.
#[derive(Debug, Clone)]
pub struct PlanHandle {
    pub root: PathBuf,
}

impl PlanHandle {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn job_path(&self, job: &Job) -> PathBuf {
        self.root.join(&job.filename)
    }

    /// Render and write a single job's front-matter + body to disk,
    /// preserving recognized-key order then unknown keys.
    fn write_job(&self, job: &Job) -> Result<(), Error> {
        let front_matter = job.to_front_matter();
        let content = serialize_front_matter(&front_matter, &job.prompt_body)?;
        write_atomic(&self.job_path(job), &content)
    }

    /// Applies a single status transition and its associated body
    /// annotation, if any.
    ///
    /// - `abandoned`: appends the sentinel section exactly once (checked by
    ///   exact substring match, so calling this twice is a no-op on the body).
    /// - `completed` on an interactive-agent job: appends a `## Transcript`
    ///   section exactly once, sourced from the job's log file if one is
    ///   discoverable under `layout`, else the literal fallback text.
    /// - every other transition only touches the front-matter `status` field.
    pub fn update_job_status(
        &self,
        plan: &mut Plan,
        reference: &DepRef,
        new_status: JobStatus,
        layout: &ArtifactLayout,
    ) -> Result<(), Error> {
        let job = plan
            .find_mut(reference)
            .ok_or_else(|| Error::JobNotFound { reference: reference.as_str().to_string() })?;

        job.status = new_status;

        if new_status == JobStatus::Abandoned && !job.prompt_body.contains(ABANDONED_SENTINEL) {
            append_section(&mut job.prompt_body, "Abandoned", ABANDONED_SENTINEL);
        }

        if new_status == JobStatus::Completed
            && job.job_type.is_interactive()
            && !job.prompt_body.contains(TRANSCRIPT_HEADING)
        {
            let transcript = read_transcript(&layout.job_log_path(job)).unwrap_or_else(|| NO_TRANSCRIPT.to_string());
            append_section(&mut job.prompt_body, "Transcript", &transcript);
        }

        self.write_job(job)
    }

    /// Recomputes the filename from the new title, rewrites the source
    /// file's `title` (and moves it on disk), then walks every *other* job
    /// and rewrites `depends_on`/`prompt_source` entries that pointed at
    /// the old filename or id — preserving which form each entry used.
    pub fn rename(&self, plan: &mut Plan, reference: &DepRef, new_title: &str) -> Result<(), Error> {
        let target = plan
            .find(reference)
            .ok_or_else(|| Error::JobNotFound { reference: reference.as_str().to_string() })?;
        let old_filename = target.filename.clone();
        let old_id = target.id.clone();

        let ordinal = ordinal_prefix(&old_filename);
        let new_filename = grove_core::job_filename(ordinal, new_title);

        // 1. Rewrite and move the target job first, then each dependent's
        // dep-list rewrite.
        let Some(job) = plan.find_by_filename_mut(&old_filename) else {
            return Err(Error::JobNotFound { reference: old_filename });
        };
        let old_path = self.root.join(&old_filename);
        job.title = new_title.to_string();
        job.filename = new_filename.clone();
        self.write_job(job)?;
        let new_path = self.job_path(job);
        if old_path != new_path && old_path.exists() {
            std::fs::remove_file(&old_path).map_err(|e| Error::io(&old_path, e))?;
        }

        // 2. Cascade: every dependent's depends_on/prompt_source entries
        // that named the old filename or id now name the new filename,
        // preserving whichever form (filename vs id) the entry used.
        let dependents: Vec<String> = plan
            .jobs_in_order()
            .iter()
            .filter(|j| {
                j.filename != new_filename
                    && (j.depends_on.iter().any(|d| matches_old(d, &old_filename, old_id.as_str()))
                        || j.prompt_source.iter().any(|d| matches_old(d, &old_filename, old_id.as_str())))
            })
            .map(|j| j.filename.clone())
            .collect();

        for filename in dependents {
            let Some(job) = plan.find_by_filename_mut(&filename) else { continue };
            rewrite_refs(&mut job.depends_on, &old_filename, &old_id.to_string(), &new_filename);
            rewrite_refs(&mut job.prompt_source, &old_filename, &old_id.to_string(), &new_filename);
            self.write_job(job)?;
        }

        Ok(())
    }

    /// Validates every new entry resolves, then writes `depends_on`
    /// atomically. An empty list clears the field.
    pub fn update_deps(
        &self,
        plan: &mut Plan,
        reference: &DepRef,
        new_deps: Vec<DepRef>,
    ) -> Result<(), Error> {
        for dep in &new_deps {
            if plan.find(dep).is_none() {
                return Err(Error::UnresolvedDependency {
                    job: reference.as_str().to_string(),
                    reference: dep.as_str().to_string(),
                });
            }
        }
        let job = plan
            .find_mut(reference)
            .ok_or_else(|| Error::JobNotFound { reference: reference.as_str().to_string() })?;
        job.depends_on = new_deps;
        self.write_job(job)
    }

    /// Appends a markdown section to a job's body and writes it, without
    /// touching `status`. Used by the executor for the `## Output` section
    /// on `oneshot`/`generate_recipe` success — unlike the abandon/transcript
    /// annotations in [`Self::update_job_status`], a new run appends a
    /// fresh section each time rather than checking for one
    /// first, since a job can legitimately be re-run and each attempt's
    /// output is worth keeping.
    pub fn record_output(&self, plan: &mut Plan, reference: &DepRef, heading: &str, text: &str) -> Result<(), Error> {
        let job = plan
            .find_mut(reference)
            .ok_or_else(|| Error::JobNotFound { reference: reference.as_str().to_string() })?;
        append_section(&mut job.prompt_body, heading, text);
        self.write_job(job)
    }

    /// Appends an `## Error` section: the executor converts any error
    /// terminating a job into a `failed` state on the job file with the
    /// error summary in an `## Error` section.
    pub fn record_error(&self, plan: &mut Plan, reference: &DepRef, detail: &str) -> Result<(), Error> {
        self.record_output(plan, reference, "Error", detail)
    }

    /// Materializes a brand-new job file in this plan, created by an
    /// external producer and committed to disk. Shared by the CLI `add`
    /// command and the executor's `generate_recipe` job type, which
    /// materializes one or more new job files from its parsed LLM output.
    pub fn create_job(&self, plan: &mut Plan, job: Job) -> Result<(), Error> {
        self.write_job(&job)?;
        plan.push(job);
        Ok(())
    }

    /// Moves the file to `.archive/<original-filename>`, preserving its
    /// numeric prefix.
    pub fn archive(&self, plan: &mut Plan, reference: &DepRef, layout: &ArtifactLayout) -> Result<(), Error> {
        let job = plan
            .find(reference)
            .cloned()
            .ok_or_else(|| Error::JobNotFound { reference: reference.as_str().to_string() })?;

        let src = self.job_path(&job);
        let dst = layout.archived_job_path(&job.filename);
        if let Some(parent) = dst.parent() {
            std::fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }
        std::fs::rename(&src, &dst).map_err(|e| Error::io(&src, e))?;
        plan.remove_by_filename(&job.filename);
        Ok(())
    }
}

fn matches_old(reference: &DepRef, old_filename: &str, old_id: &str) -> bool {
    reference.as_str() == old_filename || reference.as_str() == old_id
}

fn rewrite_refs(refs: &mut [DepRef], old_filename: &str, _old_id: &str, new_filename: &str) {
    // Only `ByFilename` entries need rewriting: the job's id never changes
    // on rename, so an `ById` entry still resolves without modification.
    for r in refs.iter_mut() {
        if let DepRef::ByFilename(s) = r {
            if s == old_filename {
                *s = new_filename.to_string();
            }
        }
    }
}

fn ordinal_prefix(filename: &str) -> u32 {
    filename.split('-').next().and_then(|s| s.parse().ok()).unwrap_or(0)
}

fn append_section(body: &mut String, heading: &str, text: &str) {
    if !body.ends_with('\n') && !body.is_empty() {
        body.push('\n');
    }
    if !body.is_empty() {
        body.push('\n');
    }
    body.push_str(&format!("## {heading}\n\n{text}\n"));
}

fn read_transcript(log_path: &std::path::Path) -> Option<String> {
    std::fs::read_to_string(log_path).ok().filter(|s| !s.is_empty())
}

#[cfg(test)]
#[path = "persister_tests.rs"]
mod tests;
