// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Plan loader: scan a directory, parse every job file, validate the
//! graph, and build a [`Plan`]. Read-only and deterministic — loading the
//! same directory twice must yield an equal `Plan`.

use crate::artifacts::is_excluded_from_job_scan;
use crate::codec::parse_front_matter;
use grove_core::{Error, Job, Plan, PlanConfig};
use std::collections::HashMap;
use std::path::Path;

/// Load and validate every job file directly under `root`.
pub fn load_plan(root: &Path) -> Result<Plan, Error> {
    let config = load_plan_config(root)?;
    let jobs = scan_jobs(root)?;

    validate_unique_ids(&jobs)?;
    validate_dependencies_resolve(&jobs)?;
    validate_acyclic(&jobs)?;

    Ok(Plan::new(root.to_path_buf(), config, jobs))
}

fn load_plan_config(root: &Path) -> Result<PlanConfig, Error> {
    let path = root.join(grove_core::PLAN_CONFIG_FILENAME);
    if !path.exists() {
        return Ok(PlanConfig::default());
    }
    let content = std::fs::read_to_string(&path).map_err(|e| Error::io(&path, e))?;
    serde_yaml::from_str(&content).map_err(|e| Error::MalformedFrontMatter {
        path,
        detail: format!("invalid plan config: {e}"),
    })
}

fn scan_jobs(root: &Path) -> Result<Vec<Job>, Error> {
    let mut jobs = Vec::new();
    let entries = match std::fs::read_dir(root) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(jobs),
        Err(e) => return Err(Error::io(root, e)),
    };

    for entry in entries {
        let entry = entry.map_err(|e| Error::io(root, e))?;
        let path = entry.path();
        if is_excluded_from_job_scan(root, &path) {
            continue;
        }
        if path.extension().and_then(|e| e.to_str()) != Some("md") {
            continue;
        }
        let Some(filename) = path.file_name().and_then(|n| n.to_str()) else { continue };

        let content = std::fs::read_to_string(&path).map_err(|e| Error::io(&path, e))?;
        let (fields, body) = parse_front_matter(&path, &content)?;
        let job = Job::from_front_matter(filename.to_string(), fields, body)?;
        warn_if_lock_is_stale(&path, filename);
        jobs.push(job);
    }

    jobs.sort_by(|a, b| a.filename.cmp(&b.filename));
    Ok(jobs)
}

/// A lock file whose pid is dead doesn't force `running` status — the
/// job's front-matter status is authoritative — but it's worth a `warn`
/// so a user inspecting the plan can see a prior run
/// never released its lock. The loader never deletes it; that's left to a
/// successful re-run or an explicit `doctor --fix`.
fn warn_if_lock_is_stale(job_path: &Path, filename: &str) {
    if let Ok(Some(lock)) = grove_adapters::lock::read_lock(job_path) {
        if !grove_adapters::is_pid_alive(lock.pid) {
            tracing::warn!(job = filename, pid = lock.pid, "stale lock file (pid is dead)");
        }
    }
}

fn validate_unique_ids(jobs: &[Job]) -> Result<(), Error> {
    let mut seen: HashMap<&str, &str> = HashMap::new();
    for job in jobs {
        if let Some(prior) = seen.insert(job.id.as_str(), job.filename.as_str()) {
            return Err(Error::MalformedFrontMatter {
                path: job.filename.clone().into(),
                detail: format!("id {:?} is also used by {prior}", job.id.as_str()),
            });
        }
    }
    Ok(())
}

fn validate_dependencies_resolve(jobs: &[Job]) -> Result<(), Error> {
    for job in jobs {
        for reference in job.depends_on.iter().chain(job.prompt_source.iter()) {
            if !jobs.iter().any(|candidate| candidate.matches_ref(reference)) {
                return Err(Error::UnresolvedDependency {
                    job: job.filename.clone(),
                    reference: reference.as_str().to_string(),
                });
            }
        }
    }
    Ok(())
}

/// DFS with tri-color marking (white/grey/black) to detect a cycle in the
/// `depends_on` graph.
fn validate_acyclic(jobs: &[Job]) -> Result<(), Error> {
    #[derive(Clone, Copy, PartialEq)]
    enum Color {
        White,
        Grey,
        Black,
    }

    let mut colors: HashMap<&str, Color> =
        jobs.iter().map(|j| (j.filename.as_str(), Color::White)).collect();

    fn visit<'a>(
        job: &'a Job,
        jobs: &'a [Job],
        colors: &mut HashMap<&'a str, Color>,
        path: &mut Vec<&'a str>,
    ) -> Result<(), Error> {
        colors.insert(&job.filename, Color::Grey);
        path.push(&job.filename);

        for reference in &job.depends_on {
            let Some(dep) = jobs.iter().find(|c| c.matches_ref(reference)) else { continue };
            match colors.get(dep.filename.as_str()) {
                Some(Color::Grey) => {
                    let mut cycle: Vec<String> =
                        path.iter().skip_while(|f| **f != dep.filename).map(|s| s.to_string()).collect();
                    cycle.push(dep.filename.clone());
                    return Err(Error::DependencyCycle { path: cycle });
                }
                Some(Color::Black) => continue,
                _ => visit(dep, jobs, colors, path)?,
            }
        }

        path.pop();
        colors.insert(&job.filename, Color::Black);
        Ok(())
    }

    for job in jobs {
        if colors.get(job.filename.as_str()) == Some(&Color::White) {
            let mut path = Vec::new();
            visit(job, jobs, &mut colors, &mut path)?;
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "loader_tests.rs"]
mod tests;
