// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `grove plan doctor` — a read-only consistency check. Re-runs the
//! loader's validation passes and separately reports orphaned lock files
//! whose pid is dead. Never mutates the plan; fixing a stale lock is left
//! to a successful re-run of the job.

use crate::context::Context;
use anyhow::Result;
use clap::Args;

#[derive(Args, Debug)]
pub struct DoctorArgs {
    /// Plan to check. Defaults to the resolved current/default plan.
    pub plan: Option<String>,
}

pub fn run(ctx: &Context, args: DoctorArgs) -> Result<()> {
    let root = ctx.resolve_plan(args.plan.as_deref())?;

    let plan = match grove_storage::load_plan(&root) {
        Ok(plan) => plan,
        Err(e) => {
            println!("FAIL: {e}");
            return Err(crate::exit_error::ExitError::new(1, e.to_string()).into());
        }
    };

    println!("OK: {} loads cleanly ({} jobs)", root.display(), plan.len());

    let mut stale = Vec::new();
    for job in plan.jobs_in_order() {
        let job_path = root.join(&job.filename);
        if let Ok(Some(lock)) = grove_adapters::lock::read_lock(&job_path) {
            if !grove_adapters::is_pid_alive(lock.pid) {
                stale.push((job.filename.clone(), lock.pid));
            }
        }
    }

    if stale.is_empty() {
        println!("No stale locks.");
    } else {
        println!("Stale locks (pid is dead, front-matter status is authoritative):");
        for (filename, pid) in &stale {
            println!("  {filename} (pid {pid})");
        }
    }

    Ok(())
}
