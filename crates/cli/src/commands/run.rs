// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `grove run` — execute one job, `--next`, or an explicit closed run set.

use crate::context::Context;
use crate::exit_error::ExitError;
use anyhow::Result;
use clap::Args;
use grove_adapters::{RealProviderAdapter, RealShellAdapter};
use grove_core::SystemClock;
use grove_engine::{BatchRunner, ExecutorDeps, JobExecutor};
use grove_storage::{ArtifactLayout, PlanHandle};
use std::io::IsTerminal;
use std::sync::Arc;

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Job file(s) to run, forming a closed run set. Mutually exclusive
    /// with `--next`.
    pub jobs: Vec<String>,

    /// Run the single next runnable job in filename order.
    #[arg(long, conflicts_with = "jobs")]
    pub next: bool,

    /// Skip the confirmation prompt.
    #[arg(long)]
    pub yes: bool,
}

pub async fn run(ctx: &Context, args: RunArgs) -> Result<()> {
    let root = ctx.resolve_plan(None)?;
    let mut plan = grove_storage::load_plan(&root)?;

    let deps = ExecutorDeps {
        shell: Arc::new(RealShellAdapter::new()),
        provider: Arc::new(RealProviderAdapter::new()),
        clock: SystemClock,
        persister: PlanHandle::new(&root),
        layout: ArtifactLayout::new(&root),
        project_root: ctx.project_root.clone(),
    };

    if args.next {
        let Some(job) = grove_engine::next_runnable(&plan).cloned() else {
            println!("No runnable jobs.");
            return Ok(());
        };
        if !confirm(&args.yes, &job.filename)? {
            println!("Aborted.");
            return Ok(());
        }
        let executor = JobExecutor::new(deps);
        let status = executor.run(&mut plan, &job.filename, &ctx.cancel).await?;
        println!("{}: {status}", job.filename);
        return Ok(());
    }

    if args.jobs.is_empty() {
        return Err(ExitError::new(1, "specify a job path or --next").into());
    }

    if args.jobs.len() == 1 {
        let filename = &args.jobs[0];
        if !confirm(&args.yes, filename)? {
            println!("Aborted.");
            return Ok(());
        }
        let executor = JobExecutor::new(deps);
        let status = executor.run(&mut plan, filename, &ctx.cancel).await?;
        println!("{filename}: {status}");
        return Ok(());
    }

    if !confirm_many(&args.yes, &args.jobs) {
        println!("Aborted.");
        return Ok(());
    }

    let max_parallel = std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1);
    let executor = JobExecutor::new(deps);
    let runner = BatchRunner::new(executor, max_parallel);
    let outcome = runner.run(&mut plan, Some(&args.jobs), &ctx.cancel).await?;

    for filename in &outcome.completed {
        println!("{filename}: completed");
    }
    for filename in &outcome.running {
        println!("{filename}: running");
    }
    for filename in &outcome.failed {
        println!("{filename}: failed");
    }
    for (filename, detail) in &outcome.errors {
        eprintln!("{filename}: error: {detail}");
    }

    if !outcome.failed.is_empty() || !outcome.errors.is_empty() {
        return Err(ExitError::new(1, "one or more jobs did not complete successfully").into());
    }
    Ok(())
}

/// No prompt when `--yes` was given or stdout isn't a terminal (CI/scripted
/// use) — only an interactive session without `--yes` gets asked.
fn confirm(yes: &bool, filename: &str) -> Result<bool> {
    if *yes || !std::io::stdout().is_terminal() {
        return Ok(true);
    }
    print!("Run {filename}? [y/N] ");
    use std::io::Write;
    std::io::stdout().flush().ok();
    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    Ok(matches!(line.trim().to_lowercase().as_str(), "y" | "yes"))
}

fn confirm_many(yes: &bool, jobs: &[String]) -> bool {
    if *yes || !std::io::stdout().is_terminal() {
        return true;
    }
    print!("Run {} jobs ({})? [y/N] ", jobs.len(), jobs.join(", "));
    use std::io::Write;
    std::io::stdout().flush().ok();
    let mut line = String::new();
    if std::io::stdin().read_line(&mut line).is_err() {
        return false;
    }
    matches!(line.trim().to_lowercase().as_str(), "y" | "yes")
}
