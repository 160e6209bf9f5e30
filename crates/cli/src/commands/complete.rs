// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `grove complete` — manual completion for interactive-agent jobs.

use crate::context::Context;
use anyhow::Result;
use clap::Args;
use grove_adapters::{RealProviderAdapter, RealShellAdapter};
use grove_core::SystemClock;
use grove_engine::{ExecutorDeps, JobExecutor};
use grove_storage::{ArtifactLayout, PlanHandle};
use std::sync::Arc;

#[derive(Args, Debug)]
pub struct CompleteArgs {
    /// The interactive-agent job to mark completed.
    pub job: String,
}

pub fn run(ctx: &Context, args: CompleteArgs) -> Result<()> {
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
    let executor = JobExecutor::new(deps);
    executor.complete_interactive(&mut plan, &args.job)?;
    println!("{}: completed", args.job);
    Ok(())
}
