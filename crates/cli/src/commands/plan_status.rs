// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `grove hold` / `unhold` / `review` / `finish` — plan-level status edits
//! to `.grove-plan.yml`.

use crate::context::Context;
use anyhow::{Context as _, Result};
use clap::Args;
use grove_core::{DepRef, PlanStatus};
use grove_storage::{ArtifactLayout, PlanHandle};
use std::io::IsTerminal;

#[derive(Args, Debug)]
pub struct PlanArgs {
    /// Plan to operate on.
    pub plan: String,
}

#[derive(Args, Debug)]
pub struct FinishArgs {
    /// Plan to finish.
    pub plan: String,

    /// Skip the confirmation prompt.
    #[arg(long)]
    pub yes: bool,

    /// Archive every job in the plan after marking it completed.
    #[arg(long)]
    pub archive: bool,
}

fn set_status(ctx: &Context, plan_name: &str, status: PlanStatus) -> Result<()> {
    let root = ctx.plan_path(plan_name);
    let config_path = root.join(grove_core::PLAN_CONFIG_FILENAME);
    let mut config = if config_path.exists() {
        let content = std::fs::read_to_string(&config_path)?;
        serde_yaml::from_str(&content).context("parsing .grove-plan.yml")?
    } else {
        grove_core::PlanConfig::default()
    };
    config.status = status;
    std::fs::create_dir_all(&root)?;
    std::fs::write(&config_path, serde_yaml::to_string(&config)?)?;
    println!("Plan {plan_name} is now {status}");
    Ok(())
}

pub fn hold(ctx: &Context, args: PlanArgs) -> Result<()> {
    set_status(ctx, &args.plan, PlanStatus::Hold)
}

pub fn unhold(ctx: &Context, args: PlanArgs) -> Result<()> {
    set_status(ctx, &args.plan, PlanStatus::Pending)
}

pub fn review(ctx: &Context, args: PlanArgs) -> Result<()> {
    set_status(ctx, &args.plan, PlanStatus::Review)
}

pub fn finish(ctx: &Context, args: FinishArgs) -> Result<()> {
    if !args.yes && std::io::stdout().is_terminal() {
        print!("Finish plan {}? [y/N] ", args.plan);
        use std::io::Write;
        std::io::stdout().flush().ok();
        let mut line = String::new();
        std::io::stdin().read_line(&mut line)?;
        if !matches!(line.trim().to_lowercase().as_str(), "y" | "yes") {
            println!("Aborted.");
            return Ok(());
        }
    }

    set_status(ctx, &args.plan, PlanStatus::Completed)?;

    if args.archive {
        let root = ctx.plan_path(&args.plan);
        let mut plan = grove_storage::load_plan(&root)?;
        let handle = PlanHandle::new(&root);
        let layout = ArtifactLayout::new(&root);
        let filenames: Vec<String> = plan.jobs_in_order().iter().map(|j| j.filename.clone()).collect();
        for filename in filenames {
            handle.archive(&mut plan, &DepRef::new(filename), &layout)?;
        }
        println!("Archived all jobs in {}", args.plan);
    }

    Ok(())
}
