// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `grove status [--json]` — plan-level status summary.

use crate::commands::shared::summary_line;
use crate::context::Context;
use anyhow::Result;
use clap::Args;
use serde::Serialize;

#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Plan to inspect. Defaults to the resolved current/default plan.
    pub plan: Option<String>,

    /// Emit machine-readable JSON instead of the text summary.
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct PlanStatusView {
    root: String,
    status: String,
    job_count: usize,
}

pub fn run(ctx: &Context, args: StatusArgs) -> Result<()> {
    let root = ctx.resolve_plan(args.plan.as_deref())?;
    let plan = grove_storage::load_plan(&root)?;

    if args.json {
        let view = PlanStatusView {
            root: root.display().to_string(),
            status: plan.config.status.to_string(),
            job_count: plan.len(),
        };
        println!("{}", serde_json::to_string_pretty(&view)?);
    } else {
        println!("Plan: {}", root.display());
        println!("Status: {}", plan.config.status);
        println!("{}", summary_line(&plan));
    }
    Ok(())
}
