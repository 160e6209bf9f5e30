// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `grove graph [-f ascii]` — render the dependency DAG.

use crate::context::Context;
use anyhow::Result;
use clap::{Args, ValueEnum};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum GraphFormat {
    #[default]
    Ascii,
}

#[derive(Args, Debug)]
pub struct GraphArgs {
    /// Plan to graph. Defaults to the resolved current/default plan.
    pub plan: Option<String>,

    #[arg(short = 'f', long, value_enum, default_value_t = GraphFormat::Ascii)]
    pub format: GraphFormat,
}

pub fn run(ctx: &Context, args: GraphArgs) -> Result<()> {
    let root = ctx.resolve_plan(args.plan.as_deref())?;
    let plan = grove_storage::load_plan(&root)?;

    if plan.is_empty() {
        println!("(empty plan)");
        return Ok(());
    }

    for job in plan.jobs_in_order() {
        let deps = if job.depends_on.is_empty() {
            "(none)".to_string()
        } else {
            job.depends_on.iter().map(|d| d.as_str()).collect::<Vec<_>>().join(", ")
        };
        println!("{} [{}] <- {}", job.filename, job.status, deps);
    }
    Ok(())
}
