// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `grove list` — read-only job listing, with an optional `--json` form.

use crate::commands::shared::{summary_line, JobRow};
use crate::context::Context;
use crate::output::{handle_list, OutputFormat};
use anyhow::Result;
use clap::Args;

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Plan to list. Defaults to the resolved current/default plan.
    pub plan: Option<String>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

pub fn run(ctx: &Context, args: ListArgs) -> Result<()> {
    let root = ctx.resolve_plan(args.plan.as_deref())?;
    let plan = grove_storage::load_plan(&root)?;
    let rows: Vec<JobRow> = plan.jobs_in_order().iter().map(JobRow::from).collect();

    handle_list(args.format, &rows, "No jobs in this plan.", |rows| {
        for row in rows {
            println!("{:<28} {:<10} {:<10} {}", row.filename, row.r#type, row.status, row.title);
        }
        println!("\n{}", summary_line(&plan));
    })
}
