// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `grove jobs rename` / `grove jobs update-deps` — structural edits.

use crate::context::Context;
use anyhow::Result;
use clap::{Args, Subcommand};
use grove_core::DepRef;
use grove_storage::PlanHandle;

#[derive(Args, Debug)]
pub struct JobsArgs {
    #[command(subcommand)]
    pub command: JobsCommand,
}

#[derive(Subcommand, Debug)]
pub enum JobsCommand {
    /// Rename a job, cascading dependency-reference rewrites.
    Rename {
        /// The job to rename (filename or id).
        job: String,
        /// The new title.
        new_title: String,
    },
    /// Replace a job's dependency list.
    UpdateDeps {
        /// The job to update (filename or id).
        job: String,
        /// New dependency references (filename or id), replacing the
        /// existing list.
        deps: Vec<String>,
    },
}

pub fn run(ctx: &Context, args: JobsArgs) -> Result<()> {
    let root = ctx.resolve_plan(None)?;
    let mut plan = grove_storage::load_plan(&root)?;
    let handle = PlanHandle::new(&root);

    match args.command {
        JobsCommand::Rename { job, new_title } => {
            let reference = DepRef::new(job);
            handle.rename(&mut plan, &reference, &new_title)?;
            println!("Renamed to {new_title:?}");
        }
        JobsCommand::UpdateDeps { job, deps } => {
            let reference = DepRef::new(job);
            let new_deps: Vec<DepRef> = deps.into_iter().map(DepRef::new).collect();
            handle.update_deps(&mut plan, &reference, new_deps)?;
            println!("Dependencies updated.");
        }
    }
    Ok(())
}
