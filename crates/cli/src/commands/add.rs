// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `grove add` — materialize a new job file in a plan.

use crate::context::Context;
use crate::exit_error::ExitError;
use anyhow::Result;
use clap::Args;
use grove_core::{DepRef, Job, JobId, JobStatus, JobType};
use grove_storage::PlanHandle;
use std::str::FromStr;

#[derive(Args, Debug)]
#[command(group(clap::ArgGroup::new("source").required(true).args(["job_type", "template", "recipe"])))]
pub struct AddArgs {
    /// Plan to add the job to.
    pub plan: String,

    /// Job type (one of the closed set `JobType` defines).
    #[arg(long = "type")]
    pub job_type: Option<String>,

    /// Named template to expand from — template expansion is an external
    /// collaborator; the job is created as `oneshot` with `template`
    /// recorded for that collaborator to act on later.
    #[arg(long)]
    pub template: Option<String>,

    /// Named recipe to expand from — recipe expansion is out of scope for
    /// this engine; rejected with a clear error.
    #[arg(long)]
    pub recipe: Option<String>,

    /// Job title.
    #[arg(long, short = 't', required = true)]
    pub title: String,

    /// Inline prompt body.
    #[arg(short = 'p', long)]
    pub prompt: Option<String>,

    /// Comma-separated dependency references (filename or id).
    #[arg(short = 'd', long = "dep", value_delimiter = ',')]
    pub deps: Vec<String>,
}

pub fn run(ctx: &Context, args: AddArgs) -> Result<()> {
    if args.recipe.is_some() {
        return Err(ExitError::new(
            1,
            "recipe expansion is not implemented by this engine; add jobs individually with --type",
        )
        .into());
    }

    let root = ctx.plan_path(&args.plan);
    let mut plan = grove_storage::load_plan(&root)?;

    let job_type = if let Some(t) = &args.job_type {
        JobType::from_str(t).map_err(|()| ExitError::new(1, format!("unknown job type {t:?}")))?
    } else {
        JobType::Oneshot
    };

    for dep in &args.deps {
        if plan.find(&DepRef::new(dep.clone())).is_none() {
            return Err(ExitError::new(1, format!("dependency {dep:?} does not resolve to any job in this plan")).into());
        }
    }

    let status = match job_type {
        JobType::File => JobStatus::Completed,
        JobType::Chat => JobStatus::PendingUser,
        _ => JobStatus::Pending,
    };

    let ordinal = plan.next_ordinal();
    let filename = grove_core::job_filename(ordinal, &args.title);
    let slug = grove_core::slugify(&args.title, grove_core::MAX_FILENAME_SLUG_LEN);
    let id = JobId::derive(&slug);

    let (model, worktree, prepend_dependencies) = if job_type == JobType::Oneshot {
        (plan.config.model.clone(), plan.config.worktree.clone(), plan.config.prepend_dependencies)
    } else {
        (None, None, None)
    };

    let job = Job {
        filename,
        id,
        title: args.title.clone(),
        job_type,
        status,
        depends_on: args.deps.iter().map(|d| DepRef::new(d.clone())).collect(),
        prompt_source: Vec::new(),
        template: args.template.clone(),
        model,
        worktree,
        provider: None,
        prepend_dependencies,
        generate_plan_from: None,
        gather_concept_notes: None,
        gather_concept_plans: None,
        prompt_body: args.prompt.clone().unwrap_or_default(),
        extra: Default::default(),
    };

    let handle = PlanHandle::new(&root);
    let filename = job.filename.clone();
    handle.create_job(&mut plan, job)?;

    println!("Added job {filename}");
    Ok(())
}
