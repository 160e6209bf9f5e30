// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `grove init` — create a plan directory and its `.grove-plan.yml`.

use crate::context::Context;
use anyhow::{Context as _, Result};
use clap::Args;
use grove_core::PlanConfig;

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Name (or path) of the plan to create.
    pub name: String,

    /// Recipe to associate with this plan. Recorded in `.grove-plan.yml`;
    /// recipe expansion itself is an external collaborator and is not run
    /// by this build.
    #[arg(long)]
    pub recipe: Option<String>,

    /// Default git-worktree path newly added jobs inherit.
    #[arg(long)]
    pub worktree: Option<String>,

    /// Run the recipe's init actions after creating the plan.
    #[arg(long)]
    pub init: bool,
}

pub fn run(ctx: &Context, args: InitArgs) -> Result<()> {
    let root = ctx.plan_path(&args.name);
    std::fs::create_dir_all(&root).with_context(|| format!("creating plan directory {}", root.display()))?;

    let config_path = root.join(grove_core::PLAN_CONFIG_FILENAME);
    if config_path.exists() {
        println!("Plan already initialized at {}", root.display());
        return Ok(());
    }

    let config = PlanConfig { recipe: args.recipe.clone(), worktree: args.worktree.clone(), ..Default::default() };
    let yaml = serde_yaml::to_string(&config).context("serializing plan config")?;
    std::fs::write(&config_path, yaml).with_context(|| format!("writing {}", config_path.display()))?;

    println!("Initialized plan at {}", root.display());

    if args.init {
        if args.recipe.is_some() {
            tracing::warn!("recipe init actions are not implemented by this engine build; skipping");
        } else {
            tracing::warn!("--init has no effect without --recipe");
        }
    }

    Ok(())
}
