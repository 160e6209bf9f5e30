// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `grove set` / `unset` / `current` — the active-plan pointer.

use crate::context::Context;
use anyhow::Result;
use clap::Args;

#[derive(Args, Debug)]
pub struct SetArgs {
    /// Plan to make active.
    pub plan: String,
}

pub fn set(ctx: &Context, args: SetArgs) -> Result<()> {
    let root = ctx.plan_path(&args.plan);
    std::fs::create_dir_all(&root)?;
    ctx.pointer.set(&root)?;
    println!("Active plan set to {}", root.display());
    Ok(())
}

pub fn unset(ctx: &Context) -> Result<()> {
    ctx.pointer.unset()?;
    println!("Active plan unset");
    Ok(())
}

pub fn current(ctx: &Context) -> Result<()> {
    match ctx.pointer.load()? {
        Some(path) => println!("{}", path.display()),
        None => println!("No active plan set"),
    }
    Ok(())
}
