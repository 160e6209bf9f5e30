// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `grove action <name> <plan>` — recipe actions (recipe expansion,
//! templated multi-job generation) are out of scope for this engine.
//! This command exists so the subcommand resolves to a clear, actionable
//! error rather than "unknown subcommand", pointing at the external
//! collaborator that owns recipes.

use crate::exit_error::ExitError;
use anyhow::Result;
use clap::Args;

#[derive(Args, Debug)]
pub struct ActionArgs {
    /// The recipe action to invoke.
    pub name: String,
    /// Plan to act on.
    pub plan: String,
}

pub fn run(args: ActionArgs) -> Result<()> {
    Err(ExitError::new(
        1,
        format!(
            "action {:?} is not implemented by this engine; recipe actions are expanded by an \
             external collaborator and land as jobs added with `grove add --type ...` (plan {:?})",
            args.name, args.plan
        ),
    )
    .into())
}
