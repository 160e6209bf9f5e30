// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Explicit execution context.
//!
//! Every operation takes a `Context` it owns explicitly, built once in
//! `main` from the process environment and CLI flags. It owns the project
//! root, the active-plan pointer, and the cancellation token every
//! long-running command wires to Ctrl-C — there is no other global state
//! in this binary.

use anyhow::{Context as _, Result};
use grove_storage::ActivePlanPointer;
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;

pub struct Context {
    pub project_root: PathBuf,
    pub pointer: ActivePlanPointer,
    pub cancel: CancellationToken,
}

impl Context {
    pub fn new() -> Result<Self> {
        let project_root = std::env::current_dir().context("could not determine current directory")?;
        let state_dir = grove_storage::plan_pointer::state_dir()?;
        Ok(Self {
            project_root,
            pointer: ActivePlanPointer::new(state_dir),
            cancel: CancellationToken::new(),
        })
    }

    /// Resolves the plan root a command should operate on, given the
    /// command's own explicit argument (if it has one) and/or the global
    /// `--plan` flag, using precedence: explicit argument > active-plan
    /// pointer > default plan (created lazily).
    pub fn resolve_plan(&self, explicit: Option<&str>) -> Result<PathBuf> {
        let explicit_path = explicit.map(|s| self.plan_path(s));
        Ok(grove_engine::resolve_plan_root(
            explicit_path.as_deref(),
            &self.pointer,
            &self.project_root,
        )?)
    }

    /// Resolves a user-supplied plan name/path against the project root:
    /// absolute paths are used as-is, relative ones are joined.
    pub fn plan_path(&self, name_or_path: &str) -> PathBuf {
        let p = Path::new(name_or_path);
        if p.is_absolute() {
            p.to_path_buf()
        } else {
            self.project_root.join(p)
        }
    }

    /// Installs a Ctrl-C handler that cancels this context's token exactly
    /// once. Safe to call once per process.
    pub fn install_ctrl_c_handler(&self) {
        let cancel = self.cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        });
    }
}
