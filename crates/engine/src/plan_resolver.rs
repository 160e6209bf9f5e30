// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Rolling/default plan resolution. Both names exist in common usage for
//! this kind of unqualified-command target; `default` is the one name
//! this implementation uses everywhere.
//!
//! Precedence: explicit CLI argument > active-plan pointer > default plan,
//! created lazily on first use. Creation — not every selection — is what
//! triggers the one-time stderr advisory.

use grove_core::Error;
use grove_storage::ActivePlanPointer;
use std::path::{Path, PathBuf};

/// The canonical name for the plan used when nothing else names one.
pub const DEFAULT_PLAN_NAME: &str = "default";

/// Resolves the plan root an unqualified command should operate on.
///
/// Returns the resolved path. A plan directory created by this call (as
/// opposed to one that already existed) prints the advisory line to
/// stderr exactly once.
pub fn resolve_plan_root(
    explicit: Option<&Path>,
    pointer: &ActivePlanPointer,
    project_root: &Path,
) -> Result<PathBuf, Error> {
    if let Some(explicit) = explicit {
        return Ok(explicit.to_path_buf());
    }
    if let Some(active) = pointer.load()? {
        return Ok(active);
    }

    let default_root = project_root.join(DEFAULT_PLAN_NAME);
    if !default_root.exists() {
        std::fs::create_dir_all(&default_root).map_err(|e| Error::io(&default_root, e))?;
        eprintln!("No active plan set. Using default plan at: {}", default_root.display());
    }
    Ok(default_root)
}

#[cfg(test)]
#[path = "plan_resolver_tests.rs"]
mod tests;
