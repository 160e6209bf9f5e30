// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The active-plan pointer: a user-scoped state file naming which plan
//! unqualified commands operate on. Deliberately separate from the
//! lazily-created default/rolling plan — creating the default plan
//! never writes this pointer.

use grove_core::Error;
use std::path::{Path, PathBuf};

/// `GROVE_STATE_DIR` > `dirs::state_dir()` > `dirs::home_dir()/.local/state/grove`.
pub fn state_dir() -> Result<PathBuf, Error> {
    if let Ok(dir) = std::env::var("GROVE_STATE_DIR") {
        return Ok(PathBuf::from(dir));
    }
    dirs::state_dir()
        .or_else(|| dirs::home_dir().map(|h| h.join(".local/state")))
        .map(|p| p.join("grove"))
        .ok_or_else(|| Error::Io {
            path: PathBuf::from("~"),
            detail: "could not determine home directory".to_string(),
        })
}

/// Reads and writes `<state_dir>/active-plan`: a single line containing the
/// absolute path of the plan unqualified commands should target.
#[derive(Debug, Clone)]
pub struct ActivePlanPointer {
    path: PathBuf,
}

impl ActivePlanPointer {
    pub fn new(state_dir: impl Into<PathBuf>) -> Self {
        Self { path: state_dir.into().join("active-plan") }
    }

    pub fn load(&self) -> Result<Option<PathBuf>, Error> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) => {
                let trimmed = content.trim();
                if trimmed.is_empty() {
                    Ok(None)
                } else {
                    Ok(Some(PathBuf::from(trimmed)))
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Error::io(&self.path, e)),
        }
    }

    pub fn set(&self, plan_root: &Path) -> Result<(), Error> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }
        let absolute = plan_root.canonicalize().unwrap_or_else(|_| plan_root.to_path_buf());
        crate::fs_atomic::write_atomic(&self.path, &format!("{}\n", absolute.display()))
    }

    pub fn unset(&self) -> Result<(), Error> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::io(&self.path, e)),
        }
    }
}

#[cfg(test)]
#[path = "plan_pointer_tests.rs"]
mod tests;
