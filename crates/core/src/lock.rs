// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Lock file shape.
//!
//! The lock file itself — creation, liveness probing, removal — is an
//! adapter/executor concern (`grove-adapters::lock`, `grove-engine::executor`);
//! this module only owns the on-disk shape and its path, since both the
//! storage loader (stale-lock detection) and the engine executor (lock
//! lifecycle) need to agree on it.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Contents of a job's `.lock` sibling file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LockFile {
    pub pid: u32,
    pub session: String,
}

/// The lock file is a sibling of the job file, not under `.artifacts/`.
pub fn lock_path_for(job_file: &Path) -> PathBuf {
    let mut name = job_file.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".lock");
    job_file.with_file_name(name)
}
