// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The at-most-one-concurrent-run-per-job lock protocol: a pid+session
//! YAML sibling file next to the job's markdown file.
//! Acquisition fails only when the existing lock's pid is still alive;
//! a lock left behind by a crashed process is reclaimed silently by the
//! next run (staleness is still logged at the loader level so a user
//! inspecting a plan can see it happened).

use grove_core::lock::{lock_path_for, LockFile};
use grove_core::Error;
use nix::sys::signal::kill;
use nix::unistd::Pid;
use std::path::{Path, PathBuf};

/// True if a process with this pid currently exists. Signal `None` only
/// probes for existence; it never actually delivers a signal. `EPERM`
/// still means the process exists (it belongs to another user), so only
/// `ESRCH` counts as dead.
pub fn is_pid_alive(pid: u32) -> bool {
    match kill(Pid::from_raw(pid as i32), None) {
        Ok(()) => true,
        Err(nix::errno::Errno::ESRCH) => false,
        Err(_) => true,
    }
}

/// Reads a job's lock file, if any, without judging liveness.
pub fn read_lock(job_file: &Path) -> Result<Option<LockFile>, Error> {
    let path = lock_path_for(job_file);
    match std::fs::read_to_string(&path) {
        Ok(content) => {
            let lock: LockFile = serde_yaml::from_str(&content)
                .map_err(|e| Error::MalformedFrontMatter { path: path.clone(), detail: e.to_string() })?;
            Ok(Some(lock))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(Error::io(&path, e)),
    }
}

/// Holds a job's lock file for the duration of a run. Releases (deletes
/// the lock file) on drop, so a panic mid-run doesn't leave the job
/// permanently locked — the filesystem state, not an in-memory guard, is
/// what every other process checks.
pub struct LockGuard {
    path: PathBuf,
}

/// Bounds the reclaim-and-retry loop in [`LockGuard::acquire`] so a pair of
/// processes racing to reclaim the same dead-pid lock can't loop forever;
/// in practice one of them wins within the first couple of iterations.
const MAX_RECLAIM_ATTEMPTS: usize = 8;

impl LockGuard {
    /// Attempts to acquire the lock for `job_file` via `O_EXCL`-style
    /// exclusive create (`create_new`), the atomic OS-level primitive the
    /// spec's own "Lock exclusivity" property names — not a separate
    /// read-then-write, which would let two concurrent callers both
    /// observe no live lock and both "win". Fails with
    /// `Error::JobAlreadyRunning` only if an existing lock's pid is still
    /// alive; a dead-pid lock is reclaimed (removed, then the exclusive
    /// create retried) rather than left blocking forever.
    pub fn acquire(job_file: &Path, job_name: &str, pid: u32, session: &str) -> Result<Self, Error> {
        let path = lock_path_for(job_file);
        let lock = LockFile { pid, session: session.to_string() };
        let content = serde_yaml::to_string(&lock)
            .map_err(|e| Error::MalformedFrontMatter { path: path.clone(), detail: e.to_string() })?;

        for _ in 0..MAX_RECLAIM_ATTEMPTS {
            match std::fs::OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(mut file) => {
                    use std::io::Write;
                    file.write_all(content.as_bytes()).map_err(|e| Error::io(&path, e))?;
                    return Ok(Self { path });
                }
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                    match read_lock(job_file)? {
                        Some(existing) if is_pid_alive(existing.pid) => {
                            return Err(Error::JobAlreadyRunning { job: job_name.to_string() });
                        }
                        // Dead pid, or the lock file vanished/was unreadable between
                        // the failed create and this read: reclaim and retry the
                        // exclusive create rather than falling back to a racy write.
                        _ => {
                            let _ = std::fs::remove_file(&path);
                        }
                    }
                }
                Err(e) => return Err(Error::io(&path, e)),
            }
        }
        Err(Error::JobAlreadyRunning { job: job_name.to_string() })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Hands the lock off to whoever reclaims it later instead of releasing
    /// it when this guard is dropped. Used for `interactive_agent`/
    /// `headless_agent` jobs, which stay `running` past the end of the
    /// executor call that started them — the matching `complete` operation
    /// deletes the lock file directly.
    pub fn persist(self) {
        std::mem::forget(self);
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(path = %self.path.display(), error = %e, "failed to release lock file");
            }
        }
    }
}

#[cfg(test)]
#[path = "lock_tests.rs"]
mod tests;
