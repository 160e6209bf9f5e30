// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The error taxonomy shared by every `grove-*` crate.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised anywhere in the orchestration engine.
#[derive(Debug, Error)]
pub enum Error {
    #[error("{path}: malformed front matter: {detail}")]
    MalformedFrontMatter { path: PathBuf, detail: String },

    #[error("job {job}: dependency {reference:?} does not resolve to any job in this plan")]
    UnresolvedDependency { job: String, reference: String },

    #[error("dependency cycle detected: {}", path.join(" -> "))]
    DependencyCycle { path: Vec<String> },

    #[error("no job matches {reference:?}")]
    JobNotFound { reference: String },

    #[error("job {job} is already running (lock held by a live process)")]
    JobAlreadyRunning { job: String },

    #[error("job {job} is not runnable: {reason}")]
    JobNotRunnable { job: String, reason: String },

    #[error("provider error for job {job}: {detail}")]
    ProviderError { job: String, detail: String },

    #[error("cancelled by user")]
    Cancelled,

    #[error("{path}: {detail}")]
    Io { path: PathBuf, detail: String },
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        Error::Io { path: path.into(), detail: err.to_string() }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
