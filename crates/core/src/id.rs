// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job identifiers.
//!
//! Unlike a typical service-side entity ID, a [`JobId`] is not random: it is
//! derived once from the job's slug plus a short stable hash, and never
//! changes again for the lifetime of the job file — derived from the
//! title when first created, stable thereafter. Deriving it from the slug
//! (rather than e.g. the creation timestamp) keeps [`JobId::derive`]
//! deterministic, which the plan loader relies on: loading the same plan
//! twice must synthesize the same id for a job missing one.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::borrow::Borrow;
use std::fmt;

/// Stable job identifier, e.g. `build-x7a1`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(String);

impl JobId {
    /// Wrap an existing id string (parsed from front-matter).
    pub fn from_string(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Derive a stable id from a job's slug.
    ///
    /// Format is `{slug}-{4 hex chars}`, where the suffix is the first four
    /// hex characters of `sha256("grove-job:" + slug)`. Deterministic: the
    /// same slug always yields the same id, so re-synthesizing an id for a
    /// job that lost its front-matter `id` field on a prior crash is
    /// idempotent across loads.
    pub fn derive(slug: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(b"grove-job:");
        hasher.update(slug.as_bytes());
        let digest = hasher.finalize();
        let suffix = format!("{:02x}{:02x}", digest[0], digest[1]);
        Self(format!("{slug}-{suffix}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for JobId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for JobId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl AsRef<str> for JobId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for JobId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for JobId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
