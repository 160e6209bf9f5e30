// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Dependency references: string-based references from one job to
//! another.
//!
//! A job may name a dependency either by filename (`02-build.md`) or by id
//! (`build-x7a1`); the codec must preserve whichever form the user wrote
//! across rewrites rather than normalizing to one. [`DepRef`] models this as
//! a sum type instead of a bare `String` so the variant survives the
//! round-trip.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A reference to another job in the same plan, tagged with the form the
/// user wrote it in.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DepRef {
    ByFilename(String),
    ById(String),
}

impl DepRef {
    /// Classify a raw front-matter string. Job filenames always end in
    /// `.md`; ids never do (the id format is `slug-xxxx`). This is the
    /// only signal available at parse time and it is exact for both
    /// reference shapes the codec accepts.
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        if raw.ends_with(".md") {
            DepRef::ByFilename(raw)
        } else {
            DepRef::ById(raw)
        }
    }

    /// The original text, exactly as written.
    pub fn as_str(&self) -> &str {
        match self {
            DepRef::ByFilename(s) | DepRef::ById(s) => s,
        }
    }
}

impl fmt::Display for DepRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for DepRef {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for DepRef {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(DepRef::new(s))
    }
}

#[cfg(test)]
#[path = "depref_tests.rs"]
mod tests;
