// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Plan-level configuration: `.grove-plan.yml`.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Plan-level status, distinct from job status despite the overlapping
/// vocabulary — `review` and `hold` appear on both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanStatus {
    Pending,
    Hold,
    Review,
    Completed,
}

crate::simple_display! {
    PlanStatus {
        Pending => "pending",
        Hold => "hold",
        Review => "review",
        Completed => "completed",
    }
}

impl Default for PlanStatus {
    fn default() -> Self {
        PlanStatus::Pending
    }
}

impl FromStr for PlanStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "pending" => PlanStatus::Pending,
            "hold" => PlanStatus::Hold,
            "review" => PlanStatus::Review,
            "completed" => PlanStatus::Completed,
            _ => return Err(()),
        })
    }
}

/// `.grove-plan.yml`: defaults inherited by newly added jobs that don't set
/// the field themselves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanConfig {
    #[serde(default)]
    pub status: PlanStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub worktree: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prepend_dependencies: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipe: Option<String>,
}

impl Default for PlanConfig {
    fn default() -> Self {
        PlanConfig {
            status: PlanStatus::Pending,
            model: None,
            worktree: None,
            prepend_dependencies: None,
            recipe: None,
        }
    }
}

/// The config file's canonical on-disk name, sibling to the job files.
pub const PLAN_CONFIG_FILENAME: &str = ".grove-plan.yml";

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
