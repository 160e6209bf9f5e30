// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The job entity and its front-matter round-trip.

use crate::depref::DepRef;
use crate::error::Error;
use crate::id::JobId;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// The closed set of job kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobType {
    Shell,
    Oneshot,
    Chat,
    InteractiveAgent,
    HeadlessAgent,
    GenerateRecipe,
    File,
}

crate::simple_display! {
    JobType {
        Shell => "shell",
        Oneshot => "oneshot",
        Chat => "chat",
        InteractiveAgent => "interactive_agent",
        HeadlessAgent => "headless_agent",
        GenerateRecipe => "generate_recipe",
        File => "file",
    }
}

impl JobType {
    /// Whether this job type's lifecycle is driven by an external actor
    /// rather than running to completion unattended.
    pub fn is_interactive(&self) -> bool {
        matches!(self, JobType::InteractiveAgent | JobType::HeadlessAgent)
    }
}

impl FromStr for JobType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "shell" => JobType::Shell,
            "oneshot" => JobType::Oneshot,
            "chat" => JobType::Chat,
            "interactive_agent" => JobType::InteractiveAgent,
            "headless_agent" => JobType::HeadlessAgent,
            "generate_recipe" => JobType::GenerateRecipe,
            "file" => JobType::File,
            _ => return Err(()),
        })
    }
}

/// The closed set of job statuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    Todo,
    Hold,
    PendingUser,
    Running,
    Completed,
    Failed,
    Abandoned,
    Review,
}

crate::simple_display! {
    JobStatus {
        Pending => "pending",
        Todo => "todo",
        Hold => "hold",
        PendingUser => "pending_user",
        Running => "running",
        Completed => "completed",
        Failed => "failed",
        Abandoned => "abandoned",
        Review => "review",
    }
}

impl JobStatus {
    /// A dependency in this status satisfies dependents: completed work
    /// counts, and an abandoned dependency is treated as satisfied rather
    /// than as a permanent block.
    pub fn satisfies_dependents(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Abandoned)
    }

    /// A job in this status is eligible to be picked up by the readiness
    /// resolver.
    pub fn is_startable(&self) -> bool {
        matches!(self, JobStatus::Pending | JobStatus::Todo)
    }
}

impl FromStr for JobStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "pending" => JobStatus::Pending,
            "todo" => JobStatus::Todo,
            "hold" => JobStatus::Hold,
            "pending_user" => JobStatus::PendingUser,
            "running" => JobStatus::Running,
            "completed" => JobStatus::Completed,
            "failed" => JobStatus::Failed,
            "abandoned" => JobStatus::Abandoned,
            "review" => JobStatus::Review,
            _ => return Err(()),
        })
    }
}

/// Recognized front-matter keys, in the canonical order mandated on
/// serialization.
pub const RECOGNIZED_KEY_ORDER: &[&str] = &[
    "id",
    "title",
    "type",
    "status",
    "depends_on",
    "prompt_source",
    "template",
    "model",
    "worktree",
    "provider",
    "prepend_dependencies",
    "generate_plan_from",
    "gather_concept_notes",
    "gather_concept_plans",
];

/// One node in a plan's dependency DAG.
///
/// `filename` is the on-disk name (`NN-slug.md`); it is not itself a
/// front-matter field, it's how the job was addressed when loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    #[serde(skip)]
    pub filename: String,
    pub id: JobId,
    pub title: String,
    #[serde(rename = "type")]
    pub job_type: JobType,
    pub status: JobStatus,
    #[serde(default)]
    pub depends_on: Vec<DepRef>,
    #[serde(default)]
    pub prompt_source: Vec<DepRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub worktree: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prepend_dependencies: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generate_plan_from: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gather_concept_notes: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gather_concept_plans: Option<bool>,
    /// The markdown body after the front-matter fence, preserved verbatim
    /// across rewrites modulo the status-transition annotation rules.
    #[serde(skip)]
    pub prompt_body: String,
    /// Unrecognized front-matter fields, kept in their original insertion
    /// order so they round-trip byte-for-byte in value (spec invariant 7).
    #[serde(skip)]
    pub extra: IndexMap<String, serde_yaml::Value>,
}

impl Job {
    /// `is_runnable()` — status permits execution, type isn't
    /// `file`, and every dependency is satisfied. Callers must supply a
    /// lookup so this stays a pure function of already-resolved statuses;
    /// the plan is what owns dependency resolution.
    pub fn is_runnable(&self, dep_status: impl Fn(&DepRef) -> Option<JobStatus>) -> bool {
        if self.job_type == JobType::File {
            return false;
        }
        if !self.status.is_startable() {
            return false;
        }
        self.depends_on.iter().all(|dep| match dep_status(dep) {
            Some(status) => status.satisfies_dependents(),
            None => false,
        })
    }

    /// Convert parsed front-matter + body into a `Job`.
    pub fn from_front_matter(
        filename: String,
        mut fields: IndexMap<String, serde_yaml::Value>,
        body: String,
    ) -> Result<Job, Error> {
        let path_hint = filename.clone();
        let take_string = |fields: &mut IndexMap<String, serde_yaml::Value>, key: &str| {
            fields.shift_remove(key).and_then(|v| v.as_str().map(str::to_string))
        };
        let take_bool = |fields: &mut IndexMap<String, serde_yaml::Value>, key: &str| {
            fields.shift_remove(key).and_then(|v| v.as_bool())
        };
        let take_list = |fields: &mut IndexMap<String, serde_yaml::Value>, key: &str| -> Vec<DepRef> {
            match fields.shift_remove(key) {
                Some(serde_yaml::Value::Sequence(seq)) => seq
                    .into_iter()
                    .filter_map(|v| v.as_str().map(|s| DepRef::new(s.to_string())))
                    .collect(),
                _ => Vec::new(),
            }
        };

        let id = take_string(&mut fields, "id").map(JobId::from_string);
        let title = take_string(&mut fields, "title").unwrap_or_default();
        let job_type = take_string(&mut fields, "type")
            .and_then(|s| JobType::from_str(&s).ok())
            .ok_or_else(|| Error::MalformedFrontMatter {
                path: path_hint.clone().into(),
                detail: "missing or invalid `type`".to_string(),
            })?;
        let status = take_string(&mut fields, "status")
            .and_then(|s| JobStatus::from_str(&s).ok())
            .unwrap_or(JobStatus::Pending);
        let depends_on = take_list(&mut fields, "depends_on");
        let prompt_source = take_list(&mut fields, "prompt_source");
        let template = take_string(&mut fields, "template");
        let model = take_string(&mut fields, "model");
        let worktree = take_string(&mut fields, "worktree");
        let provider = take_string(&mut fields, "provider");
        let prepend_dependencies = take_bool(&mut fields, "prepend_dependencies");
        let generate_plan_from = take_bool(&mut fields, "generate_plan_from");
        let gather_concept_notes = take_bool(&mut fields, "gather_concept_notes");
        let gather_concept_plans = take_bool(&mut fields, "gather_concept_plans");

        // Whatever is left in `fields` is opaque and must round-trip.
        let extra = fields;

        let slug = filename
            .strip_suffix(".md")
            .and_then(|s| s.splitn(2, '-').nth(1))
            .unwrap_or(&filename);
        let id = id.unwrap_or_else(|| JobId::derive(slug));

        Ok(Job {
            filename,
            id,
            title,
            job_type,
            status,
            depends_on,
            prompt_source,
            template,
            model,
            worktree,
            provider,
            prepend_dependencies,
            generate_plan_from,
            gather_concept_notes,
            gather_concept_plans,
            prompt_body: body,
            extra,
        })
    }

    /// Render this job's front-matter back into an ordered map: recognized
    /// keys first in canonical order, then unknown keys in their original
    /// order. Absent optional keys are omitted; empty lists serialize as
    /// `[]`.
    pub fn to_front_matter(&self) -> IndexMap<String, serde_yaml::Value> {
        let mut out = IndexMap::new();
        out.insert("id".to_string(), serde_yaml::Value::String(self.id.as_str().to_string()));
        out.insert("title".to_string(), serde_yaml::Value::String(self.title.clone()));
        out.insert("type".to_string(), serde_yaml::Value::String(self.job_type.to_string()));
        out.insert("status".to_string(), serde_yaml::Value::String(self.status.to_string()));
        out.insert(
            "depends_on".to_string(),
            serde_yaml::Value::Sequence(
                self.depends_on.iter().map(|d| serde_yaml::Value::String(d.as_str().to_string())).collect(),
            ),
        );
        out.insert(
            "prompt_source".to_string(),
            serde_yaml::Value::Sequence(
                self.prompt_source.iter().map(|d| serde_yaml::Value::String(d.as_str().to_string())).collect(),
            ),
        );
        if let Some(v) = &self.template {
            out.insert("template".to_string(), serde_yaml::Value::String(v.clone()));
        }
        if let Some(v) = &self.model {
            out.insert("model".to_string(), serde_yaml::Value::String(v.clone()));
        }
        if let Some(v) = &self.worktree {
            out.insert("worktree".to_string(), serde_yaml::Value::String(v.clone()));
        }
        if let Some(v) = &self.provider {
            out.insert("provider".to_string(), serde_yaml::Value::String(v.clone()));
        }
        if let Some(v) = self.prepend_dependencies {
            out.insert("prepend_dependencies".to_string(), serde_yaml::Value::Bool(v));
        }
        if let Some(v) = self.generate_plan_from {
            out.insert("generate_plan_from".to_string(), serde_yaml::Value::Bool(v));
        }
        if let Some(v) = self.gather_concept_notes {
            out.insert("gather_concept_notes".to_string(), serde_yaml::Value::Bool(v));
        }
        if let Some(v) = self.gather_concept_plans {
            out.insert("gather_concept_plans".to_string(), serde_yaml::Value::Bool(v));
        }
        for (k, v) in &self.extra {
            out.insert(k.clone(), v.clone());
        }
        out
    }

    /// Whether a dependency reference (by filename or id) matches this job.
    pub fn matches_ref(&self, reference: &DepRef) -> bool {
        reference.as_str() == self.filename || reference.as_str() == self.id.as_str()
    }
}

#[cfg(any(test, feature = "test-support"))]
crate::builder! {
    pub struct JobBuilder => Job {
        into {
            filename: String = "01-setup.md",
            title: String = "Setup",
        }
        set {
            job_type: JobType = JobType::Shell,
            status: JobStatus = JobStatus::Pending,
            depends_on: Vec<DepRef> = Vec::new(),
            prompt_source: Vec<DepRef> = Vec::new(),
            prompt_body: String = String::new(),
            extra: IndexMap<String, serde_yaml::Value> = IndexMap::new(),
        }
        option {
            template: String = None,
            model: String = None,
            worktree: String = None,
            provider: String = None,
            prepend_dependencies: bool = None,
            generate_plan_from: bool = None,
            gather_concept_notes: bool = None,
            gather_concept_plans: bool = None,
        }
        computed {
            id: JobId = JobId::derive("setup"),
        }
    }
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
