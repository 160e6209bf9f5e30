// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Briefing XML: the artifact written immediately before an
//! `interactive_agent`/`headless_agent` job transitions to `running`.
//! Hand-rolled string building rather than an XML crate — the shape is
//! fixed and small (three optional sections), and escaping is the only
//! thing that needs to be correct.

/// Renders one briefing document. `context` is the concatenated bodies of
/// the job's dependencies per the prepend-dependencies policy;
/// `generated_plan` is the inlined content of a prior generated-plan
/// sub-phase, present only when `generate_plan_from` is set.
pub fn render(prompt: &str, context: &str, generated_plan: Option<&str>) -> String {
    let mut xml = String::new();
    xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    xml.push_str("<briefing>\n");
    xml.push_str("  <prompt>");
    xml.push_str(&escape(prompt));
    xml.push_str("</prompt>\n");
    xml.push_str("  <context>");
    xml.push_str(&escape(context));
    xml.push_str("</context>\n");
    if let Some(plan) = generated_plan {
        xml.push_str("  <generated_plan>");
        xml.push_str(&escape(plan));
        xml.push_str("</generated_plan>\n");
    }
    xml.push_str("</briefing>\n");
    xml
}

/// Concatenates dependency bodies in filename order, the shape `<context>`
/// takes when `prepend_dependencies` or `prompt_source` applies.
pub fn join_dependency_bodies(bodies: &[&str]) -> String {
    bodies.join("\n\n")
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

#[cfg(test)]
#[path = "briefing_tests.rs"]
mod tests;
