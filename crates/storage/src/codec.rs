// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Front-matter codec.
//!
//! Parses a UTF-8 markdown file that begins with a `---` fence, a block of
//! YAML, a closing `---`, and a body. Round-trips unknown keys and body
//! bytes exactly. Files with no opening fence are treated as pure body with
//! empty front-matter; an opening fence with no closing one is an error.

use grove_core::Error;
use indexmap::IndexMap;
use std::path::Path;

const FENCE: &str = "---";

/// Parse `content` into `(front_matter, body)`.
///
/// The front-matter map preserves key order and raw YAML scalar/sequence
/// types; callers pull out recognized keys and leave the rest untouched.
pub fn parse_front_matter(
    path: &Path,
    content: &str,
) -> Result<(IndexMap<String, serde_yaml::Value>, String), Error> {
    let Some(after_open) = content.strip_prefix(FENCE) else {
        return Ok((IndexMap::new(), content.to_string()));
    };
    // The opening fence must be alone on its line (optionally followed by a
    // newline); anything else on that line means this wasn't a fence at all
    // and the whole file is body.
    let after_open = match after_open.strip_prefix('\n') {
        Some(rest) => rest,
        None if after_open.is_empty() => after_open,
        None => return Ok((IndexMap::new(), content.to_string())),
    };

    let closing = find_closing_fence(after_open).ok_or_else(|| Error::MalformedFrontMatter {
        path: path.to_path_buf(),
        detail: "opening `---` fence has no matching closing `---`".to_string(),
    })?;

    let yaml_block = &after_open[..closing.yaml_end];
    let body = after_open[closing.body_start..].to_string();

    let fields: IndexMap<String, serde_yaml::Value> = if yaml_block.trim().is_empty() {
        IndexMap::new()
    } else {
        serde_yaml::from_str(yaml_block).map_err(|e| Error::MalformedFrontMatter {
            path: path.to_path_buf(),
            detail: format!("invalid YAML in front matter: {e}"),
        })?
    };

    Ok((fields, body))
}

struct ClosingFence {
    yaml_end: usize,
    body_start: usize,
}

/// Find the `---` line that terminates the front-matter block, scanning
/// line-by-line so a `---` inside a YAML block scalar's *value* (unlikely,
/// but not ruled out) can't be confused with one — we only look at lines
/// that are exactly `---`.
fn find_closing_fence(rest: &str) -> Option<ClosingFence> {
    let mut offset = 0usize;
    for line in rest.split_inclusive('\n') {
        let trimmed = line.strip_suffix('\n').unwrap_or(line);
        if trimmed == FENCE {
            let yaml_end = offset;
            let body_start = offset + line.len();
            return Some(ClosingFence { yaml_end, body_start });
        }
        offset += line.len();
    }
    None
}

/// Render `(front_matter, body)` back into file content.
///
/// `front_matter` must already be in the caller's desired key order:
/// recognized keys in canonical order, then unknown keys as-is.
/// Empty front-matter produces a bare body with no fence.
pub fn serialize_front_matter(
    front_matter: &IndexMap<String, serde_yaml::Value>,
    body: &str,
) -> Result<String, Error> {
    if front_matter.is_empty() {
        return Ok(body.to_string());
    }
    let yaml = serde_yaml::to_string(front_matter).map_err(|e| Error::MalformedFrontMatter {
        path: std::path::PathBuf::new(),
        detail: format!("failed to serialize front matter: {e}"),
    })?;
    Ok(format!("{FENCE}\n{yaml}{FENCE}\n{body}"))
}

#[cfg(test)]
#[path = "codec_tests.rs"]
mod tests;
