// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Slugify job titles into filename and id components.

const STOP_WORDS: &[&str] = &[
    "the", "a", "an", "is", "are", "was", "were", "be", "been", "being", "have", "has", "had",
    "do", "does", "did", "will", "would", "shall", "should", "may", "might", "must", "can",
    "could", "to", "of", "in", "for", "on", "with", "at", "by", "from", "as", "into", "through",
    "during", "before", "after", "above", "below", "between", "out", "off", "over", "under",
    "again", "further", "then", "once", "that", "this", "these", "those", "and", "but", "or",
    "nor", "not", "so", "yet", "both", "each", "every", "all", "any", "few", "more", "most",
    "other", "some", "such", "no", "only", "own", "same", "than", "too", "very", "just", "about",
    "also", "its", "it", "we", "our",
];

/// Slugify a string for use as a job filename/id component.
///
/// Lowercases, replaces runs of non-alphanumeric characters with a single
/// hyphen, drops stop words, collapses consecutive duplicate words, and
/// truncates to `max_len` characters on a word boundary.
pub fn slugify(input: &str, max_len: usize) -> String {
    let lower = input.to_lowercase();

    let mut slug = String::with_capacity(lower.len());
    let mut last_was_hyphen = false;
    for ch in lower.chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch);
            last_was_hyphen = false;
        } else if !last_was_hyphen {
            slug.push('-');
            last_was_hyphen = true;
        }
    }

    let mut filtered: Vec<&str> = Vec::new();
    for word in slug.split('-') {
        if word.is_empty() || STOP_WORDS.contains(&word) {
            continue;
        }
        if filtered.last() != Some(&word) {
            filtered.push(word);
        }
    }
    let mut result = filtered.join("-");

    let trimmed = result.trim_matches('-');
    if trimmed.len() != result.len() {
        result = trimmed.to_string();
    }

    if result.len() > max_len {
        if let Some(pos) = result[..max_len].rfind('-') {
            result.truncate(pos);
        } else {
            result.truncate(max_len);
        }
    }

    let trimmed = result.trim_end_matches('-');
    if trimmed.len() != result.len() {
        result = trimmed.to_string();
    }

    if result.is_empty() {
        "job".to_string()
    } else {
        result
    }
}

/// Maximum length of the slug portion of a job filename: truncated to a
/// reasonable cap around 80 chars.
pub const MAX_FILENAME_SLUG_LEN: usize = 80;

/// Build a job filename from a zero-padded ordinal and a title.
///
/// `NN-<slug>.md`, e.g. `02-build-artifacts.md`.
pub fn job_filename(ordinal: u32, title: &str) -> String {
    let slug = slugify(title, MAX_FILENAME_SLUG_LEN);
    format!("{:02}-{}.md", ordinal, slug)
}

#[cfg(test)]
#[path = "slug_tests.rs"]
mod tests;
