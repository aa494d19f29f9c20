//! Cross-issue reference detection.
//!
//! Finds `#<number>` mentions in free text and classifies each by the
//! keyword closest to it, e.g. `fixes #12` or `blocked by #7`.

use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;
use triage_graph::{IssueRecord, ReferenceType};

/// Tokens inspected before a reference when classifying it.
const KEYWORD_WINDOW: usize = 3;

/// Characters of surrounding text kept on each side of a reference.
const CONTEXT_CHARS: usize = 30;

/// Characters before a reference scanned for keyword tokens.
const LOOKBEHIND_CHARS: usize = 120;

static REFERENCE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#(\d+)").expect("reference pattern is valid"));

static TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Za-z0-9]+").expect("token pattern is valid"));

/// One reference found in text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectedReference {
    pub target: u64,
    pub reference_type: ReferenceType,
    pub context: String,
}

/// Find every `#N` reference in `text`, in order of appearance.
///
/// A `#` preceded by a word character, `/` or `&` is skipped, so
/// `owner/repo#1`, `abc#2` and `&#39;` are not references. Neither is a
/// number running into letters (`#12ab`) or issue zero.
pub fn detect_references(text: &str) -> Vec<DetectedReference> {
    let mut found = Vec::new();

    for caps in REFERENCE_RE.captures_iter(text) {
        let Some(whole) = caps.get(0) else { continue };
        let (start, end) = (whole.start(), whole.end());

        if let Some(prev) = text[..start].chars().next_back() {
            if prev.is_alphanumeric() || prev == '_' || prev == '/' || prev == '&' {
                continue;
            }
        }
        if let Some(next) = text[end..].chars().next() {
            if next.is_alphanumeric() || next == '_' {
                continue;
            }
        }

        let target = match caps[1].parse::<u64>() {
            Ok(0) | Err(_) => continue,
            Ok(n) => n,
        };

        found.push(DetectedReference {
            target,
            reference_type: classify(&text[..start]),
            context: context_around(text, start, end),
        });
    }

    found
}

/// References from an issue's title, body and comments.
///
/// Self-references are dropped and repeated (target, type) pairs keep their
/// first occurrence.
pub fn detect_in_issue(issue: &IssueRecord) -> Vec<DetectedReference> {
    let mut seen = HashSet::new();
    issue
        .text_fragments()
        .flat_map(detect_references)
        .filter(|r| r.target != issue.number)
        .filter(|r| seen.insert((r.target, r.reference_type)))
        .collect()
}

/// Classify by the closest keyword among the last few tokens of `before`.
fn classify(before: &str) -> ReferenceType {
    let tail = tail_chars(before, LOOKBEHIND_CHARS);
    let tokens: Vec<String> = TOKEN_RE
        .find_iter(tail)
        .map(|m| m.as_str().to_lowercase())
        .collect();

    let window_start = tokens.len().saturating_sub(KEYWORD_WINDOW);
    for i in (window_start..tokens.len()).rev() {
        let previous = i.checked_sub(1).map(|p| tokens[p].as_str());
        match (previous, tokens[i].as_str()) {
            (_, "fix" | "fixes" | "fixed" | "resolve" | "resolves" | "resolved") => {
                return ReferenceType::Fixes;
            }
            (_, "close" | "closes" | "closed") => return ReferenceType::Closes,
            (_, "block" | "blocks") => return ReferenceType::Blocks,
            (Some("blocked"), "by") => return ReferenceType::BlockedBy,
            (Some("depends" | "depend"), "on") => return ReferenceType::BlockedBy,
            _ => {}
        }
    }

    ReferenceType::Mentions
}

fn context_around(text: &str, start: usize, end: usize) -> String {
    let before = tail_chars(&text[..start], CONTEXT_CHARS);
    let after_full = &text[end..];
    let after_end = after_full
        .char_indices()
        .nth(CONTEXT_CHARS)
        .map(|(i, _)| i)
        .unwrap_or(after_full.len());
    let after = &after_full[..after_end];

    let mut context = String::new();
    if before.len() < start {
        context.push_str("...");
    }
    context.push_str(before);
    context.push_str(&text[start..end]);
    context.push_str(after);
    if after_end < after_full.len() {
        context.push_str("...");
    }

    context.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// The last `n` characters of `text`.
fn tail_chars(text: &str, n: usize) -> &str {
    match text.char_indices().rev().nth(n.saturating_sub(1)) {
        Some((i, _)) if n > 0 => &text[i..],
        _ if n == 0 => "",
        _ => text,
    }
}
