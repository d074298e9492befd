//! Commit message generation from `git status --porcelain` output.

use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

use crate::storage::GLOBAL_DIR;

/// One line of porcelain status output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangeRecord {
    /// Two-letter status code, e.g. `M`, `??`, `D`.
    pub status: String,
    /// Path relative to the backup root.
    pub path: String,
}

/// What a batch of changes touched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangeSummary {
    pub changes: Vec<ChangeRecord>,
    pub namespaces: Vec<String>,
    pub kinds: Vec<String>,
    pub message: String,
}

fn status_line_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(?P<status>.+?)\s+(?P<file>.+)$").expect("valid regex"))
}

/// Parses one status line. Quotes are stripped and, for renames, the new
/// path is kept.
pub fn parse_status_line(line: &str, prefix: Option<&str>) -> Option<ChangeRecord> {
    let line = line.trim().replace('"', "");
    let captures = status_line_regex().captures(&line)?;

    let mut file = captures["file"].to_string();
    if let Some((_, renamed_to)) = file.split_once(" -> ") {
        file = renamed_to.to_string();
    }
    if let Some(prefix) = prefix {
        if let Some(stripped) = file.strip_prefix(prefix) {
            file = stripped.to_string();
        }
    }

    Some(ChangeRecord {
        status: captures["status"].to_string(),
        path: file,
    })
}

/// Normalizes a configured prefix to `dir/`, or `None` for the repo root.
fn normalize_prefix(prefix: Option<&str>) -> Option<String> {
    let prefix = prefix?.trim().trim_end_matches('/');
    let prefix = prefix.strip_prefix("./").unwrap_or(prefix);
    if prefix.is_empty() || prefix == "." {
        None
    } else {
        Some(format!("{}/", prefix))
    }
}

/// Summarizes porcelain output into namespaces, kinds and a one-line commit
/// message. Returns `None` when there is nothing to commit.
pub fn summarize(status_output: &str, prefix: Option<&str>) -> Option<ChangeSummary> {
    let prefix = normalize_prefix(prefix);

    let changes: Vec<ChangeRecord> = status_output
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| parse_status_line(line, prefix.as_deref()))
        .collect();

    if changes.is_empty() {
        return None;
    }

    let mut namespaces: Vec<String> = Vec::new();
    let mut kinds: Vec<String> = Vec::new();

    for change in &changes {
        let trimmed = change.path.strip_suffix(".yaml").unwrap_or(&change.path);
        let mut parts = trimmed.split('/');

        if let Some(first) = parts.next() {
            if first != GLOBAL_DIR && !namespaces.iter().any(|ns| ns == first) {
                namespaces.push(first.to_string());
            }
        }
        if let Some(kind) = parts.next() {
            if !kinds.iter().any(|k| k == kind) {
                kinds.push(kind.to_string());
            }
        }
    }

    let message = commit_message(&kinds, &namespaces, changes.len());

    Some(ChangeSummary {
        changes,
        namespaces,
        kinds,
        message,
    })
}

/// `Updated <kinds> in namespace(s) <namespaces>. <N> item(s)`
pub fn commit_message(kinds: &[String], namespaces: &[String], items: usize) -> String {
    let mut parts = vec!["Updated".to_string()];

    if !kinds.is_empty() {
        parts.push(kinds.join(", "));
    }
    if !namespaces.is_empty() {
        parts.push(format!(
            "in namespace{} {}.",
            if namespaces.len() > 1 { "s" } else { "" },
            namespaces.join(", ")
        ));
    }
    parts.push(format!("{} item{}", items, if items > 1 { "s" } else { "" }));

    parts.join(" ")
}
