//! Finding and snippet extraction from analyzer output.
//!
//! Analyzer reports reference issues as `path/to/file.py:42:`. This module
//! parses those references, resolves them against the project tree, and
//! cuts +-5 lines of context for the model prompt.

use std::path::{Path, PathBuf};

use regex::Regex;
use tracing::debug;

use crate::domain::models::{Finding, Language, Snippet};

/// Lines of context kept on each side of a finding.
const CONTEXT_LINES: usize = 5;

/// Parse `file:line:` references for the given language out of a report.
///
/// Findings are returned in report order, capped at `max`.
pub fn extract_findings(report: &str, language: Language, max: usize) -> Vec<Finding> {
    // Escape-free because extensions are [a-z]+ only.
    let pattern = format!(r"([^\s:]+\.{}):(\d+):", language.extension());
    let re = Regex::new(&pattern).unwrap_or_else(|_| unreachable!("static pattern"));

    let mut findings = Vec::new();
    for caps in re.captures_iter(report) {
        if findings.len() >= max {
            break;
        }
        let file = caps[1].to_string();
        if let Ok(line) = caps[2].parse::<u32>() {
            findings.push(Finding { file, line });
        }
    }
    findings
}

/// Locate the file an analyzer reported, trying the paths the various
/// linters are known to print: absolute, relative to the project root, and
/// relative with the leading path component stripped.
pub fn resolve_source_file(file: &str, project_root: &Path) -> Option<PathBuf> {
    let path = Path::new(file);
    let mut candidates: Vec<PathBuf> = Vec::new();

    if path.is_absolute() {
        candidates.push(path.to_path_buf());
    }
    candidates.push(project_root.join(path));
    let mut parts = path.components();
    if parts.next().is_some() {
        let stripped: PathBuf = parts.collect();
        if !stripped.as_os_str().is_empty() {
            candidates.push(project_root.join(stripped));
        }
    }

    candidates.into_iter().find(|c| c.is_file())
}

/// Cut context snippets for each resolvable finding.
///
/// Unresolvable paths and unreadable files are skipped, not fatal.
pub fn extract_snippets(findings: &[Finding], project_root: &Path) -> Vec<Snippet> {
    let mut snippets = Vec::new();
    for finding in findings {
        let Some(source) = resolve_source_file(&finding.file, project_root) else {
            debug!(file = %finding.file, "Could not resolve finding path");
            continue;
        };
        let Ok(content) = std::fs::read_to_string(&source) else {
            debug!(file = %source.display(), "Could not read source file");
            continue;
        };
        let lines: Vec<&str> = content.lines().collect();
        let line = finding.line as usize;
        let start = line.saturating_sub(CONTEXT_LINES);
        let end = (line + CONTEXT_LINES).min(lines.len());
        if start >= end {
            continue;
        }
        snippets.push(Snippet {
            file: finding.file.clone(),
            line: finding.line,
            text: lines[start..end].join("\n"),
        });
    }
    snippets
}
