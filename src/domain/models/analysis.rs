//! Static analysis report model.

use serde::{Deserialize, Serialize};

use super::job::Language;

/// A single `file:line` issue extracted from analyzer output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    /// File path as printed by the analyzer (may be relative)
    pub file: String,
    /// 1-based line number
    pub line: u32,
}

/// Source context around a finding, handed to the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snippet {
    pub file: String,
    pub line: u32,
    /// Lines surrounding the finding (roughly +-5)
    pub text: String,
}

impl Snippet {
    /// Render in the `--- file:line ---` block format used in prompts
    /// and snippet artifacts.
    pub fn render(&self) -> String {
        format!("--- {}:{} ---\n{}\n", self.file, self.line, self.text)
    }
}

/// Output of one static analysis pass over a project tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub language: Language,
    /// Combined stdout+stderr of every analyzer invoked
    pub raw: String,
    /// Parsed `file:line` findings (capped)
    pub findings: Vec<Finding>,
    /// Extracted source snippets for resolvable findings
    pub snippets: Vec<Snippet>,
    /// Notes about skipped or unavailable tools
    pub tool_notes: Vec<String>,
}

impl AnalysisReport {
    pub fn new(language: Language, raw: impl Into<String>) -> Self {
        Self {
            language,
            raw: raw.into(),
            findings: Vec::new(),
            snippets: Vec::new(),
            tool_notes: Vec::new(),
        }
    }

    pub fn has_findings(&self) -> bool {
        !self.findings.is_empty()
    }

    /// Render all snippets as one prompt-ready block.
    pub fn snippets_block(&self) -> String {
        self.snippets
            .iter()
            .map(Snippet::render)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snippet_render_format() {
        let s = Snippet {
            file: "src/app.py".into(),
            line: 42,
            text: "def f():\n    return x".into(),
        };
        assert!(s.render().starts_with("--- src/app.py:42 ---\n"));
        assert!(s.render().ends_with("return x\n"));
    }

    #[test]
    fn empty_report_has_no_findings() {
        let report = AnalysisReport::new(Language::Python, "");
        assert!(!report.has_findings());
        assert_eq!(report.snippets_block(), "");
    }
}
