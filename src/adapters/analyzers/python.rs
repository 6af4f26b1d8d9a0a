//! Python static analysis: pylint, flake8, bandit.

use std::path::Path;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::domain::errors::DomainResult;
use crate::domain::models::{AnalysisReport, Language};
use crate::domain::ports::Analyzer;
use crate::infrastructure::process::CommandRunner;
use crate::services::snippets;

pub struct PythonAnalyzer {
    runner: CommandRunner,
    interpreter: String,
    max_findings: usize,
}

impl PythonAnalyzer {
    pub fn new(runner: CommandRunner, interpreter: impl Into<String>, max_findings: usize) -> Self {
        Self {
            runner,
            interpreter: interpreter.into(),
            max_findings,
        }
    }

    /// The three linter passes, in report order, all invoked through the
    /// configured interpreter. Error-class checks only; style categories
    /// are disabled so the model sees real defects.
    fn tools() -> [(&'static str, &'static [&'static str]); 3] {
        [
            (
                "pylint",
                &[
                    "--disable=R,C,W,E1101",
                    "--score=n",
                    "--exit-zero",
                    "--recursive=y",
                    ".",
                ],
            ),
            (
                "flake8",
                &["--select=E9,F63,F7,F82", "--show-source", "--statistics", "."],
            ),
            ("bandit", &["-r", "."]),
        ]
    }
}

#[async_trait]
impl Analyzer for PythonAnalyzer {
    fn language(&self) -> Language {
        Language::Python
    }

    async fn analyze(&self, project: &Path) -> DomainResult<AnalysisReport> {
        let mut report = AnalysisReport::new(Language::Python, String::new());

        for (tool, tool_args) in Self::tools() {
            let mut args: Vec<&str> = vec!["-m", tool];
            args.extend_from_slice(tool_args);

            let out = self.runner.run(&self.interpreter, &args, project).await?;
            if out.timed_out {
                report.tool_notes.push(format!("{tool}: timed out"));
                continue;
            }
            if out.output.contains("No module named") && !out.success() {
                warn!(tool, "Analyzer module not installed, skipping");
                report.tool_notes.push(format!("{tool}: not installed"));
                continue;
            }
            report.raw.push_str(&format!("== {tool} ==\n"));
            report.raw.push_str(&out.output);
            if !out.output.ends_with('\n') {
                report.raw.push('\n');
            }
        }

        report.findings =
            snippets::extract_findings(&report.raw, Language::Python, self.max_findings);
        report.snippets = snippets::extract_snippets(&report.findings, project);

        info!(
            findings = report.findings.len(),
            snippets = report.snippets.len(),
            notes = report.tool_notes.len(),
            "Python analysis complete"
        );
        Ok(report)
    }
}
