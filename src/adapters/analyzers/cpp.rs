//! C++ static analysis: cppcheck, plus clang-tidy when a compilation
//! database is present.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{info, warn};

use crate::domain::errors::DomainResult;
use crate::domain::models::{AnalysisReport, Language};
use crate::domain::ports::Analyzer;
use crate::infrastructure::process::CommandRunner;
use crate::services::snippets;

pub struct CppAnalyzer {
    runner: CommandRunner,
    max_findings: usize,
}

impl CppAnalyzer {
    pub fn new(runner: CommandRunner, max_findings: usize) -> Self {
        Self {
            runner,
            max_findings,
        }
    }

    async fn run_tool(
        &self,
        report: &mut AnalysisReport,
        project: &Path,
        tool: &str,
        args: &[&str],
    ) -> DomainResult<()> {
        if !CommandRunner::available(tool) {
            warn!(tool, "Analyzer tool not installed, skipping");
            report.tool_notes.push(format!("{tool}: not installed"));
            return Ok(());
        }
        let out = self.runner.run(tool, args, project).await?;
        if out.timed_out {
            report.tool_notes.push(format!("{tool}: timed out"));
        }
        report.raw.push_str(&format!("== {tool} ==\n"));
        report.raw.push_str(&out.output);
        if !out.output.ends_with('\n') {
            report.raw.push('\n');
        }
        Ok(())
    }
}

#[async_trait]
impl Analyzer for CppAnalyzer {
    fn language(&self) -> Language {
        Language::Cpp
    }

    async fn analyze(&self, project: &Path) -> DomainResult<AnalysisReport> {
        let mut report = AnalysisReport::new(Language::Cpp, String::new());

        self.run_tool(
            &mut report,
            project,
            "cppcheck",
            &[
                "--enable=warning,performance,portability",
                "--inconclusive",
                "--quiet",
                "--force",
                ".",
            ],
        )
        .await?;

        // clang-tidy needs compile flags; only useful with a compilation
        // database in the tree.
        if project.join("compile_commands.json").is_file() {
            let sources = collect_cpp_sources(project);
            if sources.is_empty() {
                report
                    .tool_notes
                    .push("clang-tidy: no .cpp sources found".to_string());
            } else {
                let mut args: Vec<&str> = sources.iter().filter_map(|p| p.to_str()).collect();
                args.extend(["-p", "."]);
                self.run_tool(&mut report, project, "clang-tidy", &args)
                    .await?;
            }
        }

        report.findings = snippets::extract_findings(&report.raw, Language::Cpp, self.max_findings);
        report.snippets = snippets::extract_snippets(&report.findings, project);

        info!(
            findings = report.findings.len(),
            snippets = report.snippets.len(),
            notes = report.tool_notes.len(),
            "C++ analysis complete"
        );
        Ok(report)
    }
}

/// Relative paths of every `.cpp` file under the project.
pub fn collect_cpp_sources(project: &Path) -> Vec<PathBuf> {
    let mut sources = Vec::new();
    collect_into(project, project, &mut sources);
    sources.sort();
    sources
}

fn collect_into(root: &Path, dir: &Path, out: &mut Vec<PathBuf>) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_into(root, &path, out);
        } else if path.extension().and_then(|e| e.to_str()) == Some("cpp") {
            if let Ok(rel) = path.strip_prefix(root) {
                out.push(rel.to_path_buf());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn collects_cpp_sources_relative_and_sorted() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        fs::create_dir_all(root.join("src")).unwrap();
        fs::write(root.join("src/b.cpp"), "").unwrap();
        fs::write(root.join("a.cpp"), "").unwrap();
        fs::write(root.join("src/ignore.h"), "").unwrap();

        let sources = collect_cpp_sources(root);
        assert_eq!(
            sources,
            vec![PathBuf::from("a.cpp"), PathBuf::from("src/b.cpp")]
        );
    }
}
