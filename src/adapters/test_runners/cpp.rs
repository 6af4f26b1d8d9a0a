//! C++ dynamic testing: compile with sanitizers, then execute.
//!
//! Qt projects cannot build without the Qt development packages, so Qt
//! usage is detected up front and compilation skipped (or forced, per
//! configuration) instead of producing a wall of missing-header errors.

use std::path::Path;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::domain::errors::DomainResult;
use crate::domain::models::{CppConfig, Language, QtBehavior, TestCase, TestReport};
use crate::domain::ports::TestRunner;
use crate::infrastructure::process::CommandRunner;

use crate::adapters::analyzers::cpp::collect_cpp_sources;

const COMPILE_CASE: &str = "C++ compile";
const RUNTIME_CASE: &str = "C++ runtime";

pub struct CppTestRunner {
    runner: CommandRunner,
    config: CppConfig,
}

impl CppTestRunner {
    pub fn new(runner: CommandRunner, config: CppConfig) -> Self {
        Self { runner, config }
    }

    fn should_skip(&self, qt_detected: bool) -> Option<String> {
        match self.config.qt_behavior {
            QtBehavior::Skip => Some("Skipped: compilation disabled by configuration.".to_string()),
            QtBehavior::Auto if qt_detected => Some(
                "Skipped: Qt headers required (missing Qt development packages in runner)."
                    .to_string(),
            ),
            QtBehavior::Auto | QtBehavior::Force => None,
        }
    }

    async fn compile_and_run(&self, project: &Path) -> DomainResult<TestReport> {
        let sources = collect_cpp_sources(project);
        if sources.is_empty() {
            return Ok(TestReport::new(vec![TestCase::skip(
                COMPILE_CASE,
                "no .cpp sources found",
            )]));
        }

        let binary = "./__repair_build";
        let mut args: Vec<&str> = vec![
            "-std=c++17",
            "-Wall",
            "-Wextra",
            "-fsanitize=address",
            "-o",
            binary,
        ];
        let source_strs: Vec<String> = sources
            .iter()
            .filter_map(|p| p.to_str().map(str::to_string))
            .collect();
        args.extend(source_strs.iter().map(String::as_str));

        let out = self.runner.run(&self.config.compiler, &args, project).await?;
        if !out.success() {
            let detail = diagnose_compile_failure(&out.output);
            return Ok(TestReport::new(vec![TestCase::fail(COMPILE_CASE, detail)]));
        }
        debug!("Compilation succeeded, executing binary");

        let run = self.runner.run(binary, &[], project).await?;
        let _ = std::fs::remove_file(project.join("__repair_build"));

        let mut cases = vec![TestCase::pass(COMPILE_CASE, "compiled with sanitizers")];
        cases.push(if run.success() {
            TestCase::pass(RUNTIME_CASE, tail(&run.output))
        } else if run.timed_out {
            TestCase::fail(RUNTIME_CASE, tail(&run.output))
        } else {
            TestCase::fail(
                RUNTIME_CASE,
                format!("exit code {:?}\n{}", run.status, tail(&run.output)),
            )
        });
        Ok(TestReport::new(cases))
    }
}

#[async_trait]
impl TestRunner for CppTestRunner {
    fn language(&self) -> Language {
        Language::Cpp
    }

    async fn run(&self, project: &Path) -> DomainResult<TestReport> {
        let qt = detect_qt_usage(project);
        if qt {
            info!("Qt usage detected in project");
        }

        if let Some(reason) = self.should_skip(qt) {
            return Ok(TestReport::new(vec![
                TestCase::skip(COMPILE_CASE, reason.clone()),
                TestCase::skip(RUNTIME_CASE, reason),
            ]));
        }

        self.compile_and_run(project).await
    }
}

/// Qt projects carry `.pro` files or include `<Q...>` headers.
pub fn detect_qt_usage(project: &Path) -> bool {
    scan_for_qt(project)
}

fn scan_for_qt(dir: &Path) -> bool {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return false;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            if scan_for_qt(&path) {
                return true;
            }
            continue;
        }
        match path.extension().and_then(|e| e.to_str()) {
            Some("pro") => return true,
            Some("cpp" | "h" | "hpp") => {
                if let Ok(text) = std::fs::read_to_string(&path) {
                    if text
                        .lines()
                        .any(|l| l.trim_start().starts_with("#include <Q"))
                    {
                        return true;
                    }
                }
            }
            _ => {}
        }
    }
    false
}

/// Turn raw compiler output into a diagnosed failure detail.
fn diagnose_compile_failure(output: &str) -> String {
    let lower = output.to_lowercase();
    let hint = if lower.contains("fatal error: q") || lower.contains("qapplication") {
        Some("Likely cause: Qt development packages are not installed.")
    } else if lower.contains("virtual memory exhausted")
        || lower.contains("out of memory")
        || lower.contains("killed")
    {
        Some("Likely cause: compiler ran out of memory.")
    } else {
        None
    };

    match hint {
        Some(hint) => format!("{hint}\n{}", tail(output)),
        None => tail(output),
    }
}

fn tail(output: &str) -> String {
    const LINES: usize = 40;
    let lines: Vec<&str> = output.lines().collect();
    if lines.len() <= LINES {
        return output.trim_end().to_string();
    }
    lines[lines.len() - LINES..].join("\n")
}
