//! Python dynamic testing: pytest when the project has a test setup, a
//! byte-compile smoke check otherwise.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, info};

use crate::domain::errors::DomainResult;
use crate::domain::models::{Language, PythonConfig, TestCase, TestReport};
use crate::domain::ports::TestRunner;
use crate::infrastructure::process::CommandRunner;

/// Most modules checked by the smoke fallback.
const SMOKE_MODULE_LIMIT: usize = 5;
/// Detail lines kept from tool output.
const DETAIL_TAIL_LINES: usize = 40;

const CUSTOM_CASE: &str = "custom_py_tests";

pub struct PythonTestRunner {
    runner: CommandRunner,
    config: PythonConfig,
}

impl PythonTestRunner {
    pub fn new(runner: CommandRunner, config: PythonConfig) -> Self {
        Self { runner, config }
    }

    async fn run_custom(&self, project: &Path, command: &str) -> DomainResult<TestReport> {
        let out = self.runner.run("sh", &["-c", command], project).await?;
        let case = if out.success() {
            TestCase::pass(CUSTOM_CASE, tail(&out.output))
        } else {
            TestCase::fail(CUSTOM_CASE, tail(&out.output))
        };
        Ok(TestReport::new(vec![case]))
    }

    async fn run_pytest(&self, project: &Path) -> DomainResult<TestReport> {
        let out = self
            .runner
            .run(
                &self.config.interpreter,
                &["-m", "pytest", "-q", "--maxfail=1", "--tb=short"],
                project,
            )
            .await?;
        // pytest exit 5 means "no tests collected"
        let case = if out.success() {
            TestCase::pass("pytest", tail(&out.output))
        } else if out.status == Some(5) {
            TestCase::skip("pytest", "no tests collected")
        } else {
            TestCase::fail("pytest", tail(&out.output))
        };
        Ok(TestReport::new(vec![case]))
    }

    /// Byte-compile each candidate module through the interpreter; a
    /// project with no test setup at least gets a syntax-level check.
    async fn run_smoke(&self, project: &Path) -> DomainResult<TestReport> {
        let files = smoke_files(project);
        if files.is_empty() {
            return Ok(TestReport::new(vec![TestCase::skip(
                "python_smoke",
                "no top-level modules found",
            )]));
        }

        let mut cases = Vec::with_capacity(files.len().min(SMOKE_MODULE_LIMIT) + 1);
        for file in files.iter().take(SMOKE_MODULE_LIMIT) {
            let out = self
                .runner
                .run(
                    &self.config.interpreter,
                    &[
                        "-c",
                        "import py_compile, sys; py_compile.compile(sys.argv[1], doraise=True)",
                        file.as_str(),
                    ],
                    project,
                )
                .await?;
            let name = format!("compile {file}");
            cases.push(if out.success() {
                TestCase::pass(name, "module compiles cleanly")
            } else {
                TestCase::fail(name, tail(&out.output))
            });
        }
        if files.len() > SMOKE_MODULE_LIMIT {
            cases.push(TestCase::skip(
                "python_smoke",
                format!(
                    "{} additional modules not checked",
                    files.len() - SMOKE_MODULE_LIMIT
                ),
            ));
        }
        Ok(TestReport::new(cases))
    }
}

#[async_trait]
impl TestRunner for PythonTestRunner {
    fn language(&self) -> Language {
        Language::Python
    }

    async fn run(&self, project: &Path) -> DomainResult<TestReport> {
        if let Some(command) = &self.config.test_command {
            info!(%command, "Running configured test command");
            return self.run_custom(project, command).await;
        }
        if has_test_setup(project) {
            debug!("Test setup detected, running pytest");
            return self.run_pytest(project).await;
        }
        debug!("No test setup, falling back to byte-compile smoke check");
        self.run_smoke(project).await
    }
}

/// Whether the project carries anything pytest would pick up.
pub fn has_test_setup(project: &Path) -> bool {
    const TEST_DIRS: [&str; 3] = ["tests", "test", "testing"];
    const TEST_FILES: [&str; 4] = ["pytest.ini", "conftest.py", "pyproject.toml", "setup.cfg"];

    TEST_DIRS.iter().any(|d| project.join(d).is_dir())
        || TEST_FILES.iter().any(|f| project.join(f).is_file())
}

/// Top-level module files for the smoke fallback, sorted, uncapped.
fn smoke_files(project: &Path) -> Vec<String> {
    let Ok(entries) = std::fs::read_dir(project) else {
        return Vec::new();
    };
    let mut files: Vec<PathBuf> = entries
        .flatten()
        .map(|e| e.path())
        .filter(|p| p.extension().and_then(|e| e.to_str()) == Some("py"))
        .collect();
    files.sort();

    files
        .iter()
        .filter(|p| {
            p.file_stem()
                .and_then(|s| s.to_str())
                .is_some_and(|stem| stem != "setup" && !stem.starts_with("test_"))
        })
        .filter_map(|p| p.file_name().and_then(|n| n.to_str()))
        .map(str::to_string)
        .collect()
}

fn tail(output: &str) -> String {
    let lines: Vec<&str> = output.lines().collect();
    if lines.len() <= DETAIL_TAIL_LINES {
        return output.trim_end().to_string();
    }
    lines[lines.len() - DETAIL_TAIL_LINES..].join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_setup_detection() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(!has_test_setup(tmp.path()));

        fs::create_dir(tmp.path().join("tests")).unwrap();
        assert!(has_test_setup(tmp.path()));

        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("conftest.py"), "").unwrap();
        assert!(has_test_setup(tmp.path()));
    }

    #[test]
    fn smoke_files_are_sorted_and_filtered() {
        let tmp = tempfile::tempdir().unwrap();
        for name in ["b", "a", "setup", "test_x"] {
            fs::write(tmp.path().join(format!("{name}.py")), "").unwrap();
        }
        let files = smoke_files(tmp.path());
        assert_eq!(files, vec!["a.py".to_string(), "b.py".to_string()]);
    }

    #[tokio::test]
    async fn smoke_check_flags_broken_module() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("good.py"), "x = 1\n").unwrap();
        fs::write(tmp.path().join("bad.py"), "def broken(:\n").unwrap();

        let runner = PythonTestRunner::new(CommandRunner::new(30), PythonConfig::default());
        let report = runner.run(tmp.path()).await.unwrap();

        assert_eq!(report.cases.len(), 2);
        assert!(!report.all_passing());
        let bad = report
            .cases
            .iter()
            .find(|c| c.name == "compile bad.py")
            .unwrap();
        assert!(bad.detail.contains("SyntaxError") || bad.detail.contains("PyCompileError"));
    }

    #[tokio::test]
    async fn smoke_check_caps_module_count() {
        let tmp = tempfile::tempdir().unwrap();
        for name in ["a", "b", "c", "d", "e", "f", "g"] {
            fs::write(tmp.path().join(format!("{name}.py")), "x = 1\n").unwrap();
        }

        let runner = PythonTestRunner::new(CommandRunner::new(30), PythonConfig::default());
        let report = runner.run(tmp.path()).await.unwrap();

        assert_eq!(report.cases.len(), SMOKE_MODULE_LIMIT + 1);
        assert_eq!(report.skipped(), 1);
        let skip = report.cases.last().unwrap();
        assert!(skip.detail.contains("2 additional modules"));
    }

    #[tokio::test]
    async fn custom_command_overrides_discovery() {
        let tmp = tempfile::tempdir().unwrap();
        fs::create_dir(tmp.path().join("tests")).unwrap();

        let config = PythonConfig {
            test_command: Some("echo custom-ran".to_string()),
            ..PythonConfig::default()
        };
        let runner = PythonTestRunner::new(CommandRunner::new(30), config);
        let report = runner.run(tmp.path()).await.unwrap();

        assert!(report.all_passing());
        assert_eq!(report.cases[0].name, "custom_py_tests");
        assert!(report.cases[0].detail.contains("custom-ran"));
    }

    #[test]
    fn tail_keeps_last_lines() {
        let long: String = (0..100).map(|i| format!("line{i}\n")).collect();
        let t = tail(&long);
        assert!(t.starts_with("line60"));
        assert!(t.ends_with("line99"));
    }
}
