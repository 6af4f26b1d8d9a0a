//! Evaluation harness: run the pipeline over a dataset of known-buggy
//! projects and record per-case metrics.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{Job, Language};
use crate::services::repair_loop::RepairLoop;

/// Iteration budget used for every evaluation case.
const EVAL_MAX_ITERS: u32 = 3;

/// One dataset entry: a project tree with a known bug.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BugCase {
    pub id: String,
    pub language: Language,
    /// Directory holding the buggy project tree
    pub workspace: PathBuf,
    #[serde(default)]
    pub description: Option<String>,
}

/// Metrics recorded for one case.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseResult {
    pub id: String,
    pub language: Language,
    /// Static analysis reported at least one finding
    pub detected: bool,
    /// Test suite passed before any patching
    pub tests_passed: bool,
    /// Repair loop finished with a green suite
    pub repair_success: bool,
    pub duration_secs: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CaseResult {
    fn errored(case: &BugCase, detail: impl Into<String>, started: Instant) -> Self {
        Self {
            id: case.id.clone(),
            language: case.language,
            detected: false,
            tests_passed: false,
            repair_success: false,
            duration_secs: started.elapsed().as_secs_f64(),
            error: Some(detail.into()),
        }
    }
}

/// Runs the full pipeline over each dataset case.
///
/// Each case is staged into its own scratch workspace so the dataset trees
/// are never modified. A broken case records an error entry instead of
/// aborting the whole run.
pub struct EvalHarness {
    repair: Arc<RepairLoop>,
    staging_root: PathBuf,
    reports_dir: PathBuf,
}

impl EvalHarness {
    pub fn new(
        repair: Arc<RepairLoop>,
        staging_root: impl Into<PathBuf>,
        reports_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            repair,
            staging_root: staging_root.into(),
            reports_dir: reports_dir.into(),
        }
    }

    /// Load a dataset file: a JSON array of [`BugCase`] entries.
    pub fn load_dataset(path: &Path) -> DomainResult<Vec<BugCase>> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            DomainError::ValidationFailed(format!("cannot read dataset {}: {e}", path.display()))
        })?;
        let cases: Vec<BugCase> = serde_json::from_str(&text)?;
        if cases.is_empty() {
            return Err(DomainError::ValidationFailed(
                "dataset contains no cases".to_string(),
            ));
        }
        Ok(cases)
    }

    /// Run every case and persist `eval_results.json`.
    pub async fn run(&self, cases: &[BugCase]) -> DomainResult<Vec<CaseResult>> {
        let mut results = Vec::with_capacity(cases.len());
        for case in cases {
            info!(case = %case.id, "Evaluating case");
            let result = self.run_case(case).await;
            info!(
                case = %case.id,
                detected = result.detected,
                repaired = result.repair_success,
                "Case finished"
            );
            results.push(result);
        }
        self.write_results(&results)?;
        Ok(results)
    }

    async fn run_case(&self, case: &BugCase) -> CaseResult {
        let started = Instant::now();

        if !case.workspace.is_dir() {
            warn!(case = %case.id, path = %case.workspace.display(), "Case workspace missing");
            return CaseResult::errored(
                case,
                format!("workspace not found: {}", case.workspace.display()),
                started,
            );
        }

        match self.evaluate(case).await {
            Ok((detected, tests_passed, repair_success)) => CaseResult {
                id: case.id.clone(),
                language: case.language,
                detected,
                tests_passed,
                repair_success,
                duration_secs: started.elapsed().as_secs_f64(),
                error: None,
            },
            Err(err) => CaseResult::errored(case, err.to_string(), started),
        }
    }

    /// Stage the case, measure the baseline, then run the repair loop.
    async fn evaluate(&self, case: &BugCase) -> DomainResult<(bool, bool, bool)> {
        let analyzer = self.repair.analyzer_for(case.language).ok_or_else(|| {
            DomainError::AnalysisFailed(format!(
                "no analyzer registered for language '{}'",
                case.language.as_str()
            ))
        })?;
        let runner = self.repair.runner_for(case.language).ok_or_else(|| {
            DomainError::TestRunFailed(format!(
                "no test runner registered for language '{}'",
                case.language.as_str()
            ))
        })?;

        let ws_root = self.stage(case)?;
        let project = ws_root.join("project");

        let analysis = analyzer.analyze(&project).await?;
        let detected = analysis.has_findings();
        let baseline = runner.run(&project).await?;
        let tests_passed = baseline.all_passing();

        let job = Job::new(
            ws_root
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or(&case.id),
            &ws_root,
            case.language,
        )
        .with_max_iters(EVAL_MAX_ITERS);

        // A pipeline error is the case's error, not the harness's.
        let repair_success = match self.repair.run(job).await {
            Ok(result) => result.repair.success,
            Err(err) => {
                warn!(case = %case.id, error = %err, "Repair errored during evaluation");
                false
            }
        };

        Ok((detected, tests_passed, repair_success))
    }

    /// Copy the case tree into a fresh workspace under the staging root.
    fn stage(&self, case: &BugCase) -> DomainResult<PathBuf> {
        let ws_root = self
            .staging_root
            .join(format!("eval_{}_{}", sanitize(&case.id), uuid::Uuid::new_v4()));
        let project = ws_root.join("project");
        copy_tree(&case.workspace, &project)?;
        Ok(ws_root)
    }

    fn write_results(&self, results: &[CaseResult]) -> DomainResult<()> {
        std::fs::create_dir_all(&self.reports_dir)?;
        let path = self.reports_dir.join("eval_results.json");
        let json = serde_json::to_string_pretty(results)?;
        std::fs::write(&path, json)?;
        info!(path = %path.display(), cases = results.len(), "Evaluation results written");
        Ok(())
    }
}

fn sanitize(id: &str) -> String {
    crate::domain::models::sanitize_workspace_name(id)
}

fn copy_tree(from: &Path, to: &Path) -> DomainResult<()> {
    std::fs::create_dir_all(to)?;
    for entry in std::fs::read_dir(from)? {
        let entry = entry?;
        let target = to.join(entry.file_name());
        if entry.path().is_dir() {
            copy_tree(&entry.path(), &target)?;
        } else {
            std::fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn dataset_parses_and_rejects_empty() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("dataset.json");
        fs::write(
            &path,
            r#"[{"id": "case-1", "language": "py", "workspace": "/data/case1"}]"#,
        )
        .unwrap();

        let cases = EvalHarness::load_dataset(&path).unwrap();
        assert_eq!(cases.len(), 1);
        assert_eq!(cases[0].id, "case-1");
        assert_eq!(cases[0].language, Language::Python);
        assert!(cases[0].description.is_none());

        fs::write(&path, "[]").unwrap();
        assert!(EvalHarness::load_dataset(&path).is_err());
    }

    #[test]
    fn copy_tree_is_recursive() {
        let tmp = tempfile::tempdir().unwrap();
        let src = tmp.path().join("src");
        fs::create_dir_all(src.join("pkg")).unwrap();
        fs::write(src.join("pkg/mod.py"), "x = 1\n").unwrap();
        fs::write(src.join("top.py"), "y = 2\n").unwrap();

        let dst = tmp.path().join("dst");
        copy_tree(&src, &dst).unwrap();
        assert!(dst.join("pkg/mod.py").is_file());
        assert!(dst.join("top.py").is_file());
    }

    #[test]
    fn case_result_serializes_without_null_error() {
        let result = CaseResult {
            id: "c".into(),
            language: Language::Cpp,
            detected: true,
            tests_passed: false,
            repair_success: true,
            duration_secs: 1.25,
            error: None,
        };
        let json = serde_json::to_value(&result).unwrap();
        assert!(json.get("error").is_none());
        assert_eq!(json["detected"], true);
    }
}
