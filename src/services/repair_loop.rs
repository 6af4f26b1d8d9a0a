//! The repair loop: analyze, propose, apply, test, decide, iterate.
//!
//! One [`RepairLoop`] instance is wired with the adapters for every
//! supported language and drives a single job from `Running` to a terminal
//! state. The tree is rolled back to the baseline snapshot whenever a
//! candidate is rejected, so each attempt starts from the same code.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{
    Action, AnalysisReport, IterationRecord, Job, JobResult, JobStatus, Language, Patch,
    RepairSummary, ReportVariant, TestReport,
};
use crate::domain::ports::{Analyzer, JobRepository, ModelClient, PatchRequest, Patcher, TestRunner};
use crate::services::decision::{DecisionContext, DecisionPolicy};

/// Upper bound on analyzer output forwarded to the model.
const MAX_REPORT_CHARS: usize = 12_000;

pub struct RepairLoop {
    analyzers: HashMap<Language, Arc<dyn Analyzer>>,
    runners: HashMap<Language, Arc<dyn TestRunner>>,
    model: Arc<dyn ModelClient>,
    patcher: Arc<dyn Patcher>,
    jobs: Arc<dyn JobRepository>,
}

impl RepairLoop {
    pub fn new(
        model: Arc<dyn ModelClient>,
        patcher: Arc<dyn Patcher>,
        jobs: Arc<dyn JobRepository>,
    ) -> Self {
        Self {
            analyzers: HashMap::new(),
            runners: HashMap::new(),
            model,
            patcher,
            jobs,
        }
    }

    pub fn register_analyzer(&mut self, analyzer: Arc<dyn Analyzer>) {
        self.analyzers.insert(analyzer.language(), analyzer);
    }

    pub fn register_runner(&mut self, runner: Arc<dyn TestRunner>) {
        self.runners.insert(runner.language(), runner);
    }

    pub fn analyzer_for(&self, language: Language) -> Option<Arc<dyn Analyzer>> {
        self.analyzers.get(&language).cloned()
    }

    pub fn runner_for(&self, language: Language) -> Option<Arc<dyn TestRunner>> {
        self.runners.get(&language).cloned()
    }

    /// Drive a job to a terminal state and persist the outcome.
    ///
    /// On success or controlled failure the result artifact is written and
    /// the job record updated. On a pipeline error the job is marked
    /// errored before the error propagates.
    pub async fn run(&self, mut job: Job) -> DomainResult<JobResult> {
        match self.run_inner(&mut job).await {
            Ok(result) => {
                let terminal = if result.repair.success {
                    JobStatus::Succeeded
                } else {
                    JobStatus::Failed
                };
                transition(&mut job, terminal)?;
                self.jobs.update(&job).await?;
                self.jobs.write_result(&job, &result).await?;
                info!(
                    workspace = %job.workspace_id,
                    status = job.status.as_str(),
                    iterations = result.repair.iterations_run,
                    "Repair finished"
                );
                Ok(result)
            }
            Err(err) => {
                let detail = err.to_string();
                warn!(workspace = %job.workspace_id, error = %detail, "Repair errored");
                job.mark_errored(&detail);
                self.jobs.update(&job).await?;
                self.jobs.write_error(&job, &detail).await?;
                Err(err)
            }
        }
    }

    async fn run_inner(&self, job: &mut Job) -> DomainResult<JobResult> {
        transition(job, JobStatus::Running)?;
        self.jobs.update(job).await?;

        let analyzer = self.analyzers.get(&job.language).ok_or_else(|| {
            DomainError::AnalysisFailed(format!(
                "no analyzer registered for language '{}'",
                job.language.as_str()
            ))
        })?;
        let runner = self.runners.get(&job.language).ok_or_else(|| {
            DomainError::TestRunFailed(format!(
                "no test runner registered for language '{}'",
                job.language.as_str()
            ))
        })?;

        let project = job.project_dir();
        let analysis = analyzer.analyze(&project).await?;
        info!(
            workspace = %job.workspace_id,
            findings = analysis.findings.len(),
            "Static analysis complete"
        );

        let (summary, final_tests) = if analysis.has_findings() {
            self.patcher.prepare(&project).await?;
            self.repair(job, &analysis, runner.as_ref()).await?
        } else {
            // Nothing to patch; report the suite as-is.
            let report = runner.run(&project).await?;
            let mut summary = RepairSummary::empty();
            summary.success = report.all_passing();
            (summary, report)
        };

        let now = Utc::now();
        Ok(JobResult {
            workspace: job.workspace_id.clone(),
            language: job.language,
            static_report: analysis.raw.clone(),
            dynamic: final_tests.render(
                ReportVariant::Clean,
                now,
                summary.patches_applied,
                summary.patches_proposed,
            ),
            dynamic_raw: final_tests.render(
                ReportVariant::Raw,
                now,
                summary.patches_applied,
                summary.patches_proposed,
            ),
            repair: summary,
            finished_at: now,
        })
    }

    /// The apply-and-test iteration loop proper.
    async fn repair(
        &self,
        job: &Job,
        analysis: &AnalysisReport,
        runner: &dyn TestRunner,
    ) -> DomainResult<(RepairSummary, TestReport)> {
        let project = job.project_dir();
        let policy = DecisionPolicy::new(job.max_iters);
        let mut summary = RepairSummary::empty();
        let mut last_tests = TestReport::default();
        let mut failure_log: Option<String> = None;

        let mut candidates = self.propose(job, analysis, &failure_log, 1).await?;
        summary.patches_proposed += candidates.len();

        let mut iteration = 0u32;
        while iteration < job.max_iters {
            iteration += 1;
            summary.iterations_run = iteration;

            let Some(patch) = candidates.pop_front() else {
                // A proposal round came back empty; nothing left to try.
                summary.iterations.push(IterationRecord {
                    iteration,
                    patch_id: None,
                    patch_rank: None,
                    apply: None,
                    tests_passed: false,
                    test_summary: "no candidate patches".to_string(),
                    action: Action::Abort,
                });
                break;
            };

            let apply = self.patcher.apply(&project, &patch.diff).await?;
            let (tests_passed, test_summary) = if apply.applied {
                summary.patches_applied += 1;
                let report = runner.run(&project).await?;
                let passed = report.all_passing();
                let line = format!(
                    "{} passed, {} failed, {} skipped",
                    report.passed(),
                    report.failed(),
                    report.skipped()
                );
                failure_log = (!passed).then(|| failing_detail(&report));
                last_tests = report;
                (passed, line)
            } else {
                let conflict = apply
                    .conflict
                    .clone()
                    .unwrap_or_else(|| "patch did not apply".to_string());
                failure_log = Some(format!("patch could not be applied: {conflict}"));
                (false, format!("apply failed: {conflict}"))
            };

            let action = policy.decide(DecisionContext {
                tests_passed,
                candidates_remaining: candidates.len(),
                iterations_used: iteration,
            });
            info!(
                workspace = %job.workspace_id,
                iteration,
                rank = patch.rank,
                applied = apply.applied,
                tests_passed,
                action = action.as_str(),
                "Iteration complete"
            );

            summary.iterations.push(IterationRecord {
                iteration,
                patch_id: Some(patch.id),
                patch_rank: Some(patch.rank),
                apply: Some(apply),
                tests_passed,
                test_summary,
                action,
            });

            match action {
                Action::Accept => {
                    summary.success = true;
                    return Ok((summary, last_tests));
                }
                Action::Retry => {
                    self.patcher.revert(&project).await?;
                }
                Action::RequestPatches => {
                    self.patcher.revert(&project).await?;
                    candidates = self
                        .propose(job, analysis, &failure_log, iteration + 1)
                        .await?;
                    summary.patches_proposed += candidates.len();
                }
                Action::Abort => {
                    self.patcher.revert(&project).await?;
                    return Ok((summary, last_tests));
                }
            }
        }

        Ok((summary, last_tests))
    }

    async fn propose(
        &self,
        job: &Job,
        analysis: &AnalysisReport,
        failure_log: &Option<String>,
        iteration: u32,
    ) -> DomainResult<VecDeque<Patch>> {
        let request = PatchRequest {
            job_id: job.id,
            language: job.language,
            report: truncate(&analysis.raw, MAX_REPORT_CHARS),
            snippets: analysis.snippets_block(),
            failure_log: failure_log.clone(),
            iteration,
        };
        let patches = self.model.propose_patches(&request).await?;
        info!(
            workspace = %job.workspace_id,
            round = iteration,
            candidates = patches.len(),
            "Proposal round complete"
        );
        Ok(patches.into())
    }
}

fn transition(job: &mut Job, to: JobStatus) -> DomainResult<()> {
    let from = job.status;
    job.transition_to(to)
        .map_err(|reason| DomainError::InvalidStateTransition {
            from: from.as_str().to_string(),
            to: to.as_str().to_string(),
            reason,
        })
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let cut: String = text.chars().take(max_chars).collect();
    format!("{cut}\n... (truncated)")
}

/// Failing and skipped case details forwarded to the next proposal round.
fn failing_detail(report: &TestReport) -> String {
    report
        .cases
        .iter()
        .filter(|c| c.outcome != crate::domain::models::TestOutcome::Pass)
        .map(|c| format!("{}: {}", c.name, c.detail))
        .collect::<Vec<_>>()
        .join("\n")
}
