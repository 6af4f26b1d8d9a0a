//! Domain models for the repair pipeline.

pub mod analysis;
pub mod config;
pub mod job;
pub mod patch;
pub mod repair;
pub mod test_report;

pub use analysis::{AnalysisReport, Finding, Snippet};
pub use config::{
    Config, CppConfig, LoggingConfig, ModelConfig, PythonConfig, QtBehavior, RepairConfig,
    RetryConfig, ServerConfig, WorkspacesConfig,
};
pub use job::{sanitize_workspace_name, workspace_id_for, Job, JobStatus, Language};
pub use patch::{ApplyMode, ApplyResult, Patch, PatchProvenance};
pub use repair::{Action, IterationRecord, JobResult, RepairSummary};
pub use test_report::{ReportVariant, TestCase, TestOutcome, TestReport};
