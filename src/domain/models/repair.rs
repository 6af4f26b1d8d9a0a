//! Repair-loop records: per-iteration bookkeeping and the persisted result.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::job::Language;
use super::patch::ApplyResult;

/// Decision taken after one iteration of the repair loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Tests pass: keep the tree, finish successfully
    Accept,
    /// Tests fail but ranked candidates remain: revert and try the next one
    Retry,
    /// Candidates exhausted: ask the model for a fresh round
    RequestPatches,
    /// Budget exhausted (or nothing applicable): revert and give up
    Abort,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Accept => "accept",
            Self::Retry => "retry",
            Self::RequestPatches => "request_patches",
            Self::Abort => "abort",
        }
    }
}

/// Record of one apply-and-test iteration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IterationRecord {
    /// 1-based iteration number
    pub iteration: u32,
    /// Patch attempted this iteration, if any candidate was left
    pub patch_id: Option<Uuid>,
    /// Rank of the attempted patch within its proposal round
    pub patch_rank: Option<usize>,
    /// Outcome of the apply step
    pub apply: Option<ApplyResult>,
    /// Whether the test suite passed after applying
    pub tests_passed: bool,
    /// One-line test summary (passed/failed/skipped counts)
    pub test_summary: String,
    /// Decision taken afterwards
    pub action: Action,
}

/// Summary of a finished repair loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepairSummary {
    pub success: bool,
    pub iterations_run: u32,
    pub patches_proposed: usize,
    pub patches_applied: usize,
    pub iterations: Vec<IterationRecord>,
}

impl RepairSummary {
    pub fn empty() -> Self {
        Self {
            success: false,
            iterations_run: 0,
            patches_proposed: 0,
            patches_applied: 0,
            iterations: Vec::new(),
        }
    }
}

/// The `result.json` artifact persisted when a job reaches a terminal state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobResult {
    pub workspace: String,
    pub language: Language,
    /// Raw static analyzer output
    #[serde(rename = "static")]
    pub static_report: String,
    /// Cleaned dynamic report (UI-facing)
    pub dynamic: String,
    /// Raw dynamic report (audit)
    pub dynamic_raw: String,
    pub repair: RepairSummary,
    pub finished_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_names() {
        assert_eq!(Action::Accept.as_str(), "accept");
        assert_eq!(Action::RequestPatches.as_str(), "request_patches");
    }

    #[test]
    fn result_serializes_static_field() {
        let result = JobResult {
            workspace: "ws".into(),
            language: Language::Python,
            static_report: "pylint output".into(),
            dynamic: String::new(),
            dynamic_raw: String::new(),
            repair: RepairSummary::empty(),
            finished_at: Utc::now(),
        };
        let json = serde_json::to_value(&result).unwrap();
        // Serialized under the artifact's wire name, not the Rust field name.
        assert!(json.get("static").is_some());
        assert!(json.get("static_report").is_none());
    }
}
