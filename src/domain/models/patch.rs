//! Patch and patch-application models.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Where a candidate patch came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatchProvenance {
    /// Model identifier that proposed the diff
    pub model: String,
    /// Repair-loop iteration the proposal belongs to
    pub iteration: u32,
}

/// A proposed code change expressed as a unified diff.
///
/// A patch belongs to exactly one job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patch {
    pub id: Uuid,
    pub job_id: Uuid,
    /// Unified diff text
    pub diff: String,
    /// Rank among the candidates of one proposal round (0 = top)
    pub rank: usize,
    /// Heuristic confidence, decreasing with rank
    pub confidence: f32,
    pub provenance: PatchProvenance,
}

impl Patch {
    pub fn new(
        job_id: Uuid,
        diff: impl Into<String>,
        rank: usize,
        provenance: PatchProvenance,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            job_id,
            diff: diff.into(),
            rank,
            confidence: confidence_for_rank(rank),
            provenance,
        }
    }
}

/// Confidence assigned to the n-th ranked candidate of a proposal round.
///
/// The model returns diffs in preference order; score decays geometrically
/// so downstream consumers can threshold without re-ranking.
pub fn confidence_for_rank(rank: usize) -> f32 {
    #[allow(clippy::cast_possible_truncation)]
    let decay = 0.75f32.powi(rank.min(16) as i32);
    0.9 * decay
}

/// Which `git apply` invocation succeeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplyMode {
    /// Plain `git apply`
    Clean,
    /// `git apply --unidiff-zero`
    UnidiffZero,
    /// `git apply --reject` (partial application, .rej files possible)
    Reject,
}

impl ApplyMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Clean => "clean",
            Self::UnidiffZero => "unidiff-zero",
            Self::Reject => "reject",
        }
    }
}

/// Result of applying one patch to a working tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplyResult {
    pub applied: bool,
    /// Mode that succeeded, when applied
    pub mode: Option<ApplyMode>,
    /// First line of the apply failure, when not applied
    pub conflict: Option<String>,
}

impl ApplyResult {
    pub fn applied(mode: ApplyMode) -> Self {
        Self {
            applied: true,
            mode: Some(mode),
            conflict: None,
        }
    }

    pub fn conflict(detail: impl Into<String>) -> Self {
        Self {
            applied: false,
            mode: None,
            conflict: Some(detail.into()),
        }
    }
}
