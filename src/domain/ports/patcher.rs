//! Patcher port - interface for applying diffs to a working tree.

use std::path::Path;

use async_trait::async_trait;

use crate::domain::errors::DomainResult;
use crate::domain::models::ApplyResult;

/// Contract for patch application against a job's project tree.
///
/// Implementations wrap version-control tooling. The tree is snapshotted
/// before the first apply so a failed iteration can always be rolled back;
/// the loop never leaves a half-patched tree behind.
#[async_trait]
pub trait Patcher: Send + Sync {
    /// Prepare the tree for patching: ensure a baseline snapshot exists.
    async fn prepare(&self, tree: &Path) -> DomainResult<()>;

    /// Apply a unified diff to the tree.
    async fn apply(&self, tree: &Path, diff: &str) -> DomainResult<ApplyResult>;

    /// Roll the tree back to the baseline snapshot.
    async fn revert(&self, tree: &Path) -> DomainResult<()>;
}
