//! Patch application through git.
//!
//! The project tree gets a baseline commit before the first apply; revert
//! is a checkout of that baseline plus a clean of untracked files, so no
//! iteration ever sees leftovers from a rejected candidate.

use std::path::Path;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{ApplyMode, ApplyResult};
use crate::domain::ports::Patcher;
use crate::infrastructure::process::CommandRunner;

/// Identity used for the baseline commit; never pushed anywhere.
const GIT_USER: [&str; 4] = [
    "-c",
    "user.email=pipeline@localhost",
    "-c",
    "user.name=repair-pipeline",
];

pub struct GitPatcher {
    runner: CommandRunner,
}

impl GitPatcher {
    pub fn new(runner: CommandRunner) -> Self {
        Self { runner }
    }

    async fn git(&self, tree: &Path, args: &[&str]) -> DomainResult<(bool, String)> {
        let mut full: Vec<&str> = GIT_USER.to_vec();
        full.extend_from_slice(args);
        let out = self.runner.run("git", &full, tree).await?;
        Ok((out.success(), out.output))
    }

    async fn try_apply(&self, tree: &Path, diff: &str, extra: &[&str]) -> DomainResult<(bool, String)> {
        let mut args: Vec<&str> = vec!["apply", "--whitespace=nowarn"];
        args.extend_from_slice(extra);
        args.push("-");
        let out = self.runner.run_with_stdin("git", &args, tree, diff).await?;
        Ok((out.success(), out.output))
    }
}

#[async_trait]
impl Patcher for GitPatcher {
    async fn prepare(&self, tree: &Path) -> DomainResult<()> {
        if !tree.join(".git").exists() {
            let (ok, out) = self.git(tree, &["init", "--quiet"]).await?;
            if !ok {
                return Err(DomainError::PatchFailed(format!("git init failed: {out}")));
            }
        }
        let (ok, out) = self.git(tree, &["add", "-A"]).await?;
        if !ok {
            return Err(DomainError::PatchFailed(format!("git add failed: {out}")));
        }
        let (ok, out) = self
            .git(
                tree,
                &["commit", "--quiet", "--allow-empty", "-m", "baseline"],
            )
            .await?;
        if !ok {
            return Err(DomainError::PatchFailed(format!(
                "baseline commit failed: {out}"
            )));
        }
        debug!(tree = %tree.display(), "Baseline snapshot committed");
        Ok(())
    }

    async fn apply(&self, tree: &Path, diff: &str) -> DomainResult<ApplyResult> {
        // Plain apply first, then the lenient modes the model's diffs
        // sometimes need: zero-context hunks, then per-hunk rejects.
        let attempts: [(ApplyMode, &[&str]); 3] = [
            (ApplyMode::Clean, &[]),
            (ApplyMode::UnidiffZero, &["--unidiff-zero"]),
            (ApplyMode::Reject, &["--reject"]),
        ];

        let mut last_error = String::new();
        for (mode, extra) in attempts {
            let (ok, out) = self.try_apply(tree, diff, extra).await?;
            if ok {
                info!(mode = mode.as_str(), "Patch applied");
                return Ok(ApplyResult::applied(mode));
            }
            last_error = out;
        }

        let first_line = last_error.lines().next().unwrap_or("patch rejected");
        warn!(error = first_line, "Patch did not apply in any mode");
        Ok(ApplyResult::conflict(first_line))
    }

    async fn revert(&self, tree: &Path) -> DomainResult<()> {
        let (ok, out) = self.git(tree, &["checkout", "--", "."]).await?;
        if !ok {
            return Err(DomainError::PatchFailed(format!(
                "git checkout failed: {out}"
            )));
        }
        // Drop .rej files and anything a patch created
        let (ok, out) = self.git(tree, &["clean", "-fdq"]).await?;
        if !ok {
            return Err(DomainError::PatchFailed(format!("git clean failed: {out}")));
        }
        debug!(tree = %tree.display(), "Tree reverted to baseline");
        Ok(())
    }
}
