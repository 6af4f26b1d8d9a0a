//! `fixpoint submit` - intake an archive and queue a job.

use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};

use crate::adapters::storage::FsJobRepository;
use crate::domain::models::{Config, Job, Language};
use crate::domain::ports::JobRepository;
use crate::services::WorkspaceService;

pub async fn execute(
    config: Config,
    archive: PathBuf,
    language: Option<String>,
    max_iters: Option<u32>,
    json: bool,
) -> Result<()> {
    let requested = language
        .as_deref()
        .map(|s| Language::from_str(s).ok_or_else(|| anyhow!("unknown language '{s}'")))
        .transpose()?;

    let workspaces = WorkspaceService::new(&config.workspaces.root);
    let info = workspaces
        .intake_file(&archive, requested)
        .context("Failed to intake archive")?;

    let job = Job::new(&info.id, &info.root, info.language)
        .with_max_iters(max_iters.unwrap_or(config.repair.max_iters));
    let repo = FsJobRepository::new(&config.workspaces.root);
    repo.create(&job).await.context("Failed to persist job")?;

    if json {
        let output = serde_json::json!({
            "workspace": info.id,
            "language": info.language,
            "status": job.status.as_str(),
            "max_iters": job.max_iters,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("Job queued");
        println!("  Workspace: {}", info.id);
        println!("  Language:  {}", info.language.as_str());
        println!("  Budget:    {} iterations", job.max_iters);
        println!("\nRun it with: fixpoint run {}", info.id);
    }
    Ok(())
}
