//! `fixpoint list` - show known jobs.

use anyhow::{Context, Result};

use crate::adapters::storage::FsJobRepository;
use crate::cli::output::format_jobs_table;
use crate::domain::models::Config;
use crate::domain::ports::JobRepository;

pub async fn execute(config: Config, limit: usize, json: bool) -> Result<()> {
    let repo = FsJobRepository::new(&config.workspaces.root);
    let mut jobs = repo.list().await.context("Failed to list jobs")?;
    jobs.truncate(limit);

    if json {
        println!("{}", serde_json::to_string_pretty(&jobs)?);
    } else if jobs.is_empty() {
        println!("No jobs found");
    } else {
        println!("{}", format_jobs_table(&jobs));
    }
    Ok(())
}
