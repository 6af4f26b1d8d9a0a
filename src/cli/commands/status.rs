//! `fixpoint status` - poll the externally visible state of a workspace.

use anyhow::{Context, Result};

use crate::adapters::storage::FsJobRepository;
use crate::domain::models::Config;
use crate::domain::ports::{JobPoll, JobRepository};

pub async fn execute(config: Config, workspace: String, json: bool) -> Result<()> {
    let repo = FsJobRepository::new(&config.workspaces.root);
    let poll = repo
        .poll(&workspace)
        .await
        .context("Failed to poll workspace")?;

    if json {
        let output = match &poll {
            JobPoll::NotFound => serde_json::json!({"status": "not_found"}),
            JobPoll::Processing => serde_json::json!({"status": "processing"}),
            JobPoll::Done(result) => serde_json::json!({"status": "done", "result": result}),
            JobPoll::Errored(detail) => serde_json::json!({"status": "error", "error": detail}),
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    match poll {
        JobPoll::NotFound => println!("Workspace '{workspace}' not found"),
        JobPoll::Processing => println!("Workspace '{workspace}' is still processing"),
        JobPoll::Done(result) => {
            println!("{}", result.dynamic);
            println!();
            println!(
                "Finished {} ({})",
                result.finished_at.format("%Y-%m-%d %H:%M:%S UTC"),
                if result.repair.success {
                    "succeeded"
                } else {
                    "failed"
                }
            );
        }
        JobPoll::Errored(detail) => println!("Workspace '{workspace}' errored: {detail}"),
    }
    Ok(())
}
