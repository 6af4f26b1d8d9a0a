//! `fixpoint serve` - HTTP upload/status server with a background worker.

use anyhow::{Context, Result};
use tokio::sync::mpsc;
use tracing::info;

use crate::adapters::http::{serve, spawn_worker, AppState, HttpServerConfig};
use crate::domain::models::{Config, JobStatus};
use crate::infrastructure::Pipeline;

/// Jobs waiting in the channel before upload requests start failing.
const QUEUE_DEPTH: usize = 64;

pub async fn execute(config: Config, host: Option<String>, port: Option<u16>) -> Result<()> {
    let server = HttpServerConfig {
        host: host.unwrap_or_else(|| config.server.host.clone()),
        port: port.unwrap_or(config.server.port),
        max_upload_mb: config.server.max_upload_mb,
    };

    let pipeline = Pipeline::from_config(config).context("Failed to build pipeline")?;
    let (tx, rx) = mpsc::channel(QUEUE_DEPTH);
    let worker = spawn_worker(pipeline.repair.clone(), rx);

    // Jobs left queued by an earlier process get picked up again.
    let pending = pipeline
        .jobs
        .list()
        .await
        .context("Failed to scan for queued jobs")?;
    for job in pending
        .into_iter()
        .filter(|j| j.status == JobStatus::Queued)
        .rev()
    {
        info!(workspace = %job.workspace_id, "Re-queueing pending job");
        tx.send(job).await.ok();
    }

    let state = AppState::new(
        pipeline.workspaces.clone(),
        pipeline.jobs.clone(),
        tx,
        pipeline.config.repair.max_iters,
    );
    serve(&server, state).await?;

    worker.await.ok();
    Ok(())
}
