//! Filesystem job persistence.
//!
//! Each workspace directory doubles as the job's record store:
//!
//! ```text
//! <root>/<workspace_id>/
//!   project/        extracted tree (owned by the patcher)
//!   job.json        job record
//!   status          one-word status marker
//!   result.json     terminal result artifact
//!   report.txt      clean dynamic report
//!   report_raw.txt  raw dynamic report
//!   error.txt       pipeline error detail
//! ```
//!
//! Status polling reads only the marker files, so external watchers can
//! follow a job without parsing JSON.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{Job, JobResult};
use crate::domain::ports::{JobPoll, JobRepository};

pub struct FsJobRepository {
    root: PathBuf,
}

impl FsJobRepository {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn workspace_dir(&self, workspace_id: &str) -> PathBuf {
        self.root.join(workspace_id)
    }

    async fn write_record(&self, job: &Job) -> DomainResult<()> {
        let dir = self.workspace_dir(&job.workspace_id);
        tokio::fs::create_dir_all(&dir).await?;
        let json = serde_json::to_string_pretty(job)?;
        tokio::fs::write(dir.join("job.json"), json).await?;
        tokio::fs::write(dir.join("status"), job.status.as_str()).await?;
        debug!(workspace = %job.workspace_id, status = job.status.as_str(), "Job record written");
        Ok(())
    }

    async fn read_job(&self, dir: &Path) -> DomainResult<Option<Job>> {
        let path = dir.join("job.json");
        match tokio::fs::read_to_string(&path).await {
            Ok(text) => Ok(Some(serde_json::from_str(&text)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl JobRepository for FsJobRepository {
    async fn create(&self, job: &Job) -> DomainResult<()> {
        job.validate().map_err(DomainError::ValidationFailed)?;
        self.write_record(job).await
    }

    async fn update(&self, job: &Job) -> DomainResult<()> {
        self.write_record(job).await
    }

    async fn load(&self, workspace_id: &str) -> DomainResult<Option<Job>> {
        self.read_job(&self.workspace_dir(workspace_id)).await
    }

    async fn list(&self) -> DomainResult<Vec<Job>> {
        let mut jobs = Vec::new();
        let mut entries = match tokio::fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(jobs),
            Err(e) => return Err(e.into()),
        };
        while let Some(entry) = entries.next_entry().await? {
            if !entry.path().is_dir() {
                continue;
            }
            if let Some(job) = self.read_job(&entry.path()).await? {
                jobs.push(job);
            }
        }
        jobs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(jobs)
    }

    async fn write_result(&self, job: &Job, result: &JobResult) -> DomainResult<()> {
        let dir = self.workspace_dir(&job.workspace_id);
        tokio::fs::create_dir_all(&dir).await?;
        let json = serde_json::to_string_pretty(result)?;
        tokio::fs::write(dir.join("result.json"), json).await?;
        tokio::fs::write(dir.join("report.txt"), &result.dynamic).await?;
        tokio::fs::write(dir.join("report_raw.txt"), &result.dynamic_raw).await?;
        debug!(workspace = %job.workspace_id, "Result artifact written");
        Ok(())
    }

    async fn write_error(&self, job: &Job, detail: &str) -> DomainResult<()> {
        let dir = self.workspace_dir(&job.workspace_id);
        tokio::fs::create_dir_all(&dir).await?;
        tokio::fs::write(dir.join("error.txt"), detail).await?;
        tokio::fs::write(dir.join("status"), "errored").await?;
        Ok(())
    }

    async fn poll(&self, workspace_id: &str) -> DomainResult<JobPoll> {
        let dir = self.workspace_dir(workspace_id);
        if !dir.is_dir() {
            return Ok(JobPoll::NotFound);
        }

        let result_path = dir.join("result.json");
        if result_path.is_file() {
            let text = tokio::fs::read_to_string(&result_path).await?;
            let result: JobResult = serde_json::from_str(&text)?;
            return Ok(JobPoll::Done(Box::new(result)));
        }

        let error_path = dir.join("error.txt");
        if error_path.is_file() {
            let detail = tokio::fs::read_to_string(&error_path).await?;
            return Ok(JobPoll::Errored(detail));
        }

        Ok(JobPoll::Processing)
    }
}
