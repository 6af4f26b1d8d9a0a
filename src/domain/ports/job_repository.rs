//! Job repository port - persistence for job records and result artifacts.

use async_trait::async_trait;

use crate::domain::errors::DomainResult;
use crate::domain::models::{Job, JobResult};

/// What a status poll observes for a workspace id.
#[derive(Debug, Clone, PartialEq)]
pub enum JobPoll {
    /// No such workspace
    NotFound,
    /// Job exists but has not reached a terminal state
    Processing,
    /// Terminal success/failure with the persisted result artifact
    Done(Box<JobResult>),
    /// The pipeline errored before producing a result
    Errored(String),
}

/// Persistence contract for jobs.
///
/// Jobs are created on submit, updated through the pipeline, and their
/// result artifact is written exactly once on terminal state.
#[async_trait]
pub trait JobRepository: Send + Sync {
    /// Persist a newly created job record.
    async fn create(&self, job: &Job) -> DomainResult<()>;

    /// Persist an updated job record.
    async fn update(&self, job: &Job) -> DomainResult<()>;

    /// Load a job by workspace id.
    async fn load(&self, workspace_id: &str) -> DomainResult<Option<Job>>;

    /// List all known jobs, newest first.
    async fn list(&self) -> DomainResult<Vec<Job>>;

    /// Persist the terminal result artifact for a job.
    async fn write_result(&self, job: &Job, result: &JobResult) -> DomainResult<()>;

    /// Record that the pipeline errored for a job.
    async fn write_error(&self, job: &Job, detail: &str) -> DomainResult<()>;

    /// Poll the externally visible status of a workspace.
    async fn poll(&self, workspace_id: &str) -> DomainResult<JobPoll>;
}
