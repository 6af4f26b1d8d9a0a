//! Job domain model.
//!
//! A job is one uploaded project moving through the repair pipeline:
//! analyze, propose patches, apply, test, iterate.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Source language of an uploaded project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Language {
    #[serde(rename = "py")]
    Python,
    #[serde(rename = "cpp")]
    Cpp,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Python => "py",
            Self::Cpp => "cpp",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "py" | "python" => Some(Self::Python),
            "cpp" | "c++" | "cxx" => Some(Self::Cpp),
            _ => None,
        }
    }

    /// Source file extension used for detection and finding extraction.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Python => "py",
            Self::Cpp => "cpp",
        }
    }
}

/// Status of a job in the repair pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// Job is accepted and waiting for the worker
    Queued,
    /// Job is being processed by the repair loop
    Running,
    /// Repair succeeded: the test suite passes
    Succeeded,
    /// Repair gave up: budget exhausted or patches rejected
    Failed,
    /// The pipeline itself broke (tool missing, storage error, ...)
    Errored,
}

impl Default for JobStatus {
    fn default() -> Self {
        Self::Queued
    }
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::Running => "running",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
            Self::Errored => "errored",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "queued" => Some(Self::Queued),
            "running" => Some(Self::Running),
            "succeeded" => Some(Self::Succeeded),
            "failed" => Some(Self::Failed),
            "errored" => Some(Self::Errored),
            _ => None,
        }
    }

    /// Check if this is a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed | Self::Errored)
    }

    /// Valid transitions from this status.
    pub fn valid_transitions(&self) -> Vec<JobStatus> {
        match self {
            Self::Queued => vec![Self::Running, Self::Errored],
            Self::Running => vec![Self::Succeeded, Self::Failed, Self::Errored],
            Self::Succeeded | Self::Failed | Self::Errored => vec![],
        }
    }

    pub fn can_transition_to(&self, new_status: Self) -> bool {
        self.valid_transitions().contains(&new_status)
    }
}

/// One uploaded project undergoing (or awaiting) repair.
///
/// A job owns at most one active iteration state; iteration records are
/// accumulated by the repair loop and persisted in the result artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    /// Unique identifier
    pub id: Uuid,
    /// Human-readable workspace id (sanitized archive name + timestamp)
    pub workspace_id: String,
    /// Workspace root directory owned by this job
    pub root: PathBuf,
    /// Detected or requested source language
    pub language: Language,
    /// Current status
    pub status: JobStatus,
    /// Error detail when status is Errored
    pub error: Option<String>,
    /// Iteration budget for the repair loop
    pub max_iters: u32,
    /// When created
    pub created_at: DateTime<Utc>,
    /// When last updated
    pub updated_at: DateTime<Utc>,
    /// When the worker picked the job up
    pub started_at: Option<DateTime<Utc>>,
    /// When the job reached a terminal state
    pub completed_at: Option<DateTime<Utc>>,
}

impl Job {
    /// Create a queued job for an extracted workspace.
    pub fn new(workspace_id: impl Into<String>, root: impl Into<PathBuf>, language: Language) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            workspace_id: workspace_id.into(),
            root: root.into(),
            language,
            status: JobStatus::default(),
            error: None,
            max_iters: 5,
            created_at: now,
            updated_at: now,
            started_at: None,
            completed_at: None,
        }
    }

    /// Set the iteration budget.
    pub fn with_max_iters(mut self, max_iters: u32) -> Self {
        self.max_iters = max_iters;
        self
    }

    /// Directory holding the extracted project tree.
    pub fn project_dir(&self) -> PathBuf {
        self.root.join("project")
    }

    /// Check if can transition to given status.
    pub fn can_transition_to(&self, new_status: JobStatus) -> bool {
        self.status.can_transition_to(new_status)
    }

    /// Transition to new status, updating timestamps.
    pub fn transition_to(&mut self, new_status: JobStatus) -> Result<(), String> {
        if !self.can_transition_to(new_status) {
            return Err(format!(
                "Cannot transition from {} to {}",
                self.status.as_str(),
                new_status.as_str()
            ));
        }

        self.status = new_status;
        self.updated_at = Utc::now();

        match new_status {
            JobStatus::Running => self.started_at = Some(Utc::now()),
            JobStatus::Succeeded | JobStatus::Failed | JobStatus::Errored => {
                self.completed_at = Some(Utc::now());
            }
            JobStatus::Queued => {}
        }

        Ok(())
    }

    /// Mark the job errored with a detail message.
    pub fn mark_errored(&mut self, detail: impl Into<String>) {
        self.error = Some(detail.into());
        self.status = JobStatus::Errored;
        self.updated_at = Utc::now();
        self.completed_at = Some(Utc::now());
    }

    /// Check if job is terminal.
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Validate the job record.
    pub fn validate(&self) -> Result<(), String> {
        if self.workspace_id.is_empty() {
            return Err("Job workspace id cannot be empty".to_string());
        }
        if self.root.as_os_str().is_empty() {
            return Err("Job workspace root cannot be empty".to_string());
        }
        if self.max_iters == 0 {
            return Err("Job iteration budget cannot be zero".to_string());
        }
        Ok(())
    }
}

/// Sanitize an archive stem into workspace-id-safe characters.
pub fn sanitize_workspace_name(stem: &str) -> String {
    let safe: String = stem
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if safe.is_empty() {
        "upload".to_string()
    } else {
        safe
    }
}

/// Derive a workspace id from an archive name and timestamp, ensuring
/// uniqueness against the given root by appending a counter.
pub fn workspace_id_for(root: &Path, archive_name: &str, now: DateTime<Utc>) -> String {
    let stem = Path::new(archive_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("upload");
    let safe = sanitize_workspace_name(stem);
    let ts = now.format("%Y%m%d_%H%M%S");
    let base = format!("{safe}_{ts}");

    if !root.join(&base).exists() {
        return base;
    }
    let mut counter = 1;
    loop {
        let candidate = format!("{base}_{counter}");
        if !root.join(&candidate).exists() {
            return candidate;
        }
        counter += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_creation() {
        let job = Job::new("demo_20250101_000000", "/tmp/ws/demo", Language::Python);
        assert_eq!(job.status, JobStatus::Queued);
        assert_eq!(job.language, Language::Python);
        assert_eq!(job.max_iters, 5);
        assert!(job.validate().is_ok());
    }

    #[test]
    fn test_job_state_transitions() {
        let mut job = Job::new("ws", "/tmp/ws", Language::Cpp);

        assert!(job.can_transition_to(JobStatus::Running));
        job.transition_to(JobStatus::Running).unwrap();
        assert!(job.started_at.is_some());

        job.transition_to(JobStatus::Succeeded).unwrap();
        assert!(job.completed_at.is_some());
        assert!(job.is_terminal());

        // Terminal states do not transition
        assert!(job.transition_to(JobStatus::Running).is_err());
    }

    #[test]
    fn test_queued_cannot_complete_directly() {
        let mut job = Job::new("ws", "/tmp/ws", Language::Python);
        assert!(job.transition_to(JobStatus::Succeeded).is_err());
        assert!(job.transition_to(JobStatus::Failed).is_err());
    }

    #[test]
    fn test_language_parsing() {
        assert_eq!(Language::from_str("py"), Some(Language::Python));
        assert_eq!(Language::from_str("Python"), Some(Language::Python));
        assert_eq!(Language::from_str("C++"), Some(Language::Cpp));
        assert_eq!(Language::from_str("rust"), None);
    }

    #[test]
    fn test_sanitize_workspace_name() {
        assert_eq!(sanitize_workspace_name("my project (v2)"), "my_project__v2_");
        assert_eq!(sanitize_workspace_name("safe-name_1"), "safe-name_1");
        assert_eq!(sanitize_workspace_name(""), "upload");
    }

    #[test]
    fn test_workspace_id_collision_counter() {
        let tmp = std::env::temp_dir().join(format!("fixpoint-test-{}", Uuid::new_v4()));
        std::fs::create_dir_all(&tmp).unwrap();
        let now = Utc::now();

        let first = workspace_id_for(&tmp, "demo.zip", now);
        std::fs::create_dir(tmp.join(&first)).unwrap();
        let second = workspace_id_for(&tmp, "demo.zip", now);
        assert_ne!(first, second);
        assert!(second.starts_with(&first));

        std::fs::remove_dir_all(&tmp).unwrap();
    }
}
