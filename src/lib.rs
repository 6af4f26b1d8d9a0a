//! Fixpoint - automated bug repair pipeline.
//!
//! Fixpoint takes an uploaded project archive, runs language-appropriate
//! static analyzers over it, asks a model for candidate patches, applies
//! them through git, and re-runs the project's tests until they pass or
//! the iteration budget runs out.
//!
//! # Architecture
//!
//! The crate follows Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain`): Pure models, errors, and ports
//! - **Service Layer** (`services`): The repair loop, intake, prompts,
//!   decision policy, and the evaluation harness
//! - **Adapters** (`adapters`): Port implementations against real tools -
//!   linters, git, test runners, the model API, storage, and HTTP
//! - **Infrastructure** (`infrastructure`): Configuration, logging,
//!   process execution, and wiring
//! - **CLI Layer** (`cli`): Command-line interface

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::errors::{DomainError, DomainResult};
pub use domain::models::{
    AnalysisReport, Config, Job, JobResult, JobStatus, Language, Patch, RepairSummary, TestReport,
};
pub use infrastructure::Pipeline;
pub use services::{RepairLoop, WorkspaceService};
