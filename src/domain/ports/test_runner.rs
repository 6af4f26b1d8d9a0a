//! Test runner port - interface for dynamic test backends.

use std::path::Path;

use async_trait::async_trait;

use crate::domain::errors::DomainResult;
use crate::domain::models::{Language, TestReport};

/// Contract for test runners: project path in, pass/fail + logs out.
#[async_trait]
pub trait TestRunner: Send + Sync {
    /// Language this runner understands.
    fn language(&self) -> Language;

    /// Execute the project's test suite (or the configured fallback checks)
    /// and return structured case results.
    async fn run(&self, project: &Path) -> DomainResult<TestReport>;
}
