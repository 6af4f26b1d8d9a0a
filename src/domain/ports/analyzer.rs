//! Analyzer port - interface for static analysis backends.

use std::path::Path;

use async_trait::async_trait;

use crate::domain::errors::DomainResult;
use crate::domain::models::{AnalysisReport, Language};

/// Contract for static analyzers: project path in, findings out.
///
/// Implementations wrap external linters (pylint, cppcheck, ...) and
/// normalize their output; the tools themselves are not reimplemented.
#[async_trait]
pub trait Analyzer: Send + Sync {
    /// Language this analyzer understands.
    fn language(&self) -> Language;

    /// Run all configured analysis tools against the project tree and
    /// produce a combined report with extracted findings and snippets.
    async fn analyze(&self, project: &Path) -> DomainResult<AnalysisReport>;
}
