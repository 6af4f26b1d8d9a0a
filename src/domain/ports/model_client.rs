//! Model client port - interface for patch-proposing LLM backends.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::errors::DomainResult;
use crate::domain::models::{Language, Patch};

/// Everything the model needs to propose candidate patches for one round.
#[derive(Debug, Clone)]
pub struct PatchRequest {
    /// Job the returned patches will belong to
    pub job_id: Uuid,
    pub language: Language,
    /// Static analysis report text (possibly truncated)
    pub report: String,
    /// Rendered source snippets around findings
    pub snippets: String,
    /// Test failure log from the previous round, when re-requesting
    pub failure_log: Option<String>,
    /// 1-based repair-loop iteration this request belongs to
    pub iteration: u32,
}

/// Contract for the patch-proposing model: prompt in, ranked diffs out.
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Backend name for logs and provenance.
    fn name(&self) -> &'static str;

    /// Ask the model for candidate patches. The returned list is ranked:
    /// index 0 is the model's preferred diff.
    async fn propose_patches(&self, request: &PatchRequest) -> DomainResult<Vec<Patch>>;
}
