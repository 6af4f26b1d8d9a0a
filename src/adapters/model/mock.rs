//! Mock model client for offline runs and tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use tracing::info;

use crate::domain::errors::DomainResult;
use crate::domain::models::{Patch, PatchProvenance};
use crate::domain::ports::{ModelClient, PatchRequest};
use crate::services::prompts;

/// Scripted model: each proposal round consumes the next queued reply and
/// parses it exactly like the HTTP client would. With no replies queued a
/// round yields zero candidates, which the loop treats as "nothing to try".
#[derive(Default)]
pub struct MockModelClient {
    replies: Mutex<VecDeque<String>>,
}

impl MockModelClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_replies(replies: Vec<String>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
        }
    }

    pub fn push_reply(&self, reply: impl Into<String>) {
        self.replies
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push_back(reply.into());
    }
}

#[async_trait]
impl ModelClient for MockModelClient {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn propose_patches(&self, request: &PatchRequest) -> DomainResult<Vec<Patch>> {
        let reply = self
            .replies
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .pop_front();

        let Some(reply) = reply else {
            info!(round = request.iteration, "Mock model has no reply queued");
            return Ok(Vec::new());
        };

        Ok(prompts::extract_diffs(&reply)
            .into_iter()
            .enumerate()
            .map(|(rank, diff)| {
                Patch::new(
                    request.job_id,
                    diff,
                    rank,
                    PatchProvenance {
                        model: "mock".to_string(),
                        iteration: request.iteration,
                    },
                )
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::Language;
    use uuid::Uuid;

    fn request() -> PatchRequest {
        PatchRequest {
            job_id: Uuid::new_v4(),
            language: Language::Python,
            report: String::new(),
            snippets: String::new(),
            failure_log: None,
            iteration: 1,
        }
    }

    #[tokio::test]
    async fn scripted_replies_are_parsed_in_order() {
        let mock = MockModelClient::with_replies(vec![
            "```diff\n--- a/x.py\n+++ b/x.py\n@@ -1 +1 @@\n-a\n+b\n```".to_string(),
        ]);

        let patches = mock.propose_patches(&request()).await.unwrap();
        assert_eq!(patches.len(), 1);
        assert_eq!(patches[0].rank, 0);
        assert_eq!(patches[0].provenance.model, "mock");

        // Queue exhausted
        assert!(mock.propose_patches(&request()).await.unwrap().is_empty());
    }
}
