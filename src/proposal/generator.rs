//! Proposal generators — turn a finished Answer Store into proposal text.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::error::{LlmError, ProposalError};
use crate::llm::costs::call_cost;
use crate::llm::{ChatMessage, CompletionRequest, LlmProvider};
use crate::survey::{AnswerStore, SurveySchema, build_prompt};

/// Something that can produce proposal text for a set of answers.
///
/// One call is one attempt. Implementations never retry; calling again
/// with the same answers is always allowed.
#[async_trait]
pub trait ProposalGenerator: Send + Sync {
    async fn generate(&self, answers: &AnswerStore) -> Result<String, ProposalError>;
}

/// Builds the prompt locally and sends it straight to an LLM.
pub struct LlmProposalGenerator {
    llm: Arc<dyn LlmProvider>,
    schema: Arc<SurveySchema>,
}

impl LlmProposalGenerator {
    pub fn new(llm: Arc<dyn LlmProvider>, schema: Arc<SurveySchema>) -> Self {
        Self { llm, schema }
    }
}

#[async_trait]
impl ProposalGenerator for LlmProposalGenerator {
    async fn generate(&self, answers: &AnswerStore) -> Result<String, ProposalError> {
        let prompt = build_prompt(&self.schema, answers);
        let request = CompletionRequest::new(vec![ChatMessage::user(prompt)]);

        let response = self.llm.complete(request).await?;

        let cost = call_cost(
            self.llm.cost_per_token(),
            response.input_tokens,
            response.output_tokens,
        );
        info!(
            model = self.llm.model_name(),
            input_tokens = response.input_tokens,
            output_tokens = response.output_tokens,
            cost_usd = %cost,
            "Proposal generated"
        );

        if response.content.trim().is_empty() {
            warn!(model = self.llm.model_name(), "LLM returned an empty proposal");
            return Err(ProposalError::Generation(LlmError::InvalidResponse {
                provider: self.llm.model_name().to_string(),
                reason: "empty proposal text".to_string(),
            }));
        }

        Ok(response.content)
    }
}

/// Stand-in used when no LLM could be configured at startup.
///
/// Every call fails with the startup reason, so the process stays up and
/// the endpoint reports the problem per request.
pub struct UnavailableGenerator {
    provider: String,
}

impl UnavailableGenerator {
    pub fn missing_api_key(provider: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
        }
    }
}

#[async_trait]
impl ProposalGenerator for UnavailableGenerator {
    async fn generate(&self, _answers: &AnswerStore) -> Result<String, ProposalError> {
        Err(ProposalError::Generation(LlmError::MissingApiKey {
            provider: self.provider.clone(),
        }))
    }
}
