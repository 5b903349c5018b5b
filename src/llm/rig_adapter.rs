//! Adapter from a rig-core `CompletionModel` to our `LlmProvider` trait.

use std::time::Duration;

use async_trait::async_trait;
use rig::completion::{AssistantContent, CompletionModel, Message};
use rust_decimal::Decimal;
use tracing::debug;

use super::costs::model_cost;
use super::provider::{CompletionRequest, CompletionResponse, LlmProvider, Role};
use crate::error::LlmError;

/// Wraps any rig completion model. One call is one HTTP request; rig's
/// client does not retry and neither does this adapter.
pub struct RigAdapter<M> {
    model: M,
    model_name: String,
    provider: &'static str,
    timeout: Option<Duration>,
}

impl<M: CompletionModel> RigAdapter<M> {
    pub fn new(model: M, model_name: &str, provider: &'static str) -> Self {
        Self {
            model,
            model_name: model_name.to_string(),
            provider,
            timeout: None,
        }
    }

    /// Fail a call with `LlmError::Timeout` after `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// A request reshaped the way rig takes it.
#[derive(Debug)]
struct RigPrompt {
    preamble: Option<String>,
    history: Vec<Message>,
    prompt: String,
}

/// System messages become the preamble, the final user message the prompt,
/// everything between it the chat history. `None` when the conversation
/// does not end on a user turn.
fn to_rig_prompt(request: &CompletionRequest) -> Option<RigPrompt> {
    let mut turns: Vec<_> = request
        .messages
        .iter()
        .filter(|m| m.role != Role::System)
        .collect();
    let last = turns.pop().filter(|m| m.role == Role::User)?;

    let history = turns
        .into_iter()
        .map(|m| match m.role {
            Role::Assistant => Message::assistant(m.content.clone()),
            _ => Message::user(m.content.clone()),
        })
        .collect();

    Some(RigPrompt {
        preamble: request.system_prompt(),
        history,
        prompt: last.content.clone(),
    })
}

fn response_text<'a>(choice: impl IntoIterator<Item = &'a AssistantContent>) -> String {
    choice
        .into_iter()
        .filter_map(|content| match content {
            AssistantContent::Text(text) => Some(text.text.as_str()),
            _ => None,
        })
        .collect()
}

/// rig reports provider failures as text; pick out the statuses callers
/// act on differently.
fn classify_failure(provider: &str, reason: String) -> LlmError {
    let lower = reason.to_ascii_lowercase();
    if lower.contains("429") || lower.contains("rate limit") || lower.contains("resource_exhausted") {
        LlmError::RateLimited {
            provider: provider.to_string(),
        }
    } else if lower.contains("401") || lower.contains("invalid x-api-key") || lower.contains("api key not valid") {
        LlmError::AuthFailed {
            provider: provider.to_string(),
        }
    } else {
        LlmError::RequestFailed {
            provider: provider.to_string(),
            reason,
        }
    }
}

fn token_count(n: u64) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

#[async_trait]
impl<M> LlmProvider for RigAdapter<M>
where
    M: CompletionModel + 'static,
{
    fn model_name(&self) -> &str {
        &self.model_name
    }

    fn cost_per_token(&self) -> (Decimal, Decimal) {
        model_cost(&self.model_name)
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let prompt = to_rig_prompt(&request).ok_or_else(|| LlmError::RequestFailed {
            provider: self.provider.to_string(),
            reason: "request must end with a user message".to_string(),
        })?;

        let mut builder = self
            .model
            .completion_request(Message::user(prompt.prompt))
            .messages(prompt.history);
        if let Some(preamble) = prompt.preamble {
            builder = builder.preamble(preamble);
        }

        debug!(provider = self.provider, model = %self.model_name, "Sending completion");
        let sent = builder.send();
        let result = match self.timeout {
            Some(timeout) => tokio::time::timeout(timeout, sent)
                .await
                .map_err(|_| LlmError::Timeout {
                    provider: self.provider.to_string(),
                    timeout,
                })?,
            None => sent.await,
        };
        let response = result.map_err(|e| classify_failure(self.provider, e.to_string()))?;

        Ok(CompletionResponse {
            content: response_text(response.choice.iter()),
            input_tokens: token_count(response.usage.input_tokens),
            output_tokens: token_count(response.usage.output_tokens),
        })
    }
}
