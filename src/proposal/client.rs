//! HTTP client for the proposal endpoint (`POST {surveyData}` → `{proposal}`).

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::generator::ProposalGenerator;
use crate::error::ProposalError;
use crate::survey::AnswerStore;

/// Request body accepted by the proposal endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProposalRequestBody {
    #[serde(rename = "surveyData", default)]
    pub survey_data: Option<AnswerStore>,
}

/// Success body returned by the proposal endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProposalResponseBody {
    pub proposal: String,
}

/// Failure body returned by the proposal endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// User-facing text for a non-2xx reply: the body's `error` field when it
/// carries any text, else the status line.
fn rejection_message(status: u16, body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .map(|b| b.error)
        .filter(|error| !error.trim().is_empty())
        .unwrap_or_else(|| format!("Request failed with status {status}"))
}

/// Calls a remote proposal endpoint. The prompt is built server-side.
pub struct HttpProposalClient {
    client: reqwest::Client,
    endpoint: String,
    timeout: Duration,
}

impl HttpProposalClient {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, ProposalError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProposalError::Transport(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            timeout,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ProposalGenerator for HttpProposalClient {
    async fn generate(&self, answers: &AnswerStore) -> Result<String, ProposalError> {
        let body = ProposalRequestBody {
            survey_data: Some(answers.clone()),
        };

        debug!(endpoint = %self.endpoint, "Requesting proposal");
        let response = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProposalError::Timeout(self.timeout)
                } else {
                    ProposalError::Transport(e.to_string())
                }
            })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ProposalError::Transport(e.to_string()))?;

        if !status.is_success() {
            warn!(status = %status, "Proposal endpoint returned an error");
            return Err(ProposalError::Rejected {
                status: status.as_u16(),
                message: rejection_message(status.as_u16(), &text),
            });
        }

        let parsed: ProposalResponseBody = serde_json::from_str(&text)
            .map_err(|e| ProposalError::MalformedResponse(e.to_string()))?;
        Ok(parsed.proposal)
    }
}
