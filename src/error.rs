//! Error types for the HRD survey.

use std::time::Duration;

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Settings store errors.
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error("Connection pool error: {0}")]
    Pool(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// LLM provider errors.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("Provider {provider} request failed: {reason}")]
    RequestFailed { provider: String, reason: String },

    #[error("Provider {provider} timed out after {timeout:?}")]
    Timeout { provider: String, timeout: Duration },

    #[error("Provider {provider} rate limited")]
    RateLimited { provider: String },

    #[error("Invalid response from {provider}: {reason}")]
    InvalidResponse { provider: String, reason: String },

    #[error("Authentication failed for provider {provider}")]
    AuthFailed { provider: String },

    #[error("API key is not configured for provider {provider}")]
    MissingApiKey { provider: String },
}

/// Errors from the proposal endpoint, as seen by the requesting side.
#[derive(Debug, thiserror::Error)]
pub enum ProposalError {
    #[error("{0}")]
    Transport(String),

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// The endpoint answered non-2xx; `message` is its `error` field when present.
    #[error("{message}")]
    Rejected { status: u16, message: String },

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Generation failed: {0}")]
    Generation(#[from] LlmError),
}

/// Survey schema errors.
#[derive(Debug, thiserror::Error)]
pub enum SurveyError {
    #[error("Survey has no steps")]
    Empty,

    #[error("Duplicate step id: {0}")]
    DuplicateStep(String),

    #[error("Duplicate question id {question_id} in step {step_id}")]
    DuplicateQuestion { step_id: String, question_id: String },

    #[error("Choice question {question_id} in step {step_id} has no options")]
    MissingOptions { step_id: String, question_id: String },
}
