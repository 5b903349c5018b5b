//! Configuration types.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;

use crate::error::ConfigError;
use crate::llm::{LlmBackend, LlmConfig};
use crate::settings::Theme;

/// Application configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub llm: LlmConfig,
    /// Port the proposal server listens on (localhost).
    pub port: u16,
    /// Remote proposal endpoint. `None` means use the local server.
    pub proposal_url: Option<String>,
    /// libSQL settings database.
    pub db_path: PathBuf,
    /// Theme used when no preference has been stored.
    pub system_theme: Theme,
    /// Timeout for outbound HTTP calls (proposal endpoint and LLM).
    pub request_timeout: Duration,
}

impl AppConfig {
    /// Build config from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let backend: LlmBackend = match var("HRD_SURVEY_LLM_BACKEND") {
            Some(s) => s.parse().map_err(|message| ConfigError::InvalidValue {
                key: "HRD_SURVEY_LLM_BACKEND".to_string(),
                message,
            })?,
            None => LlmBackend::Gemini,
        };

        let api_key = match backend {
            LlmBackend::Gemini => var("GEMINI_API_KEY").or_else(|| var("API_KEY")),
            LlmBackend::Anthropic => var("ANTHROPIC_API_KEY"),
        }
        .map(SecretString::from);

        let model =
            var("HRD_SURVEY_MODEL").unwrap_or_else(|| backend.default_model().to_string());

        let port: u16 = var("HRD_SURVEY_PORT")
            .and_then(|s| s.parse().ok())
            .unwrap_or(8787);

        let request_timeout_secs: u64 = var("HRD_SURVEY_REQUEST_TIMEOUT_SECS")
            .and_then(|s| s.parse().ok())
            .unwrap_or(120);
        let request_timeout = Duration::from_secs(request_timeout_secs);

        let db_path = var("HRD_SURVEY_DB_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("./data/hrd-survey.db"));

        let system_theme: Theme = match var("HRD_SURVEY_SYSTEM_THEME") {
            Some(s) => s.parse().map_err(|message| ConfigError::InvalidValue {
                key: "HRD_SURVEY_SYSTEM_THEME".to_string(),
                message,
            })?,
            None => Theme::Light,
        };

        Ok(Self {
            llm: LlmConfig {
                backend,
                api_key,
                model,
                timeout: request_timeout,
            },
            port,
            proposal_url: var("HRD_SURVEY_PROPOSAL_URL"),
            db_path,
            system_theme,
            request_timeout,
        })
    }

    /// Endpoint the terminal form posts finished surveys to.
    pub fn proposal_endpoint(&self) -> String {
        self.proposal_url
            .clone()
            .unwrap_or_else(|| format!("http://127.0.0.1:{}/api/proposal", self.port))
    }
}
