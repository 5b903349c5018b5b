//! REST endpoints: proposal generation, survey schema, and theme preference.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use tokio::sync::RwLock;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tracing::{error, info, warn};

use crate::error::ProposalError;
use crate::proposal::{ProposalGenerator, render};
use crate::proposal::client::{ErrorBody, ProposalResponseBody};
use crate::settings::{Theme, ThemeSettings};
use crate::survey::{AnswerStore, SurveySchema};

/// Shared state for all routes.
#[derive(Clone)]
pub struct AppState {
    pub generator: Arc<dyn ProposalGenerator>,
    pub schema: Arc<SurveySchema>,
    pub theme: Arc<RwLock<ThemeSettings>>,
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorBody {
            error: message.into(),
        }),
    )
        .into_response()
}

/// Reason text for a failed generation, without the requestor-side prefix.
fn generation_reason(err: &ProposalError) -> String {
    match err {
        ProposalError::Generation(inner) => inner.to_string(),
        other => other.to_string(),
    }
}

/// Parse a non-empty JSON request body, mapping failures to 400s.
fn parse_json_body(body: &[u8]) -> Result<serde_json::Value, Response> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(error_response(
            StatusCode::BAD_REQUEST,
            "Request body is empty",
        ));
    }

    serde_json::from_slice(body).map_err(|e| {
        error_response(
            StatusCode::BAD_REQUEST,
            format!("Request body is not valid JSON: {e}"),
        )
    })
}

/// Extract the Answer Store from a raw request body.
fn parse_survey_data(body: &[u8]) -> Result<AnswerStore, Response> {
    let value = parse_json_body(body)?;

    let survey_data = match value.get("surveyData") {
        None | Some(serde_json::Value::Null) => {
            return Err(error_response(
                StatusCode::BAD_REQUEST,
                "Missing surveyData in request body",
            ));
        }
        Some(data) => data.clone(),
    };

    serde_json::from_value(survey_data).map_err(|e| {
        error_response(
            StatusCode::BAD_REQUEST,
            format!("Invalid surveyData: {e}"),
        )
    })
}

/// POST /api/proposal
///
/// `{"surveyData": {...}}` → `{"proposal": "..."}`. The prompt is built here
/// from the server's own schema; the client only sends answers.
async fn create_proposal(State(state): State<AppState>, body: Bytes) -> Response {
    let answers = match parse_survey_data(&body) {
        Ok(answers) => answers,
        Err(response) => return response,
    };

    info!(answers = answers.answer_count(), "Generating proposal");
    match state.generator.generate(&answers).await {
        Ok(proposal) => Json(ProposalResponseBody { proposal }).into_response(),
        Err(e) => {
            error!(error = %e, "Proposal generation failed");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to generate proposal. {}", generation_reason(&e)),
            )
        }
    }
}

/// POST /api/proposal/render
///
/// `{"proposal": "..."}` → `{"html": "...", "blocks": [...]}` for web
/// front ends that display a proposal they already hold.
async fn render_proposal(body: Bytes) -> Response {
    let parsed = parse_json_body(&body).and_then(|value| {
        serde_json::from_value::<ProposalResponseBody>(value).map_err(|e| {
            error_response(StatusCode::BAD_REQUEST, format!("Invalid proposal body: {e}"))
        })
    });
    let proposal = match parsed {
        Ok(body) => body.proposal,
        Err(response) => return response,
    };

    let rendered = render(&proposal);
    Json(serde_json::json!({
        "html": rendered.to_html(),
        "blocks": rendered,
    }))
    .into_response()
}

async fn method_not_allowed() -> Response {
    error_response(StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed")
}

/// GET /health
async fn health() -> impl IntoResponse {
    Json(serde_json::json!({"status": "ok"}))
}

/// GET /api/survey
async fn get_survey(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.schema.as_ref().clone())
}

#[derive(Debug, Deserialize)]
struct ThemeBody {
    theme: String,
}

/// GET /api/settings/theme
async fn get_theme(State(state): State<AppState>) -> impl IntoResponse {
    let theme = state.theme.read().await.current();
    Json(serde_json::json!({"theme": theme}))
}

/// PUT /api/settings/theme
///
/// Body `{"theme": "light" | "dark"}`; persisted before responding.
async fn put_theme(State(state): State<AppState>, body: Bytes) -> Response {
    let parsed = parse_json_body(&body).and_then(|value| {
        serde_json::from_value::<ThemeBody>(value).map_err(|e| {
            error_response(StatusCode::BAD_REQUEST, format!("Invalid theme body: {e}"))
        })
    });
    let theme: Theme = match parsed.and_then(|body| {
        body.theme
            .parse::<Theme>()
            .map_err(|message| error_response(StatusCode::BAD_REQUEST, message))
    }) {
        Ok(theme) => theme,
        Err(response) => return response,
    };

    if let Err(e) = state.theme.write().await.set(theme).await {
        warn!("Failed to persist theme: {}", e);
        return error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Failed to save theme: {e}"),
        );
    }
    Json(serde_json::json!({"theme": theme})).into_response()
}

/// Build the application router.
pub fn proposal_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route(
            "/api/proposal",
            post(create_proposal).fallback(method_not_allowed),
        )
        .route(
            "/api/proposal/render",
            post(render_proposal).fallback(method_not_allowed),
        )
        .route("/api/survey", get(get_survey))
        .route("/api/settings/theme", get(get_theme).put(put_theme))
        .layer(ServiceBuilder::new().layer(CorsLayer::permissive()))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Method, Request};
    use tower::ServiceExt;

    use super::*;
    use crate::proposal::UnavailableGenerator;
    use crate::store::{LibSqlBackend, SettingsStore};

    /// Echoes the number of recorded answers back as the proposal.
    struct EchoGenerator;

    #[async_trait]
    impl ProposalGenerator for EchoGenerator {
        async fn generate(&self, answers: &AnswerStore) -> Result<String, ProposalError> {
            Ok(format!("## Proposal\n{} answers", answers.answer_count()))
        }
    }

    async fn app_with(generator: Arc<dyn ProposalGenerator>) -> Router {
        let store: Arc<dyn SettingsStore> = Arc::new(LibSqlBackend::new_memory().await.unwrap());
        let theme = ThemeSettings::load(store, Theme::Light).await;
        proposal_routes(AppState {
            generator,
            schema: Arc::new(SurveySchema::hrd_needs_analysis()),
            theme: Arc::new(RwLock::new(theme)),
        })
    }

    async fn send(app: Router, method: Method, uri: &str, body: &str) -> (StatusCode, serde_json::Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    #[tokio::test]
    async fn proposal_success() {
        let app = app_with(Arc::new(EchoGenerator)).await;
        let (status, json) = send(
            app,
            Method::POST,
            "/api/proposal",
            r#"{"surveyData": {"step1": {"q1": "Other"}}}"#,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["proposal"], "## Proposal\n1 answers");
    }

    #[tokio::test]
    async fn proposal_rejects_bad_bodies() {
        let app = app_with(Arc::new(EchoGenerator)).await;

        let (status, json) = send(app.clone(), Method::POST, "/api/proposal", "").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "Request body is empty");

        let (status, json) = send(app.clone(), Method::POST, "/api/proposal", "{}").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "Missing surveyData in request body");

        let (status, _) = send(app.clone(), Method::POST, "/api/proposal", "not json").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(
            app,
            Method::POST,
            "/api/proposal",
            r#"{"surveyData": {"step1": {"q1": 5}}}"#,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn proposal_rejects_other_methods() {
        let app = app_with(Arc::new(EchoGenerator)).await;
        let (status, json) = send(app, Method::GET, "/api/proposal", "").await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(json["error"], "Method Not Allowed");
    }

    #[tokio::test]
    async fn missing_key_is_a_500_with_reason() {
        let app = app_with(Arc::new(UnavailableGenerator::missing_api_key("gemini"))).await;
        let (status, json) = send(
            app,
            Method::POST,
            "/api/proposal",
            r#"{"surveyData": {}}"#,
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            json["error"],
            "Failed to generate proposal. API key is not configured for provider gemini"
        );
    }

    #[tokio::test]
    async fn health_and_survey() {
        let app = app_with(Arc::new(EchoGenerator)).await;
        let (status, json) = send(app.clone(), Method::GET, "/health", "").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "ok");

        let (status, json) = send(app, Method::GET, "/api/survey", "").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["steps"].as_array().unwrap().len(), 4);
        assert_eq!(json["steps"][0]["id"], "step1");
    }

    #[tokio::test]
    async fn theme_round_trip() {
        let app = app_with(Arc::new(EchoGenerator)).await;

        let (_, json) = send(app.clone(), Method::GET, "/api/settings/theme", "").await;
        assert_eq!(json["theme"], "light");

        let (status, json) =
            send(app.clone(), Method::PUT, "/api/settings/theme", r#"{"theme":"dark"}"#).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["theme"], "dark");

        let (_, json) = send(app.clone(), Method::GET, "/api/settings/theme", "").await;
        assert_eq!(json["theme"], "dark");

        let (status, _) =
            send(app, Method::PUT, "/api/settings/theme", r#"{"theme":"sepia"}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn malformed_theme_bodies_get_json_errors() {
        let app = app_with(Arc::new(EchoGenerator)).await;

        for body in ["", "{not json", r#"{"mode":"dark"}"#, r#"{"theme": 1}"#] {
            let (status, json) =
                send(app.clone(), Method::PUT, "/api/settings/theme", body).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "body {body:?}");
            assert!(json["error"].is_string(), "body {body:?}");
        }

        let (_, json) = send(app, Method::GET, "/api/settings/theme", "").await;
        assert_eq!(json["theme"], "light");
    }

    #[tokio::test]
    async fn render_returns_escaped_html_and_blocks() {
        let app = app_with(Arc::new(EchoGenerator)).await;
        let (status, json) = send(
            app.clone(),
            Method::POST,
            "/api/proposal/render",
            r###"{"proposal": "## Plan\n**Goal** <b>now</b>\n---"}"###,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            json["html"],
            "<h2>Plan</h2><p><strong>Goal</strong> &lt;b&gt;now&lt;/b&gt;</p><hr>"
        );
        assert_eq!(json["blocks"][0]["type"], "heading");
        assert_eq!(json["blocks"][2]["type"], "divider");

        let (status, json) =
            send(app, Method::POST, "/api/proposal/render", r#"{"text": "x"}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json["error"].is_string());
    }
}
