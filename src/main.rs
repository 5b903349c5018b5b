use std::sync::Arc;

use anyhow::Context;
use tokio::sync::RwLock;

use hrd_survey::cli::SurveyRepl;
use hrd_survey::config::AppConfig;
use hrd_survey::error::LlmError;
use hrd_survey::llm::create_provider;
use hrd_survey::proposal::{
    HttpProposalClient, LlmProposalGenerator, ProposalGenerator, ProposalRequestor,
    UnavailableGenerator,
};
use hrd_survey::server::{AppState, proposal_routes};
use hrd_survey::settings::ThemeSettings;
use hrd_survey::store::{LibSqlBackend, SettingsStore};
use hrd_survey::survey::{SurveySchema, SurveySession};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing (stderr keeps the form on stdout readable)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = AppConfig::from_env().context("Invalid configuration")?;

    eprintln!("📋 HRD Survey v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Model: {} ({})", config.llm.model, config.llm.backend.name());
    eprintln!("   API: http://127.0.0.1:{}/api/proposal", config.port);
    eprintln!("   Type :help for commands, :quit to exit.\n");

    // ── Settings ─────────────────────────────────────────────────────────
    let store: Arc<dyn SettingsStore> = Arc::new(
        LibSqlBackend::new_local(&config.db_path)
            .await
            .with_context(|| format!("Failed to open database at {}", config.db_path.display()))?,
    );
    let theme = Arc::new(RwLock::new(
        ThemeSettings::load(store, config.system_theme).await,
    ));
    eprintln!("   Database: {}", config.db_path.display());
    eprintln!("   Theme: {}", theme.read().await.current());

    // ── Proposal server ──────────────────────────────────────────────────
    let schema = Arc::new(SurveySchema::hrd_needs_analysis());

    let generator: Arc<dyn ProposalGenerator> = match create_provider(&config.llm) {
        Ok(llm) => Arc::new(LlmProposalGenerator::new(llm, Arc::clone(&schema))),
        Err(LlmError::MissingApiKey { provider }) => {
            tracing::warn!(
                provider = %provider,
                "No API key configured; proposal requests will fail until one is set"
            );
            Arc::new(UnavailableGenerator::missing_api_key(provider))
        }
        Err(e) => return Err(e).context("Failed to create LLM provider"),
    };

    let app = proposal_routes(AppState {
        generator,
        schema: Arc::clone(&schema),
        theme: Arc::clone(&theme),
    });
    let listener = tokio::net::TcpListener::bind(("127.0.0.1", config.port))
        .await
        .with_context(|| format!("Failed to bind port {}", config.port))?;
    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!("Proposal server stopped: {}", e);
        }
    });
    tracing::info!(port = config.port, "Proposal server started");

    // ── Terminal form ────────────────────────────────────────────────────
    let endpoint = config.proposal_endpoint();
    let client = HttpProposalClient::new(&endpoint, config.request_timeout)
        .context("Failed to create proposal client")?;
    tracing::info!(endpoint = %client.endpoint(), "Proposals requested from");

    let session = SurveySession::new(schema).context("Invalid survey")?;
    let repl = SurveyRepl::new(
        session,
        ProposalRequestor::new(Arc::new(client)),
        theme,
    );
    repl.run().await.context("Failed to read stdin")?;

    eprintln!("Bye.");
    Ok(())
}
