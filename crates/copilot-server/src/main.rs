//! Yield co-pilot HTTP Server
//!
//! Axum-based server exposing yield suggestions, chat with account context
//! and wallet balances.

mod auth;
mod config;
mod handlers;
mod state;

use std::sync::Arc;

use axum::{
    Router,
    http::HeaderValue,
    routing::{get, post},
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use agent_runtime::{LlmSettings, select_provider};
use yield_advisor::{
    AdvisorConfig, BackendVaultClient, BalanceSource, ContextAggregator, SolanaBalanceClient,
    SuggestionService, VaultSource, renderer_for, responder_for,
};

use crate::auth::TokenVerifier;
use crate::config::ServerConfig;
use crate::handlers::{chat_handler, get_balances, get_suggestion, health_check};
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment
    dotenvy::dotenv().ok();

    let server_config = ServerConfig::from_env()?;
    let advisor_config = AdvisorConfig::from_env()?;

    // Select the LLM provider once for the whole process
    let provider = select_provider(&LlmSettings::from_env())?;
    let llm_provider = match &provider {
        Some(provider) => {
            let info = provider.info();
            match provider.health_check().await {
                Ok(true) => tracing::info!("✓ Connected to {}", info),
                Ok(false) | Err(_) => tracing::warn!("⚠ {} not reachable yet", info),
            }
            info.to_string()
        }
        None => {
            tracing::warn!("⚠ No LLM configured - template suggestions, chat unavailable");
            tracing::warn!("  Set OPENAI_API_KEY, GOOGLE_API_KEY or LLM_PROVIDER=ollama in .env");
            "none".to_string()
        }
    };

    // Data sources
    let catalog = Arc::new(advisor_config.load_catalog()?);
    tracing::info!("Loaded {} pools, max risk score {}", catalog.len(), advisor_config.max_risk_score);

    let vaults: Arc<dyn VaultSource> = Arc::new(BackendVaultClient::new(
        &server_config.backend_url,
        server_config.http_timeout,
    )?);
    let balances: Arc<dyn BalanceSource> = Arc::new(SolanaBalanceClient::new(
        &server_config.solana_rpc_url,
        server_config.http_timeout,
    )?);
    tracing::info!("Backend: {}", server_config.backend_url);
    tracing::info!("Solana RPC: {}", server_config.solana_rpc_url);

    // Build application state
    let renderer = renderer_for(provider.clone());
    let responder = responder_for(provider);

    let state = AppState {
        suggestions: Arc::new(SuggestionService::new(
            &advisor_config,
            catalog,
            vaults.clone(),
            renderer,
        )),
        context: Arc::new(
            ContextAggregator::new(vaults, balances.clone()).with_timeout(advisor_config.fetch_timeout),
        ),
        responder,
        balances,
        verifier: Arc::new(TokenVerifier::new(&server_config.jwt_secret)),
        llm_provider,
    };

    // CORS configuration
    let cors = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    let cors = if server_config.cors_origins.is_empty() {
        cors.allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> = server_config
            .cors_origins
            .iter()
            .filter_map(|origin| match origin.parse() {
                Ok(value) => Some(value),
                Err(_) => {
                    tracing::warn!("Ignoring invalid CORS origin '{}'", origin);
                    None
                }
            })
            .collect();
        cors.allow_origin(origins)
    };

    // Build router
    let app = Router::new()
        .route("/health", get(health_check))
        .route("/api/v1/suggestions/{user_id}", get(get_suggestion))
        .route("/api/v1/chat/{user_id}", post(chat_handler))
        .route("/api/v1/balances", get(get_balances))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&server_config.bind_addr).await?;

    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("🚀 yield co-pilot running on http://{}", server_config.bind_addr);
    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("");
    tracing::info!("Endpoints:");
    tracing::info!("  GET  /health                          - Health check");
    tracing::info!("  GET  /api/v1/suggestions/{{user_id}}    - Yield suggestion (?asset=USDC)");
    tracing::info!("  POST /api/v1/chat/{{user_id}}           - Chat with account context");
    tracing::info!("  GET  /api/v1/balances                 - Wallet balances");
    tracing::info!("");

    axum::serve(listener, app).await?;

    Ok(())
}
