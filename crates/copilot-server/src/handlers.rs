//! HTTP Handlers

use std::str::FromStr;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
};
use serde::{Deserialize, Serialize};

use yield_advisor::{ActionIntent, AdvisorError, Asset, SourceError, WalletBalances};

use crate::auth::{AuthError, Authenticated};
use crate::state::AppState;

// ============================================================================
// Request / Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub llm_provider: String,
    pub renderer: String,
    pub responder: String,
    pub max_risk_score: u8,
}

#[derive(Debug, Deserialize)]
pub struct SuggestionQuery {
    pub asset: String,
}

#[derive(Debug, Serialize)]
pub struct SuggestionResponse {
    pub suggestion_text: String,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub response: String,
    pub action_intent: Option<ActionIntent>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

pub type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, code: &str, error: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
            code: code.into(),
        }),
    )
}

fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<Authenticated, ApiError> {
    state.verifier.authenticate(headers).map_err(|e| {
        tracing::warn!("Rejected request: {}", e);
        api_error(
            StatusCode::UNAUTHORIZED,
            "UNAUTHORIZED",
            "Could not validate credentials",
        )
    })
}

fn wallet_of(auth: &Authenticated) -> Result<&str, ApiError> {
    auth.claims.solana_pubkey.as_deref().ok_or_else(|| {
        tracing::error!("Token is missing the 'solanaPubkey' claim");
        api_error(
            StatusCode::UNAUTHORIZED,
            "UNAUTHORIZED",
            AuthError::Malformed("missing solanaPubkey claim").to_string(),
        )
    })
}

// ============================================================================
// Handlers
// ============================================================================

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        llm_provider: state.llm_provider.clone(),
        renderer: state.suggestions.renderer_name(),
        responder: state.responder.name(),
        max_risk_score: state.suggestions.max_risk_score(),
    })
}

/// One rendered yield suggestion for an asset
pub async fn get_suggestion(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(query): Query<SuggestionQuery>,
    headers: HeaderMap,
) -> Result<Json<SuggestionResponse>, ApiError> {
    let auth = authenticate(&state, &headers)?;

    let asset = Asset::from_str(&query.asset).map_err(|e| {
        tracing::warn!(user_id = %user_id, "Rejected suggestion request: {}", e);
        api_error(StatusCode::BAD_REQUEST, "INVALID_ASSET", e)
    })?;

    tracing::info!(user_id = %user_id, asset = %asset, "Suggestion requested");

    let suggestion = state
        .suggestions
        .suggest(&user_id, &auth.token, asset)
        .await
        .map_err(|e| {
            tracing::error!(user_id = %user_id, asset = %asset, "Suggestion failed: {}", e);
            match &e {
                AdvisorError::Upstream(SourceError::Unauthorized(_)) => api_error(
                    StatusCode::UNAUTHORIZED,
                    "BACKEND_UNAUTHORIZED",
                    "Could not validate credentials",
                ),
                AdvisorError::Upstream(_) => {
                    api_error(StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR", e.user_message())
                }
                _ => api_error(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "AI_GENERATION_ERROR",
                    e.user_message(),
                ),
            }
        })?;

    Ok(Json(SuggestionResponse {
        suggestion_text: suggestion.text,
    }))
}

/// One chat turn with account context
pub async fn chat_handler(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    headers: HeaderMap,
    Json(payload): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    let auth = authenticate(&state, &headers)?;
    let wallet = wallet_of(&auth)?;

    if payload.message.trim().is_empty() {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            "EMPTY_MESSAGE",
            "Message must not be empty",
        ));
    }

    tracing::info!(user_id = %user_id, "Chat message received");

    let context = state
        .context
        .build_context(&user_id, &auth.token, Some(wallet))
        .await;
    let reply = state.responder.respond(&payload.message, &context).await;

    if let Some(action) = &reply.action {
        tracing::info!(user_id = %user_id, ?action, "Action intent detected");
    }

    Ok(Json(ChatResponse {
        response: reply.text,
        action_intent: reply.action,
    }))
}

/// On-chain balances of the token holder's wallet
pub async fn get_balances(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<WalletBalances>, ApiError> {
    let auth = authenticate(&state, &headers)?;
    let wallet = wallet_of(&auth)?;

    tracing::info!(wallet = %wallet, "Balance request");

    match state.balances.fetch_balances(wallet).await {
        Ok(Some(balances)) => Ok(Json(balances)),
        Ok(None) => Err(api_error(
            StatusCode::NOT_FOUND,
            "BALANCES_NOT_FOUND",
            "Could not retrieve balances for the wallet address.",
        )),
        Err(e) => {
            tracing::error!(wallet = %wallet, "Balance fetch failed: {}", e);
            let status = match &e {
                SourceError::MalformedAddress(_) => StatusCode::BAD_REQUEST,
                SourceError::Timeout => StatusCode::GATEWAY_TIMEOUT,
                _ => StatusCode::BAD_GATEWAY,
            };
            Err(api_error(
                status,
                "BALANCE_ERROR",
                format!("Failed to retrieve wallet balances ({}).", e.category()),
            ))
        }
    }
}
