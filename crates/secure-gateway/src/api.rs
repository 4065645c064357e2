use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::limit::RequestBodyLimitLayer;
use tracing::warn;

use prompt_firewall::Action;

use crate::error::GatewayError;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct PromptRequest {
    pub user_input: String,
    /// Accepted for client compatibility; not consulted by the firewall.
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LlmReply {
    pub answer: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AnalyzeResponse {
    pub status: String,
    pub action: Action,
    pub sanitized_text: String,
    pub original_censored: bool,
    pub redaction_log: Vec<String>,
    pub llm_reply: LlmReply,
}

pub fn router(state: AppState) -> Router {
    let body_limit = state.max_body_bytes;
    Router::new()
        .route("/", get(health_check))
        .route("/analyze", post(analyze_prompt))
        .layer(RequestBodyLimitLayer::new(body_limit))
        .with_state(state)
}

async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "running", "service": "LLM Firewall" }))
}

/// Scan the prompt, record the verdict, and forward sanitized text to the
/// backend unless it was blocked.
async fn analyze_prompt(
    State(state): State<AppState>,
    Json(req): Json<PromptRequest>,
) -> Result<Json<AnalyzeResponse>, GatewayError> {
    let result = state.firewall.scan(&req.user_input);
    state.audit.log(result.audit_entry()).await;

    if !result.action.is_forwardable() {
        return Err(GatewayError::Blocked(result.reason));
    }

    let answer = state
        .backend
        .complete(&result.sanitized_text)
        .await
        .map_err(|err| {
            warn!(%err, action = %result.action, "backend call failed");
            err
        })?;

    Ok(Json(AnalyzeResponse {
        status: "allowed".to_string(),
        action: result.action,
        original_censored: result.was_redacted(),
        sanitized_text: result.sanitized_text,
        redaction_log: result.redaction_log,
        llm_reply: LlmReply { answer },
    }))
}
