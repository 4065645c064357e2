//! Downstream language-model client.
//!
//! The gateway only ever hands a backend the firewall's sanitized text.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use crate::config::{BackendConfig, BackendKind};

#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("request to LLM backend failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("LLM backend returned HTTP {0}")]
    Status(u16),

    #[error("LLM backend response had no answer")]
    EmptyAnswer,
}

#[async_trait]
pub trait LlmBackend: Send + Sync {
    /// Send `prompt` and return the model's answer.
    async fn complete(&self, prompt: &str) -> Result<String, BackendError>;
}

/// Build the backend selected in `config`.
pub fn from_config(config: &BackendConfig) -> Result<Box<dyn LlmBackend>, BackendError> {
    Ok(match config.kind {
        BackendKind::Mock => Box::new(MockBackend),
        BackendKind::Http => Box::new(HttpBackend::new(config)?),
    })
}

// ---------------------------------------------------------------------------
// MockBackend
// ---------------------------------------------------------------------------

/// Canned answers for demos and tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct MockBackend;

#[async_trait]
impl LlmBackend for MockBackend {
    async fn complete(&self, prompt: &str) -> Result<String, BackendError> {
        Ok(format!("[simulated LLM] I received your request: \"{prompt}\""))
    }
}

// ---------------------------------------------------------------------------
// HttpBackend
// ---------------------------------------------------------------------------

/// OpenAI-compatible chat-completions client.
pub struct HttpBackend {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: Option<String>,
}

impl HttpBackend {
    pub fn new(config: &BackendConfig) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            endpoint: format!("{}/chat/completions", config.url.trim_end_matches('/')),
            model: config.model.clone(),
            api_key: config.api_key.clone(),
        })
    }
}

#[async_trait]
impl LlmBackend for HttpBackend {
    async fn complete(&self, prompt: &str) -> Result<String, BackendError> {
        let body = json!({
            "model": self.model,
            "messages": [{ "role": "user", "content": prompt }],
        });

        let mut req = self.client.post(&self.endpoint).json(&body);
        if let Some(key) = &self.api_key {
            req = req.bearer_auth(key);
        }

        let resp = req.send().await?;
        let status = resp.status();
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "LLM backend error");
            return Err(BackendError::Status(status.as_u16()));
        }

        let parsed: ChatResponse = resp.json().await?;
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or(BackendError::EmptyAnswer)
    }
}
