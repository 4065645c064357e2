//! HTTP front door for the prompt firewall.
//!
//! ```text
//! client ──POST /analyze──► secure-gateway ──sanitized text──► LLM backend
//!                               │
//!                         [Firewall] ──► 403 on BLOCK
//!                               │
//!                         [Audit Sink]
//! ```

pub mod api;
pub mod backend;
pub mod cli;
pub mod config;
pub mod error;

use std::sync::Arc;

use audit_log::AuditSink;
use prompt_firewall::Firewall;

use crate::backend::LlmBackend;

/// Shared request-handling state.  Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub firewall: Arc<Firewall>,
    pub backend: Arc<dyn LlmBackend>,
    pub audit: AuditSink,
    pub max_body_bytes: usize,
}
