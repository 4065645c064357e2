//! Decision engine.
//!
//! A linear pipeline run once per prompt:
//!
//! ```text
//! text ─► normalizer ─► detector ──match──► BLOCK
//!                          │
//!                        clean
//!                          ▼
//!                      redactor ──fired──► ANONYMIZE
//!                          │
//!                        clean ──────────► ALLOW
//! ```
//!
//! BLOCK always pre-empts redaction: a blocked prompt never reaches the
//! redactor.

use tracing::{debug, info, warn};

use crate::detector::Detector;
use crate::error::FirewallError;
use crate::normalizer;
use crate::redactor::Redactor;
use crate::registry::Registry;
use crate::verdict::ScanResult;

/// The compiled scanning engine.
///
/// Immutable after construction and `Send + Sync`; share it behind an `Arc`
/// and call [`scan`](Self::scan) from any number of tasks.
#[derive(Debug)]
pub struct Firewall {
    detector: Detector,
    redactor: Redactor,
}

impl Firewall {
    /// Compile `registry`.  Any invalid pattern is an error; callers should
    /// refuse to start rather than run with a partial registry.
    pub fn new(registry: &Registry) -> Result<Self, FirewallError> {
        Ok(Self {
            detector: Detector::new(&registry.signatures)?,
            redactor: Redactor::new(&registry.pii_categories)?,
        })
    }

    /// Compile the built-in registry.
    pub fn builtin() -> Result<Self, FirewallError> {
        Self::new(&Registry::builtin())
    }

    /// Classify `text`.  Total: every input yields a verdict.
    pub fn scan(&self, text: &str) -> ScanResult {
        if text.is_empty() {
            debug!("empty prompt allowed");
            return ScanResult::allow(text);
        }

        let decoded = normalizer::normalize(text).filter(|d| d != text);
        let targets = std::iter::once(text).chain(decoded.as_deref());

        if let Some(sig) = self.detector.detect(targets) {
            warn!(
                signature = %sig.id,
                obfuscated = decoded.is_some(),
                "prompt injection blocked"
            );
            return ScanResult::block(&sig.id);
        }

        let redaction = self.redactor.redact(text);
        if redaction.is_empty() {
            debug!(len = text.len(), "prompt allowed");
            return ScanResult::allow(text);
        }

        let labels = redaction.labels();
        info!(categories = ?labels, "PII redacted from prompt");
        ScanResult::anonymize(&labels, redaction.sanitized_text.clone(), redaction.log())
    }

    pub fn signature_count(&self) -> usize {
        self.detector.signature_count()
    }

    pub fn pii_category_count(&self) -> usize {
        self.redactor.category_count()
    }
}
