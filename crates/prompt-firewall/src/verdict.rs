use audit_log::{AuditEntry, AuditLevel};
use serde::{Deserialize, Serialize};

/// What the gateway should do with a prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    /// Forward the prompt unchanged.
    Allow,
    /// Forward the redacted prompt.
    Anonymize,
    /// Reject the prompt; nothing derived from it goes downstream.
    Block,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Allow => "ALLOW",
            Self::Anonymize => "ANONYMIZE",
            Self::Block => "BLOCK",
        }
    }

    pub fn is_forwardable(&self) -> bool {
        !matches!(self, Self::Block)
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The outcome of scanning one prompt.
///
/// For [`Action::Block`] `sanitized_text` is empty and `redaction_log` is
/// empty.  For [`Action::Allow`] `sanitized_text` is the input verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanResult {
    pub action: Action,
    pub reason: String,
    pub sanitized_text: String,
    pub redaction_log: Vec<String>,
}

impl ScanResult {
    pub(crate) fn allow(text: &str) -> Self {
        Self {
            action: Action::Allow,
            reason: "No threat detected".to_string(),
            sanitized_text: text.to_string(),
            redaction_log: Vec::new(),
        }
    }

    pub(crate) fn block(signature_id: &str) -> Self {
        Self {
            action: Action::Block,
            reason: format!("Malicious signature detected: '{signature_id}'"),
            sanitized_text: String::new(),
            redaction_log: Vec::new(),
        }
    }

    pub(crate) fn anonymize(labels: &[&str], sanitized_text: String, log: Vec<String>) -> Self {
        Self {
            action: Action::Anonymize,
            reason: format!("PII detected: {}", labels.join(", ")),
            sanitized_text,
            redaction_log: log,
        }
    }

    /// `true` when the forwarded text differs from the input.
    pub fn was_redacted(&self) -> bool {
        self.action == Action::Anonymize
    }

    /// Audit severity: WARNING for blocks, INFO otherwise.
    pub fn audit_level(&self) -> AuditLevel {
        match self.action {
            Action::Block => AuditLevel::Warning,
            Action::Allow | Action::Anonymize => AuditLevel::Info,
        }
    }

    /// Audit message.  Never contains the prompt itself.
    pub fn audit_message(&self) -> String {
        match self.action {
            Action::Block => format!("ATTACK BLOCKED | {}", self.reason),
            Action::Anonymize => format!(
                "PII REDACTED | {} | {}",
                self.reason,
                self.redaction_log.join("; ")
            ),
            Action::Allow => format!("PROMPT ALLOWED | {}", self.reason),
        }
    }

    /// Build the audit record for this verdict, stamped now.
    pub fn audit_entry(&self) -> AuditEntry {
        AuditEntry::new(self.audit_level(), self.audit_message())
    }
}
