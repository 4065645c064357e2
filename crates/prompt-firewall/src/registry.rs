//! Signature registry.
//!
//! Holds the ordered catalogue of injection signatures and the ordered
//! mapping of PII category label to detection pattern.  The registry is plain
//! data: it is built once at start-up (from the built-in tables, optionally
//! extended by [`crate::loader`]) and then compiled into a
//! [`Firewall`](crate::Firewall).  Nothing here mutates after construction.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Definitions
// ---------------------------------------------------------------------------

/// A single injection signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureDef {
    /// Identifier reported verbatim in the block reason.
    pub id: String,
    /// Regex string, compiled case-insensitively.
    pub pattern: String,
}

/// A PII category and the pattern that detects it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PiiCategoryDef {
    /// Uppercase label, e.g. `EMAIL`.
    pub label: String,
    /// Regex string, compiled as written.
    pub pattern: String,
}

impl PiiCategoryDef {
    /// The token substituted for every match of this category.
    pub fn placeholder(&self) -> String {
        placeholder_for(&self.label)
    }
}

/// Render the canonical `<LABEL_REDACTED>` token for `label`.
pub fn placeholder_for(label: &str) -> String {
    format!("<{label}_REDACTED>")
}

// ---------------------------------------------------------------------------
// Built-in catalogue
// ---------------------------------------------------------------------------

/// Built-in injection signatures as `(id, pattern)`.
///
/// Order is significant: when several signatures match, the first one listed
/// here is the one reported.
pub static BUILTIN_SIGNATURES: &[(&str, &str)] = &[
    // ---- Instruction override ------------------------------------------
    ("ignore previous instructions", r"ignore previous instructions"),
    ("system override", r"system override"),
    ("ignore all rules", r"ignore all rules"),
    ("pwned", r"pwned"),
    // ---- Shell / SQL ---------------------------------------------------
    ("drop table", r"drop table"),
    ("sudo ", r"sudo "),
    ("rm -rf", r"rm -rf"),
    // ---- Jailbreak phrasing --------------------------------------------
    ("disregard previous instructions", r"disregard previous instructions"),
    ("jailbreak", r"jailbreak"),
    ("do anything now", r"do anything now"),
    ("developer mode", r"developer mode"),
    // ---- Code execution / markup ---------------------------------------
    ("<script", r"<script"),
    ("eval(", r"eval\("),
    ("exec(", r"exec\("),
    ("union select", r"union select"),
];

/// Built-in PII categories as `(label, pattern)`, in redaction order.
pub static BUILTIN_PII_CATEGORIES: &[(&str, &str)] = &[
    ("EMAIL", r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}"),
    // Known to over-match long digit runs such as order ids.
    ("CREDIT_CARD", r"\b(?:\d[ -]*?){13,16}\b"),
    ("AWS_KEY", r"AKIA[0-9A-Z]{16}"),
    ("SSN", r"\b\d{3}-\d{2}-\d{4}\b"),
];

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Ordered signatures plus ordered PII categories.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registry {
    pub signatures: Vec<SignatureDef>,
    pub pii_categories: Vec<PiiCategoryDef>,
}

impl Registry {
    /// The built-in catalogue.
    pub fn builtin() -> Self {
        let signatures = BUILTIN_SIGNATURES
            .iter()
            .map(|(id, pattern)| SignatureDef {
                id: (*id).to_string(),
                pattern: (*pattern).to_string(),
            })
            .collect();
        let pii_categories = BUILTIN_PII_CATEGORIES
            .iter()
            .map(|(label, pattern)| PiiCategoryDef {
                label: (*label).to_string(),
                pattern: (*pattern).to_string(),
            })
            .collect();
        Self {
            signatures,
            pii_categories,
        }
    }

    /// Append `signatures` and `pii_categories` after the existing entries,
    /// preserving their order.
    pub fn extend(
        &mut self,
        signatures: impl IntoIterator<Item = SignatureDef>,
        pii_categories: impl IntoIterator<Item = PiiCategoryDef>,
    ) {
        self.signatures.extend(signatures);
        self.pii_categories.extend(pii_categories);
    }

    /// Look up a PII category by label.
    pub fn pii_category(&self, label: &str) -> Option<&PiiCategoryDef> {
        self.pii_categories.iter().find(|c| c.label == label)
    }
}
