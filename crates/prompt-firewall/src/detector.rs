//! Injection detector.
//!
//! Compiles the registry signatures into a case-insensitive [`RegexSet`] and
//! reports the first signature that matches, in (target order, signature
//! order) priority.

use regex::RegexSetBuilder;

use crate::error::FirewallError;
use crate::registry::SignatureDef;

/// Compiled injection signatures.
pub struct Detector {
    /// One entry per signature, in registry order.
    regex_set: regex::RegexSet,
    signatures: Vec<SignatureDef>,
}

impl std::fmt::Debug for Detector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Detector")
            .field("signatures", &self.signatures.len())
            .finish()
    }
}

impl Detector {
    /// Compile `signatures`.  Fails if the list is empty or any pattern is
    /// invalid, naming the offending signature.
    pub fn new(signatures: &[SignatureDef]) -> Result<Self, FirewallError> {
        if signatures.is_empty() {
            return Err(FirewallError::NoSignatures);
        }

        // Compile one by one first so the error names the culprit.
        for sig in signatures {
            compile_one(&sig.pattern).map_err(|source| FirewallError::InvalidSignature {
                id: sig.id.clone(),
                source,
            })?;
        }

        let regex_set = RegexSetBuilder::new(signatures.iter().map(|s| s.pattern.as_str()))
            .case_insensitive(true)
            .build()
            .map_err(|source| FirewallError::InvalidSignature {
                id: "<signature set>".to_string(),
                source,
            })?;

        Ok(Self {
            regex_set,
            signatures: signatures.to_vec(),
        })
    }

    /// Return the first matching signature across `targets`.
    ///
    /// Targets are checked in order and the search stops at the first target
    /// with any match; within a target the lowest-index signature wins.
    pub fn detect<'a, I>(&self, targets: I) -> Option<&SignatureDef>
    where
        I: IntoIterator<Item = &'a str>,
    {
        targets.into_iter().find_map(|target| {
            self.regex_set
                .matches(target)
                .iter()
                .next()
                .map(|idx| &self.signatures[idx])
        })
    }

    /// Number of compiled signatures.
    pub fn signature_count(&self) -> usize {
        self.signatures.len()
    }
}

fn compile_one(pattern: &str) -> Result<regex::Regex, regex::Error> {
    regex::RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
}
