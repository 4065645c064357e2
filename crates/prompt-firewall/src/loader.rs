use std::collections::HashSet;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::registry::{PiiCategoryDef, Registry, SignatureDef};

/// Extra signatures and PII categories appended after the built-ins.
///
/// ```yaml
/// version: "1.0"
/// signatures:
///   - id: "reveal secrets"
///     pattern: "reveal\\s+secrets"
/// pii_categories:
///   - label: IBAN
///     pattern: "\\bFR\\d{25}\\b"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegistryExtension {
    pub version: String,
    #[serde(default)]
    pub signatures: Vec<SignatureDef>,
    #[serde(default)]
    pub pii_categories: Vec<PiiCategoryDef>,
}

/// Load the built-in registry extended by the YAML file at `path`.
pub fn load_registry(path: impl AsRef<Path>) -> Result<Registry> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read extensions file: {}", path.display()))?;
    load_registry_from_str(&contents)
        .with_context(|| format!("failed to parse extensions file: {}", path.display()))
}

/// Parse `yaml` as a [`RegistryExtension`] and apply it to the built-ins.
pub fn load_registry_from_str(yaml: &str) -> Result<Registry> {
    let ext: RegistryExtension =
        serde_yml::from_str(yaml).context("YAML deserialization failed")?;

    let mut registry = Registry::builtin();
    validate(&registry, &ext)?;
    registry.extend(ext.signatures, ext.pii_categories);
    Ok(registry)
}

fn validate(base: &Registry, ext: &RegistryExtension) -> Result<()> {
    if ext.version != "1.0" {
        bail!(
            "unsupported extensions version '{}'; only '1.0' is supported",
            ext.version
        );
    }

    let mut ids: HashSet<&str> = base.signatures.iter().map(|s| s.id.as_str()).collect();
    for sig in &ext.signatures {
        if sig.id.is_empty() {
            bail!("signature id must not be empty");
        }
        if sig.pattern.is_empty() {
            bail!("signature '{}' has an empty pattern", sig.id);
        }
        if !ids.insert(&sig.id) {
            bail!("duplicate signature id: '{}'", sig.id);
        }
        regex::Regex::new(&sig.pattern)
            .with_context(|| format!("signature '{}' does not compile", sig.id))?;
    }

    let mut labels: HashSet<&str> = base
        .pii_categories
        .iter()
        .map(|c| c.label.as_str())
        .collect();
    for cat in &ext.pii_categories {
        if !is_valid_label(&cat.label) {
            bail!(
                "invalid PII label '{}': expected uppercase letters, digits and '_'",
                cat.label
            );
        }
        if cat.pattern.is_empty() {
            bail!("PII category '{}' has an empty pattern", cat.label);
        }
        if !labels.insert(&cat.label) {
            bail!("duplicate PII label: '{}'", cat.label);
        }
        regex::Regex::new(&cat.pattern)
            .with_context(|| format!("PII category '{}' does not compile", cat.label))?;
    }

    Ok(())
}

fn is_valid_label(label: &str) -> bool {
    let mut chars = label.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_uppercase())
        && chars.all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
}
