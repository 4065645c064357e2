//! # prompt-firewall
//!
//! Inbound content-security gate for LLM-backed services.  Every prompt is
//! classified into exactly one [`Action`]:
//!
//! * **BLOCK** -- an injection signature matched, either in the raw text or
//!   in its base64-decoded form.
//! * **ANONYMIZE** -- no signature, but PII was found and replaced with
//!   `<LABEL_REDACTED>` placeholders.
//! * **ALLOW** -- neither; the text is forwarded verbatim.
//!
//! The crate is organised in layers:
//!
//! 1. **[`registry`]** -- ordered signature and PII category catalogue.
//! 2. **[`normalizer`]** -- reveals a single base64 layer.
//! 3. **[`detector`]** -- first-match signature search.
//! 4. **[`redactor`]** -- category-by-category PII replacement.
//! 5. **[`engine`]** -- combines the above into a [`ScanResult`].
//!
//! ## Quick start
//!
//! ```rust
//! use prompt_firewall::{Action, Firewall};
//!
//! let firewall = Firewall::builtin().unwrap();
//! let result = firewall.scan("Contact me at alice@example.com");
//! assert_eq!(result.action, Action::Anonymize);
//! assert_eq!(result.sanitized_text, "Contact me at <EMAIL_REDACTED>");
//! ```

pub mod detector;
pub mod engine;
mod error;
pub mod loader;
pub mod normalizer;
pub mod redactor;
pub mod registry;
mod verdict;

pub use engine::Firewall;
pub use error::FirewallError;
pub use loader::{load_registry, load_registry_from_str, RegistryExtension};
pub use redactor::{Redaction, RedactionEntry};
pub use registry::{PiiCategoryDef, Registry, SignatureDef};
pub use verdict::{Action, ScanResult};
