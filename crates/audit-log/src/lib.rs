//! Append-only security audit log.
//!
//! Every record is one line of the form
//!
//! ```text
//! 2024-05-01 13:37:00,123 - WARNING - ATTACK BLOCKED | Malicious signature detected: 'pwned'
//! ```
//!
//! Dashboards and log shippers split on `" - "`, so the three fields and the
//! separator are a stable format.  [`AuditEntry::parse`] is the reference
//! reader.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use audit_log::{AuditEntry, AuditSink};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let (sink, handle) = AuditSink::start("security_audit.log").await?;
//! sink.log(AuditEntry::info("PROMPT ALLOWED | No threat detected")).await;
//! drop(sink);
//! handle.await?;
//! # Ok(())
//! # }
//! ```

pub mod entry;
pub mod sink;
pub mod writer;

pub use entry::{AuditEntry, AuditLevel, AuditParseError, FIELD_SEPARATOR, TIMESTAMP_FORMAT};
pub use sink::AuditSink;
pub use writer::{AuditWriteError, AuditWriter};
