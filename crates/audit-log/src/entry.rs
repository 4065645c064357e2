use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// Separator between the three fields of a rendered line.  Downstream
/// tooling splits on it, so it must not change.
pub const FIELD_SEPARATOR: &str = " - ";

/// Timestamp layout: `2024-05-01 13:37:00,123`.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S,%3f";

/// Severity of an audit line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AuditLevel {
    Info,
    Warning,
}

impl AuditLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "INFO",
            Self::Warning => "WARNING",
        }
    }
}

impl fmt::Display for AuditLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AuditLevel {
    type Err = AuditParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "INFO" => Ok(Self::Info),
            "WARNING" => Ok(Self::Warning),
            other => Err(AuditParseError::UnknownLevel(other.to_string())),
        }
    }
}

/// Errors returned by [`AuditEntry::parse`].
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum AuditParseError {
    #[error("line has fewer than three ' - ' separated fields")]
    MissingFields,

    #[error("invalid timestamp '{0}'")]
    Timestamp(String),

    #[error("unknown level '{0}'")]
    UnknownLevel(String),
}

/// A single audit record: `<timestamp> - <LEVEL> - <message>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub timestamp: DateTime<Utc>,
    pub level: AuditLevel,
    pub message: String,
}

impl AuditEntry {
    /// Create an entry stamped with the current UTC time.
    pub fn new(level: AuditLevel, message: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            level,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(AuditLevel::Info, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(AuditLevel::Warning, message)
    }

    /// Render as one line, without the trailing newline.
    ///
    /// Line breaks inside the message are flattened to spaces so that one
    /// entry is always exactly one line.
    pub fn render(&self) -> String {
        let message: String = self
            .message
            .chars()
            .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
            .collect();
        format!(
            "{}{FIELD_SEPARATOR}{}{FIELD_SEPARATOR}{}",
            self.timestamp.format(TIMESTAMP_FORMAT),
            self.level,
            message
        )
    }

    /// Parse a rendered line back into an entry.
    ///
    /// Only the first two separators are significant; everything after the
    /// level is the message.
    pub fn parse(line: &str) -> Result<Self, AuditParseError> {
        let line = line.trim_end_matches(['\n', '\r']);
        let mut parts = line.splitn(3, FIELD_SEPARATOR);
        let (Some(ts), Some(level), Some(message)) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(AuditParseError::MissingFields);
        };

        let timestamp = NaiveDateTime::parse_from_str(ts, TIMESTAMP_FORMAT)
            .map_err(|_| AuditParseError::Timestamp(ts.to_string()))?
            .and_utc();

        Ok(Self {
            timestamp,
            level: level.parse()?,
            message: message.to_string(),
        })
    }
}

impl fmt::Display for AuditEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}
