/// Errors raised while compiling a [`Registry`](crate::Registry) into a
/// [`Firewall`](crate::Firewall).
///
/// All of these are start-up failures.  Scanning itself never fails.
#[derive(Debug, thiserror::Error)]
pub enum FirewallError {
    #[error("registry contains no injection signatures")]
    NoSignatures,

    #[error("failed to compile signature '{id}': {source}")]
    InvalidSignature {
        id: String,
        #[source]
        source: regex::Error,
    },

    #[error("failed to compile PII category '{label}': {source}")]
    InvalidPiiPattern {
        label: String,
        #[source]
        source: regex::Error,
    },
}
