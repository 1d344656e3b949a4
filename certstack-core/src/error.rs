//! Unified error type definition

use serde::Serialize;
use thiserror::Error;

// Re-export library error type
pub use certstack_provider::EngineError;

/// Core layer error type
#[derive(Error, Debug, Serialize)]
#[serde(tag = "code", content = "details")]
pub enum CoreError {
    /// Malformed input domain (fewer than two labels)
    #[error("Invalid domain '{0}': no TLD found")]
    InvalidDomain(String),

    /// No hosted zone exists for the root domain
    #[error("Hosted zone not found: {0}")]
    ZoneNotFound(String),

    /// The issuer rejected the ownership proof
    #[error("Certificate validation failed for {domain}: {reason}")]
    CertificateValidationFailed { domain: String, reason: String },

    /// The configured wait budget expired before the issuer confirmed
    #[error("Certificate validation timed out for {domain} after {}s", .waited.as_secs())]
    CertificateValidationTimeout {
        domain: String,
        waited: std::time::Duration,
    },

    /// Lookup found no certificate in issued status
    #[error("No issued certificate found for: {0}")]
    NoIssuedCertificateFound(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Engine error (converting from library)
    #[error("{0}")]
    Engine(#[from] EngineError),
}

impl CoreError {
    /// Whether it is expected behavior (user input, resource does not exist, etc.) is used for log classification.
    ///
    /// Level `warn` should be used when returning `true` and level `error` when returning `false`.
    /// **Please update this method simultaneously when new variants are added. **
    #[must_use]
    pub fn is_expected(&self) -> bool {
        match self {
            Self::InvalidDomain(_)
            | Self::ZoneNotFound(_)
            | Self::NoIssuedCertificateFound(_)
            | Self::Config(_) => true,
            Self::Engine(e) => e.is_expected(),
            _ => false,
        }
    }
}

/// Core layer Result type alias
pub type CoreResult<T> = std::result::Result<T, CoreError>;
