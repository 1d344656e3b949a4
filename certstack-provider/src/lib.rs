//! # certstack-provider
//!
//! Abstraction over a cloud resource-provisioning engine, covering exactly
//! the surface a DNS-validated certificate workflow needs:
//!
//! - region bootstrap ([`ProvisioningEngine::open_region`])
//! - certificate request and lookup ([`CertificateSpec`], [`CertificateSummary`])
//! - hosted-zone resolution ([`HostedZone`])
//! - record-set creation ([`RecordSetSpec`]), including CAA directives
//!   ([`CaaValue`]) in their literal `0 issue "issuer.tld"` wire syntax
//! - validation confirmation ([`ValidationSpec`])
//!
//! The crate ships no concrete cloud client. Backends (an SDK-based engine,
//! an IaC driver, a test double) implement [`ProvisioningEngine`]; the
//! orchestration layer in `certstack-core` consumes the trait object.
//!
//! ## Identity model
//!
//! Every spec carries a logical `name`. Engines deduplicate on it, so
//! resubmitting an identical request is a no-op and two stacks asking for
//! the same wildcard certificate share one instance. This is the contract
//! that keeps the orchestration layer free of idempotency bookkeeping.
//!
//! ## Error Handling
//!
//! All operations return [`Result<T, EngineError>`](EngineError). Transient
//! failures (`NetworkError`, `Timeout`, `RateLimited`) are distinguished
//! from terminal ones via [`EngineError::is_retryable`]; log-level routing
//! uses [`EngineError::is_expected`].

mod error;
mod traits;
mod types;

// Re-export error types
pub use error::{EngineError, Result};

// Re-export core trait
pub use traits::ProvisioningEngine;

// Re-export types
pub use types::{
    CaaTag, CaaValue, CertificateArn, CertificateSpec, CertificateStatus, CertificateSummary,
    DnsChallenge, HostedZone, PendingCertificate, RecordSet, RecordSetSpec, RecordType, Region,
    RegionContext, ValidationMethod, ValidationSpec,
};
