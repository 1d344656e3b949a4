use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============ Regions ============

/// A provider region identifier (e.g., `"us-east-1"`).
///
/// Certificate issuance is region-specific: publicly trusted certificates
/// consumed by a CDN must be issued from the pinned issuance region, while
/// hosted-zone lookups always go through the fixed DNS API region.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Region(String);

impl Region {
    /// Create a region from its identifier string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The pinned region certificates must be issued from to be consumable
    /// by edge distributions.
    #[must_use]
    pub fn certificate_issuance() -> Self {
        Self("us-east-1".to_string())
    }

    /// The fixed region the DNS API is served from. Hosted zones themselves
    /// are global objects.
    #[must_use]
    pub fn dns_lookup() -> Self {
        Self("us-east-1".to_string())
    }

    /// The region identifier as a bare string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Region {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Handle to a region-scoped view of the engine, returned by
/// [`ProvisioningEngine::open_region`](crate::ProvisioningEngine::open_region).
///
/// Opening a region is a provider-managed bootstrap with by-name identity;
/// opening the same logical name twice per process is wasteful and can
/// collide. Open the handle once and share it (it is read-only after
/// construction and safe to use from concurrent tasks).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionContext {
    /// Engine-assigned identifier for the bootstrap resource.
    pub id: String,
    /// The region this context is pinned to.
    pub region: Region,
}

// ============ Hosted Zones ============

/// An externally owned DNS zone, looked up by its root-domain name.
///
/// Zones are never created through this crate; a missing zone is a caller
/// error surfaced by the orchestration layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostedZone {
    /// Provider-specific zone identifier.
    pub id: String,
    /// Zone name, dot-terminated (e.g., `"example.com."`).
    pub name: String,
}

// ============ Record Sets ============

/// DNS record type identifier.
///
/// Serialized as uppercase strings (`"A"`, `"AAAA"`, `"CNAME"`, etc.).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RecordType {
    /// IPv4 address record.
    A,
    /// IPv6 address record.
    Aaaa,
    /// Canonical name (alias) record.
    Cname,
    /// Mail exchange record.
    Mx,
    /// Text record.
    Txt,
    /// Name server record.
    Ns,
    /// Certificate Authority Authorization record.
    Caa,
}

impl std::fmt::Display for RecordType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::A => "A",
            Self::Aaaa => "AAAA",
            Self::Cname => "CNAME",
            Self::Mx => "MX",
            Self::Txt => "TXT",
            Self::Ns => "NS",
            Self::Caa => "CAA",
        };
        f.write_str(s)
    }
}

/// CAA property tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaaTag {
    /// Authorize issuance of host certificates.
    Issue,
    /// Authorize issuance of wildcard certificates.
    IssueWild,
    /// Incident reporting URL.
    Iodef,
}

impl std::fmt::Display for CaaTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Issue => "issue",
            Self::IssueWild => "issuewild",
            Self::Iodef => "iodef",
        };
        f.write_str(s)
    }
}

/// A single CAA directive.
///
/// The `Display` form is the literal record value syntax the DNS API expects:
///
/// ```
/// use certstack_provider::{CaaTag, CaaValue};
///
/// let v = CaaValue::new(CaaTag::Issue, "letsencrypt.org");
/// assert_eq!(v.to_string(), r#"0 issue "letsencrypt.org""#);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaaValue {
    /// Issuer critical flag (0 or 128).
    pub flags: u8,
    /// Property tag.
    pub tag: CaaTag,
    /// CA domain or reporting URI.
    pub value: String,
}

impl CaaValue {
    /// Create a non-critical (`flags = 0`) CAA directive.
    pub fn new(tag: CaaTag, value: impl Into<String>) -> Self {
        Self {
            flags: 0,
            tag,
            value: value.into(),
        }
    }
}

impl std::fmt::Display for CaaValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} \"{}\"", self.flags, self.tag, self.value)
    }
}

/// Request to create a DNS record set inside a hosted zone.
///
/// `name` is the logical identity the engine deduplicates on; submitting the
/// same spec under the same name twice yields the same resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordSetSpec {
    /// Logical resource name (identity key for the engine).
    pub name: String,
    /// Hosted zone identifier to create the record set in.
    pub zone_id: String,
    /// Record name (e.g., `"example.com."` or an issuer-supplied challenge name).
    pub record_name: String,
    /// Record type.
    pub record_type: RecordType,
    /// Time to live in seconds.
    pub ttl: u32,
    /// Record values, in the literal syntax of the record type.
    pub values: Vec<String>,
}

/// A DNS record set as confirmed by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordSet {
    /// Logical resource name the set was created under.
    pub name: String,
    /// Hosted zone the set lives in.
    pub zone_id: String,
    /// Fully-qualified record name without the trailing dot
    /// (e.g., `"_3f2a.example.com"`). Feeds validation confirmation.
    pub fqdn: String,
    /// Record type.
    pub record_type: RecordType,
    /// Time to live in seconds.
    pub ttl: u32,
    /// Record values.
    pub values: Vec<String>,
}

// ============ Certificates ============

/// How ownership of the certificate's domains is proven to the issuer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ValidationMethod {
    /// Publish an issuer-specified DNS record.
    Dns,
}

/// Request for a new certificate.
///
/// `name` is the logical identity the engine deduplicates on: one wildcard
/// certificate per parent domain is shared across every stack that needs it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateSpec {
    /// Logical resource name (identity key for the engine).
    pub name: String,
    /// Primary domain (e.g., `"*.example.com"`).
    pub domain_name: String,
    /// Additional covered domains.
    pub subject_alternative_names: Vec<String>,
    /// Ownership-proof method.
    pub validation_method: ValidationMethod,
}

/// DNS challenge the issuer attaches to a pending certificate request.
///
/// Publishing a record with exactly this name/type/value proves ownership of
/// the corresponding domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DnsChallenge {
    /// Domain this challenge validates.
    pub domain_name: String,
    /// Record name to publish, dot-terminated.
    pub record_name: String,
    /// Record type to publish.
    pub record_type: RecordType,
    /// Record value to publish.
    pub record_value: String,
}

/// A requested certificate that is not yet usable.
///
/// The certificate only becomes consumable after its DNS challenges are
/// published and [`confirm_validation`](crate::ProvisioningEngine::confirm_validation)
/// succeeds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingCertificate {
    /// ARN of the pending certificate.
    pub arn: CertificateArn,
    /// Primary domain of the request.
    pub domain_name: String,
    /// Issuer-supplied challenges, one per covered domain.
    pub validation_options: Vec<DnsChallenge>,
}

/// Lifecycle status of a certificate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CertificateStatus {
    /// Waiting for ownership proof.
    PendingValidation,
    /// Issued and trusted.
    Issued,
    /// Past its validity window.
    Expired,
    /// The issuer stopped waiting for the ownership proof.
    ValidationTimedOut,
    /// Revoked by the issuer or the account.
    Revoked,
    /// Issuance failed.
    Failed,
}

/// Summary of a certificate as listed by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateSummary {
    /// Certificate ARN.
    pub arn: CertificateArn,
    /// Primary domain the certificate covers.
    pub domain_name: String,
    /// Current lifecycle status.
    pub status: CertificateStatus,
    /// When the certificate was issued, if it has been.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issued_at: Option<DateTime<Utc>>,
}

/// Opaque certificate identifier consumed by downstream TLS-terminating resources.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CertificateArn(String);

impl CertificateArn {
    /// Wrap a raw ARN string.
    pub fn new(arn: impl Into<String>) -> Self {
        Self(arn.into())
    }

    /// The raw ARN string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CertificateArn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Request to confirm a pending certificate's validation.
///
/// Keyed by the fully-qualified names of the published challenge records.
/// The engine blocks until the issuer observes them and confirms, within the
/// engine's own polling budget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationSpec {
    /// Logical resource name (identity key for the engine).
    pub name: String,
    /// ARN of the pending certificate.
    pub certificate_arn: CertificateArn,
    /// FQDNs of the published challenge records, without trailing dots.
    pub record_fqdns: Vec<String>,
}
