use async_trait::async_trait;

use crate::error::Result;
use crate::types::{
    CertificateArn, CertificateSpec, CertificateSummary, HostedZone, PendingCertificate, RecordSet,
    RecordSetSpec, Region, RegionContext, ValidationSpec,
};

/// The resource-provisioning collaborator.
///
/// Implementations translate these declarative requests into provider-managed
/// resources. Every operation is identity-keyed: submitting the same spec
/// under the same logical name again is deduplicated by the engine, which is
/// what makes the orchestration above it safely re-invokable.
///
/// Ordering between independent requests is the engine's concern; callers
/// express dependencies purely by sequencing the data (a challenge value can
/// only be published after the request that produced it returned).
#[async_trait]
pub trait ProvisioningEngine: Send + Sync {
    /// Engine backend identifier (used in error values and logs).
    fn id(&self) -> &'static str;

    /// Bootstrap a region-scoped view of the engine.
    ///
    /// The bootstrap is itself a provider-managed resource keyed by
    /// `logical_name`; open each region once per process and share the
    /// returned handle.
    async fn open_region(&self, logical_name: &str, region: &Region) -> Result<RegionContext>;

    /// Request a certificate in the context's region.
    ///
    /// The returned certificate is pending: it carries the issuer's DNS
    /// challenges and is not usable until validation is confirmed.
    async fn request_certificate(
        &self,
        ctx: &RegionContext,
        spec: &CertificateSpec,
    ) -> Result<PendingCertificate>;

    /// List certificates whose primary domain equals `domain`, any status.
    async fn list_certificates(
        &self,
        ctx: &RegionContext,
        domain: &str,
    ) -> Result<Vec<CertificateSummary>>;

    /// Look up a hosted zone by its bare root-domain name.
    ///
    /// Returns `Ok(None)` when no zone exists; zones are externally owned
    /// and never created through this trait.
    async fn lookup_hosted_zone(&self, name: &str) -> Result<Option<HostedZone>>;

    /// Create a DNS record set.
    async fn create_record_set(&self, spec: &RecordSetSpec) -> Result<RecordSet>;

    /// Confirm a pending certificate's validation.
    ///
    /// Blocks until the issuer observes the records named by the spec's
    /// FQDNs and confirms, or until the engine's own polling budget is
    /// exhausted. Returns the ARN of the now-usable certificate.
    async fn confirm_validation(
        &self,
        ctx: &RegionContext,
        spec: &ValidationSpec,
    ) -> Result<CertificateArn>;
}
