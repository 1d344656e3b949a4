//! 通配符证书签发编排服务

use std::sync::Arc;
use std::time::Duration;

use certstack_provider::{
    CaaTag, CaaValue, CertificateArn, CertificateSpec, CertificateStatus, EngineError, RecordSet,
    RecordSetSpec, RecordType, Region, ValidationMethod, ValidationSpec,
};

use crate::domain::DomainParts;
use crate::error::{CoreError, CoreResult};
use crate::services::ServiceContext;

/// CAA 记录的 TTL(秒)
const CAA_RECORD_TTL: u32 = 3600;
/// 验证记录的 TTL(秒)
const VALIDATION_RECORD_TTL: u32 = 600;

/// 基线 CAA 签发机构,按固定顺序,每家同时授权 `issue` 与 `issuewild`
const BASELINE_CAA_ISSUERS: [&str; 5] = [
    "letsencrypt.org",
    "pki.goog",
    "amazon.com",
    "amazontrust.com",
    "awstrust.com",
];

/// The fixed CAA baseline: `issue` plus `issuewild` for each authorized
/// issuer, in a stable order. Caller-supplied extras are appended after
/// these, never interleaved.
#[must_use]
pub fn baseline_caa_values() -> Vec<CaaValue> {
    BASELINE_CAA_ISSUERS
        .iter()
        .flat_map(|issuer| {
            [
                CaaValue::new(CaaTag::Issue, *issuer),
                CaaValue::new(CaaTag::IssueWild, *issuer),
            ]
        })
        .collect()
}

/// Per-call options for [`CertificateService::provision`].
#[derive(Debug, Clone, Default)]
pub struct ProvisionOptions {
    /// Issuance region override; defaults to the configured region.
    pub region: Option<Region>,
    /// CAA directives appended after the fixed baseline, in caller order.
    pub extra_caa_entries: Vec<CaaValue>,
    /// Validation wait budget override; defaults to the configured budget.
    pub validation_timeout: Option<Duration>,
}

/// 通配符证书签发编排服务
///
/// 一个父域名只需一张通配符证书,供该父域名下所有站点共享;
/// 证书请求按逻辑名称去重,重复调用是幂等的。
pub struct CertificateService {
    ctx: Arc<ServiceContext>,
}

impl CertificateService {
    /// 创建证书服务实例
    #[must_use]
    pub fn new(ctx: Arc<ServiceContext>) -> Self {
        Self { ctx }
    }

    /// Provision a validated wildcard certificate for the domain's parent
    /// domain and return its ARN.
    ///
    /// Requests `*.<parent>` with `<parent>` as the sole alternative name,
    /// publishes the issuer's DNS challenge plus a CAA policy record in the
    /// root domain's hosted zone, then waits for the issuer to confirm.
    /// The certificate request and the zone lookup run concurrently; the two
    /// records are independent of each other and are created concurrently,
    /// but the validation record is only derivable once the issuer has
    /// attached its challenge to the request.
    ///
    /// # Errors
    ///
    /// - [`CoreError::InvalidDomain`] for inputs with fewer than two labels
    /// - [`CoreError::ZoneNotFound`] when the root domain has no hosted
    ///   zone; no records are created in that case
    /// - [`CoreError::CertificateValidationFailed`] when the issuer refuses
    ///   to confirm
    /// - [`CoreError::CertificateValidationTimeout`] when the wait budget
    ///   expires first
    pub async fn provision(
        &self,
        domain: &str,
        opts: &ProvisionOptions,
    ) -> CoreResult<CertificateArn> {
        let parts = DomainParts::parse(domain)?;
        let parent = parts.parent_domain_bare().to_string();
        log::info!("Provisioning wildcard certificate for *.{parent}");

        let region = opts
            .region
            .clone()
            .unwrap_or_else(|| self.ctx.settings.issuance_region.clone());
        let issuance = self.ctx.region_context(&region).await?;

        let certificate_spec = CertificateSpec {
            name: format!("{parent}-certificate"),
            domain_name: format!("*.{parent}"),
            subject_alternative_names: vec![parent.clone()],
            validation_method: ValidationMethod::Dns,
        };

        let (pending, zone) = futures::try_join!(
            async {
                self.ctx
                    .engine
                    .request_certificate(&issuance, &certificate_spec)
                    .await
                    .map_err(CoreError::from)
            },
            self.ctx.resolve_zone(parts.root_domain_bare()),
        )?;

        let challenge = pending.validation_options.first().ok_or_else(|| {
            CoreError::CertificateValidationFailed {
                domain: parent.clone(),
                reason: "issuer attached no DNS challenge to the certificate request".to_string(),
            }
        })?;

        let caa_spec = RecordSetSpec {
            name: format!("{parent}-caaRecord"),
            zone_id: zone.id.clone(),
            record_name: parts.parent_domain.clone(),
            record_type: RecordType::Caa,
            ttl: CAA_RECORD_TTL,
            values: baseline_caa_values()
                .iter()
                .chain(opts.extra_caa_entries.iter())
                .map(ToString::to_string)
                .collect(),
        };
        let validation_spec = RecordSetSpec {
            name: format!("{parent}-validationRecord"),
            zone_id: zone.id.clone(),
            record_name: challenge.record_name.clone(),
            record_type: challenge.record_type.clone(),
            ttl: VALIDATION_RECORD_TTL,
            values: vec![challenge.record_value.clone()],
        };

        let (_caa_record, validation_record) = futures::try_join!(
            self.create_record(&caa_spec),
            self.create_record(&validation_spec),
        )?;

        let confirmation_spec = ValidationSpec {
            name: format!("{parent}-certificateValidation"),
            certificate_arn: pending.arn.clone(),
            record_fqdns: vec![validation_record.fqdn.clone()],
        };
        let budget = opts
            .validation_timeout
            .unwrap_or(self.ctx.settings.validation_timeout);

        let confirmed = tokio::time::timeout(
            budget,
            self.ctx
                .engine
                .confirm_validation(&issuance, &confirmation_spec),
        )
        .await;

        let arn = match confirmed {
            Ok(Ok(arn)) => arn,
            Ok(Err(EngineError::ValidationFailed { raw_message, .. })) => {
                return Err(CoreError::CertificateValidationFailed {
                    domain: parent,
                    reason: raw_message
                        .unwrap_or_else(|| "issuer refused to confirm the record".to_string()),
                });
            }
            Ok(Err(e)) => return Err(e.into()),
            Err(_elapsed) => {
                return Err(CoreError::CertificateValidationTimeout {
                    domain: parent,
                    waited: budget,
                });
            }
        };

        log::info!("Certificate for *.{parent} validated: {arn}");
        Ok(arn)
    }

    /// Look up the most recently issued certificate for `*.<parent>` without
    /// provisioning anything.
    ///
    /// Intended for consumers that assume [`provision`](Self::provision) has
    /// already run once per account and region.
    ///
    /// # Errors
    ///
    /// [`CoreError::NoIssuedCertificateFound`] when no certificate for the
    /// wildcard domain is in issued status.
    pub async fn lookup_existing(&self, domain: &str) -> CoreResult<CertificateArn> {
        let parts = DomainParts::parse(domain)?;
        let wildcard = format!("*.{}", parts.parent_domain_bare());

        let region = self.ctx.settings.issuance_region.clone();
        let issuance = self.ctx.region_context(&region).await?;

        let certificates = self
            .ctx
            .engine
            .list_certificates(&issuance, &wildcard)
            .await?;

        certificates
            .into_iter()
            .filter(|c| c.status == CertificateStatus::Issued)
            .max_by_key(|c| c.issued_at)
            .map(|c| c.arn)
            .ok_or(CoreError::NoIssuedCertificateFound(wildcard))
    }

    async fn create_record(&self, spec: &RecordSetSpec) -> CoreResult<RecordSet> {
        let record = self.ctx.engine.create_record_set(spec).await?;
        log::debug!("Created {} record set {}", record.record_type, record.fqdn);
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{create_test_certificate_service, issued_certificate};

    use certstack_provider::CertificateSummary;
    use chrono::{TimeZone, Utc};

    #[tokio::test]
    async fn provision_returns_validated_arn() {
        let (svc, engine) = create_test_certificate_service();
        engine.add_zone("example.com", "Z0001").await;

        let arn = svc
            .provision("www.example.com", &ProvisionOptions::default())
            .await
            .unwrap();

        assert_eq!(
            arn.as_str(),
            "arn:aws:acm:us-east-1:123456789012:certificate/example.com-certificate"
        );
    }

    #[tokio::test]
    async fn provision_requests_wildcard_with_parent_as_san() {
        let (svc, engine) = create_test_certificate_service();
        engine.add_zone("example.com", "Z0001").await;

        svc.provision("www.example.com", &ProvisionOptions::default())
            .await
            .unwrap();

        let spec = engine.requested_certificates().await.remove(0);
        assert_eq!(spec.name, "example.com-certificate");
        assert_eq!(spec.domain_name, "*.example.com");
        assert_eq!(spec.subject_alternative_names, vec!["example.com"]);
        assert_eq!(spec.validation_method, ValidationMethod::Dns);
    }

    #[tokio::test]
    async fn provision_caa_record_is_baseline_then_extras() {
        let (svc, engine) = create_test_certificate_service();
        engine.add_zone("example.com", "Z0001").await;

        let opts = ProvisionOptions {
            extra_caa_entries: vec![
                CaaValue::new(CaaTag::Iodef, "mailto:ops@example.com"),
                CaaValue::new(CaaTag::Issue, "buypass.com"),
            ],
            ..ProvisionOptions::default()
        };
        svc.provision("www.example.com", &opts).await.unwrap();

        let records = engine.created_records().await;
        let caa = records
            .iter()
            .find(|r| r.record_type == RecordType::Caa)
            .unwrap();

        assert_eq!(caa.name, "example.com-caaRecord");
        assert_eq!(caa.record_name, "example.com.");
        assert_eq!(caa.zone_id, "Z0001");
        assert_eq!(caa.ttl, 3600);
        assert_eq!(caa.values.len(), 12);

        let baseline: Vec<String> = baseline_caa_values()
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(&caa.values[..10], &baseline[..]);
        assert_eq!(caa.values[10], r#"0 iodef "mailto:ops@example.com""#);
        assert_eq!(caa.values[11], r#"0 issue "buypass.com""#);
    }

    #[test]
    fn baseline_has_ten_directives_in_fixed_order() {
        let baseline = baseline_caa_values();
        assert_eq!(baseline.len(), 10);
        assert_eq!(baseline[0].to_string(), r#"0 issue "letsencrypt.org""#);
        assert_eq!(baseline[1].to_string(), r#"0 issuewild "letsencrypt.org""#);
        assert_eq!(baseline[8].to_string(), r#"0 issue "awstrust.com""#);
        assert_eq!(baseline[9].to_string(), r#"0 issuewild "awstrust.com""#);
    }

    #[tokio::test]
    async fn provision_validation_record_follows_challenge() {
        let (svc, engine) = create_test_certificate_service();
        engine.add_zone("example.com", "Z0001").await;

        svc.provision("www.example.com", &ProvisionOptions::default())
            .await
            .unwrap();

        let records = engine.created_records().await;
        let validation = records
            .iter()
            .find(|r| r.name == "example.com-validationRecord")
            .unwrap();

        assert_eq!(validation.record_name, "_acme-challenge.example.com.");
        assert_eq!(validation.record_type, RecordType::Cname);
        assert_eq!(validation.ttl, 600);
        assert_eq!(
            validation.values,
            vec!["_mock-validation.acm-validations.aws.".to_string()]
        );
        assert_eq!(validation.zone_id, "Z0001");
    }

    #[tokio::test]
    async fn provision_never_creates_records_before_challenge_exists() {
        let (svc, engine) = create_test_certificate_service();
        engine.add_zone("example.com", "Z0001").await;

        svc.provision("www.example.com", &ProvisionOptions::default())
            .await
            .unwrap();

        let calls = engine.calls().await;
        let request_idx = calls
            .iter()
            .position(|c| c.starts_with("request_certificate"))
            .unwrap();
        let first_record_idx = calls
            .iter()
            .position(|c| c.starts_with("create_record_set"))
            .unwrap();
        assert!(request_idx < first_record_idx);

        // 确认提交必须排在验证记录之后
        let confirm_idx = calls
            .iter()
            .position(|c| c.starts_with("confirm_validation"))
            .unwrap();
        let last_record_idx = calls
            .iter()
            .rposition(|c| c.starts_with("create_record_set"))
            .unwrap();
        assert!(last_record_idx < confirm_idx);
    }

    #[tokio::test]
    async fn provision_confirms_by_validation_record_fqdn() {
        let (svc, engine) = create_test_certificate_service();
        engine.add_zone("example.com", "Z0001").await;

        svc.provision("www.example.com", &ProvisionOptions::default())
            .await
            .unwrap();

        let confirmation = engine.confirmations().await.remove(0);
        assert_eq!(confirmation.name, "example.com-certificateValidation");
        assert_eq!(
            confirmation.record_fqdns,
            vec!["_acme-challenge.example.com".to_string()]
        );
    }

    #[tokio::test]
    async fn provision_missing_zone_creates_nothing() {
        let (svc, engine) = create_test_certificate_service();
        // 不预置任何托管区域

        let result = svc
            .provision("www.example.com", &ProvisionOptions::default())
            .await;

        assert!(matches!(result, Err(CoreError::ZoneNotFound(ref d)) if d == "example.com"));
        let calls = engine.calls().await;
        assert!(!calls.iter().any(|c| c.starts_with("create_record_set")));
    }

    #[tokio::test]
    async fn provision_rejects_single_label_domain() {
        let (svc, _engine) = create_test_certificate_service();
        let result = svc
            .provision("localhost", &ProvisionOptions::default())
            .await;
        assert!(matches!(result, Err(CoreError::InvalidDomain(_))));
    }

    #[tokio::test]
    async fn provision_apex_domain_uses_itself_as_parent() {
        let (svc, engine) = create_test_certificate_service();
        engine.add_zone("example.com", "Z0001").await;

        svc.provision("example.com", &ProvisionOptions::default())
            .await
            .unwrap();

        let spec = engine.requested_certificates().await.remove(0);
        assert_eq!(spec.domain_name, "*.example.com");
        assert_eq!(spec.subject_alternative_names, vec!["example.com"]);
    }

    #[tokio::test]
    async fn provision_times_out_when_issuer_never_confirms() {
        let (svc, engine) = create_test_certificate_service();
        engine.add_zone("example.com", "Z0001").await;
        engine.set_hang_confirmation(true).await;

        let opts = ProvisionOptions {
            validation_timeout: Some(Duration::from_millis(20)),
            ..ProvisionOptions::default()
        };
        let result = svc.provision("www.example.com", &opts).await;

        match result {
            Err(CoreError::CertificateValidationTimeout { domain, waited }) => {
                assert_eq!(domain, "example.com");
                assert_eq!(waited, Duration::from_millis(20));
            }
            other => panic!("expected timeout, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn provision_surfaces_issuer_rejection() {
        let (svc, engine) = create_test_certificate_service();
        engine.add_zone("example.com", "Z0001").await;
        engine
            .set_confirm_error(Some(EngineError::ValidationFailed {
                engine: "mock".to_string(),
                certificate_arn: "arn:x".to_string(),
                raw_message: Some("CAA forbids issuance".to_string()),
            }))
            .await;

        let result = svc
            .provision("www.example.com", &ProvisionOptions::default())
            .await;

        match result {
            Err(CoreError::CertificateValidationFailed { domain, reason }) => {
                assert_eq!(domain, "example.com");
                assert_eq!(reason, "CAA forbids issuance");
            }
            other => panic!("expected validation failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn provision_fails_when_issuer_attaches_no_challenge() {
        let (svc, engine) = create_test_certificate_service();
        engine.add_zone("example.com", "Z0001").await;
        engine.set_issue_challenges(false).await;

        let result = svc
            .provision("www.example.com", &ProvisionOptions::default())
            .await;

        assert!(matches!(
            result,
            Err(CoreError::CertificateValidationFailed { .. })
        ));
    }

    #[tokio::test]
    async fn provision_reuses_region_context_across_calls() {
        let (svc, engine) = create_test_certificate_service();
        engine.add_zone("example.com", "Z0001").await;
        engine.add_zone("example.org", "Z0002").await;

        svc.provision("www.example.com", &ProvisionOptions::default())
            .await
            .unwrap();
        svc.provision("www.example.org", &ProvisionOptions::default())
            .await
            .unwrap();

        let opens = engine
            .calls()
            .await
            .iter()
            .filter(|c| c.starts_with("open_region"))
            .count();
        assert_eq!(opens, 1);
    }

    #[tokio::test]
    async fn provision_honors_region_override() {
        let (svc, engine) = create_test_certificate_service();
        engine.add_zone("example.com", "Z0001").await;

        let opts = ProvisionOptions {
            region: Some(Region::new("eu-west-1")),
            ..ProvisionOptions::default()
        };
        svc.provision("www.example.com", &opts).await.unwrap();

        let calls = engine.calls().await;
        assert!(calls.contains(&"open_region:eu-west-1".to_string()));
        assert_eq!(engine.requested_certificates().await.len(), 1);
    }

    #[tokio::test]
    async fn lookup_existing_picks_most_recent_issued() {
        let (svc, engine) = create_test_certificate_service();
        engine
            .add_certificate(issued_certificate(
                "arn:old",
                "*.example.com",
                Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap(),
            ))
            .await;
        engine
            .add_certificate(issued_certificate(
                "arn:new",
                "*.example.com",
                Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap(),
            ))
            .await;
        engine
            .add_certificate(CertificateSummary {
                arn: CertificateArn::new("arn:pending"),
                domain_name: "*.example.com".to_string(),
                status: CertificateStatus::PendingValidation,
                issued_at: None,
            })
            .await;

        let arn = svc.lookup_existing("www.example.com").await.unwrap();
        assert_eq!(arn.as_str(), "arn:new");
    }

    #[tokio::test]
    async fn lookup_existing_fails_without_issued_certificates() {
        let (svc, engine) = create_test_certificate_service();
        engine
            .add_certificate(CertificateSummary {
                arn: CertificateArn::new("arn:pending"),
                domain_name: "*.example.com".to_string(),
                status: CertificateStatus::PendingValidation,
                issued_at: None,
            })
            .await;

        let result = svc.lookup_existing("www.example.com").await;
        assert!(matches!(
            result,
            Err(CoreError::NoIssuedCertificateFound(ref d)) if d == "*.example.com"
        ));
    }

    #[tokio::test]
    async fn lookup_existing_ignores_other_domains() {
        let (svc, engine) = create_test_certificate_service();
        engine
            .add_certificate(issued_certificate(
                "arn:other",
                "*.example.org",
                Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            ))
            .await;

        let result = svc.lookup_existing("www.example.com").await;
        assert!(matches!(
            result,
            Err(CoreError::NoIssuedCertificateFound(_))
        ));
    }
}
