//! 站点 DNS 记录管理服务

use std::sync::Arc;

use certstack_provider::{HostedZone, RecordSet, RecordSetSpec, RecordType};

use crate::domain::DomainParts;
use crate::error::CoreResult;
use crate::services::ServiceContext;

/// 区域顶点记录的 TTL(秒)
const APEX_RECORD_TTL: u32 = 3600;

/// Google Workspace 邮件交换记录值,按优先级排序
const GOOGLE_MX_VALUES: [&str; 5] = [
    "1 ASPMX.L.GOOGLE.COM.",
    "5 ALT1.ASPMX.L.GOOGLE.COM.",
    "5 ALT2.ASPMX.L.GOOGLE.COM.",
    "10 ALT3.ASPMX.L.GOOGLE.COM.",
    "10 ALT4.ASPMX.L.GOOGLE.COM.",
];

/// 站点 DNS 记录管理服务
///
/// 覆盖证书工作流之外站点还需要的少量区域顶点记录
/// (域名验证用 TXT、Google Workspace 的 MX)。
pub struct RecordService {
    ctx: Arc<ServiceContext>,
}

impl RecordService {
    /// 创建记录服务实例
    #[must_use]
    pub fn new(ctx: Arc<ServiceContext>) -> Self {
        Self { ctx }
    }

    /// Resolve the hosted zone serving the domain's root domain.
    ///
    /// # Errors
    ///
    /// [`CoreError::ZoneNotFound`](crate::error::CoreError::ZoneNotFound)
    /// when no zone exists for the root domain.
    pub async fn hosted_zone(&self, domain: &str) -> CoreResult<HostedZone> {
        let parts = DomainParts::parse(domain)?;
        self.ctx.resolve_zone(parts.root_domain_bare()).await
    }

    /// Create a TXT record at the zone apex, e.g. for site-ownership
    /// verification tokens.
    ///
    /// `name` distinguishes multiple TXT records for the same domain in the
    /// logical resource identity.
    pub async fn create_txt_record(
        &self,
        name: &str,
        domain: &str,
        value: &str,
    ) -> CoreResult<RecordSet> {
        let zone = self.hosted_zone(domain).await?;
        let spec = RecordSetSpec {
            name: format!("{domain}/txt-record-{name}"),
            zone_id: zone.id.clone(),
            record_name: zone.name.clone(),
            record_type: RecordType::Txt,
            ttl: APEX_RECORD_TTL,
            values: vec![value.to_string()],
        };
        let record = self.ctx.engine.create_record_set(&spec).await?;
        log::debug!("Created TXT record set {}", record.fqdn);
        Ok(record)
    }

    /// Create the Google Workspace MX record set at the zone apex.
    pub async fn create_google_mx_records(&self, domain: &str) -> CoreResult<RecordSet> {
        let zone = self.hosted_zone(domain).await?;
        let spec = RecordSetSpec {
            name: format!("{domain}/google-mx-records"),
            zone_id: zone.id.clone(),
            record_name: zone.name.clone(),
            record_type: RecordType::Mx,
            ttl: APEX_RECORD_TTL,
            values: GOOGLE_MX_VALUES.iter().map(ToString::to_string).collect(),
        };
        let record = self.ctx.engine.create_record_set(&spec).await?;
        log::debug!("Created MX record set {}", record.fqdn);
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;
    use crate::test_utils::create_test_record_service;

    #[tokio::test]
    async fn hosted_zone_resolves_by_root_domain() {
        let (svc, engine) = create_test_record_service();
        engine.add_zone("example.com", "Z0001").await;

        let zone = svc.hosted_zone("www.shop.example.com").await.unwrap();
        assert_eq!(zone.id, "Z0001");
        assert_eq!(zone.name, "example.com.");
    }

    #[tokio::test]
    async fn hosted_zone_missing_is_an_error() {
        let (svc, _engine) = create_test_record_service();
        let result = svc.hosted_zone("www.example.com").await;
        assert!(matches!(result, Err(CoreError::ZoneNotFound(ref d)) if d == "example.com"));
    }

    #[tokio::test]
    async fn txt_record_sits_at_zone_apex() {
        let (svc, engine) = create_test_record_service();
        engine.add_zone("example.com", "Z0001").await;

        svc.create_txt_record("site-verification", "www.example.com", "token=abc123")
            .await
            .unwrap();

        let spec = engine.created_records().await.remove(0);
        assert_eq!(spec.name, "www.example.com/txt-record-site-verification");
        assert_eq!(spec.record_name, "example.com.");
        assert_eq!(spec.record_type, RecordType::Txt);
        assert_eq!(spec.ttl, 3600);
        assert_eq!(spec.values, vec!["token=abc123".to_string()]);
    }

    #[tokio::test]
    async fn google_mx_records_carry_fixed_value_list() {
        let (svc, engine) = create_test_record_service();
        engine.add_zone("example.com", "Z0001").await;

        svc.create_google_mx_records("example.com").await.unwrap();

        let spec = engine.created_records().await.remove(0);
        assert_eq!(spec.name, "example.com/google-mx-records");
        assert_eq!(spec.record_name, "example.com.");
        assert_eq!(spec.record_type, RecordType::Mx);
        assert_eq!(spec.ttl, 3600);
        assert_eq!(
            spec.values,
            vec![
                "1 ASPMX.L.GOOGLE.COM.".to_string(),
                "5 ALT1.ASPMX.L.GOOGLE.COM.".to_string(),
                "5 ALT2.ASPMX.L.GOOGLE.COM.".to_string(),
                "10 ALT3.ASPMX.L.GOOGLE.COM.".to_string(),
                "10 ALT4.ASPMX.L.GOOGLE.COM.".to_string(),
            ]
        );
    }
}
