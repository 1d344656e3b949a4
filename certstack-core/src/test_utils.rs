//! 测试辅助模块
//!
//! 提供 mock 引擎实现和便捷的测试工厂方法。

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use certstack_provider::{
    CertificateArn, CertificateSpec, CertificateStatus, CertificateSummary, DnsChallenge,
    EngineError, HostedZone, PendingCertificate, ProvisioningEngine, RecordSet, RecordSetSpec,
    RecordType, Region, RegionContext, Result as EngineResult, ValidationSpec,
};

use crate::config::Settings;
use crate::services::{CertificateService, RecordService, ServiceContext};

// ===== MockEngine =====

/// 内存 mock 引擎,记录每次调用的顺序供依赖关系断言使用
pub struct MockEngine {
    /// 托管区域,按裸根域名索引
    zones: RwLock<HashMap<String, HostedZone>>,
    /// 账户内已存在的证书(供 `list_certificates`)
    certificates: RwLock<Vec<CertificateSummary>>,
    /// 已创建的记录集请求
    records: RwLock<Vec<RecordSetSpec>>,
    /// 已提交的证书请求
    certificate_specs: RwLock<Vec<CertificateSpec>>,
    /// 已提交的验证确认请求
    confirmations: RwLock<Vec<ValidationSpec>>,
    /// 按调用顺序记录的操作台账
    calls: RwLock<Vec<String>>,
    /// 如果 Some,confirm_validation 返回此错误
    confirm_error: RwLock<Option<EngineError>>,
    /// 如果 true,confirm_validation 永不返回(用于测试超时路径)
    hang_confirmation: RwLock<bool>,
    /// 如果 false,证书请求不携带 DNS 挑战
    issue_challenges: RwLock<bool>,
}

impl MockEngine {
    pub fn new() -> Self {
        Self {
            zones: RwLock::new(HashMap::new()),
            certificates: RwLock::new(Vec::new()),
            records: RwLock::new(Vec::new()),
            certificate_specs: RwLock::new(Vec::new()),
            confirmations: RwLock::new(Vec::new()),
            calls: RwLock::new(Vec::new()),
            confirm_error: RwLock::new(None),
            hang_confirmation: RwLock::new(false),
            issue_challenges: RwLock::new(true),
        }
    }

    pub async fn add_zone(&self, root_domain: &str, zone_id: &str) {
        self.zones.write().await.insert(
            root_domain.to_string(),
            HostedZone {
                id: zone_id.to_string(),
                name: format!("{root_domain}."),
            },
        );
    }

    pub async fn add_certificate(&self, summary: CertificateSummary) {
        self.certificates.write().await.push(summary);
    }

    pub async fn set_confirm_error(&self, err: Option<EngineError>) {
        *self.confirm_error.write().await = err;
    }

    pub async fn set_hang_confirmation(&self, hang: bool) {
        *self.hang_confirmation.write().await = hang;
    }

    pub async fn set_issue_challenges(&self, issue: bool) {
        *self.issue_challenges.write().await = issue;
    }

    pub async fn calls(&self) -> Vec<String> {
        self.calls.read().await.clone()
    }

    pub async fn created_records(&self) -> Vec<RecordSetSpec> {
        self.records.read().await.clone()
    }

    pub async fn requested_certificates(&self) -> Vec<CertificateSpec> {
        self.certificate_specs.read().await.clone()
    }

    pub async fn confirmations(&self) -> Vec<ValidationSpec> {
        self.confirmations.read().await.clone()
    }

    async fn record_call(&self, call: String) {
        self.calls.write().await.push(call);
    }
}

#[async_trait]
impl ProvisioningEngine for MockEngine {
    fn id(&self) -> &'static str {
        "mock"
    }

    async fn open_region(
        &self,
        logical_name: &str,
        region: &Region,
    ) -> EngineResult<RegionContext> {
        self.record_call(format!("open_region:{region}")).await;
        Ok(RegionContext {
            id: logical_name.to_string(),
            region: region.clone(),
        })
    }

    async fn request_certificate(
        &self,
        ctx: &RegionContext,
        spec: &CertificateSpec,
    ) -> EngineResult<PendingCertificate> {
        self.record_call(format!("request_certificate:{}", spec.domain_name))
            .await;
        self.certificate_specs.write().await.push(spec.clone());

        let parent = spec
            .subject_alternative_names
            .first()
            .cloned()
            .unwrap_or_else(|| spec.domain_name.trim_start_matches("*.").to_string());
        let validation_options = if *self.issue_challenges.read().await {
            vec![DnsChallenge {
                domain_name: spec.domain_name.clone(),
                record_name: format!("_acme-challenge.{parent}."),
                record_type: RecordType::Cname,
                record_value: "_mock-validation.acm-validations.aws.".to_string(),
            }]
        } else {
            Vec::new()
        };

        Ok(PendingCertificate {
            arn: CertificateArn::new(format!(
                "arn:aws:acm:{}:123456789012:certificate/{}",
                ctx.region, spec.name
            )),
            domain_name: spec.domain_name.clone(),
            validation_options,
        })
    }

    async fn list_certificates(
        &self,
        _ctx: &RegionContext,
        domain: &str,
    ) -> EngineResult<Vec<CertificateSummary>> {
        self.record_call(format!("list_certificates:{domain}")).await;
        Ok(self
            .certificates
            .read()
            .await
            .iter()
            .filter(|c| c.domain_name == domain)
            .cloned()
            .collect())
    }

    async fn lookup_hosted_zone(&self, name: &str) -> EngineResult<Option<HostedZone>> {
        self.record_call(format!("lookup_hosted_zone:{name}")).await;
        Ok(self.zones.read().await.get(name).cloned())
    }

    async fn create_record_set(&self, spec: &RecordSetSpec) -> EngineResult<RecordSet> {
        self.record_call(format!(
            "create_record_set:{}:{}",
            spec.record_type, spec.record_name
        ))
        .await;
        self.records.write().await.push(spec.clone());
        Ok(RecordSet {
            name: spec.name.clone(),
            zone_id: spec.zone_id.clone(),
            fqdn: spec.record_name.trim_end_matches('.').to_string(),
            record_type: spec.record_type.clone(),
            ttl: spec.ttl,
            values: spec.values.clone(),
        })
    }

    async fn confirm_validation(
        &self,
        _ctx: &RegionContext,
        spec: &ValidationSpec,
    ) -> EngineResult<CertificateArn> {
        self.record_call(format!("confirm_validation:{}", spec.name))
            .await;
        self.confirmations.write().await.push(spec.clone());

        if *self.hang_confirmation.read().await {
            return std::future::pending().await;
        }
        if let Some(err) = self.confirm_error.read().await.clone() {
            return Err(err);
        }
        Ok(spec.certificate_arn.clone())
    }
}

// ===== 工厂方法 =====

/// 创建测试用 `ServiceContext`
pub fn create_test_context() -> (Arc<ServiceContext>, Arc<MockEngine>) {
    let engine = Arc::new(MockEngine::new());
    let ctx = Arc::new(ServiceContext::new(engine.clone(), Settings::default()));
    (ctx, engine)
}

/// 创建测试用 `CertificateService`
pub fn create_test_certificate_service() -> (CertificateService, Arc<MockEngine>) {
    let (ctx, engine) = create_test_context();
    (CertificateService::new(ctx), engine)
}

/// 创建测试用 `RecordService`
pub fn create_test_record_service() -> (RecordService, Arc<MockEngine>) {
    let (ctx, engine) = create_test_context();
    (RecordService::new(ctx), engine)
}

/// 构造一张已签发状态的证书摘要
pub fn issued_certificate(
    arn: &str,
    domain: &str,
    issued_at: DateTime<Utc>,
) -> CertificateSummary {
    CertificateSummary {
        arn: CertificateArn::new(arn),
        domain_name: domain.to_string(),
        status: CertificateStatus::Issued,
        issued_at: Some(issued_at),
    }
}
