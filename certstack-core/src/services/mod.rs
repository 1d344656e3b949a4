//! 业务逻辑服务层

mod certificate_service;
mod record_service;

pub use certificate_service::{baseline_caa_values, CertificateService, ProvisionOptions};
pub use record_service::RecordService;

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use certstack_provider::{HostedZone, ProvisioningEngine, Region, RegionContext};

use crate::config::Settings;
use crate::error::{CoreError, CoreResult};

/// 服务上下文 - 持有引擎句柄与配置
///
/// 调用方创建此上下文并注入具体的 [`ProvisioningEngine`] 实现。
/// 上下文在并发 `provision` 调用间共享是安全的:配置只读,
/// 区域句柄缓存由 `RwLock` 保护。
pub struct ServiceContext {
    /// 资源引擎
    pub engine: Arc<dyn ProvisioningEngine>,
    /// 进程级配置
    pub settings: Settings,
    /// 已打开的区域句柄,按区域缓存
    region_contexts: RwLock<HashMap<String, Arc<RegionContext>>>,
}

impl ServiceContext {
    /// 创建服务上下文
    #[must_use]
    pub fn new(engine: Arc<dyn ProvisioningEngine>, settings: Settings) -> Self {
        Self {
            engine,
            settings,
            region_contexts: RwLock::new(HashMap::new()),
        }
    }

    /// 获取指定区域的引擎句柄,首次访问时打开并缓存
    ///
    /// 区域引导是按名称去重的 provider 资源,每个进程对同一区域只应
    /// 打开一次,之后复用缓存的句柄。
    pub async fn region_context(&self, region: &Region) -> CoreResult<Arc<RegionContext>> {
        if let Some(ctx) = self.region_contexts.read().await.get(region.as_str()) {
            return Ok(ctx.clone());
        }

        let mut contexts = self.region_contexts.write().await;
        // 竞争检查:等待写锁期间其他任务可能已完成引导
        if let Some(ctx) = contexts.get(region.as_str()) {
            return Ok(ctx.clone());
        }

        let logical_name = format!("provider/{region}");
        let ctx = Arc::new(self.engine.open_region(&logical_name, region).await?);
        log::debug!("Opened region context {logical_name}");
        contexts.insert(region.as_str().to_string(), ctx.clone());
        Ok(ctx)
    }

    /// 按裸根域名解析托管区域,不存在时返回 [`CoreError::ZoneNotFound`]
    pub async fn resolve_zone(&self, root_domain: &str) -> CoreResult<HostedZone> {
        self.engine
            .lookup_hosted_zone(root_domain)
            .await?
            .ok_or_else(|| CoreError::ZoneNotFound(root_domain.to_string()))
    }
}
