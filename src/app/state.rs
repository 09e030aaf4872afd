// ==========================================
// 渔场管理系统 - 应用状态
// ==========================================
// 职责: 组装 API 客户端、通知器与各工作流服务
// ==========================================

use std::path::PathBuf;
use std::sync::Arc;

use crate::api::{ApiResult, FarmApiClient, FarmBackend};
use crate::app::bill_service::BillService;
use crate::app::catalog_service::CatalogService;
use crate::app::diagnostic_service::DiagnosticService;
use crate::app::inventory_service::InventoryService;
use crate::app::invoice_service::InvoiceService;
use crate::app::ledger_service::LedgerService;
use crate::app::notify::{Notifier, TracingNotifier};
use crate::app::report_service::ReportService;
use crate::config::ClientConfig;
use crate::i18n;

/// 应用状态
///
/// 所有服务共享同一个 API 客户端（及其查询缓存）
pub struct AppState {
    /// 客户端配置
    pub config: ClientConfig,

    /// API 客户端
    pub client: FarmApiClient,

    /// 通知器
    pub notifier: Arc<dyn Notifier>,

    /// 账单工作流
    pub bills: Arc<BillService>,

    /// 发票工作流
    pub invoices: Arc<InvoiceService>,

    /// 报表工作流
    pub reports: Arc<ReportService>,

    /// 员工台账
    pub ledger: Arc<LedgerService>,

    /// 鱼病诊断
    pub diagnostics: Arc<DiagnosticService>,

    /// 库存
    pub inventory: Arc<InventoryService>,

    /// 分类选项
    pub catalog: Arc<CatalogService>,
}

impl AppState {
    /// 创建 AppState（HTTP 后端）
    ///
    /// # 参数
    /// - config: 客户端配置
    /// - notifier: 用户通知出口
    pub fn new(config: ClientConfig, notifier: Arc<dyn Notifier>) -> ApiResult<Self> {
        tracing::info!("初始化AppState，API地址: {}", config.api_root());
        let client = FarmApiClient::new(&config)?;
        Self::assemble(config, client, notifier)
    }

    /// 从配置文件与环境变量创建，并应用界面语言
    pub fn from_env() -> ApiResult<Self> {
        let config = ClientConfig::load()?;
        i18n::set_locale(&config.locale);
        Self::new(config, Arc::new(TracingNotifier))
    }

    /// 使用指定后端创建（测试/离线场景）
    pub fn with_backend(
        config: ClientConfig,
        backend: Arc<dyn FarmBackend>,
        notifier: Arc<dyn Notifier>,
    ) -> ApiResult<Self> {
        let client = FarmApiClient::with_backend(backend, config.cache_ttl());
        Self::assemble(config, client, notifier)
    }

    fn assemble(
        config: ClientConfig,
        client: FarmApiClient,
        notifier: Arc<dyn Notifier>,
    ) -> ApiResult<Self> {
        let diagnostics = DiagnosticService::new(client.clone(), notifier.clone())?;

        Ok(Self {
            bills: Arc::new(BillService::new(client.clone(), notifier.clone())),
            invoices: Arc::new(InvoiceService::new(client.clone(), notifier.clone())),
            reports: Arc::new(ReportService::new(client.clone(), notifier.clone())),
            ledger: Arc::new(LedgerService::new(client.clone(), notifier.clone())),
            diagnostics: Arc::new(diagnostics),
            inventory: Arc::new(InventoryService::new(client.clone(), notifier.clone())),
            catalog: Arc::new(CatalogService::new(client.clone())),
            config,
            client,
            notifier,
        })
    }
}

// ==========================================
// 默认导出目录辅助函数
// ==========================================

/// 获取默认 CSV 导出目录
///
/// # 返回
/// - 环境变量 FISH_FARM_EXPORT_DIR（非空时）
/// - 否则用户下载目录，其次数据目录/fish-farm，最后当前目录
pub fn get_default_export_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("FISH_FARM_EXPORT_DIR") {
        let trimmed = dir.trim();
        if !trimmed.is_empty() {
            return PathBuf::from(trimmed);
        }
    }

    dirs::download_dir()
        .or_else(|| dirs::data_dir().map(|d| d.join("fish-farm")))
        .unwrap_or_else(|| PathBuf::from("."))
}
