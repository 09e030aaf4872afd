// ==========================================
// 渔场管理系统 - 客户端核心库
// ==========================================
// 技术栈: Rust + tokio + reqwest
// 系统定位: 渔场管理后端的客户端业务层
// 后端拥有全部数据，本库负责计算、校验、报表与诊断
// ==========================================

// 初始化国际化系统
rust_i18n::i18n!("locales", fallback = "en");

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体、草稿与载荷
pub mod domain;

// 引擎层 - 纯计算
pub mod engine;

// 配置层 - 客户端配置
pub mod config;

// 日志系统
pub mod logging;

// 国际化
pub mod i18n;

// API 层 - REST 客户端与查询缓存
pub mod api;

// 应用层 - 页面级工作流
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{DocumentStatus, ItemCategory, PayrollStatus, StockStatus, Unit};

// 领域实体
pub use domain::{
    Bill, BillDraft, BillLine, BillLineDraft, Diagnosis, FieldValue, Invoice, InvoiceLine,
    ItemLineDraft, PayrollRun, Pond, SymptomSelection,
};

// 引擎
pub use engine::{
    BillLineCalculator, CsvReportExporter, DiagnosticEngine, FishLineReconciler, LedgerBuilder,
    ReportAggregator,
};

// API
pub use api::{ApiError, FarmApiClient, FarmBackend, HttpBackend};

// 应用
pub use app::{AppState, Notifier};

// 配置
pub use config::ClientConfig;

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "Fish Farm Management";
