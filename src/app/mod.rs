// ==========================================
// 渔场管理系统 - 应用层
// ==========================================
// 职责: 页面工作流（加载 → 计算 → 提交 → 通知）
// 依赖: api（网络）+ engine（纯计算）
// ==========================================

pub mod bill_service;
pub mod catalog_service;
pub mod diagnostic_service;
pub mod inventory_service;
pub mod invoice_service;
pub mod ledger_service;
pub mod notify;
pub mod report_service;
pub mod state;

// 重导出
pub use bill_service::BillService;
pub use catalog_service::{CatalogService, TaxonomyOption};
pub use diagnostic_service::DiagnosticService;
pub use inventory_service::{InventoryService, PondStockRow};
pub use invoice_service::InvoiceService;
pub use ledger_service::LedgerService;
pub use notify::{Notification, NotificationLevel, Notifier, RecordingNotifier, TracingNotifier};
pub use report_service::ReportService;
pub use state::{get_default_export_dir, AppState};
