// ==========================================
// 渔场管理系统 - 引擎层
// ==========================================
// 职责: 纯计算（行金额/鱼类换算/发票补齐/台账/报表/诊断/库存/分类树）
// 红线: Engine 不访问网络,输入输出均为领域对象
// ==========================================

pub mod csv_export;
pub mod diagnostic;
pub mod fish_line;
pub mod invoice_totals;
pub mod ledger;
pub mod line_totals;
pub mod payroll_totals;
pub mod report;
pub mod stock;
pub mod taxonomy;

// 重导出核心引擎
pub use csv_export::{CsvReportExporter, ExportError, ExportedReport};
pub use diagnostic::{DiagnosticEngine, DiagnosticError};
pub use fish_line::{FishField, FishLineReconciler};
pub use invoice_totals::{InvoiceCalculator, InvoiceValidationError};
pub use ledger::{EmployeeLedger, LedgerBuilder, LedgerEntry, LedgerEntryType};
pub use line_totals::{BillLineCalculator, BillValidationError, LineEdit};
pub use payroll_totals::{aggregate_totals, run_totals, PayrollTotals};
pub use report::{
    ExportMode, FarmReport, PondPerformance, PondStatus, ReportAggregator, ReportData,
    ReportFilter, ReportType,
};
pub use stock::{FishRollup, StockCheck};
pub use taxonomy::{FlatNode, Taxonomy, TreeBranch};
