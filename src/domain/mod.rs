// ==========================================
// 渔场管理系统 - 领域模型层
// ==========================================
// 职责: 后端实体的客户端视图、编辑草稿、提交载荷
// 红线: 不含网络访问逻辑,不含计算逻辑
// 实体由后端拥有，ID 由后端分配
// ==========================================

pub mod bill;
pub mod dates;
pub mod diagnostic;
pub mod farm;
pub mod inventory;
pub mod invoice;
pub mod numeric;
pub mod payment;
pub mod payroll;
pub mod refs;
pub mod taxonomy;
pub mod types;

// 重导出核心类型
pub use bill::{
    Bill, BillDraft, BillLine, BillLineDraft, BillLinePayload, BillPayload, ExpenseLineDraft,
    ItemLineDraft, NextBillNumber,
};
pub use diagnostic::{
    Diagnosis, Disease, MedicalDiagnostic, MedicalDiagnosticPayload, MedicalKnowledge, Organ,
    OrganConditions, SelectedOrgan, SymptomSelection,
};
pub use farm::{Customer, Pond, Vendor};
pub use inventory::{CustomerStock, Item, StockEntry, StockLevel};
pub use invoice::{
    Invoice, InvoiceDraft, InvoiceLine, InvoiceLineDraft, InvoiceLinePayload, InvoicePayload,
    NextInvoiceNumber,
};
pub use numeric::FieldValue;
pub use payment::{BillPayment, CashRecord, CustomerPayment, Deposit};
pub use payroll::{Employee, EmployeeStatus, PayrollLine, PayrollRun};
pub use refs::{EntityRef, Identified};
pub use taxonomy::{Account, ExpenseType, IncomeType, Species, TreeNode};
pub use types::{DocumentStatus, ItemCategory, PayrollStatus, StockStatus, Unit};
