// ==========================================
// 渔场管理系统 - 后端 API 客户端
// ==========================================
// 职责: 各实体的类型化读写接口
// - 列表读取经查询缓存
// - 写操作后使相关实体缓存失效
// - 删除账单/发票时后端级联删除行，行缓存一并失效
// ==========================================

use crate::api::backend::{FarmBackend, HttpBackend};
use crate::api::cache::QueryCache;
use crate::api::envelope::decode_list;
use crate::api::error::ApiResult;
use crate::config::ClientConfig;
use crate::domain::bill::{Bill, BillLine, BillLinePayload, BillPayload, NextBillNumber};
use crate::domain::diagnostic::{MedicalDiagnostic, MedicalDiagnosticPayload};
use crate::domain::farm::{Customer, Pond, Vendor};
use crate::domain::inventory::{CustomerStock, Item, StockLevel};
use crate::domain::invoice::{
    Invoice, InvoiceLine, InvoiceLinePayload, InvoicePayload, NextInvoiceNumber,
};
use crate::domain::payment::{BillPayment, CustomerPayment, Deposit};
use crate::domain::payroll::{Employee, PayrollRun};
use crate::domain::taxonomy::{Account, ExpenseType, IncomeType, Species};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, instrument};

/// 实体名（缓存键，同时是资源路径段）
pub mod entities {
    pub const PONDS: &str = "ponds";
    pub const SPECIES: &str = "species";
    pub const EXPENSE_TYPES: &str = "expense-types";
    pub const INCOME_TYPES: &str = "income-types";
    pub const ITEMS: &str = "items";
    pub const VENDORS: &str = "vendors";
    pub const CUSTOMERS: &str = "customers";
    pub const ACCOUNTS: &str = "accounts";
    pub const BILLS: &str = "bills";
    pub const BILL_LINES: &str = "bill-lines";
    pub const INVOICES: &str = "invoices";
    pub const INVOICE_LINES: &str = "invoice-lines";
    pub const BILL_PAYMENTS: &str = "bill-payments";
    pub const CUSTOMER_PAYMENTS: &str = "customer-payments";
    pub const DEPOSITS: &str = "deposits";
    pub const PAYROLL_RUNS: &str = "payroll-runs";
    pub const EMPLOYEES: &str = "employees";
    pub const CUSTOMER_STOCKS: &str = "customer-stocks";
    pub const STOCK_LEVELS: &str = "stock-levels";
    pub const MEDICAL_DIAGNOSTICS: &str = "medical-diagnostics";
}

use entities::*;

/// 主数据写接口: 新建 / 修改 / 删除，均使该实体缓存失效
macro_rules! master_data_writes {
    ($entity:expr, $ty:ty, $create:ident, $update:ident, $delete:ident) => {
        pub async fn $create(&self, record: &$ty) -> ApiResult<$ty> {
            self.create($entity, record).await
        }

        pub async fn $update(&self, id: i64, record: &$ty) -> ApiResult<$ty> {
            self.update($entity, id, record).await
        }

        pub async fn $delete(&self, id: i64) -> ApiResult<()> {
            self.remove($entity, id).await
        }
    };
}

// ==========================================
// FarmApiClient
// ==========================================
#[derive(Clone)]
pub struct FarmApiClient {
    backend: Arc<dyn FarmBackend>,
    cache: Arc<QueryCache>,
}

impl std::fmt::Debug for FarmApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FarmApiClient")
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

impl FarmApiClient {
    /// 由配置创建 HTTP 客户端
    pub fn new(config: &ClientConfig) -> ApiResult<Self> {
        let backend = HttpBackend::new(config)?;
        Ok(Self::with_backend(Arc::new(backend), config.cache_ttl()))
    }

    /// 使用自定义传输层
    pub fn with_backend(backend: Arc<dyn FarmBackend>, cache_ttl: std::time::Duration) -> Self {
        Self {
            backend,
            cache: Arc::new(QueryCache::new(cache_ttl)),
        }
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    // ==========================================
    // 通用读写
    // ==========================================

    /// 列表查询（经缓存）
    async fn list<T: DeserializeOwned>(&self, entity: &str, query: &str) -> ApiResult<Vec<T>> {
        if let Some(hit) = self.cache.get(entity, query).await {
            return decode_list(hit);
        }
        let path = if query.is_empty() {
            format!("/{}/", entity)
        } else {
            format!("/{}/?{}", entity, query)
        };
        let value = self.backend.get(&path).await?;
        self.cache.put(entity, query, value.clone()).await;
        decode_list(value)
    }

    async fn fetch<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        let value = self.backend.get(path).await?;
        Ok(serde_json::from_value(value)?)
    }

    async fn create<B: Serialize, T: DeserializeOwned>(
        &self,
        entity: &str,
        body: &B,
    ) -> ApiResult<T> {
        let value = self
            .backend
            .post(&format!("/{}/", entity), serde_json::to_value(body)?)
            .await?;
        self.cache.invalidate(entity).await;
        Ok(serde_json::from_value(value)?)
    }

    async fn update<B: Serialize, T: DeserializeOwned>(
        &self,
        entity: &str,
        id: i64,
        body: &B,
    ) -> ApiResult<T> {
        let value = self
            .backend
            .put(&format!("/{}/{}/", entity, id), serde_json::to_value(body)?)
            .await?;
        self.cache.invalidate(entity).await;
        Ok(serde_json::from_value(value)?)
    }

    async fn remove(&self, entity: &str, id: i64) -> ApiResult<()> {
        self.backend.delete(&format!("/{}/{}/", entity, id)).await?;
        self.cache.invalidate(entity).await;
        Ok(())
    }

    // ==========================================
    // 主数据
    // ==========================================

    pub async fn ponds(&self) -> ApiResult<Vec<Pond>> {
        self.list(PONDS, "").await
    }

    pub async fn species(&self) -> ApiResult<Vec<Species>> {
        self.list(SPECIES, "").await
    }

    pub async fn expense_types(&self) -> ApiResult<Vec<ExpenseType>> {
        self.list(EXPENSE_TYPES, "").await
    }

    pub async fn income_types(&self) -> ApiResult<Vec<IncomeType>> {
        self.list(INCOME_TYPES, "").await
    }

    pub async fn items(&self) -> ApiResult<Vec<Item>> {
        self.list(ITEMS, "").await
    }

    pub async fn vendors(&self) -> ApiResult<Vec<Vendor>> {
        self.list(VENDORS, "").await
    }

    pub async fn customers(&self) -> ApiResult<Vec<Customer>> {
        self.list(CUSTOMERS, "").await
    }

    pub async fn accounts(&self) -> ApiResult<Vec<Account>> {
        self.list(ACCOUNTS, "").await
    }

    pub async fn employees(&self) -> ApiResult<Vec<Employee>> {
        self.list(EMPLOYEES, "").await
    }

    master_data_writes!(PONDS, Pond, create_pond, update_pond, delete_pond);
    master_data_writes!(SPECIES, Species, create_species, update_species, delete_species);
    master_data_writes!(
        EXPENSE_TYPES,
        ExpenseType,
        create_expense_type,
        update_expense_type,
        delete_expense_type
    );
    master_data_writes!(
        INCOME_TYPES,
        IncomeType,
        create_income_type,
        update_income_type,
        delete_income_type
    );
    master_data_writes!(ITEMS, Item, create_item, update_item, delete_item);
    master_data_writes!(VENDORS, Vendor, create_vendor, update_vendor, delete_vendor);
    master_data_writes!(CUSTOMERS, Customer, create_customer, update_customer, delete_customer);
    master_data_writes!(ACCOUNTS, Account, create_account, update_account, delete_account);
    master_data_writes!(EMPLOYEES, Employee, create_employee, update_employee, delete_employee);

    // ==========================================
    // 账单
    // ==========================================

    pub async fn bills(&self) -> ApiResult<Vec<Bill>> {
        self.list(BILLS, "").await
    }

    pub async fn bill(&self, bill_id: i64) -> ApiResult<Bill> {
        self.fetch(&format!("/{}/{}/", BILLS, bill_id)).await
    }

    pub async fn bill_lines(&self, bill_id: i64) -> ApiResult<Vec<BillLine>> {
        self.list(BILL_LINES, &format!("bill={}", bill_id)).await
    }

    #[instrument(skip(self, payload), fields(bill_no = %payload.bill_no))]
    pub async fn create_bill(&self, payload: &BillPayload) -> ApiResult<Bill> {
        self.create(BILLS, payload).await
    }

    #[instrument(skip(self, payload), fields(bill_no = %payload.bill_no))]
    pub async fn update_bill(&self, bill_id: i64, payload: &BillPayload) -> ApiResult<Bill> {
        self.update(BILLS, bill_id, payload).await
    }

    pub async fn create_bill_line(&self, payload: &BillLinePayload) -> ApiResult<BillLine> {
        self.create(BILL_LINES, payload).await
    }

    pub async fn delete_bill_line(&self, line_id: i64) -> ApiResult<()> {
        self.remove(BILL_LINES, line_id).await
    }

    #[instrument(skip(self))]
    pub async fn delete_bill(&self, bill_id: i64) -> ApiResult<()> {
        self.remove(BILLS, bill_id).await?;
        self.cache.invalidate(BILL_LINES).await;
        Ok(())
    }

    /// 下一个可用账单号
    pub async fn next_bill_number(&self) -> ApiResult<String> {
        let next: NextBillNumber = self
            .fetch(&format!("/{}/next_bill_number/", BILLS))
            .await?;
        debug!(next = %next.next_bill_number, "获取下一个账单号");
        Ok(next.next_bill_number)
    }

    // ==========================================
    // 销售与资金
    // ==========================================

    pub async fn invoices(&self) -> ApiResult<Vec<Invoice>> {
        self.list(INVOICES, "").await
    }

    pub async fn invoice(&self, invoice_id: i64) -> ApiResult<Invoice> {
        self.fetch(&format!("/{}/{}/", INVOICES, invoice_id)).await
    }

    pub async fn invoice_lines(&self, invoice_id: i64) -> ApiResult<Vec<InvoiceLine>> {
        self.list(INVOICE_LINES, &format!("invoice={}", invoice_id)).await
    }

    #[instrument(skip(self, payload), fields(invoice_no = %payload.invoice_no))]
    pub async fn create_invoice(&self, payload: &InvoicePayload) -> ApiResult<Invoice> {
        self.create(INVOICES, payload).await
    }

    #[instrument(skip(self, payload), fields(invoice_no = %payload.invoice_no))]
    pub async fn update_invoice(
        &self,
        invoice_id: i64,
        payload: &InvoicePayload,
    ) -> ApiResult<Invoice> {
        self.update(INVOICES, invoice_id, payload).await
    }

    #[instrument(skip(self))]
    pub async fn delete_invoice(&self, invoice_id: i64) -> ApiResult<()> {
        self.remove(INVOICES, invoice_id).await?;
        self.cache.invalidate(INVOICE_LINES).await;
        Ok(())
    }

    pub async fn create_invoice_line(&self, payload: &InvoiceLinePayload) -> ApiResult<InvoiceLine> {
        self.create(INVOICE_LINES, payload).await
    }

    pub async fn delete_invoice_line(&self, line_id: i64) -> ApiResult<()> {
        self.remove(INVOICE_LINES, line_id).await
    }

    /// 下一个可用发票号
    pub async fn next_invoice_number(&self) -> ApiResult<String> {
        let next: NextInvoiceNumber = self
            .fetch(&format!("/{}/next_invoice_number/", INVOICES))
            .await?;
        debug!(next = %next.next_invoice_number, "获取下一个发票号");
        Ok(next.next_invoice_number)
    }

    pub async fn bill_payments(&self) -> ApiResult<Vec<BillPayment>> {
        self.list(BILL_PAYMENTS, "").await
    }

    pub async fn customer_payments(&self) -> ApiResult<Vec<CustomerPayment>> {
        self.list(CUSTOMER_PAYMENTS, "").await
    }

    pub async fn deposits(&self) -> ApiResult<Vec<Deposit>> {
        self.list(DEPOSITS, "").await
    }

    pub async fn payroll_runs(&self) -> ApiResult<Vec<PayrollRun>> {
        self.list(PAYROLL_RUNS, "").await
    }

    // ==========================================
    // 库存
    // ==========================================

    pub async fn customer_stocks(&self, pond_id: i64) -> ApiResult<Vec<CustomerStock>> {
        self.list(CUSTOMER_STOCKS, &format!("pond={}", pond_id)).await
    }

    pub async fn stock_levels(&self, pond_id: Option<i64>) -> ApiResult<Vec<StockLevel>> {
        let query = pond_id
            .map(|id| format!("pond_id={}", id))
            .unwrap_or_default();
        self.list(STOCK_LEVELS, &query).await
    }

    // ==========================================
    // 鱼病诊断
    // ==========================================

    pub async fn medical_diagnostics(&self) -> ApiResult<Vec<MedicalDiagnostic>> {
        self.list(MEDICAL_DIAGNOSTICS, "").await
    }

    pub async fn create_medical_diagnostic(
        &self,
        payload: &MedicalDiagnosticPayload,
    ) -> ApiResult<MedicalDiagnostic> {
        self.create(MEDICAL_DIAGNOSTICS, payload).await
    }
}
