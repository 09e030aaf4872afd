// ==========================================
// 集成测试辅助工具
// ==========================================
// 职责: 内存后端 + 测试数据构建
// ==========================================

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::NaiveDate;
use fish_farm_client::api::{ApiError, ApiResult, FarmApiClient, FarmBackend};
use fish_farm_client::domain::{
    Bill, BillLine, EntityRef, FieldValue, Invoice, InvoiceLine, PayrollLine, PayrollRun,
};
use fish_farm_client::domain::refs::{CustomerSummary, ItemSummary, PondSummary, SpeciesSummary};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

// ==========================================
// InMemoryBackend - 内存后端
// ==========================================

/// 记录下来的一次请求
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub method: String,
    pub path: String,
    pub body: Option<Value>,
}

/// 内存后端
///
/// - GET: 返回预置响应（未预置时返回空数组）
/// - POST: 回显请求体并分配自增 id
/// - PUT: 回显请求体并带上路径中的 id
/// - 可对 (method, path) 预置失败响应
#[derive(Default)]
pub struct InMemoryBackend {
    responses: Mutex<HashMap<String, Value>>,
    failures: Mutex<HashMap<(String, String), (u16, String)>>,
    calls: Mutex<Vec<RecordedCall>>,
    next_id: Mutex<i64>,
}

impl InMemoryBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            next_id: Mutex::new(100),
            ..Default::default()
        })
    }

    /// 预置 GET 响应
    pub fn respond(&self, path: &str, value: Value) {
        self.responses
            .lock()
            .unwrap()
            .insert(path.to_string(), value);
    }

    /// 预置失败响应
    pub fn fail(&self, method: &str, path: &str, status: u16, body: &str) {
        self.failures
            .lock()
            .unwrap()
            .insert((method.to_string(), path.to_string()), (status, body.to_string()));
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    /// 指定方法的请求（按发生顺序）
    pub fn calls_for(&self, method: &str) -> Vec<RecordedCall> {
        self.calls()
            .into_iter()
            .filter(|c| c.method == method)
            .collect()
    }

    pub fn count(&self, method: &str, path: &str) -> usize {
        self.calls()
            .iter()
            .filter(|c| c.method == method && c.path == path)
            .count()
    }

    fn record(&self, method: &str, path: &str, body: Option<Value>) -> ApiResult<()> {
        self.calls.lock().unwrap().push(RecordedCall {
            method: method.to_string(),
            path: path.to_string(),
            body,
        });
        match self
            .failures
            .lock()
            .unwrap()
            .get(&(method.to_string(), path.to_string()))
        {
            Some((status, body)) => Err(ApiError::from_status(method, path, *status, body.clone())),
            None => Ok(()),
        }
    }

    fn allocate_id(&self) -> i64 {
        let mut id = self.next_id.lock().unwrap();
        *id += 1;
        *id
    }
}

#[async_trait]
impl FarmBackend for InMemoryBackend {
    async fn get(&self, path: &str) -> ApiResult<Value> {
        self.record("GET", path, None)?;
        Ok(self
            .responses
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .unwrap_or_else(|| json!([])))
    }

    async fn post(&self, path: &str, body: Value) -> ApiResult<Value> {
        self.record("POST", path, Some(body.clone()))?;
        let mut echoed = body;
        if let Some(obj) = echoed.as_object_mut() {
            obj.insert("id".to_string(), json!(self.allocate_id()));
        }
        Ok(echoed)
    }

    async fn put(&self, path: &str, body: Value) -> ApiResult<Value> {
        self.record("PUT", path, Some(body.clone()))?;
        let id: i64 = path
            .trim_matches('/')
            .rsplit('/')
            .next()
            .and_then(|s| s.parse().ok())
            .unwrap_or(0);
        let mut echoed = body;
        if let Some(obj) = echoed.as_object_mut() {
            obj.insert("id".to_string(), json!(id));
        }
        Ok(echoed)
    }

    async fn delete(&self, path: &str) -> ApiResult<()> {
        self.record("DELETE", path, None)
    }
}

/// 基于内存后端的客户端（缓存 60 秒）
pub fn create_test_client() -> (Arc<InMemoryBackend>, FarmApiClient) {
    let backend = InMemoryBackend::new();
    let client = FarmApiClient::with_backend(backend.clone(), Duration::from_secs(60));
    (backend, client)
}

// ==========================================
// 测试数据构建
// ==========================================

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn item_ref(id: i64, name: &str, category: &str) -> Option<EntityRef<ItemSummary>> {
    Some(EntityRef::Embedded(ItemSummary {
        id: Some(id),
        name: Some(name.to_string()),
        category: Some(category.to_string()),
    }))
}

fn pond_ref(pond: Option<i64>) -> Option<EntityRef<PondSummary>> {
    pond.map(EntityRef::Id)
}

/// 物料账单行
pub fn create_test_item_line(
    category: &str,
    qty: f64,
    cost: f64,
    pond: Option<i64>,
) -> BillLine {
    BillLine {
        is_item: true,
        item: item_ref(1, category, category),
        qty: FieldValue::Set(qty),
        cost: FieldValue::Set(cost),
        line_amount: FieldValue::Set(qty * cost),
        pond: pond_ref(pond),
        ..Default::default()
    }
}

/// 直接费用账单行
pub fn create_test_expense_line(amount: f64, pond: Option<i64>) -> BillLine {
    BillLine {
        is_item: false,
        expense_account: Some(9),
        amount: FieldValue::Set(amount),
        pond: pond_ref(pond),
        ..Default::default()
    }
}

pub fn create_test_bill(id: i64, day: NaiveDate, lines: Vec<BillLine>) -> Bill {
    let total = lines.iter().map(BillLine::effective_amount).sum();
    Bill {
        bill_id: id,
        bill_no: format!("B-{:04}", id),
        bill_date: Some(day),
        total_amount: total,
        balance_due: Some(total),
        lines,
        ..Default::default()
    }
}

/// 鱼类发票（单行）
pub fn create_test_fish_invoice(
    id: i64,
    day: NaiveDate,
    customer_pond: Option<i64>,
    species: &str,
    weight: f64,
    amount: f64,
    count: f64,
) -> Invoice {
    Invoice {
        invoice_id: id,
        invoice_no: format!("INV-{}", id),
        invoice_date: Some(day),
        customer: Some(EntityRef::Embedded(CustomerSummary {
            id: Some(id),
            name: Some(format!("Customer {}", id)),
            pond: pond_ref(customer_pond),
        })),
        total_amount: amount,
        lines: vec![InvoiceLine {
            item: item_ref(50, "Rui", "fish"),
            species: Some(EntityRef::Embedded(SpeciesSummary {
                id: Some(7),
                name: Some(species.to_string()),
            })),
            total_weight: FieldValue::Set(weight),
            amount: FieldValue::Set(amount),
            fish_count: FieldValue::Set(count),
            ..Default::default()
        }],
        ..Default::default()
    }
}

pub fn create_test_payroll_line(employee: i64, full_salary: f64, pf_employee: f64) -> PayrollLine {
    PayrollLine {
        employee,
        full_salary,
        pf_employee,
        total_earnings: full_salary,
        total_deductions: pf_employee,
        net_pay: full_salary - pf_employee,
        ..Default::default()
    }
}

pub fn create_test_payroll_run(id: i64, day: NaiveDate, lines: Vec<PayrollLine>) -> PayrollRun {
    PayrollRun {
        payroll_run_id: id,
        pay_date: Some(day),
        lines,
        ..Default::default()
    }
}
