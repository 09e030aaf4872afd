// ==========================================
// 渔场管理系统 - 客户发票
// ==========================================
// 职责: 发票/发票行的接口记录与编辑草稿
// ==========================================

use crate::domain::dates;
use crate::domain::numeric::{lenient, FieldValue};
use crate::domain::refs::{
    CustomerSummary, EntityRef, ItemSummary, PondSummary, SpeciesSummary,
};
use crate::domain::types::{DocumentStatus, ItemCategory, Unit};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ==========================================
// Invoice - 发票记录
// ==========================================
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Invoice {
    #[serde(default, alias = "id")]
    pub invoice_id: i64,
    #[serde(default)]
    pub customer: Option<EntityRef<CustomerSummary>>,
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default, alias = "invoice_number")]
    pub invoice_no: String,
    #[serde(default, deserialize_with = "dates::opt_date")]
    pub invoice_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "dates::opt_date")]
    pub due_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub total_amount: f64,
    #[serde(default, deserialize_with = "lenient::number")]
    pub paid_amount: f64,
    #[serde(default, deserialize_with = "lenient::opt_number")]
    pub open_balance: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_number")]
    pub balance_due: Option<f64>,
    #[serde(default)]
    pub status: DocumentStatus,
    #[serde(default)]
    pub memo: Option<String>,
    #[serde(default)]
    pub lines: Vec<InvoiceLine>,
}

impl Invoice {
    pub fn balance(&self) -> f64 {
        self.balance_due.or(self.open_balance).unwrap_or(0.0)
    }

    /// 客户所属池塘（内部客户）
    pub fn customer_pond(&self) -> Option<i64> {
        self.customer
            .as_ref()
            .and_then(|c| c.embedded())
            .and_then(|c| c.pond.as_ref())
            .and_then(|p| p.id())
    }

    /// 客户名称（内嵌对象优先）
    pub fn customer_label(&self) -> Option<String> {
        self.customer
            .as_ref()
            .and_then(|c| c.embedded())
            .and_then(|c| c.name.clone())
            .or_else(|| self.customer_name.clone())
            .filter(|s| !s.is_empty())
    }

    /// 是否包含鱼类销售行
    pub fn has_fish_line(&self) -> bool {
        self.lines.iter().any(InvoiceLine::is_fish)
    }
}

// ==========================================
// InvoiceLine - 发票行记录
// ==========================================
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InvoiceLine {
    #[serde(default, alias = "id")]
    pub invoice_line_id: i64,
    #[serde(default)]
    pub item: Option<EntityRef<ItemSummary>>,
    #[serde(default)]
    pub item_name: Option<String>,
    #[serde(default)]
    pub item_category: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub qty: FieldValue,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub packet_size: FieldValue,
    #[serde(default)]
    pub rate: FieldValue,
    #[serde(default)]
    pub amount: FieldValue,
    #[serde(default)]
    pub pond: Option<EntityRef<PondSummary>>,
    #[serde(default)]
    pub species: Option<EntityRef<SpeciesSummary>>,
    #[serde(default)]
    pub total_weight: FieldValue,
    #[serde(default)]
    pub line_number: FieldValue,
    #[serde(default)]
    pub fish_count: FieldValue,
}

impl InvoiceLine {
    /// 类别文本：内嵌物料优先，其次扁平字段
    pub fn category_label(&self) -> Option<String> {
        self.item
            .as_ref()
            .and_then(|r| r.embedded())
            .and_then(|i| i.category.clone())
            .or_else(|| self.item_category.clone())
            .filter(|c| !c.is_empty())
    }

    pub fn is_fish(&self) -> bool {
        ItemCategory::from_label(self.category_label().as_deref()) == ItemCategory::Fish
    }

    pub fn item_label(&self) -> Option<String> {
        self.item
            .as_ref()
            .and_then(|r| r.embedded())
            .and_then(|i| i.name.clone())
            .or_else(|| self.item_name.clone())
            .filter(|s| !s.is_empty())
    }

    pub fn species_label(&self) -> Option<String> {
        self.species
            .as_ref()
            .and_then(|r| r.embedded())
            .and_then(|s| s.name.clone())
            .filter(|s| !s.is_empty())
    }

    /// 销售重量：total_weight 优先，其次 qty
    pub fn sold_weight(&self) -> f64 {
        self.total_weight
            .value()
            .filter(|v| *v != 0.0)
            .or_else(|| self.qty.value())
            .unwrap_or(0.0)
    }
}

// ==========================================
// 发票编辑草稿
// ==========================================
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InvoiceLineDraft {
    pub item: Option<i64>,
    pub category: Option<ItemCategory>,
    pub description: String,
    pub qty: FieldValue,
    pub unit: Unit,
    pub packet_size: FieldValue,
    pub rate: FieldValue,
    pub amount: FieldValue,
    pub pond: Option<i64>,
    pub species: Option<i64>,
    pub fish_count: FieldValue,
    pub line_number: FieldValue,
    pub total_weight: FieldValue,
}

impl InvoiceLineDraft {
    pub fn is_fish(&self) -> bool {
        self.category == Some(ItemCategory::Fish)
    }

    /// 由已有发票行还原草稿（类别由调用方解析）
    pub fn from_record(line: &InvoiceLine, category: Option<ItemCategory>) -> Self {
        Self {
            item: line.item.as_ref().and_then(|r| r.id()),
            category,
            description: line.description.clone().unwrap_or_default(),
            qty: line.qty,
            unit: line
                .unit
                .as_deref()
                .and_then(Unit::parse)
                .unwrap_or(Unit::Kg),
            packet_size: line.packet_size,
            rate: line.rate,
            amount: line.amount,
            pond: line.pond.as_ref().and_then(|r| r.id()),
            species: line.species.as_ref().and_then(|r| r.id()),
            fish_count: line.fish_count,
            line_number: line.line_number,
            total_weight: line.total_weight,
        }
    }
}

/// 发票草稿（invoice_id 为 None 表示新建）
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InvoiceDraft {
    pub invoice_id: Option<i64>,
    pub customer: Option<i64>,
    pub invoice_no: String,
    pub invoice_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub status: DocumentStatus,
    pub memo: String,
    pub lines: Vec<InvoiceLineDraft>,
}

// ==========================================
// 提交载荷
// ==========================================

/// 发票头载荷
#[derive(Debug, Clone, Serialize)]
pub struct InvoicePayload {
    pub customer: Option<i64>,
    pub invoice_no: String,
    pub invoice_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub total_amount: f64,
    pub open_balance: f64,
    pub status: DocumentStatus,
    pub memo: String,
}

/// 发票行载荷
#[derive(Debug, Clone, Serialize)]
pub struct InvoiceLinePayload {
    pub invoice: i64,
    pub item: Option<i64>,
    pub description: String,
    pub qty: f64,
    pub unit: Unit,
    pub packet_size: FieldValue,
    pub rate: f64,
    pub amount: f64,
    pub pond: Option<i64>,
    pub species: Option<i64>,
    pub total_weight: FieldValue,
    pub line_number: FieldValue,
    pub fish_count: FieldValue,
}

/// 下一个可用发票号
#[derive(Debug, Clone, Deserialize)]
pub struct NextInvoiceNumber {
    pub next_invoice_number: String,
}
