// ==========================================
// 渔场管理系统 - 供应商账单
// ==========================================
// 职责: 账单/账单行的接口记录与编辑草稿
// 账单行两种形态: 物料行 (is_item=true) / 直接费用行
// ==========================================

use crate::domain::dates;
use crate::domain::numeric::{lenient, FieldValue};
use crate::domain::refs::{EntityRef, ItemSummary, PondSummary, SpeciesSummary};
use crate::domain::types::{DocumentStatus, ItemCategory, Unit};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ==========================================
// Bill - 账单记录（后端返回）
// ==========================================
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Bill {
    #[serde(default, alias = "id")]
    pub bill_id: i64,
    #[serde(default)]
    pub vendor: Option<i64>,
    #[serde(default)]
    pub vendor_name: Option<String>,
    #[serde(default, alias = "bill_number")]
    pub bill_no: String,
    #[serde(default, deserialize_with = "dates::opt_date")]
    pub bill_date: Option<NaiveDate>,
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
    pub terms: Option<i64>,
    #[serde(default)]
    pub lines: Vec<BillLine>,
}

impl Bill {
    /// 未付余额（balance_due 优先，其次 open_balance）
    pub fn balance(&self) -> f64 {
        self.balance_due.or(self.open_balance).unwrap_or(0.0)
    }

    /// 账单所涉池塘（来自费用行）
    pub fn ponds(&self) -> impl Iterator<Item = i64> + '_ {
        self.lines.iter().filter_map(|l| l.pond.as_ref().and_then(|p| p.id()))
    }
}

// ==========================================
// BillLine - 账单行记录
// ==========================================
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BillLine {
    #[serde(default, alias = "id")]
    pub bill_line_id: i64,
    #[serde(default)]
    pub bill: Option<i64>,
    #[serde(default = "default_true")]
    pub is_item: bool,
    #[serde(default)]
    pub item: Option<EntityRef<ItemSummary>>,
    #[serde(default)]
    pub item_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub qty: FieldValue,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub packet_size: FieldValue,
    #[serde(default)]
    pub cost: FieldValue,
    #[serde(default)]
    pub line_amount: FieldValue,
    #[serde(default)]
    pub species: Option<EntityRef<SpeciesSummary>>,
    #[serde(default)]
    pub total_weight: FieldValue,
    #[serde(default)]
    pub fish_count: FieldValue,
    #[serde(default)]
    pub body_weight_per_fish: FieldValue,
    #[serde(default)]
    pub line_number: FieldValue,
    #[serde(default)]
    pub expense_account: Option<i64>,
    #[serde(default)]
    pub expense_account_name: Option<String>,
    #[serde(default)]
    pub amount: FieldValue,
    #[serde(default)]
    pub line_memo: Option<String>,
    #[serde(default)]
    pub pond: Option<EntityRef<PondSummary>>,
}

fn default_true() -> bool {
    true
}

impl BillLine {
    /// 行所属物料类别（仅内嵌物料可判定）
    pub fn category(&self) -> Option<ItemCategory> {
        self.item
            .as_ref()
            .and_then(|r| r.embedded())
            .filter(|i| i.category.is_some())
            .map(|i| i.category_kind())
    }

    pub fn category_label(&self) -> Option<String> {
        self.item
            .as_ref()
            .and_then(|r| r.embedded())
            .and_then(|i| i.category.clone())
            .filter(|c| !c.is_empty())
    }

    pub fn is_fish(&self) -> bool {
        self.is_item && self.category() == Some(ItemCategory::Fish)
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

    /// 行金额：line_amount 优先，其次 amount
    pub fn effective_amount(&self) -> f64 {
        self.line_amount
            .value()
            .filter(|v| *v != 0.0)
            .or_else(|| self.amount.value())
            .unwrap_or(0.0)
    }
}

// ==========================================
// 编辑草稿
// ==========================================

/// 物料行草稿
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemLineDraft {
    pub item: Option<i64>,
    pub category: Option<ItemCategory>,
    pub description: String,
    pub qty: FieldValue,
    pub unit: Unit,
    pub packet_size: FieldValue,
    pub cost: FieldValue,
    pub line_amount: FieldValue,
    pub species: Option<i64>,
    pub fish_count: FieldValue,
    pub line_number: FieldValue,
    pub total_weight: FieldValue,
    pub body_weight_per_fish: FieldValue,
}

impl ItemLineDraft {
    pub fn is_fish(&self) -> bool {
        self.category == Some(ItemCategory::Fish)
    }

    /// 从已有账单行构造草稿
    ///
    /// # 参数
    /// - line: 后端账单行
    /// - category: 物料类别（内嵌对象缺失时由调用方按物料表补齐）
    pub fn from_record(line: &BillLine, category: Option<ItemCategory>) -> Self {
        Self {
            item: line.item.as_ref().and_then(|r| r.id()),
            category: category.or_else(|| line.category()),
            description: line.description.clone().unwrap_or_default(),
            qty: line.qty,
            unit: line.unit.as_deref().and_then(Unit::parse).unwrap_or_default(),
            packet_size: line.packet_size,
            cost: line.cost,
            line_amount: line.line_amount,
            species: line.species.as_ref().and_then(|r| r.id()),
            fish_count: line.fish_count,
            line_number: line.line_number,
            total_weight: line.total_weight,
            body_weight_per_fish: line.body_weight_per_fish,
        }
    }
}

/// 直接费用行草稿
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExpenseLineDraft {
    pub expense_account: Option<i64>,
    pub amount: FieldValue,
    pub line_memo: String,
    pub pond: Option<i64>,
}

impl ExpenseLineDraft {
    pub fn from_record(line: &BillLine) -> Self {
        Self {
            expense_account: line.expense_account,
            amount: line.amount,
            line_memo: line.line_memo.clone().unwrap_or_default(),
            pond: line.pond.as_ref().and_then(|p| p.id()),
        }
    }
}

/// 账单行草稿
#[derive(Debug, Clone, PartialEq)]
pub enum BillLineDraft {
    Item(ItemLineDraft),
    Expense(ExpenseLineDraft),
}

impl BillLineDraft {
    pub fn from_record(line: &BillLine, category: Option<ItemCategory>) -> Self {
        if line.is_item {
            BillLineDraft::Item(ItemLineDraft::from_record(line, category))
        } else {
            BillLineDraft::Expense(ExpenseLineDraft::from_record(line))
        }
    }
}

/// 账单草稿（新建或编辑）
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BillDraft {
    /// 编辑时为已有账单 ID
    pub bill_id: Option<i64>,
    pub vendor: Option<i64>,
    pub bill_no: String,
    pub bill_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub status: DocumentStatus,
    pub memo: String,
    pub terms: Option<i64>,
    pub lines: Vec<BillLineDraft>,
}

// ==========================================
// 提交载荷
// ==========================================

/// 账单头载荷
#[derive(Debug, Clone, Serialize)]
pub struct BillPayload {
    pub vendor: Option<i64>,
    pub bill_no: String,
    pub bill_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub total_amount: f64,
    pub open_balance: f64,
    pub status: DocumentStatus,
    pub memo: String,
    pub terms: Option<i64>,
}

/// 账单行载荷
#[derive(Debug, Clone, Serialize)]
pub struct BillLinePayload {
    pub bill: i64,
    pub is_item: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qty: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<Unit>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub packet_size: Option<FieldValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub species: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_weight: Option<FieldValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fish_count: Option<FieldValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_number: Option<FieldValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body_weight_per_fish: Option<FieldValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expense_account: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_memo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pond: Option<i64>,
}

/// 下一个可用账单号
#[derive(Debug, Clone, Deserialize)]
pub struct NextBillNumber {
    pub next_bill_number: String,
}
