// ==========================================
// 渔场管理系统 - 收付款与存款
// ==========================================
// 金额字段名称在不同接口间不一致:
// total_amount / amount_total / amount，统一经 amount() 读取
// ==========================================

use crate::domain::dates;
use crate::domain::numeric::lenient;
use crate::domain::refs::{EntityRef, PondSummary};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// 带金额与池塘的资金记录
pub trait CashRecord {
    fn record_date(&self) -> Option<NaiveDate>;
    fn pond(&self) -> Option<i64>;
    fn amount(&self) -> f64;
}

/// 多个候选金额字段取第一个存在的
fn first_amount(candidates: &[Option<f64>]) -> f64 {
    candidates.iter().flatten().next().copied().unwrap_or(0.0)
}

// ==========================================
// BillPayment - 供应商付款
// ==========================================
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BillPayment {
    #[serde(default, alias = "id")]
    pub bill_payment_id: i64,
    #[serde(default, deserialize_with = "dates::opt_date")]
    pub payment_date: Option<NaiveDate>,
    #[serde(default)]
    pub vendor: Option<i64>,
    #[serde(default, deserialize_with = "lenient::opt_number")]
    pub total_amount: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_number")]
    pub amount: Option<f64>,
    #[serde(default)]
    pub pond: Option<EntityRef<PondSummary>>,
    #[serde(default)]
    pub memo: Option<String>,
}

impl CashRecord for BillPayment {
    fn record_date(&self) -> Option<NaiveDate> {
        self.payment_date
    }

    fn pond(&self) -> Option<i64> {
        self.pond.as_ref().and_then(|p| p.id())
    }

    fn amount(&self) -> f64 {
        first_amount(&[self.total_amount, self.amount])
    }
}

// ==========================================
// CustomerPayment - 客户收款
// ==========================================
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CustomerPayment {
    #[serde(default, alias = "id")]
    pub customer_payment_id: i64,
    #[serde(default, deserialize_with = "dates::opt_date")]
    pub payment_date: Option<NaiveDate>,
    #[serde(default)]
    pub customer: Option<i64>,
    #[serde(default, deserialize_with = "lenient::opt_number")]
    pub amount_total: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_number")]
    pub amount: Option<f64>,
    #[serde(default)]
    pub pond: Option<EntityRef<PondSummary>>,
    #[serde(default)]
    pub memo: Option<String>,
}

impl CashRecord for CustomerPayment {
    fn record_date(&self) -> Option<NaiveDate> {
        self.payment_date
    }

    fn pond(&self) -> Option<i64> {
        self.pond.as_ref().and_then(|p| p.id())
    }

    fn amount(&self) -> f64 {
        first_amount(&[self.amount_total, self.amount])
    }
}

// ==========================================
// Deposit - 银行存款
// ==========================================
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Deposit {
    #[serde(default, alias = "id")]
    pub deposit_id: i64,
    #[serde(default, deserialize_with = "dates::opt_date")]
    pub deposit_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient::opt_number")]
    pub amount_total: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_number")]
    pub amount: Option<f64>,
    #[serde(default)]
    pub pond: Option<EntityRef<PondSummary>>,
    #[serde(default)]
    pub memo: Option<String>,
}

impl CashRecord for Deposit {
    fn record_date(&self) -> Option<NaiveDate> {
        self.deposit_date
    }

    fn pond(&self) -> Option<i64> {
        self.pond.as_ref().and_then(|p| p.id())
    }

    fn amount(&self) -> f64 {
        first_amount(&[self.amount_total, self.amount])
    }
}
