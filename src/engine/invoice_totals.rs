// ==========================================
// 渔场管理系统 - 发票行补齐与校验
// ==========================================
// 职责: 提交前补齐鱼类三元组、发票合计、校验、提交载荷
// 数量/单价/金额/总重 提交时保留两位小数
// ==========================================

use crate::domain::invoice::{InvoiceDraft, InvoiceLineDraft, InvoiceLinePayload, InvoicePayload};
use crate::domain::numeric::{round2, FieldValue};
use crate::domain::types::Unit;
use crate::engine::fish_line::FishLineReconciler;
use crate::i18n::t_with_args;
use thiserror::Error;

/// 发票校验错误（行号从 1 开始）
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvoiceValidationError {
    #[error("Please select a customer")]
    MissingCustomer,

    #[error("Please add at least one line item")]
    NoLines,

    #[error("Please select an item for line {0}")]
    MissingItem(usize),

    #[error("Please enter a valid total weight for line {0}")]
    InvalidTotalWeight(usize),

    #[error("Please enter a valid quantity for line {0}")]
    InvalidQuantity(usize),

    #[error("Please enter a valid unit price for line {0}")]
    InvalidRate(usize),
}

impl InvoiceValidationError {
    /// 当前语言的提示文本
    pub fn localized(&self) -> String {
        let (key, line) = match self {
            InvoiceValidationError::MissingCustomer => ("invoice.validation.missing_customer", None),
            InvoiceValidationError::NoLines => ("invoice.validation.no_lines", None),
            InvoiceValidationError::MissingItem(n) => ("invoice.validation.missing_item", Some(*n)),
            InvoiceValidationError::InvalidTotalWeight(n) => {
                ("invoice.validation.invalid_total_weight", Some(*n))
            }
            InvoiceValidationError::InvalidQuantity(n) => {
                ("invoice.validation.invalid_quantity", Some(*n))
            }
            InvoiceValidationError::InvalidRate(n) => ("invoice.validation.invalid_rate", Some(*n)),
        };
        let line = line.map(|n| n.to_string()).unwrap_or_default();
        t_with_args(key, &[("line", line.as_str())])
    }
}

// ==========================================
// InvoiceCalculator - 发票计算器
// ==========================================
#[derive(Debug, Default, Clone, Copy)]
pub struct InvoiceCalculator {
    fish: FishLineReconciler,
}

impl InvoiceCalculator {
    pub fn new() -> Self {
        Self {
            fish: FishLineReconciler::new(),
        }
    }

    /// 逐行补齐（鱼类三元组 + 金额）
    pub fn complete(&self, draft: &InvoiceDraft) -> InvoiceDraft {
        InvoiceDraft {
            lines: draft
                .lines
                .iter()
                .map(|l| self.fish.complete_invoice_line(l))
                .collect(),
            ..draft.clone()
        }
    }

    /// 发票合计 = Σ 行金额
    pub fn invoice_total(&self, lines: &[InvoiceLineDraft]) -> f64 {
        round2(lines.iter().map(|l| l.amount.or_zero()).sum())
    }

    /// 提交前校验（命中第一条即返回）
    ///
    /// 鱼类行校验总重，其余行校验数量；所有行单价须 > 0
    pub fn validate(&self, draft: &InvoiceDraft) -> Result<(), InvoiceValidationError> {
        if draft.customer.is_none() {
            return Err(InvoiceValidationError::MissingCustomer);
        }
        if draft.lines.is_empty() {
            return Err(InvoiceValidationError::NoLines);
        }

        for (idx, line) in draft.lines.iter().enumerate() {
            let n = idx + 1;
            if line.item.is_none() {
                return Err(InvoiceValidationError::MissingItem(n));
            }
            if line.is_fish() {
                if !line.total_weight.is_positive() {
                    return Err(InvoiceValidationError::InvalidTotalWeight(n));
                }
            } else if !line.qty.is_positive() {
                return Err(InvoiceValidationError::InvalidQuantity(n));
            }
            if !line.rate.is_positive() {
                return Err(InvoiceValidationError::InvalidRate(n));
            }
        }
        Ok(())
    }

    // ==========================================
    // 提交载荷
    // ==========================================

    /// 发票头载荷（未结余额 = 合计）
    pub fn invoice_payload(&self, draft: &InvoiceDraft) -> InvoicePayload {
        let total = self.invoice_total(&draft.lines);
        InvoicePayload {
            customer: draft.customer,
            invoice_no: draft.invoice_no.clone(),
            invoice_date: draft.invoice_date,
            due_date: draft.due_date,
            total_amount: total,
            open_balance: total,
            status: draft.status,
            memo: draft.memo.clone(),
        }
    }

    /// 行载荷
    ///
    /// 鱼类行: qty = 总重，单位 kg，无包装规格
    pub fn line_payload(&self, invoice_id: i64, line: &InvoiceLineDraft) -> InvoiceLinePayload {
        let fish = line.is_fish();
        let (qty, unit, packet_size) = if fish {
            (line.total_weight.or_zero(), Unit::Kg, FieldValue::Unset)
        } else {
            (line.qty.or_zero(), line.unit, positive_or_unset(line.packet_size))
        };

        InvoiceLinePayload {
            invoice: invoice_id,
            item: line.item,
            description: line.description.clone(),
            qty: round2(qty),
            unit,
            packet_size,
            rate: round2(line.rate.or_zero()),
            amount: round2(line.amount.or_zero()),
            pond: line.pond,
            species: line.species,
            total_weight: match line.total_weight.positive() {
                Some(w) => FieldValue::Set(round2(w)),
                None => FieldValue::Unset,
            },
            line_number: positive_or_unset(line.line_number),
            fish_count: positive_or_unset(line.fish_count),
        }
    }
}

fn positive_or_unset(v: FieldValue) -> FieldValue {
    match v.positive() {
        Some(x) => FieldValue::Set(x),
        None => FieldValue::Unset,
    }
}
