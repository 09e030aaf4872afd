// ==========================================
// 渔场管理系统 - 账单行计算与校验
// ==========================================
// 职责: 行编辑派发、非鱼类行金额、账单合计、提交前校验、提交载荷
// 鱼类行的派生字段委托 FishLineReconciler
// ==========================================

use crate::domain::bill::{
    BillDraft, BillLineDraft, BillLinePayload, BillPayload, ExpenseLineDraft, ItemLineDraft,
};
use crate::domain::numeric::FieldValue;
use crate::domain::types::{ItemCategory, Unit};
use crate::engine::fish_line::{FishField, FishLineReconciler};
use crate::i18n::t_with_args;
use thiserror::Error;

/// 物料行上的一次编辑
#[derive(Debug, Clone, PartialEq)]
pub enum LineEdit {
    /// 选择物料（携带物料类别）
    Item {
        item: Option<i64>,
        category: Option<ItemCategory>,
    },
    Description(String),
    Qty(FieldValue),
    Unit(Unit),
    PacketSize(FieldValue),
    Cost(FieldValue),
    Species(Option<i64>),
    FishCount(FieldValue),
    LineNumber(FieldValue),
    TotalWeight(FieldValue),
    BodyWeightPerFish(FieldValue),
}

// ==========================================
// 校验错误
// ==========================================
// 行号从 1 开始
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BillValidationError {
    #[error("Please select a vendor")]
    MissingVendor,

    #[error("Please add at least one line item")]
    NoLines,

    #[error("Please select an item for line {0}")]
    MissingItem(usize),

    #[error("Please enter a valid total weight for line {0}")]
    InvalidTotalWeight(usize),

    #[error("Please enter a valid quantity for line {0}")]
    InvalidQuantity(usize),

    #[error("Please enter a valid unit cost for line {0}")]
    InvalidCost(usize),

    #[error("Please select an expense account for line {0}")]
    MissingExpenseAccount(usize),

    #[error("Please enter a valid amount for line {0}")]
    InvalidAmount(usize),
}

impl BillValidationError {
    /// 当前语言下的提示文本
    pub fn localized(&self) -> String {
        let (key, line) = match self {
            BillValidationError::MissingVendor => ("bill.validation.missing_vendor", None),
            BillValidationError::NoLines => ("bill.validation.no_lines", None),
            BillValidationError::MissingItem(n) => ("bill.validation.missing_item", Some(*n)),
            BillValidationError::InvalidTotalWeight(n) => {
                ("bill.validation.invalid_total_weight", Some(*n))
            }
            BillValidationError::InvalidQuantity(n) => {
                ("bill.validation.invalid_quantity", Some(*n))
            }
            BillValidationError::InvalidCost(n) => ("bill.validation.invalid_cost", Some(*n)),
            BillValidationError::MissingExpenseAccount(n) => {
                ("bill.validation.missing_expense_account", Some(*n))
            }
            BillValidationError::InvalidAmount(n) => ("bill.validation.invalid_amount", Some(*n)),
        };
        let line = line.map(|n| n.to_string()).unwrap_or_default();
        t_with_args(key, &[("line", line.as_str())])
    }
}

// ==========================================
// BillLineCalculator - 账单行计算器
// ==========================================
#[derive(Debug, Default, Clone, Copy)]
pub struct BillLineCalculator {
    fish: FishLineReconciler,
}

impl BillLineCalculator {
    pub fn new() -> Self {
        Self {
            fish: FishLineReconciler::new(),
        }
    }

    /// 对物料行应用一次编辑
    ///
    /// # 规则
    /// - 选择物料: 单位重置为目录第一个单位，包装规格置 0
    /// - 鱼类行的 尾数/每公斤尾数/总重/单价 编辑: 走鱼类重算
    /// - 非鱼类行的 数量/单价 编辑: 金额 = 数量 × 单价
    pub fn apply(&self, line: &ItemLineDraft, edit: LineEdit) -> ItemLineDraft {
        let mut next = line.clone();

        let fish_field = match &edit {
            LineEdit::FishCount(_) => Some(FishField::FishCount),
            LineEdit::LineNumber(_) => Some(FishField::LineNumber),
            LineEdit::TotalWeight(_) => Some(FishField::TotalWeight),
            LineEdit::Cost(_) => Some(FishField::Cost),
            _ => None,
        };
        let recompute_plain = matches!(edit, LineEdit::Qty(_) | LineEdit::Cost(_));

        match edit {
            LineEdit::Item { item, category } => {
                next.item = item;
                next.category = category;
                next.unit = Unit::CATALOG[0];
                next.packet_size = FieldValue::Set(0.0);
            }
            LineEdit::Description(text) => next.description = text,
            LineEdit::Qty(v) => next.qty = v,
            LineEdit::Unit(u) => next.unit = u,
            LineEdit::PacketSize(v) => next.packet_size = v,
            LineEdit::Cost(v) => next.cost = v,
            LineEdit::Species(s) => next.species = s,
            LineEdit::FishCount(v) => next.fish_count = v,
            LineEdit::LineNumber(v) => next.line_number = v,
            LineEdit::TotalWeight(v) => next.total_weight = v,
            LineEdit::BodyWeightPerFish(v) => next.body_weight_per_fish = v,
        }

        if next.is_fish() {
            if let Some(field) = fish_field {
                return self.fish.reconcile(field, &next);
            }
        } else if recompute_plain {
            next.line_amount = FieldValue::Set(next.qty.or_zero() * next.cost.or_zero());
        }

        next
    }

    /// 账单合计 = Σ 物料行金额 + Σ 费用行金额
    pub fn bill_total(&self, lines: &[BillLineDraft]) -> f64 {
        lines
            .iter()
            .map(|line| match line {
                BillLineDraft::Item(l) => l.line_amount.or_zero(),
                BillLineDraft::Expense(l) => l.amount.or_zero(),
            })
            .sum()
    }

    /// 提交前校验（命中第一条即返回）
    pub fn validate(&self, draft: &BillDraft) -> Result<(), BillValidationError> {
        if draft.vendor.is_none() {
            return Err(BillValidationError::MissingVendor);
        }
        if draft.lines.is_empty() {
            return Err(BillValidationError::NoLines);
        }

        for (idx, line) in draft.lines.iter().enumerate() {
            let n = idx + 1;
            match line {
                BillLineDraft::Item(l) => {
                    if l.item.is_none() {
                        return Err(BillValidationError::MissingItem(n));
                    }
                    if l.is_fish() {
                        if !l.total_weight.is_positive() {
                            return Err(BillValidationError::InvalidTotalWeight(n));
                        }
                    } else if !l.qty.is_positive() {
                        return Err(BillValidationError::InvalidQuantity(n));
                    }
                    if !l.cost.is_positive() {
                        return Err(BillValidationError::InvalidCost(n));
                    }
                }
                BillLineDraft::Expense(l) => {
                    if l.expense_account.is_none() {
                        return Err(BillValidationError::MissingExpenseAccount(n));
                    }
                    if !l.amount.is_positive() {
                        return Err(BillValidationError::InvalidAmount(n));
                    }
                }
            }
        }
        Ok(())
    }

    // ==========================================
    // 提交载荷
    // ==========================================

    /// 账单头载荷（合计由行重算）
    pub fn bill_payload(&self, draft: &BillDraft) -> BillPayload {
        let total = self.bill_total(&draft.lines);
        BillPayload {
            vendor: draft.vendor,
            bill_no: draft.bill_no.clone(),
            bill_date: draft.bill_date,
            due_date: draft.due_date,
            total_amount: total,
            open_balance: total,
            status: draft.status,
            memo: draft.memo.clone(),
            terms: draft.terms,
        }
    }

    /// 行载荷
    ///
    /// 鱼类行: qty = 总重，单位 kg，无包装规格，附带鱼类字段
    pub fn line_payload(&self, bill_id: i64, line: &BillLineDraft) -> BillLinePayload {
        match line {
            BillLineDraft::Item(l) => self.item_line_payload(bill_id, l),
            BillLineDraft::Expense(l) => self.expense_line_payload(bill_id, l),
        }
    }

    fn item_line_payload(&self, bill_id: i64, line: &ItemLineDraft) -> BillLinePayload {
        let fish = line.is_fish();
        let mut payload = empty_payload(bill_id, true);
        payload.item = line.item;
        payload.description = Some(line.description.clone());
        payload.cost = Some(line.cost.or_zero());
        payload.line_amount = Some(line.line_amount.or_zero());

        if fish {
            payload.qty = Some(line.total_weight.or_zero());
            payload.unit = Some(Unit::Kg);
            payload.packet_size = Some(FieldValue::Unset);
            payload.species = line.species;
            payload.total_weight = Some(FieldValue::Set(line.total_weight.or_zero()));
            payload.fish_count = Some(positive_or_unset(line.fish_count));
            payload.line_number = Some(positive_or_unset(line.line_number));
            payload.body_weight_per_fish = Some(positive_or_unset(line.body_weight_per_fish));
        } else {
            payload.qty = Some(line.qty.or_zero());
            payload.unit = Some(line.unit);
            payload.packet_size = Some(positive_or_unset(line.packet_size));
        }
        payload
    }

    fn expense_line_payload(&self, bill_id: i64, line: &ExpenseLineDraft) -> BillLinePayload {
        let mut payload = empty_payload(bill_id, false);
        payload.expense_account = line.expense_account;
        payload.amount = Some(line.amount.or_zero());
        payload.line_memo = Some(line.line_memo.clone());
        payload.pond = line.pond;
        payload
    }
}

fn positive_or_unset(v: FieldValue) -> FieldValue {
    match v.positive() {
        Some(x) => FieldValue::Set(x),
        None => FieldValue::Unset,
    }
}

fn empty_payload(bill_id: i64, is_item: bool) -> BillLinePayload {
    BillLinePayload {
        bill: bill_id,
        is_item,
        item: None,
        description: None,
        qty: None,
        unit: None,
        packet_size: None,
        cost: None,
        line_amount: None,
        species: None,
        total_weight: None,
        fish_count: None,
        line_number: None,
        body_weight_per_fish: None,
        expense_account: None,
        amount: None,
        line_memo: None,
        pond: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed_line() -> ItemLineDraft {
        ItemLineDraft {
            item: Some(3),
            category: Some(ItemCategory::Feed),
            ..Default::default()
        }
    }

    #[test]
    fn test_plain_line_amount_follows_qty_and_cost() {
        let calc = BillLineCalculator::new();
        let line = calc.apply(&feed_line(), LineEdit::Qty(FieldValue::Set(10.0)));
        let line = calc.apply(&line, LineEdit::Cost(FieldValue::Set(25.0)));
        assert_eq!(line.line_amount, FieldValue::Set(250.0));

        let line = calc.apply(&line, LineEdit::Cost(FieldValue::Set(30.0)));
        assert_eq!(line.line_amount, FieldValue::Set(300.0));
    }

    #[test]
    fn test_item_change_resets_unit_and_packet() {
        let calc = BillLineCalculator::new();
        let mut line = feed_line();
        line.unit = Unit::Packet;
        line.packet_size = FieldValue::Set(25.0);
        let line = calc.apply(
            &line,
            LineEdit::Item {
                item: Some(8),
                category: Some(ItemCategory::Medicine),
            },
        );
        assert_eq!(line.unit, Unit::Kg);
        assert_eq!(line.packet_size, FieldValue::Set(0.0));
        assert_eq!(line.item, Some(8));
    }

    #[test]
    fn test_fish_edits_route_to_reconciler() {
        let calc = BillLineCalculator::new();
        let line = ItemLineDraft {
            item: Some(1),
            category: Some(ItemCategory::Fish),
            line_number: FieldValue::Set(4.0),
            cost: FieldValue::Set(10.0),
            ..Default::default()
        };
        let line = calc.apply(&line, LineEdit::FishCount(FieldValue::Set(600.0)));
        assert_eq!(line.total_weight, FieldValue::Set(150.0));
        assert_eq!(line.line_amount, FieldValue::Set(1500.0));
    }

    #[test]
    fn test_bill_total_mixes_item_and_expense_lines() {
        let calc = BillLineCalculator::new();
        let mut item = feed_line();
        item.line_amount = FieldValue::Set(250.0);
        let lines = vec![
            BillLineDraft::Item(item),
            BillLineDraft::Expense(ExpenseLineDraft {
                expense_account: Some(4),
                amount: FieldValue::Set(75.5),
                ..Default::default()
            }),
        ];
        assert_eq!(calc.bill_total(&lines), 325.5);
    }

    #[test]
    fn test_validation_order() {
        let calc = BillLineCalculator::new();
        let mut draft = BillDraft::default();
        assert_eq!(calc.validate(&draft), Err(BillValidationError::MissingVendor));

        draft.vendor = Some(1);
        assert_eq!(calc.validate(&draft), Err(BillValidationError::NoLines));

        let mut fish = ItemLineDraft {
            item: Some(1),
            category: Some(ItemCategory::Fish),
            qty: FieldValue::Set(5.0),
            ..Default::default()
        };
        draft.lines = vec![BillLineDraft::Item(feed_line()), BillLineDraft::Item(fish.clone())];
        assert_eq!(calc.validate(&draft), Err(BillValidationError::InvalidQuantity(1)));

        let mut ok_feed = feed_line();
        ok_feed.qty = FieldValue::Set(1.0);
        ok_feed.cost = FieldValue::Set(1.0);
        draft.lines[0] = BillLineDraft::Item(ok_feed);
        assert_eq!(calc.validate(&draft), Err(BillValidationError::InvalidTotalWeight(2)));

        fish.total_weight = FieldValue::Set(20.0);
        draft.lines[1] = BillLineDraft::Item(fish);
        assert_eq!(calc.validate(&draft), Err(BillValidationError::InvalidCost(2)));
    }

    #[test]
    fn test_expense_line_validation() {
        let calc = BillLineCalculator::new();
        let draft = BillDraft {
            vendor: Some(1),
            lines: vec![BillLineDraft::Expense(ExpenseLineDraft::default())],
            ..Default::default()
        };
        let err = calc.validate(&draft).unwrap_err();
        assert_eq!(err, BillValidationError::MissingExpenseAccount(1));
        assert_eq!(err.to_string(), "Please select an expense account for line 1");
    }

    #[test]
    fn test_fish_payload_uses_weight_as_qty() {
        let calc = BillLineCalculator::new();
        let line = BillLineDraft::Item(ItemLineDraft {
            item: Some(1),
            category: Some(ItemCategory::Fish),
            unit: Unit::Packet,
            qty: FieldValue::Set(3.0),
            packet_size: FieldValue::Set(25.0),
            total_weight: FieldValue::Set(150.0),
            fish_count: FieldValue::Set(600.0),
            cost: FieldValue::Set(10.0),
            line_amount: FieldValue::Set(1500.0),
            ..Default::default()
        });
        let payload = calc.line_payload(42, &line);
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["bill"], 42);
        assert_eq!(json["qty"], 150.0);
        assert_eq!(json["unit"], "kg");
        assert!(json["packet_size"].is_null());
        assert_eq!(json["fish_count"], 600.0);
        assert!(json.get("expense_account").is_none());
    }
}
