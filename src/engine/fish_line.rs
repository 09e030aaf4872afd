// ==========================================
// 渔场管理系统 - 鱼类行派生字段引擎
// ==========================================
// 职责: 维持 尾数 / 每公斤尾数 / 总重 三者一致
// 输入: 被编辑字段 + 当前行
// 输出: 新行（纯函数，不修改入参）
// ==========================================
// 账单: 以被编辑字段为准重算另一项
// 发票: 只补齐缺失的一项，不覆盖已填值
// ==========================================

use crate::domain::bill::ItemLineDraft;
use crate::domain::invoice::InvoiceLineDraft;
use crate::domain::numeric::FieldValue;
use crate::domain::types::Unit;
use tracing::debug;

/// 鱼类行中触发重算的字段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FishField {
    FishCount,
    LineNumber,
    TotalWeight,
    Cost,
}

// ==========================================
// FishLineReconciler - 鱼类行重算
// ==========================================
#[derive(Debug, Default, Clone, Copy)]
pub struct FishLineReconciler;

impl FishLineReconciler {
    pub fn new() -> Self {
        Self
    }

    /// 按被编辑字段重算派生字段
    ///
    /// 规则:
    /// 1) 尾数或每公斤尾数变化: 两者均 > 0 → 总重 = 尾数 / 每公斤尾数，否则清空总重
    /// 2) 总重变化: 总重 > 0 且 尾数 > 0 → 每公斤尾数 = 尾数 / 总重，否则清空每公斤尾数
    /// 3) 单价变化: 三元组不变
    /// 之后: qty 跟随总重（单位固定 kg），金额 = 单价 × 总重
    pub fn reconcile(&self, edited: FishField, line: &ItemLineDraft) -> ItemLineDraft {
        let mut next = line.clone();

        match edited {
            FishField::FishCount | FishField::LineNumber => {
                next.total_weight =
                    match (next.fish_count.positive(), next.line_number.positive()) {
                        (Some(count), Some(per_kg)) => FieldValue::Set(count / per_kg),
                        _ => FieldValue::Unset,
                    };
            }
            FishField::TotalWeight => {
                next.line_number =
                    match (next.total_weight.positive(), next.fish_count.positive()) {
                        (Some(weight), Some(count)) => FieldValue::Set(count / weight),
                        _ => FieldValue::Unset,
                    };
            }
            FishField::Cost => {}
        }

        self.sync_quantity_and_amount(&mut next);

        debug!(
            ?edited,
            total_weight = ?next.total_weight,
            line_number = ?next.line_number,
            line_amount = ?next.line_amount,
            "鱼类行重算"
        );
        next
    }

    /// 写入新值并重算
    pub fn apply_edit(
        &self,
        line: &ItemLineDraft,
        edited: FishField,
        value: FieldValue,
    ) -> ItemLineDraft {
        let mut next = line.clone();
        match edited {
            FishField::FishCount => next.fish_count = value,
            FishField::LineNumber => next.line_number = value,
            FishField::TotalWeight => next.total_weight = value,
            FishField::Cost => next.cost = value,
        }
        self.reconcile(edited, &next)
    }

    fn sync_quantity_and_amount(&self, line: &mut ItemLineDraft) {
        match line.total_weight.positive() {
            Some(weight) => {
                line.qty = FieldValue::Set(weight);
                line.unit = Unit::Kg;
            }
            None => line.qty = FieldValue::Unset,
        }

        line.line_amount = match (line.cost.positive(), line.total_weight.positive()) {
            (Some(cost), Some(weight)) => FieldValue::Set(cost * weight),
            _ => FieldValue::Unset,
        };
    }

    // ==========================================
    // 发票行补齐
    // ==========================================

    /// 补齐发票行缺失的三元组成员并重算金额
    ///
    /// 规则（仅当恰好缺一项时生效）:
    /// - 有尾数 + 每公斤尾数，缺总重 → 总重 = 尾数 / 每公斤尾数
    /// - 有尾数 + 总重，缺每公斤尾数 → 每公斤尾数 = 尾数 / 总重
    /// - 有每公斤尾数 + 总重，缺尾数 → 尾数 = round(每公斤尾数 × 总重)
    ///
    /// 金额: 单价与总重均有值 → 单价 × 总重，否则保留原金额
    /// 非鱼类行: 金额 = 数量 × 单价
    pub fn complete_invoice_line(&self, line: &InvoiceLineDraft) -> InvoiceLineDraft {
        let mut next = line.clone();

        if !next.is_fish() {
            next.amount = FieldValue::Set(next.qty.or_zero() * next.rate.or_zero());
            return next;
        }

        let count = next.fish_count.positive();
        let per_kg = next.line_number.positive();
        let weight = next.total_weight.positive();

        match (count, per_kg, weight) {
            (Some(c), Some(l), None) => next.total_weight = FieldValue::Set(c / l),
            (Some(c), None, Some(w)) => next.line_number = FieldValue::Set(c / w),
            (None, Some(l), Some(w)) => next.fish_count = FieldValue::Set((l * w).round()),
            _ => {}
        }

        if let (Some(rate), Some(weight)) = (next.rate.positive(), next.total_weight.positive()) {
            next.amount = FieldValue::Set(rate * weight);
        }

        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::ItemCategory;

    fn fish_line() -> ItemLineDraft {
        ItemLineDraft {
            item: Some(1),
            category: Some(ItemCategory::Fish),
            ..Default::default()
        }
    }

    #[test]
    fn test_count_then_weight_edit() {
        let engine = FishLineReconciler::new();
        let mut line = fish_line();
        line.line_number = FieldValue::Set(4.0);

        let line = engine.apply_edit(&line, FishField::FishCount, FieldValue::Set(600.0));
        assert_eq!(line.total_weight, FieldValue::Set(150.0));
        assert_eq!(line.qty, FieldValue::Set(150.0));
        assert_eq!(line.unit, Unit::Kg);

        let line = engine.apply_edit(&line, FishField::TotalWeight, FieldValue::Set(100.0));
        assert_eq!(line.line_number, FieldValue::Set(6.0));
        assert_eq!(line.fish_count, FieldValue::Set(600.0));
    }

    #[test]
    fn test_clearing_count_clears_weight() {
        let engine = FishLineReconciler::new();
        let mut line = fish_line();
        line.fish_count = FieldValue::Set(600.0);
        line.line_number = FieldValue::Set(4.0);
        line.cost = FieldValue::Set(200.0);
        let line = engine.reconcile(FishField::FishCount, &line);
        assert_eq!(line.line_amount, FieldValue::Set(30000.0));

        let line = engine.apply_edit(&line, FishField::FishCount, FieldValue::Unset);
        assert_eq!(line.total_weight, FieldValue::Unset);
        assert_eq!(line.qty, FieldValue::Unset);
        assert_eq!(line.line_amount, FieldValue::Unset);
    }

    #[test]
    fn test_triple_zero_leaves_blank() {
        let engine = FishLineReconciler::new();
        let mut line = fish_line();
        line.fish_count = FieldValue::Set(0.0);
        line.line_number = FieldValue::Set(0.0);
        line.total_weight = FieldValue::Set(0.0);
        for field in [FishField::FishCount, FishField::LineNumber, FishField::TotalWeight] {
            let out = engine.reconcile(field, &line);
            assert!(!out.total_weight.is_positive());
            assert_eq!(out.qty, FieldValue::Unset);
            assert_eq!(out.line_amount, FieldValue::Unset);
        }
    }

    #[test]
    fn test_cost_edit_keeps_triple() {
        let engine = FishLineReconciler::new();
        let mut line = fish_line();
        line.fish_count = FieldValue::Set(500.0);
        line.line_number = FieldValue::Set(5.0);
        line.total_weight = FieldValue::Set(100.0);

        let out = engine.apply_edit(&line, FishField::Cost, FieldValue::Set(120.0));
        assert_eq!(out.fish_count, FieldValue::Set(500.0));
        assert_eq!(out.line_number, FieldValue::Set(5.0));
        assert_eq!(out.line_amount, FieldValue::Set(12000.0));
    }

    #[test]
    fn test_invoice_completion_fills_missing_member() {
        let engine = FishLineReconciler::new();
        let base = InvoiceLineDraft {
            category: Some(ItemCategory::Fish),
            rate: FieldValue::Set(250.0),
            ..Default::default()
        };

        let mut line = base.clone();
        line.line_number = FieldValue::Set(2.5);
        line.total_weight = FieldValue::Set(41.0);
        let out = engine.complete_invoice_line(&line);
        assert_eq!(out.fish_count, FieldValue::Set(103.0));
        assert_eq!(out.amount, FieldValue::Set(10250.0));

        let mut line = base.clone();
        line.fish_count = FieldValue::Set(300.0);
        line.line_number = FieldValue::Set(3.0);
        let out = engine.complete_invoice_line(&line);
        assert_eq!(out.total_weight, FieldValue::Set(100.0));

        let mut line = base;
        line.fish_count = FieldValue::Set(300.0);
        line.total_weight = FieldValue::Set(60.0);
        line.line_number = FieldValue::Set(9.0);
        let out = engine.complete_invoice_line(&line);
        assert_eq!(out.line_number, FieldValue::Set(9.0));
    }

    #[test]
    fn test_invoice_amount_kept_without_weight() {
        let engine = FishLineReconciler::new();
        let line = InvoiceLineDraft {
            category: Some(ItemCategory::Fish),
            rate: FieldValue::Set(250.0),
            amount: FieldValue::Set(999.0),
            ..Default::default()
        };
        assert_eq!(engine.complete_invoice_line(&line).amount, FieldValue::Set(999.0));
    }

    #[test]
    fn test_invoice_non_fish_amount() {
        let engine = FishLineReconciler::new();
        let line = InvoiceLineDraft {
            category: Some(ItemCategory::Feed),
            qty: FieldValue::Set(4.0),
            rate: FieldValue::Set(12.5),
            ..Default::default()
        };
        assert_eq!(engine.complete_invoice_line(&line).amount, FieldValue::Set(50.0));
    }
}
