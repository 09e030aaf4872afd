// ==========================================
// 渔场管理系统 - 库存辅助计算
// ==========================================
// 职责: 库存状态分级、单位归一、按单位折算库存、可用量检查、鱼类汇总
// 库存本身由后端维护，这里只做展示与校验用的纯计算
// ==========================================

use crate::domain::inventory::{CustomerStock, Item};
use crate::domain::numeric::round2;
use crate::domain::types::{ItemCategory, StockStatus, Unit};
use serde::Serialize;

/// 按最小/最大库存分级
///
/// 0 → 缺货；≤ 最小 → 低库存；≥ 最大（最大 > 0）→ 超储；其余正常
pub fn classify(current: f64, min: f64, max: f64) -> StockStatus {
    if current <= 0.0 {
        StockStatus::OutOfStock
    } else if current <= min {
        StockStatus::LowStock
    } else if max > 0.0 && current >= max {
        StockStatus::Overstocked
    } else {
        StockStatus::InStock
    }
}

/// 单位归一（目录外的单位保持原样）
pub fn normalize_unit(raw: &str) -> String {
    Unit::parse(raw)
        .map(|u| u.as_str().to_string())
        .unwrap_or_else(|| raw.to_string())
}

/// 按入库明细折算当前库存
///
/// gram/ml ÷1000，ton ×1000，packet × 包装规格（无规格按 1:1），其余 1:1；
/// 无入库明细时取 total_stock_in_unit，其次 total_stock_kg
pub fn stock_in_unit(item: &Item) -> f64 {
    if item.stock_entries.is_empty() {
        return item
            .total_stock_in_unit
            .value()
            .filter(|v| *v != 0.0)
            .or_else(|| item.total_stock_kg.value())
            .unwrap_or(0.0);
    }

    let total: f64 = item
        .stock_entries
        .iter()
        .map(|entry| {
            let qty = entry.quantity;
            match Unit::parse(&entry.unit) {
                Some(Unit::Gram) | Some(Unit::Ml) => qty / 1000.0,
                Some(Unit::Ton) => qty * 1000.0,
                Some(Unit::Packet) => match entry.packet_size.value() {
                    Some(size) if size != 0.0 => qty * size,
                    _ => qty,
                },
                _ => qty,
            }
        })
        .sum();
    round2(total)
}

/// 展示用单位: 入库明细中出现最多的单位，否则物料单位，默认 kg
pub fn display_unit(item: &Item) -> String {
    let mut counts: Vec<(String, usize)> = Vec::new();
    for entry in &item.stock_entries {
        let unit = normalize_unit(&entry.unit);
        match counts.iter_mut().find(|(u, _)| *u == unit) {
            Some((_, n)) => *n += 1,
            None => counts.push((unit, 1)),
        }
    }

    let mut best: Option<(String, usize)> = None;
    for (unit, n) in counts {
        if best.as_ref().map_or(true, |(_, b)| n >= *b) {
            best = Some((unit, n));
        }
    }

    let chosen = best
        .map(|(u, _)| u)
        .or_else(|| item.unit.clone())
        .unwrap_or_else(|| "kg".to_string());
    Unit::parse(&chosen)
        .map(|u| u.as_str().to_string())
        .unwrap_or_else(|| "kg".to_string())
}

/// 可用量检查结果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StockCheck {
    pub available: bool,
    pub message: String,
}

/// 检查物料库存是否满足需求量
///
/// # 参数
/// - item: 物料（None 表示未找到）
/// - quantity: 需求数量
/// - unit: 需求单位
/// - packet_size: 包装规格（仅 packet 单位使用）
pub fn check_availability(
    item: Option<&Item>,
    quantity: f64,
    unit: Unit,
    packet_size: f64,
) -> StockCheck {
    let Some(item) = item else {
        return StockCheck {
            available: false,
            message: "Item not found".to_string(),
        };
    };

    let available = stock_in_unit(item);
    let shown_unit = display_unit(item);

    let required_kg = if item.category_kind() == ItemCategory::Feed {
        match unit {
            Unit::Packet if packet_size > 0.0 => quantity * packet_size,
            Unit::Gram => quantity / 1000.0,
            Unit::Ton => quantity * 1000.0,
            _ => quantity,
        }
    } else {
        quantity
    };

    if available <= 0.0 {
        return StockCheck {
            available: false,
            message: format!(
                "Item is out of stock. Current stock: {} {}",
                fmt_qty(available),
                shown_unit
            ),
        };
    }

    if available < required_kg {
        return StockCheck {
            available: false,
            message: format!(
                "Insufficient stock. Available: {} {}, Required: {} kg ({} {})",
                fmt_qty(available),
                shown_unit,
                fmt_qty(required_kg),
                fmt_qty(quantity),
                unit
            ),
        };
    }

    StockCheck {
        available: true,
        message: format!("Stock available: {} {}", fmt_qty(available), shown_unit),
    }
}

/// 客户库存中的鱼类汇总
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct FishRollup {
    pub weight_kg: f64,
    pub count: f64,
    pub pieces_per_kg: f64,
}

pub fn fish_rollup(stock: &CustomerStock) -> FishRollup {
    let weight_kg = stock
        .fish_total_weight_kg
        .value()
        .filter(|v| *v != 0.0)
        .unwrap_or(stock.current_stock);
    let count = stock.fish_count.or_zero();
    let pieces_per_kg = stock
        .line_number
        .value()
        .filter(|v| *v != 0.0)
        .unwrap_or(if weight_kg > 0.0 { count / weight_kg } else { 0.0 });

    FishRollup {
        weight_kg,
        count,
        pieces_per_kg,
    }
}

fn fmt_qty(v: f64) -> String {
    if v.fract() == 0.0 {
        format!("{}", v as i64)
    } else {
        format!("{}", v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::inventory::StockEntry;
    use crate::domain::numeric::FieldValue;

    fn entry(qty: f64, unit: &str, packet: Option<f64>) -> StockEntry {
        StockEntry {
            quantity: qty,
            unit: unit.to_string(),
            packet_size: packet.into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_classify() {
        assert_eq!(classify(0.0, 5.0, 50.0), StockStatus::OutOfStock);
        assert_eq!(classify(5.0, 5.0, 50.0), StockStatus::LowStock);
        assert_eq!(classify(50.0, 5.0, 50.0), StockStatus::Overstocked);
        assert_eq!(classify(20.0, 5.0, 50.0), StockStatus::InStock);
        assert_eq!(classify(20.0, 5.0, 0.0), StockStatus::InStock);
    }

    #[test]
    fn test_normalize_unit() {
        assert_eq!(normalize_unit("pcs"), "piece");
        assert_eq!(normalize_unit("packets"), "packet");
        assert_eq!(normalize_unit("crate"), "crate");
    }

    #[test]
    fn test_stock_in_unit_conversions() {
        let item = Item {
            stock_entries: vec![
                entry(2.0, "packets", Some(25.0)),
                entry(500.0, "grams", None),
                entry(1.0, "ton", None),
                entry(3.0, "packet", None),
            ],
            ..Default::default()
        };
        assert_eq!(stock_in_unit(&item), 50.0 + 0.5 + 1000.0 + 3.0);
        assert_eq!(display_unit(&item), "packet");
    }

    #[test]
    fn test_stock_fallback_without_entries() {
        let item = Item {
            total_stock_kg: FieldValue::Set(12.0),
            ..Default::default()
        };
        assert_eq!(stock_in_unit(&item), 12.0);
        assert_eq!(display_unit(&item), "kg");
    }

    #[test]
    fn test_check_availability_feed_packets() {
        let item = Item {
            category: Some("feed".to_string()),
            stock_entries: vec![entry(100.0, "kg", None)],
            ..Default::default()
        };
        let ok = check_availability(Some(&item), 2.0, Unit::Packet, 25.0);
        assert!(ok.available);
        assert_eq!(ok.message, "Stock available: 100 kg");

        let short = check_availability(Some(&item), 5.0, Unit::Packet, 25.0);
        assert!(!short.available);
        assert_eq!(
            short.message,
            "Insufficient stock. Available: 100 kg, Required: 125 kg (5 packet)"
        );

        let missing = check_availability(None, 1.0, Unit::Kg, 0.0);
        assert_eq!(missing.message, "Item not found");
    }

    #[test]
    fn test_out_of_stock_message() {
        let item = Item::default();
        let res = check_availability(Some(&item), 1.0, Unit::Kg, 0.0);
        assert!(!res.available);
        assert_eq!(res.message, "Item is out of stock. Current stock: 0 kg");
    }

    #[test]
    fn test_fish_rollup() {
        let stock = CustomerStock {
            current_stock: 40.0,
            fish_count: FieldValue::Set(200.0),
            ..Default::default()
        };
        let r = fish_rollup(&stock);
        assert_eq!(r.weight_kg, 40.0);
        assert_eq!(r.pieces_per_kg, 5.0);
    }
}
