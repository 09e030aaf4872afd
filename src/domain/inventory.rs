// ==========================================
// 渔场管理系统 - 物料与库存
// ==========================================
// 职责: 物料主数据、客户库存投影、库存水平
// 库存为只读投影，由后端维护
// ==========================================

use crate::domain::numeric::{lenient, FieldValue};
use crate::domain::refs::{CustomerSummary, EntityRef, ItemSummary, PondSummary};
use crate::domain::types::{ItemCategory, StockStatus};
use serde::{Deserialize, Serialize};

/// 入库明细
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StockEntry {
    #[serde(default, alias = "id")]
    pub entry_id: i64,
    #[serde(default, deserialize_with = "lenient::number")]
    pub quantity: f64,
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub packet_size: FieldValue,
    #[serde(default)]
    pub kg_equivalent: FieldValue,
}

/// 物料
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Item {
    #[serde(default, alias = "id")]
    pub item_id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub item_type: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub uom: Option<String>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub current_stock: f64,
    #[serde(default)]
    pub total_stock_kg: FieldValue,
    #[serde(default)]
    pub total_stock_in_unit: FieldValue,
    #[serde(default)]
    pub selling_price: FieldValue,
    #[serde(default)]
    pub fish_total_weight_kg: FieldValue,
    #[serde(default)]
    pub fish_count: FieldValue,
    #[serde(default)]
    pub stock_entries: Vec<StockEntry>,
}

impl Item {
    pub fn category_kind(&self) -> ItemCategory {
        ItemCategory::from_label(self.category.as_deref())
    }

    /// 主计量单位文本（unit 优先，其次 uom）
    pub fn primary_unit(&self) -> Option<&str> {
        self.unit
            .as_deref()
            .or(self.uom.as_deref())
            .filter(|u| !u.trim().is_empty())
    }
}

/// 客户库存（按池塘、按物料）
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CustomerStock {
    #[serde(default, alias = "id")]
    pub customer_stock_id: i64,
    #[serde(default)]
    pub customer: Option<EntityRef<CustomerSummary>>,
    #[serde(default)]
    pub pond: Option<EntityRef<PondSummary>>,
    #[serde(default)]
    pub item: Option<EntityRef<ItemSummary>>,
    #[serde(default)]
    pub item_name: Option<String>,
    #[serde(default)]
    pub item_category: Option<String>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub current_stock: f64,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub unit_cost: f64,
    #[serde(default)]
    pub min_stock_level: FieldValue,
    #[serde(default)]
    pub max_stock_level: FieldValue,
    #[serde(default)]
    pub stock_status: Option<StockStatus>,
    #[serde(default)]
    pub fish_total_weight_kg: FieldValue,
    #[serde(default)]
    pub fish_count: FieldValue,
    #[serde(default)]
    pub line_number: FieldValue,
}

impl CustomerStock {
    pub fn item_id(&self) -> Option<i64> {
        self.item.as_ref().and_then(|r| r.id())
    }

    pub fn pond_id(&self) -> Option<i64> {
        self.pond.as_ref().and_then(|r| r.id())
    }

    pub fn category_kind(&self) -> ItemCategory {
        let label = self
            .item
            .as_ref()
            .and_then(|r| r.embedded())
            .and_then(|i| i.category.clone())
            .or_else(|| self.item_category.clone());
        ItemCategory::from_label(label.as_deref())
    }
}

/// 库存水平（/stock-levels/）
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StockLevel {
    #[serde(default, alias = "id")]
    pub item_id: i64,
    #[serde(default)]
    pub item_name: String,
    #[serde(default)]
    pub item_type: Option<String>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub current_stock: f64,
    #[serde(default, deserialize_with = "lenient::number")]
    pub minimum_stock: f64,
    #[serde(default, deserialize_with = "lenient::number")]
    pub maximum_stock: f64,
    #[serde(default, deserialize_with = "lenient::number")]
    pub unit_cost: f64,
    #[serde(default, deserialize_with = "lenient::number")]
    pub total_value: f64,
    #[serde(default)]
    pub status: Option<StockStatus>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_customer_stock_decoding() {
        let json = r#"{
            "customer_stock_id": 1, "pond": {"pond_id": 4, "name": "East"},
            "item": {"id": 9, "name": "Tilapia", "category": "fish"},
            "current_stock": "120.5", "unit": "kg", "unit_cost": "150",
            "stock_status": "low_stock", "fish_count": "400", "line_number": ""
        }"#;
        let stock: CustomerStock = serde_json::from_str(json).unwrap();
        assert_eq!(stock.pond_id(), Some(4));
        assert_eq!(stock.item_id(), Some(9));
        assert_eq!(stock.category_kind(), ItemCategory::Fish);
        assert_eq!(stock.stock_status, Some(StockStatus::LowStock));
        assert_eq!(stock.fish_count, FieldValue::Set(400.0));
        assert_eq!(stock.line_number, FieldValue::Unset);
    }

    #[test]
    fn test_stock_level_legacy_status() {
        let level: StockLevel =
            serde_json::from_str(r#"{"item_id": 2, "item_name": "Lime", "status": "high"}"#).unwrap();
        assert_eq!(level.status, Some(StockStatus::Overstocked));
    }
}
