// ==========================================
// 渔场管理系统 - 领域类型定义
// ==========================================
// 职责: 状态枚举、物料类别、计量单位
// 序列化格式: snake_case (与后端一致)
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 单据状态 (Document Status)
// ==========================================
// 账单与发票共用
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    #[default]
    Draft,
    Pending,
    Open,
    Sent,
    Partial,
    Paid,
    Overdue,
    Cancelled,
    #[serde(other)]
    Unknown,
}

impl fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DocumentStatus::Draft => "draft",
            DocumentStatus::Pending => "pending",
            DocumentStatus::Open => "open",
            DocumentStatus::Sent => "sent",
            DocumentStatus::Partial => "partial",
            DocumentStatus::Paid => "paid",
            DocumentStatus::Overdue => "overdue",
            DocumentStatus::Cancelled => "cancelled",
            DocumentStatus::Unknown => "unknown",
        };
        write!(f, "{}", s)
    }
}

// ==========================================
// 工资单状态 (Payroll Status)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayrollStatus {
    #[default]
    Draft,
    Paid,
    #[serde(other)]
    Unknown,
}

impl fmt::Display for PayrollStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PayrollStatus::Draft => write!(f, "draft"),
            PayrollStatus::Paid => write!(f, "paid"),
            PayrollStatus::Unknown => write!(f, "unknown"),
        }
    }
}

// ==========================================
// 物料类别 (Item Category)
// ==========================================
// 后端以自由文本存储，这里只区分参与计算的几类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemCategory {
    Fish,
    Feed,
    Medicine,
    Other,
}

impl ItemCategory {
    /// 从后端类别文本判定（大小写不敏感）
    pub fn from_label(label: Option<&str>) -> Self {
        match label.map(|s| s.trim().to_lowercase()).as_deref() {
            Some("fish") => ItemCategory::Fish,
            Some("feed") => ItemCategory::Feed,
            Some("medicine") => ItemCategory::Medicine,
            _ => ItemCategory::Other,
        }
    }
}

impl fmt::Display for ItemCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemCategory::Fish => write!(f, "fish"),
            ItemCategory::Feed => write!(f, "feed"),
            ItemCategory::Medicine => write!(f, "medicine"),
            ItemCategory::Other => write!(f, "other"),
        }
    }
}

// ==========================================
// 计量单位 (Unit of Measure)
// ==========================================
// 固定目录，第一个单位为默认单位
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Unit {
    #[default]
    Kg,
    Litre,
    Piece,
    Gram,
    Ml,
    Ton,
    Box,
    Bag,
    Bottle,
    Packet,
}

impl Unit {
    /// 单位目录（顺序即下拉顺序）
    pub const CATALOG: [Unit; 10] = [
        Unit::Kg,
        Unit::Litre,
        Unit::Piece,
        Unit::Gram,
        Unit::Ml,
        Unit::Ton,
        Unit::Box,
        Unit::Bag,
        Unit::Bottle,
        Unit::Packet,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Unit::Kg => "kg",
            Unit::Litre => "litre",
            Unit::Piece => "piece",
            Unit::Gram => "gram",
            Unit::Ml => "ml",
            Unit::Ton => "ton",
            Unit::Box => "box",
            Unit::Bag => "bag",
            Unit::Bottle => "bottle",
            Unit::Packet => "packet",
        }
    }

    /// 解析单位文本（含复数与别名）
    ///
    /// # 返回
    /// - Some(Unit): 已知单位
    /// - None: 目录外的单位
    pub fn parse(raw: &str) -> Option<Unit> {
        let unit = match raw.trim().to_lowercase().as_str() {
            "kg" | "kgs" | "kilogram" | "kilograms" => Unit::Kg,
            "litre" | "liter" | "litres" | "liters" | "l" => Unit::Litre,
            "piece" | "pieces" | "pcs" | "pc" => Unit::Piece,
            "gram" | "grams" | "g" => Unit::Gram,
            "ml" | "milliliter" | "milliliters" | "millilitre" | "millilitres" => Unit::Ml,
            "ton" | "tons" | "tonne" | "tonnes" => Unit::Ton,
            "box" | "boxes" => Unit::Box,
            "bag" | "bags" => Unit::Bag,
            "bottle" | "bottles" => Unit::Bottle,
            "packet" | "packets" | "pack" | "packs" => Unit::Packet,
            _ => return None,
        };
        Some(unit)
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// 库存状态 (Stock Status)
// ==========================================
// 后端字段值: in_stock / low_stock / out_of_stock / overstocked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockStatus {
    #[serde(alias = "normal")]
    InStock,
    #[serde(alias = "low")]
    LowStock,
    #[serde(alias = "out")]
    OutOfStock,
    #[serde(alias = "high")]
    Overstocked,
}

impl fmt::Display for StockStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StockStatus::InStock => write!(f, "in_stock"),
            StockStatus::LowStock => write!(f, "low_stock"),
            StockStatus::OutOfStock => write!(f, "out_of_stock"),
            StockStatus::Overstocked => write!(f, "overstocked"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_aliases() {
        assert_eq!(Unit::parse("pcs"), Some(Unit::Piece));
        assert_eq!(Unit::parse("Pack"), Some(Unit::Packet));
        assert_eq!(Unit::parse("liters"), Some(Unit::Litre));
        assert_eq!(Unit::parse("kilograms"), Some(Unit::Kg));
        assert_eq!(Unit::parse("bottles"), Some(Unit::Bottle));
        assert_eq!(Unit::parse("furlong"), None);
        assert_eq!(Unit::CATALOG[0], Unit::default());
    }

    #[test]
    fn test_status_decoding() {
        let s: DocumentStatus = serde_json::from_str("\"partial\"").unwrap();
        assert_eq!(s, DocumentStatus::Partial);
        let s: DocumentStatus = serde_json::from_str("\"void\"").unwrap();
        assert_eq!(s, DocumentStatus::Unknown);
        let s: StockStatus = serde_json::from_str("\"low_stock\"").unwrap();
        assert_eq!(s, StockStatus::LowStock);
    }

    #[test]
    fn test_item_category() {
        assert_eq!(ItemCategory::from_label(Some("Fish")), ItemCategory::Fish);
        assert_eq!(ItemCategory::from_label(Some("chemical")), ItemCategory::Other);
        assert_eq!(ItemCategory::from_label(None), ItemCategory::Other);
    }
}
