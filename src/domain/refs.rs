// ==========================================
// 渔场管理系统 - 实体引用
// ==========================================
// 后端外键字段可能是纯 ID，也可能是内嵌摘要对象
// ==========================================

use crate::domain::types::ItemCategory;
use serde::{Deserialize, Serialize};

/// 可提供后端 ID 的实体
pub trait Identified {
    fn entity_id(&self) -> Option<i64>;
}

/// 外键引用：ID 或内嵌对象
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntityRef<T> {
    Id(i64),
    Embedded(T),
}

impl<T: Identified> EntityRef<T> {
    pub fn id(&self) -> Option<i64> {
        match self {
            EntityRef::Id(id) => Some(*id),
            EntityRef::Embedded(inner) => inner.entity_id(),
        }
    }

    pub fn embedded(&self) -> Option<&T> {
        match self {
            EntityRef::Embedded(inner) => Some(inner),
            EntityRef::Id(_) => None,
        }
    }
}

// ==========================================
// 内嵌摘要
// ==========================================

/// 物料摘要
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemSummary {
    #[serde(default, alias = "item_id")]
    pub id: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

impl ItemSummary {
    pub fn category_kind(&self) -> ItemCategory {
        ItemCategory::from_label(self.category.as_deref())
    }
}

impl Identified for ItemSummary {
    fn entity_id(&self) -> Option<i64> {
        self.id
    }
}

/// 鱼种摘要
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpeciesSummary {
    #[serde(default, alias = "species_id")]
    pub id: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
}

impl Identified for SpeciesSummary {
    fn entity_id(&self) -> Option<i64> {
        self.id
    }
}

/// 池塘摘要
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PondSummary {
    #[serde(default, alias = "pond_id")]
    pub id: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
}

impl Identified for PondSummary {
    fn entity_id(&self) -> Option<i64> {
        self.id
    }
}

/// 客户摘要（内部客户关联池塘）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CustomerSummary {
    #[serde(default, alias = "customer_id")]
    pub id: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub pond: Option<EntityRef<PondSummary>>,
}

impl Identified for CustomerSummary {
    fn entity_id(&self) -> Option<i64> {
        self.id
    }
}

/// 取内嵌对象的名称
pub fn embedded_name<T, F>(r: Option<&EntityRef<T>>, name: F) -> Option<String>
where
    F: Fn(&T) -> Option<&String>,
{
    match r {
        Some(EntityRef::Embedded(inner)) => name(inner).filter(|s| !s.is_empty()).cloned(),
        _ => None,
    }
}
