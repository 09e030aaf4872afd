// ==========================================
// 渔场管理系统 - 池塘与往来单位
// ==========================================

use crate::domain::dates;
use crate::domain::numeric::lenient;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// 池塘
///
/// 后端 ID 字段名为 `id` 或 `pond_id`（取决于接口版本）
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Pond {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub pond_id: Option<i64>,
    #[serde(default)]
    pub name: String,
    #[serde(default, alias = "water_area_decimal", deserialize_with = "lenient::number")]
    pub area_decimal: f64,
    #[serde(default, deserialize_with = "lenient::number")]
    pub depth_ft: f64,
    #[serde(default, deserialize_with = "lenient::number")]
    pub volume_m3: f64,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default, deserialize_with = "dates::opt_date")]
    pub leasing_end_date: Option<NaiveDate>,
}

fn default_active() -> bool {
    true
}

impl Pond {
    pub fn key(&self) -> Option<i64> {
        self.pond_id.or(self.id)
    }
}

/// 供应商
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Vendor {
    #[serde(default, alias = "id")]
    pub vendor_id: i64,
    #[serde(default)]
    pub name: String,
}

/// 客户（内部客户关联池塘）
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Customer {
    #[serde(default, alias = "id")]
    pub customer_id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default, rename = "type")]
    pub customer_type: Option<String>,
    #[serde(default)]
    pub pond: Option<i64>,
    #[serde(default)]
    pub pond_name: Option<String>,
}
