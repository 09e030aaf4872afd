// ==========================================
// 渔场管理系统 - 日期字段解析
// ==========================================
// 后端日期可能是 "YYYY-MM-DD"、完整时间戳或空串
// ==========================================

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};

/// 解析日期文本（取前 10 个字符）
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    let head = s.get(..10).unwrap_or(s);
    NaiveDate::parse_from_str(head, "%Y-%m-%d").ok()
}

/// serde 辅助：空值或无法解析 → None
pub fn opt_date<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<NaiveDate>, D::Error> {
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(parse_date))
}
