// ==========================================
// 渔场管理系统 - 数值字段解析
// ==========================================
// 职责: 后端数值字段的宽松解码
// 输入形态: 数字 / 数字字符串 / 空字符串 / null
// ==========================================

use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

// ==========================================
// FieldValue - 可选数值字段
// ==========================================
// Unset 表示"未填写"，与 Set(0.0) 区分
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum FieldValue {
    #[default]
    Unset,
    Set(f64),
}

impl FieldValue {
    /// 从文本输入构造（空白或无法解析 → Unset）
    pub fn parse(raw: &str) -> Self {
        match parse_lenient(raw) {
            Some(v) => FieldValue::Set(v),
            None => FieldValue::Unset,
        }
    }

    pub fn value(&self) -> Option<f64> {
        match self {
            FieldValue::Set(v) => Some(*v),
            FieldValue::Unset => None,
        }
    }

    /// 未填写按 0 处理
    pub fn or_zero(&self) -> f64 {
        self.value().unwrap_or(0.0)
    }

    /// 仅当值 > 0 时返回
    pub fn positive(&self) -> Option<f64> {
        self.value().filter(|v| *v > 0.0)
    }

    pub fn is_positive(&self) -> bool {
        self.positive().is_some()
    }

    pub fn is_set(&self) -> bool {
        matches!(self, FieldValue::Set(_))
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        FieldValue::Set(v)
    }
}

impl From<Option<f64>> for FieldValue {
    fn from(v: Option<f64>) -> Self {
        match v {
            Some(v) => FieldValue::Set(v),
            None => FieldValue::Unset,
        }
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FieldValue::Set(v) => serializer.serialize_f64(*v),
            FieldValue::Unset => serializer.serialize_none(),
        }
    }
}

impl<'de> Deserialize<'de> for FieldValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<RawNumber>::deserialize(deserializer)?;
        Ok(raw.and_then(RawNumber::into_f64).into())
    }
}

// ==========================================
// 宽松解析
// ==========================================

#[derive(Deserialize)]
#[serde(untagged)]
enum RawNumber {
    Number(f64),
    Text(String),
    Flag(bool),
}

impl RawNumber {
    fn into_f64(self) -> Option<f64> {
        match self {
            RawNumber::Number(v) => Some(v),
            RawNumber::Text(s) => parse_lenient(&s),
            RawNumber::Flag(_) => None,
        }
    }
}

/// 按"最长数字前缀"规则解析文本
///
/// # 示例
/// - "12.5" → Some(12.5)
/// - "12.5kg" → Some(12.5)
/// - "" / "abc" → None
pub fn parse_lenient(raw: &str) -> Option<f64> {
    let s = raw.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if end < bytes.len() && (bytes[end] == b'+' || bytes[end] == b'-') {
        end += 1;
    }

    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;

    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut j = frac_start;
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
        }
        if digits > 0 || j > frac_start {
            digits += j - frac_start;
            end = j;
        }
    }

    if digits == 0 {
        return None;
    }

    if end < bytes.len() && (bytes[end] == b'e' || bytes[end] == b'E') {
        let mut j = end + 1;
        if j < bytes.len() && (bytes[j] == b'+' || bytes[j] == b'-') {
            j += 1;
        }
        let exp_start = j;
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
        }
        if j > exp_start {
            end = j;
        }
    }

    s[..end].trim_end_matches('.').parse::<f64>().ok()
}

/// serde 辅助函数（用于 `deserialize_with`）
pub mod lenient {
    use super::RawNumber;
    use serde::{Deserialize, Deserializer};

    /// 无法解析 → 0
    pub fn number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        Ok(opt_number(deserializer)?.unwrap_or(0.0))
    }

    /// 无法解析 → None
    pub fn opt_number<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<f64>, D::Error> {
        let raw = Option::<RawNumber>::deserialize(deserializer)?;
        Ok(raw.and_then(RawNumber::into_f64))
    }
}

/// 金额保留两位小数
pub fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}
