// ==========================================
// 渔场管理系统 - 列表响应信封
// ==========================================
// 列表接口返回三种形态之一:
// - 裸数组
// - {"results": [...]}（分页）
// - {"data": [...]}
// 其余形态视为空列表
// ==========================================

use crate::api::error::ApiResult;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// 取出列表元素
pub fn extract_list(value: Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items,
        Value::Object(mut map) => match (map.remove("results"), map.remove("data")) {
            (Some(Value::Array(items)), _) => items,
            (_, Some(Value::Array(items))) => items,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    }
}

/// 取出列表并解析为实体
pub fn decode_list<T: DeserializeOwned>(value: Value) -> ApiResult<Vec<T>> {
    extract_list(value)
        .into_iter()
        .map(|item| serde_json::from_value(item).map_err(Into::into))
        .collect()
}
