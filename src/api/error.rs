// ==========================================
// 渔场管理系统 - API层错误类型
// ==========================================
// 职责: 定义API层错误类型，统一网络/HTTP/解析/校验错误
// 所有错误只做展示，不自动重试
// ==========================================

use crate::config::ConfigError;
use crate::engine::{BillValidationError, DiagnosticError, ExportError};
use thiserror::Error;

/// 后端报重复键时的错误体特征串
pub const DUPLICATE_MARKER: &str = "already exists";

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 网络与HTTP错误
    // ==========================================
    #[error("网络错误: {0}")]
    Transport(String),

    #[error("请求超时: {method} {url}")]
    Timeout { method: String, url: String },

    #[error("HTTP {status} {method} {url}: {body}")]
    Http {
        method: String,
        url: String,
        status: u16,
        body: String,
    },

    #[error("认证失败: token 无效或已过期")]
    Unauthorized,

    #[error("资源未找到: {0}")]
    NotFound(String),

    /// 后端唯一约束冲突（错误体含 "already exists"）
    #[error("记录已存在: {0}")]
    Duplicate(String),

    #[error("响应解析失败: {0}")]
    Decode(String),

    // ==========================================
    // 客户端错误
    // ==========================================
    #[error("数据验证失败: {0}")]
    Validation(String),

    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),

    #[error("IO错误: {0}")]
    Io(#[from] std::io::Error),

    #[error("报表导出失败: {0}")]
    Export(#[from] ExportError),

    #[error("诊断失败: {0}")]
    Diagnostic(#[from] DiagnosticError),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<BillValidationError> for ApiError {
    fn from(err: BillValidationError) -> Self {
        ApiError::Validation(err.localized())
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Decode(err.to_string())
    }
}

impl ApiError {
    /// 是否为重复键错误
    pub fn is_duplicate(&self) -> bool {
        matches!(self, ApiError::Duplicate(_))
    }

    /// 由非成功响应构造错误
    pub fn from_status(method: &str, url: &str, status: u16, body: String) -> Self {
        match status {
            401 => ApiError::Unauthorized,
            404 => ApiError::NotFound(url.to_string()),
            _ if body.contains(DUPLICATE_MARKER) => ApiError::Duplicate(body),
            _ => ApiError::Http {
                method: method.to_string(),
                url: url.to_string(),
                status,
                body,
            },
        }
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status_mapping() {
        assert!(matches!(
            ApiError::from_status("GET", "/x/", 401, String::new()),
            ApiError::Unauthorized
        ));
        assert!(matches!(
            ApiError::from_status("GET", "/x/", 404, String::new()),
            ApiError::NotFound(_)
        ));
        let dup = ApiError::from_status(
            "POST",
            "/bills/",
            400,
            r#"{"bill_no":["bill with this bill no already exists."]}"#.to_string(),
        );
        assert!(dup.is_duplicate());
        let other = ApiError::from_status("POST", "/bills/", 500, "boom".to_string());
        assert_eq!(other.to_string(), "HTTP 500 POST /bills/: boom");
    }
}
