// ==========================================
// 渔场管理系统 - REST 传输层
// ==========================================
// 职责: 以 JSON 收发请求，将非成功响应映射为 ApiError
// FarmBackend 为传输抽象，便于测试中替换为内存实现
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::config::ClientConfig;
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder};
use serde_json::Value;
use tracing::{debug, error, instrument};
use uuid::Uuid;

/// 后端传输抽象
///
/// 路径以 `/` 开头并以 `/` 结尾（可带查询串），如 `/bills/`、`/bill-lines/?bill=3`
#[async_trait]
pub trait FarmBackend: Send + Sync {
    async fn get(&self, path: &str) -> ApiResult<Value>;
    async fn post(&self, path: &str, body: Value) -> ApiResult<Value>;
    async fn put(&self, path: &str, body: Value) -> ApiResult<Value>;
    async fn delete(&self, path: &str) -> ApiResult<()>;
}

// ==========================================
// HttpBackend - 基于 reqwest 的实现
// ==========================================
#[derive(Debug, Clone)]
pub struct HttpBackend {
    http: Client,
    root: String,
    token: Option<String>,
}

impl HttpBackend {
    pub fn new(config: &ClientConfig) -> ApiResult<Self> {
        config.validate()?;
        let http = Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        Ok(Self {
            http,
            root: config.api_root().to_string(),
            token: config.token.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.root, path)
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let builder = self.http.request(method, url);
        match &self.token {
            Some(token) => builder.header("Authorization", format!("Token {}", token)),
            None => builder,
        }
    }

    #[instrument(skip(self, body), fields(request_id = %Uuid::new_v4()))]
    async fn send(&self, method: Method, path: &str, body: Option<Value>) -> ApiResult<Value> {
        let url = self.url(path);
        let mut builder = self.request(method.clone(), &url);
        if let Some(body) = &body {
            builder = builder.json(body);
        }

        debug!(%method, %url, "发送请求");
        let res = builder.send().await.map_err(|e| {
            error!(%method, %url, error = %e, "请求发送失败");
            if e.is_timeout() {
                ApiError::Timeout {
                    method: method.to_string(),
                    url: url.clone(),
                }
            } else {
                ApiError::Transport(e.to_string())
            }
        })?;

        let status = res.status();
        let text = res.text().await.unwrap_or_default();

        if !status.is_success() {
            error!(
                %method,
                %url,
                status = status.as_u16(),
                body = %text,
                "请求失败"
            );
            return Err(ApiError::from_status(
                method.as_str(),
                &url,
                status.as_u16(),
                text,
            ));
        }

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).map_err(|e| ApiError::Decode(format!("{}: {}", url, e)))
    }
}

#[async_trait]
impl FarmBackend for HttpBackend {
    async fn get(&self, path: &str) -> ApiResult<Value> {
        self.send(Method::GET, path, None).await
    }

    async fn post(&self, path: &str, body: Value) -> ApiResult<Value> {
        self.send(Method::POST, path, Some(body)).await
    }

    async fn put(&self, path: &str, body: Value) -> ApiResult<Value> {
        self.send(Method::PUT, path, Some(body)).await
    }

    async fn delete(&self, path: &str) -> ApiResult<()> {
        self.send(Method::DELETE, path, None).await.map(|_| ())
    }
}
