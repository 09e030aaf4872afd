// ==========================================
// 渔场管理系统 - 客户端配置
// ==========================================
// 职责: 配置加载、覆写、校验
// 来源: 默认值 → 配置文件（JSON）→ 环境变量
// 配置文件: $FISH_FARM_CONFIG 或 <config_dir>/fish-farm/config.json
// ==========================================

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

/// 环境变量名
pub mod config_keys {
    pub const API_URL: &str = "FISH_FARM_API_URL";
    pub const API_TOKEN: &str = "FISH_FARM_API_TOKEN";
    pub const API_TIMEOUT_SECS: &str = "FISH_FARM_API_TIMEOUT_SECS";
    pub const LOCALE: &str = "FISH_FARM_LOCALE";
    pub const CACHE_TTL_SECS: &str = "FISH_FARM_CACHE_TTL_SECS";
    pub const CONFIG_PATH: &str = "FISH_FARM_CONFIG";
}

const DEFAULT_BASE_URL: &str = "http://localhost:8000/api";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_CACHE_TTL_SECS: u64 = 60;
const DEFAULT_LOCALE: &str = "en";
const CONFIG_DIR_NAME: &str = "fish-farm";
const CONFIG_FILE_NAME: &str = "config.json";

/// 配置错误
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("配置文件读取失败 {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("配置文件解析失败 {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("环境变量 {key} 取值无效: {value}")]
    InvalidEnv { key: String, value: String },

    #[error("配置校验失败: {0}")]
    Invalid(String),
}

// ==========================================
// ClientConfig
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// 后端 API 根地址（不含结尾 /）
    pub base_url: String,
    pub token: Option<String>,
    pub timeout_secs: u64,
    pub locale: String,
    /// 查询缓存有效期（0 = 不缓存）
    pub cache_ttl_secs: u64,
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            token: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            locale: DEFAULT_LOCALE.to_string(),
            cache_ttl_secs: DEFAULT_CACHE_TTL_SECS,
            user_agent: format!("fish-farm-client/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ClientConfig {
    /// 按 默认值 → 配置文件 → 环境变量 加载并校验
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var(config_keys::CONFIG_PATH)
            .ok()
            .map(PathBuf::from)
            .or_else(Self::default_path);

        let mut config = match path {
            Some(p) if p.exists() => Self::from_file(&p)?,
            _ => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;

        info!(base_url = %config.base_url, locale = %config.locale, "客户端配置已加载");
        Ok(config)
    }

    /// 默认配置文件路径
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// 从 JSON 文件读取（缺失字段取默认值）
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: ClientConfig =
            serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        debug!(path = %path.display(), "已读取配置文件");
        Ok(config)
    }

    /// 用环境变量覆写
    ///
    /// # 参数
    /// - lookup: 环境变量查询函数（测试中可注入）
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(config_keys::API_URL) {
            self.base_url = url;
        }
        if let Some(token) = lookup(config_keys::API_TOKEN) {
            self.token = Some(token).filter(|t| !t.trim().is_empty());
        }
        if let Some(raw) = lookup(config_keys::API_TIMEOUT_SECS) {
            self.timeout_secs = parse_u64(config_keys::API_TIMEOUT_SECS, &raw)?;
        }
        if let Some(locale) = lookup(config_keys::LOCALE) {
            self.locale = locale;
        }
        if let Some(raw) = lookup(config_keys::CACHE_TTL_SECS) {
            self.cache_ttl_secs = parse_u64(config_keys::CACHE_TTL_SECS, &raw)?;
        }
        Ok(())
    }

    /// 校验: base_url 必须为 http(s)，超时 > 0
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = self.base_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::Invalid(format!(
                "base_url 必须以 http:// 或 https:// 开头: {}",
                self.base_url
            )));
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::Invalid("timeout_secs 必须大于 0".to_string()));
        }
        Ok(())
    }

    /// 去除结尾 / 的根地址
    pub fn api_root(&self) -> &str {
        self.base_url.trim().trim_end_matches('/')
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}

fn parse_u64(key: &str, raw: &str) -> Result<u64, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::InvalidEnv {
        key: key.to_string(),
        value: raw.to_string(),
    })
}
