// ==========================================
// 渔场管理系统 - 配置层
// ==========================================
// 职责: 客户端配置加载与校验,支持多级覆写
// 层级: 默认值 → JSON 配置文件 → 环境变量
// ==========================================

pub mod client_config;

// 重导出核心配置
pub use client_config::{config_keys, ClientConfig, ConfigError};
