// ==========================================
// 渔场管理系统 - API 层
// ==========================================
// 职责: 与 REST 后端通信,提供类型化接口与查询缓存
// ==========================================

pub mod backend;
pub mod cache;
pub mod client;
pub mod envelope;
pub mod error;

// 重导出核心类型
pub use backend::{FarmBackend, HttpBackend};
pub use cache::QueryCache;
pub use client::{entities, FarmApiClient};
pub use envelope::{decode_list, extract_list};
pub use error::{ApiError, ApiResult};
