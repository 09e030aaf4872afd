// ==========================================
// 渔场管理系统 - 查询缓存
// ==========================================
// 职责: 按 实体 + 参数 缓存列表查询结果
// - 过期时间由 cache_ttl 控制（0 = 不缓存）
// - 写操作后按实体整体失效
// ==========================================

use serde_json::Value;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::debug;

#[derive(Debug, Clone)]
struct CacheEntry {
    value: Value,
    stored_at: Instant,
}

/// 查询缓存
#[derive(Debug)]
pub struct QueryCache {
    ttl: Duration,
    entries: RwLock<HashMap<(String, String), CacheEntry>>,
}

impl QueryCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn is_enabled(&self) -> bool {
        !self.ttl.is_zero()
    }

    /// 读取未过期的缓存
    pub async fn get(&self, entity: &str, params: &str) -> Option<Value> {
        if !self.is_enabled() {
            return None;
        }
        let entries = self.entries.read().await;
        let hit = entries
            .get(&(entity.to_string(), params.to_string()))
            .filter(|e| e.stored_at.elapsed() < self.ttl)
            .map(|e| e.value.clone());
        debug!(entity, params, hit = hit.is_some(), "查询缓存");
        hit
    }

    pub async fn put(&self, entity: &str, params: &str, value: Value) {
        if !self.is_enabled() {
            return;
        }
        self.entries.write().await.insert(
            (entity.to_string(), params.to_string()),
            CacheEntry {
                value,
                stored_at: Instant::now(),
            },
        );
    }

    /// 使某实体的全部缓存失效
    pub async fn invalidate(&self, entity: &str) {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|(e, _), _| e != entity);
        debug!(entity, removed = before - entries.len(), "缓存失效");
    }

    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_put_get_and_invalidate() {
        let cache = QueryCache::new(Duration::from_secs(60));
        cache.put("bills", "", json!([1])).await;
        cache.put("bill-lines", "bill=3", json!([2])).await;
        assert_eq!(cache.get("bills", "").await, Some(json!([1])));
        assert_eq!(cache.get("bill-lines", "bill=4").await, None);

        cache.invalidate("bills").await;
        assert_eq!(cache.get("bills", "").await, None);
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_zero_ttl_disables_cache() {
        let cache = QueryCache::new(Duration::ZERO);
        cache.put("ponds", "", json!([])).await;
        assert_eq!(cache.get("ponds", "").await, None);
        assert_eq!(cache.len().await, 0);
    }
}
