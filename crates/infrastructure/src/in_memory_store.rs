use async_trait::async_trait;
use registry_domain::KeyValueStore;
use registry_errors::RegistryResult;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::debug;

/// 内存键值存储实现
///
/// 用于嵌入式部署和测试，按键维护过期时间。过期的键在下一次访问时惰性删除，
/// 行为与Redis的自动过期一致：过期后读取不到，也不会出现在扫描结果中。
#[derive(Debug, Clone, Default)]
pub struct InMemoryWorkerStore {
    entries: Arc<RwLock<HashMap<String, Entry>>>,
}

#[derive(Debug, Clone)]
struct Entry {
    value: Vec<u8>,
    expires_at: Instant,
}

impl Entry {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// 清除所有已过期的键，返回清除数量
fn purge_expired(entries: &mut HashMap<String, Entry>, now: Instant) -> usize {
    let before = entries.len();
    entries.retain(|_, entry| !entry.is_expired(now));
    let purged = before - entries.len();
    if purged > 0 {
        debug!("Purged {} expired keys from in-memory store", purged);
    }
    purged
}

impl InMemoryWorkerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 键的剩余存活时间
    pub async fn ttl_remaining(&self, key: &str) -> Option<Duration> {
        let now = Instant::now();
        let entries = self.entries.read().await;
        entries
            .get(key)
            .filter(|entry| !entry.is_expired(now))
            .map(|entry| entry.expires_at - now)
    }

    /// 直接写入原始字节，绕过编码（用于模拟损坏的数据）
    pub async fn insert_raw(&self, key: &str, value: &[u8], ttl: Duration) {
        let mut entries = self.entries.write().await;
        entries.insert(
            key.to_string(),
            Entry {
                value: value.to_vec(),
                expires_at: Instant::now() + ttl,
            },
        );
    }

    pub async fn len(&self) -> usize {
        let now = Instant::now();
        let entries = self.entries.read().await;
        entries.values().filter(|e| !e.is_expired(now)).count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl KeyValueStore for InMemoryWorkerStore {
    async fn set(&self, key: &str, value: &[u8], ttl: Duration) -> RegistryResult<()> {
        self.insert_raw(key, value, ttl).await;
        Ok(())
    }

    async fn get(&self, key: &str) -> RegistryResult<Option<Vec<u8>>> {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        match entries.get(key) {
            Some(entry) if entry.is_expired(now) => {
                entries.remove(key);
                Ok(None)
            }
            Some(entry) => Ok(Some(entry.value.clone())),
            None => Ok(None),
        }
    }

    async fn delete(&self, key: &str) -> RegistryResult<bool> {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        Ok(entries
            .remove(key)
            .is_some_and(|entry| !entry.is_expired(now)))
    }

    /// 扫描时顺带清除所有已过期的键，停止心跳的Worker不会一直占用内存
    async fn scan_prefix(&self, prefix: &str) -> RegistryResult<Vec<String>> {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        purge_expired(&mut entries, now);
        let mut keys: Vec<String> = entries
            .keys()
            .filter(|key| key.starts_with(prefix))
            .cloned()
            .collect();
        keys.sort();
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_entries_expire_after_ttl() {
        let store = InMemoryWorkerStore::new();
        store
            .set("w:1", b"one", Duration::from_secs(30))
            .await
            .unwrap();

        tokio::time::advance(Duration::from_secs(29)).await;
        assert_eq!(store.get("w:1").await.unwrap(), Some(b"one".to_vec()));

        tokio::time::advance(Duration::from_secs(2)).await;
        assert_eq!(store.get("w:1").await.unwrap(), None);
        assert!(store.is_empty().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_set_resets_ttl() {
        let store = InMemoryWorkerStore::new();
        store.set("w:1", b"a", Duration::from_secs(10)).await.unwrap();
        tokio::time::advance(Duration::from_secs(8)).await;
        store.set("w:1", b"b", Duration::from_secs(10)).await.unwrap();
        tokio::time::advance(Duration::from_secs(8)).await;

        assert_eq!(store.get("w:1").await.unwrap(), Some(b"b".to_vec()));
        assert_eq!(
            store.ttl_remaining("w:1").await,
            Some(Duration::from_secs(2))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_scan_skips_other_prefixes_and_expired_keys() {
        let store = InMemoryWorkerStore::new();
        store.set("w:b", b"", Duration::from_secs(60)).await.unwrap();
        store.set("w:a", b"", Duration::from_secs(60)).await.unwrap();
        store.set("w:old", b"", Duration::from_secs(1)).await.unwrap();
        store.set("other:c", b"", Duration::from_secs(60)).await.unwrap();

        tokio::time::advance(Duration::from_secs(2)).await;

        assert_eq!(
            store.scan_prefix("w:").await.unwrap(),
            vec!["w:a".to_string(), "w:b".to_string()]
        );
        assert!(!store.entries.read().await.contains_key("w:old"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_scan_frees_expired_entries() {
        let store = InMemoryWorkerStore::new();
        for i in 0..1000 {
            store
                .set(&format!("w:{i}"), b"x", Duration::from_secs(1))
                .await
                .unwrap();
        }
        store
            .set("other:live", b"x", Duration::from_secs(60))
            .await
            .unwrap();

        tokio::time::advance(Duration::from_secs(5)).await;

        assert!(store.scan_prefix("w:").await.unwrap().is_empty());
        let entries = store.entries.read().await;
        assert_eq!(entries.len(), 1);
        assert!(entries.contains_key("other:live"));
    }

    #[tokio::test]
    async fn test_delete_missing_key_is_not_an_error() {
        let store = InMemoryWorkerStore::new();
        assert!(!store.delete("missing").await.unwrap());
        store.set("present", b"x", Duration::from_secs(5)).await.unwrap();
        assert!(store.delete("present").await.unwrap());
        assert!(!store.delete("present").await.unwrap());
    }
}
