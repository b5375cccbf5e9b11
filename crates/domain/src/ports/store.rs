use std::time::Duration;

use async_trait::async_trait;
use registry_errors::RegistryResult;

/// 支持按键过期和前缀扫描的键值存储
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// 写入并把过期时间重置为 `ttl`
    async fn set(&self, key: &str, value: &[u8], ttl: Duration) -> RegistryResult<()>;

    async fn get(&self, key: &str) -> RegistryResult<Option<Vec<u8>>>;

    /// 删除不存在的键不是错误，返回是否真的删除了
    async fn delete(&self, key: &str) -> RegistryResult<bool>;

    /// 列出前缀下的所有键。迭代期间的并发写入和过期是允许的，
    /// 返回的键在随后读取时可能已经不存在。
    async fn scan_prefix(&self, prefix: &str) -> RegistryResult<Vec<String>>;
}
