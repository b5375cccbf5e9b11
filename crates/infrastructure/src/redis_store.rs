//! Redis-backed worker record store
//!
//! Records are plain string keys written with `SET ... PX`, so Redis itself
//! expires a worker that stops heart-beating.

use std::collections::BTreeSet;
use std::time::Duration;

use async_trait::async_trait;
use registry_domain::KeyValueStore;
use registry_errors::{RegistryError, RegistryResult};
use tracing::{debug, error, instrument};

use crate::redis_connection::RedisConnectionManager;

pub struct RedisWorkerStore {
    connection: RedisConnectionManager,
    scan_count: usize,
}

impl RedisWorkerStore {
    pub fn new(connection: RedisConnectionManager, scan_count: usize) -> Self {
        Self {
            connection,
            scan_count: scan_count.max(1),
        }
    }
}

/// Escape glob metacharacters so a key prefix matches literally in SCAN MATCH
fn escape_glob(prefix: &str) -> String {
    let mut escaped = String::with_capacity(prefix.len() + 1);
    for c in prefix.chars() {
        if matches!(c, '*' | '?' | '[' | ']' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('*');
    escaped
}

#[async_trait]
impl KeyValueStore for RedisWorkerStore {
    #[instrument(skip(self, value))]
    async fn set(&self, key: &str, value: &[u8], ttl: Duration) -> RegistryResult<()> {
        let ttl_ms = (ttl.as_millis() as u64).max(1);
        let mut cmd = redis::cmd("SET");
        cmd.arg(key).arg(value).arg("PX").arg(ttl_ms);

        let _: () = self.connection.query("SET", &cmd).await.map_err(|e| {
            error!("Redis SET failed for key {}: {}", key, e);
            RegistryError::store("SET", key, e)
        })?;

        debug!("Redis SET {} with TTL {}ms", key, ttl_ms);
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get(&self, key: &str) -> RegistryResult<Option<Vec<u8>>> {
        let mut cmd = redis::cmd("GET");
        cmd.arg(key);

        self.connection.query("GET", &cmd).await.map_err(|e| {
            error!("Redis GET failed for key {}: {}", key, e);
            RegistryError::store("GET", key, e)
        })
    }

    #[instrument(skip(self))]
    async fn delete(&self, key: &str) -> RegistryResult<bool> {
        let mut cmd = redis::cmd("DEL");
        cmd.arg(key);

        let deleted: i64 = self.connection.query("DEL", &cmd).await.map_err(|e| {
            error!("Redis DEL failed for key {}: {}", key, e);
            RegistryError::store("DEL", key, e)
        })?;

        Ok(deleted > 0)
    }

    #[instrument(skip(self))]
    async fn scan_prefix(&self, prefix: &str) -> RegistryResult<Vec<String>> {
        let pattern = escape_glob(prefix);
        // SCAN 可能重复返回同一个键
        let mut keys = BTreeSet::new();
        let mut cursor: u64 = 0;

        loop {
            let mut cmd = redis::cmd("SCAN");
            cmd.arg(cursor)
                .arg("MATCH")
                .arg(&pattern)
                .arg("COUNT")
                .arg(self.scan_count);

            let (next_cursor, batch): (u64, Vec<String>) =
                self.connection.query("SCAN", &cmd).await.map_err(|e| {
                    error!("Redis SCAN failed for prefix {}: {}", prefix, e);
                    RegistryError::store("SCAN", prefix, e)
                })?;

            keys.extend(batch);
            if next_cursor == 0 {
                break;
            }
            cursor = next_cursor;
        }

        debug!("Redis SCAN {} found {} keys", pattern, keys.len());
        Ok(keys.into_iter().collect())
    }
}
