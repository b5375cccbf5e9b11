use std::time::Duration;

use chrono::Utc;
use metrics::counter;
use registry_errors::{RegistryError, RegistryResult};
use tracing::{debug, info, instrument, warn};

use crate::registry::WorkerRegistry;

impl WorkerRegistry {
    /// 删除心跳超过 `timeout` 的Worker，返回删除数量
    ///
    /// 存储TTL是主要的过期机制，这里只兜底 TTL 未生效或需要更长宽限期的情况。
    /// 扫描或删除失败时返回 `PartialSweep`，其中带有失败前已删除的数量。
    #[instrument(skip(self), fields(timeout_ms = timeout.as_millis() as u64))]
    pub async fn cleanup_stale_workers(&self, timeout: Duration) -> RegistryResult<usize> {
        if timeout <= self.ttl {
            debug!(
                ttl_ms = self.ttl.as_millis() as u64,
                "sweep timeout does not exceed store TTL, expiry will usually win"
            );
        }

        let keys = self
            .store
            .scan_prefix(&self.key_prefix)
            .await
            .map_err(|e| RegistryError::partial_sweep(0, e))?;

        let now = Utc::now();
        let mut removed = 0;

        for key in &keys {
            let Some(record) = self.fetch_for_scan(key).await else {
                continue;
            };

            if !record.is_stale(now, timeout) {
                continue;
            }

            let idle = record.heartbeat_age(now);
            match self.store.delete(key).await {
                Ok(true) => {
                    removed += 1;
                    info!(
                        worker_id = %record.id,
                        worker_type = %record.worker_type,
                        idle_ms = idle.as_millis() as u64,
                        "removed stale worker"
                    );
                }
                Ok(false) => {
                    debug!(worker_id = %record.id, "stale worker already gone");
                }
                Err(e) => {
                    warn!(worker_id = %record.id, removed, error = %e, "sweep aborted");
                    counter!("registry_stale_workers_removed_total").increment(removed as u64);
                    return Err(RegistryError::partial_sweep(removed, e));
                }
            }
        }

        counter!("registry_stale_workers_removed_total").increment(removed as u64);
        if removed > 0 {
            info!(removed, scanned = keys.len(), "stale worker sweep finished");
        } else {
            debug!(scanned = keys.len(), "no stale workers");
        }
        Ok(removed)
    }
}
