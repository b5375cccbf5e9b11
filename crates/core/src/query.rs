//! 注册中心的扫描查询
//!
//! 列表和统计都基于前缀扫描：扫描只负责枚举键，逐条读取时已过期、
//! 无法解码或读取失败的记录会被跳过，不会让整次查询失败。

use chrono::Utc;
use metrics::histogram;
use registry_domain::{WorkerFilter, WorkerInfo, WorkerStats, WorkerType};
use registry_errors::{RegistryError, RegistryResult};
use tracing::{debug, instrument};

use crate::registry::WorkerRegistry;

impl WorkerRegistry {
    /// 列出满足过滤条件的Worker，结果顺序不做保证
    #[instrument(skip(self), fields(prefix = %self.key_prefix))]
    pub async fn list_workers(&self, filter: &WorkerFilter) -> RegistryResult<Vec<WorkerInfo>> {
        let keys = self
            .store
            .scan_prefix(&self.key_prefix)
            .await
            .map_err(|e| match e {
                RegistryError::Store(message) => {
                    RegistryError::store("list_workers", &self.key_prefix, message)
                }
                other => other,
            })?;

        let now = Utc::now();
        let mut workers = Vec::with_capacity(keys.len());
        for key in &keys {
            let Some(record) = self.fetch_for_scan(key).await else {
                continue;
            };
            let info = record.project(now, self.ttl);
            if filter.matches(&info) {
                workers.push(info);
            }
        }

        histogram!("registry_scan_keys").record(keys.len() as f64);
        debug!(
            scanned = keys.len(),
            matched = workers.len(),
            "listed workers"
        );
        Ok(workers)
    }

    pub async fn get_worker_stats(&self, worker_type: WorkerType) -> RegistryResult<WorkerStats> {
        let workers = self
            .list_workers(&WorkerFilter::of_type(worker_type))
            .await?;
        Ok(WorkerStats::from_workers(worker_type, &workers))
    }

    /// 按名称统计，未知类型返回 `UnsupportedType`
    pub async fn get_worker_stats_by_name(&self, worker_type: &str) -> RegistryResult<WorkerStats> {
        let worker_type: WorkerType = worker_type.parse()?;
        self.get_worker_stats(worker_type).await
    }

    /// 一次扫描得到所有类型的统计，按 `WorkerType::ALL` 的顺序返回
    pub async fn list_all_stats(&self) -> RegistryResult<Vec<WorkerStats>> {
        let workers = self.list_workers(&WorkerFilter::default()).await?;

        let mut stats: Vec<WorkerStats> =
            WorkerType::ALL.iter().copied().map(WorkerStats::new).collect();
        for worker in &workers {
            if let Some(entry) = stats.iter_mut().find(|s| s.worker_type == worker.worker_type) {
                entry.record(worker);
            }
        }
        Ok(stats)
    }
}
