//! Worker存活注册中心
//!
//! 每个Worker在存储中对应一条带TTL的记录，键为 `<key_prefix><worker_id>`。
//! 存储自身的过期机制是主要的存活计时器；读取时再根据心跳时间计算健康状态，
//! 用于覆盖过期前一刻被读到的记录。
//!
//! 心跳是"读取-修改-写回"，不是原子操作。约定每个Worker只为自己发送心跳和注销，
//! 在这个约定下并发写同一个ID的情况不会出现；多个写入方共享同一ID时后写者覆盖先写者。

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use metrics::counter;
use registry_config::RegistryConfig;
use registry_domain::{
    decode_record, encode_record, KeyValueStore, ReportedStatus, SelfHealPolicy, WorkerInfo,
    WorkerRecord, WorkerType,
};
use registry_errors::{RegistryError, RegistryResult};
use tracing::{debug, info, warn};

use crate::pending::PendingTaskAccessor;

pub const DEFAULT_WORKER_TTL: Duration = Duration::from_secs(30);
pub const DEFAULT_KEY_PREFIX: &str = "dago:workers:";

pub struct WorkerRegistry {
    pub(crate) store: Arc<dyn KeyValueStore>,
    pending: PendingTaskAccessor,
    pub(crate) ttl: Duration,
    pub(crate) key_prefix: String,
    self_heal: SelfHealPolicy,
}

impl WorkerRegistry {
    pub fn new(store: Arc<dyn KeyValueStore>, pending: PendingTaskAccessor) -> Self {
        Self {
            store,
            pending,
            ttl: DEFAULT_WORKER_TTL,
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
            self_heal: SelfHealPolicy::Infer,
        }
    }

    pub fn from_config(
        config: &RegistryConfig,
        store: Arc<dyn KeyValueStore>,
        task_queue: Arc<dyn registry_domain::TaskQueueInspector>,
    ) -> Self {
        let pending = PendingTaskAccessor::with_bindings(task_queue, config.queues.bindings());
        Self::new(store, pending)
            .with_ttl(config.registry.ttl())
            .with_key_prefix(config.registry.key_prefix.clone())
            .with_self_heal(config.registry.self_heal)
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn with_key_prefix(mut self, key_prefix: impl Into<String>) -> Self {
        self.key_prefix = key_prefix.into();
        self
    }

    pub fn with_self_heal(mut self, policy: SelfHealPolicy) -> Self {
        self.self_heal = policy;
        self
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn key_for(&self, worker_id: &str) -> String {
        format!("{}{}", self.key_prefix, worker_id)
    }

    /// 注册Worker，覆盖同ID的已有记录
    pub async fn register(&self, record: &WorkerRecord) -> RegistryResult<()> {
        record.validate()?;

        let key = self.key_for(&record.id);
        self.write_record("register", &key, record).await?;

        counter!("registry_registrations_total", "type" => record.worker_type.as_str())
            .increment(1);
        info!(
            worker_id = %record.id,
            worker_type = %record.worker_type,
            ttl_ms = self.ttl.as_millis() as u64,
            "worker registered"
        );
        Ok(())
    }

    /// 心跳：刷新状态和当前任务并续期。未注册的Worker按自愈策略处理。
    pub async fn heartbeat(
        &self,
        worker_id: &str,
        status: ReportedStatus,
        current_task: &str,
    ) -> RegistryResult<()> {
        self.refresh(worker_id, None, status, current_task).await
    }

    /// 与 `heartbeat` 相同，但需要自动注册时使用调用方给出的类型
    pub async fn heartbeat_as(
        &self,
        worker_id: &str,
        worker_type: WorkerType,
        status: ReportedStatus,
        current_task: &str,
    ) -> RegistryResult<()> {
        self.refresh(worker_id, Some(worker_type), status, current_task)
            .await
    }

    /// 删除不存在的Worker不是错误
    pub async fn unregister(&self, worker_id: &str) -> RegistryResult<()> {
        let key = self.key_for(worker_id);
        let existed = self
            .store
            .delete(&key)
            .await
            .map_err(with_operation("unregister", worker_id))?;

        if existed {
            info!(worker_id, "worker unregistered");
        } else {
            debug!(worker_id, "unregister for unknown worker");
        }
        Ok(())
    }

    /// 读取Worker；心跳超过TTL时返回的状态为 Unhealthy（不写回存储）
    pub async fn get_worker(&self, worker_id: &str) -> RegistryResult<WorkerInfo> {
        let key = self.key_for(worker_id);
        let payload = self
            .store
            .get(&key)
            .await
            .map_err(with_operation("get_worker", worker_id))?
            .ok_or_else(|| RegistryError::worker_not_found(worker_id))?;

        let record = decode_record(&key, &payload)?;
        Ok(record.project(Utc::now(), self.ttl))
    }

    async fn refresh(
        &self,
        worker_id: &str,
        explicit_type: Option<WorkerType>,
        status: ReportedStatus,
        current_task: &str,
    ) -> RegistryResult<()> {
        if worker_id.trim().is_empty() {
            return Err(RegistryError::invalid_worker("Worker ID不能为空"));
        }

        let key = self.key_for(worker_id);
        let now = Utc::now();

        let existing = match self
            .store
            .get(&key)
            .await
            .map_err(with_operation("heartbeat", worker_id))?
        {
            Some(payload) => match decode_record(&key, &payload) {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!(
                        worker_id,
                        error = %e,
                        "stored worker record is unreadable, replacing it"
                    );
                    None
                }
            },
            None => None,
        };

        let mut record = match existing {
            Some(mut record) => {
                record.apply_heartbeat(status, current_task, now);
                record
            }
            None => self.self_heal(worker_id, explicit_type, status, current_task, now)?,
        };

        match self.pending.pending_count(worker_id, record.worker_type).await {
            Ok(pending) => record.pending_tasks = pending,
            Err(e) => {
                counter!("registry_pending_lookup_failures_total").increment(1);
                warn!(
                    worker_id,
                    error = %e,
                    pending_tasks = record.pending_tasks,
                    "failed to get pending tasks, keeping previous value"
                );
            }
        }

        self.write_record("heartbeat", &key, &record).await?;
        counter!("registry_heartbeats_total", "type" => record.worker_type.as_str()).increment(1);
        debug!(
            worker_id,
            status = ?record.status,
            pending_tasks = record.pending_tasks,
            "heartbeat recorded"
        );
        Ok(())
    }

    fn self_heal(
        &self,
        worker_id: &str,
        explicit_type: Option<WorkerType>,
        status: ReportedStatus,
        current_task: &str,
        now: DateTime<Utc>,
    ) -> RegistryResult<WorkerRecord> {
        let worker_type = match (explicit_type, self.self_heal) {
            (Some(worker_type), _) => worker_type,
            (None, SelfHealPolicy::Infer) => WorkerType::infer_from_id(worker_id),
            (None, SelfHealPolicy::Reject) => {
                warn!(worker_id, "rejecting heartbeat for unregistered worker");
                return Err(RegistryError::UnregisteredHeartbeat {
                    id: worker_id.to_string(),
                });
            }
        };

        warn!(
            worker_id,
            %worker_type,
            "heartbeat for unregistered worker, auto-registering"
        );
        counter!("registry_self_heals_total").increment(1);

        Ok(WorkerRecord {
            id: worker_id.to_string(),
            worker_type,
            status,
            registered_at: now,
            last_heartbeat: now,
            current_task: current_task.to_string(),
            pending_tasks: 0,
        })
    }

    async fn write_record(
        &self,
        operation: &'static str,
        key: &str,
        record: &WorkerRecord,
    ) -> RegistryResult<()> {
        let payload = encode_record(record)?;
        self.store
            .set(key, &payload, self.ttl)
            .await
            .map_err(with_operation(operation, &record.id))
    }

    /// 读取并解码一条记录；已消失、无法解码或读取失败的记录记日志后跳过
    pub(crate) async fn fetch_for_scan(&self, key: &str) -> Option<WorkerRecord> {
        let payload = match self.store.get(key).await {
            Ok(Some(payload)) => payload,
            Ok(None) => {
                debug!(key, "worker key expired between scan and get");
                return None;
            }
            Err(e) => {
                warn!(key, error = %e, "failed to get worker");
                return None;
            }
        };

        match decode_record(key, &payload) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!(key, error = %e, "failed to decode worker");
                None
            }
        }
    }
}

/// 为存储错误附加操作名和Worker ID
pub(crate) fn with_operation<'a>(
    operation: &'static str,
    worker_id: &'a str,
) -> impl FnOnce(RegistryError) -> RegistryError + 'a {
    move |err| match err {
        RegistryError::Store(message) => RegistryError::store(operation, worker_id, message),
        other => other,
    }
}
