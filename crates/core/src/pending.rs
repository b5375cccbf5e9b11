use std::collections::HashMap;
use std::sync::Arc;

use registry_config::QueuesConfig;
use registry_domain::{QueueBinding, TaskQueueInspector, WorkerType};
use registry_errors::RegistryResult;
use tracing::debug;

/// 查询Worker在任务队列中已领取未确认的任务数
#[derive(Clone)]
pub struct PendingTaskAccessor {
    inspector: Arc<dyn TaskQueueInspector>,
    bindings: HashMap<WorkerType, QueueBinding>,
}

impl PendingTaskAccessor {
    /// 使用默认的队列绑定（executor.work / router.work）
    pub fn new(inspector: Arc<dyn TaskQueueInspector>) -> Self {
        Self::with_bindings(inspector, QueuesConfig::default().bindings())
    }

    pub fn with_bindings(
        inspector: Arc<dyn TaskQueueInspector>,
        bindings: impl IntoIterator<Item = (WorkerType, QueueBinding)>,
    ) -> Self {
        Self {
            inspector,
            bindings: bindings.into_iter().collect(),
        }
    }

    pub fn binding_for(&self, worker_type: WorkerType) -> Option<&QueueBinding> {
        self.bindings.get(&worker_type)
    }

    /// 队列、消费组或消费者尚不存在时返回0；其他失败以 `Queue` 错误返回，
    /// 由调用方决定是否降级
    pub async fn pending_count(
        &self,
        worker_id: &str,
        worker_type: WorkerType,
    ) -> RegistryResult<u64> {
        let Some(binding) = self.binding_for(worker_type) else {
            debug!(worker_id, %worker_type, "no queue bound to worker type");
            return Ok(0);
        };

        let pending = self
            .inspector
            .consumer_pending(binding, worker_id)
            .await?
            .unwrap_or(0);

        Ok(pending)
    }
}
