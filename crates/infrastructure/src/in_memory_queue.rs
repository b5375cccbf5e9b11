use async_trait::async_trait;
use registry_domain::{QueueBinding, TaskQueueInspector};
use registry_errors::RegistryResult;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// 内存任务队列视图
///
/// 只记录每个消费组内各消费者的挂起任务数，供嵌入式部署和测试使用。
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskQueue {
    groups: Arc<RwLock<HashMap<QueueBinding, HashMap<String, u64>>>>,
}

impl InMemoryTaskQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn create_group(&self, binding: &QueueBinding) {
        let mut groups = self.groups.write().await;
        groups.entry(binding.clone()).or_default();
    }

    /// 设置消费者的挂起任务数，消费组不存在时自动创建
    pub async fn set_pending(&self, binding: &QueueBinding, consumer: &str, pending: u64) {
        let mut groups = self.groups.write().await;
        groups
            .entry(binding.clone())
            .or_default()
            .insert(consumer.to_string(), pending);
    }

    pub async fn remove_consumer(&self, binding: &QueueBinding, consumer: &str) {
        let mut groups = self.groups.write().await;
        if let Some(consumers) = groups.get_mut(binding) {
            consumers.remove(consumer);
        }
    }
}

#[async_trait]
impl TaskQueueInspector for InMemoryTaskQueue {
    async fn consumer_pending(
        &self,
        binding: &QueueBinding,
        consumer: &str,
    ) -> RegistryResult<Option<u64>> {
        let groups = self.groups.read().await;
        Ok(groups
            .get(binding)
            .and_then(|consumers| consumers.get(consumer))
            .copied())
    }
}
