use async_trait::async_trait;
use registry_errors::RegistryResult;
use serde::{Deserialize, Serialize};

/// 某类Worker消费的队列及其消费组
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QueueBinding {
    pub stream: String,
    pub group: String,
}

impl QueueBinding {
    pub fn new(stream: impl Into<String>, group: impl Into<String>) -> Self {
        Self {
            stream: stream.into(),
            group: group.into(),
        }
    }
}

#[async_trait]
pub trait TaskQueueInspector: Send + Sync {
    /// 消费者已领取但未确认的任务数。
    ///
    /// 队列、消费组或消费者不存在时返回 `Ok(None)`。
    async fn consumer_pending(
        &self,
        binding: &QueueBinding,
        consumer: &str,
    ) -> RegistryResult<Option<u64>>;
}
