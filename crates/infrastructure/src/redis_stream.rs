//! Redis Streams 消费组挂起任务查询
//!
//! 通过 `XINFO CONSUMERS <stream> <group>` 读取每个消费者已领取但未确认的消息数。

use async_trait::async_trait;
use redis::streams::StreamInfoConsumersReply;
use registry_domain::{QueueBinding, TaskQueueInspector};
use registry_errors::{RegistryError, RegistryResult};
use tracing::{debug, instrument};

use crate::redis_connection::{CommandError, RedisConnectionManager};

pub struct RedisStreamInspector {
    connection: RedisConnectionManager,
}

impl RedisStreamInspector {
    pub fn new(connection: RedisConnectionManager) -> Self {
        Self { connection }
    }
}

/// Stream 或消费组尚未创建
fn is_missing_queue(err: &CommandError) -> bool {
    match err {
        CommandError::Redis(e) => {
            let message = e.to_string();
            message.contains("NOGROUP") || message.to_ascii_lowercase().contains("no such key")
        }
        CommandError::Timeout(_) => false,
    }
}

#[async_trait]
impl TaskQueueInspector for RedisStreamInspector {
    #[instrument(skip(self))]
    async fn consumer_pending(
        &self,
        binding: &QueueBinding,
        consumer: &str,
    ) -> RegistryResult<Option<u64>> {
        let mut cmd = redis::cmd("XINFO");
        cmd.arg("CONSUMERS").arg(&binding.stream).arg(&binding.group);

        let reply: StreamInfoConsumersReply = match self.connection.query("XINFO", &cmd).await {
            Ok(reply) => reply,
            Err(e) if is_missing_queue(&e) => {
                debug!(
                    "Stream {} or group {} does not exist yet",
                    binding.stream, binding.group
                );
                return Ok(None);
            }
            Err(e) => return Err(RegistryError::queue(&binding.stream, &binding.group, e)),
        };

        Ok(reply
            .consumers
            .iter()
            .find(|c| c.name == consumer)
            .map(|c| c.pending as u64))
    }
}
