use std::time::Duration;

use registry_domain::{QueueBinding, SelfHealPolicy, WorkerType};
use registry_errors::RegistryResult;
use serde::{Deserialize, Serialize};

use crate::validation::{ConfigValidator, ValidationUtils};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Redis,
    /// 进程内存储，适用于嵌入式部署和测试
    Memory,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LivenessConfig {
    pub backend: StoreBackend,
    pub key_prefix: String,
    /// 每次注册或心跳后记录的存活时间（秒）
    pub ttl_seconds: u64,
    pub self_heal: SelfHealPolicy,
}

impl Default for LivenessConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Redis,
            key_prefix: "dago:workers:".to_string(),
            ttl_seconds: 30,
            self_heal: SelfHealPolicy::Infer,
        }
    }
}

impl LivenessConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_seconds)
    }
}

impl ConfigValidator for LivenessConfig {
    fn validate(&self) -> RegistryResult<()> {
        ValidationUtils::validate_not_empty(&self.key_prefix, "registry.key_prefix")?;
        ValidationUtils::validate_positive(self.ttl_seconds, "registry.ttl_seconds")?;
        Ok(())
    }
}

/// 各类Worker消费的Stream与消费组
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueuesConfig {
    pub executor: QueueBinding,
    pub router: QueueBinding,
}

impl Default for QueuesConfig {
    fn default() -> Self {
        Self {
            executor: QueueBinding::new("executor.work", "executor-workers"),
            router: QueueBinding::new("router.work", "router-workers"),
        }
    }
}

impl QueuesConfig {
    pub fn binding_for(&self, worker_type: WorkerType) -> &QueueBinding {
        match worker_type {
            WorkerType::Executor => &self.executor,
            WorkerType::Router => &self.router,
        }
    }

    pub fn bindings(&self) -> Vec<(WorkerType, QueueBinding)> {
        WorkerType::ALL
            .iter()
            .map(|t| (*t, self.binding_for(*t).clone()))
            .collect()
    }
}

impl ConfigValidator for QueuesConfig {
    fn validate(&self) -> RegistryResult<()> {
        for (worker_type, binding) in self.bindings() {
            ValidationUtils::validate_not_empty(
                &binding.stream,
                &format!("queues.{worker_type}.stream"),
            )?;
            ValidationUtils::validate_not_empty(
                &binding.group,
                &format!("queues.{worker_type}.group"),
            )?;
        }
        Ok(())
    }
}
