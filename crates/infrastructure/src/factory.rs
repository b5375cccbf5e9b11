use std::sync::Arc;

use registry_config::{RegistryConfig, StoreBackend};
use registry_domain::{KeyValueStore, TaskQueueInspector};
use registry_errors::RegistryResult;
use tracing::{debug, info};

use crate::{
    InMemoryTaskQueue, InMemoryWorkerStore, RedisConnectionManager, RedisStreamInspector,
    RedisWorkerStore,
};

/// 注册中心需要的两个外部依赖
#[derive(Clone)]
pub struct RegistryBackends {
    pub store: Arc<dyn KeyValueStore>,
    pub task_queue: Arc<dyn TaskQueueInspector>,
}

pub struct BackendFactory;

impl BackendFactory {
    pub async fn create(config: &RegistryConfig) -> RegistryResult<RegistryBackends> {
        debug!("Creating registry backends: {:?}", config.registry.backend);

        match config.registry.backend {
            StoreBackend::Redis => {
                info!("Initializing Redis worker store at {}", config.redis.url);
                let connection = RedisConnectionManager::connect(&config.redis).await?;
                Ok(RegistryBackends {
                    store: Arc::new(RedisWorkerStore::new(
                        connection.clone(),
                        config.redis.scan_count,
                    )),
                    task_queue: Arc::new(RedisStreamInspector::new(connection)),
                })
            }
            StoreBackend::Memory => {
                info!("Initializing in-memory worker store");
                Ok(Self::in_memory())
            }
        }
    }

    pub fn in_memory() -> RegistryBackends {
        RegistryBackends {
            store: Arc::new(InMemoryWorkerStore::new()),
            task_queue: Arc::new(InMemoryTaskQueue::new()),
        }
    }
}
