pub mod app_config;
pub mod liveness;
pub mod redis;
pub mod sweeper_observability;

pub use app_config::RegistryConfig;
pub use liveness::{LivenessConfig, QueuesConfig, StoreBackend};
pub use redis::RedisConfig;
pub use sweeper_observability::{ObservabilityConfig, SweeperConfig};
