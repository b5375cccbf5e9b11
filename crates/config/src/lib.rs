pub mod models;
pub mod validation;

pub use models::{
    LivenessConfig, ObservabilityConfig, QueuesConfig, RedisConfig, RegistryConfig,
    StoreBackend, SweeperConfig,
};
pub use validation::{ConfigValidator, ValidationUtils};
