pub mod pending;
pub mod query;
pub mod registry;
pub mod sweep_service;
pub mod sweeper;

pub use pending::PendingTaskAccessor;
pub use registry::{WorkerRegistry, DEFAULT_KEY_PREFIX, DEFAULT_WORKER_TTL};
pub use sweep_service::SweepService;

pub use registry_domain::*;
