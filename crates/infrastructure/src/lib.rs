pub mod factory;
pub mod in_memory_queue;
pub mod in_memory_store;
pub mod redis_connection;
pub mod redis_store;
pub mod redis_stream;

pub use factory::{BackendFactory, RegistryBackends};
pub use in_memory_queue::InMemoryTaskQueue;
pub use in_memory_store::InMemoryWorkerStore;
pub use redis_connection::{CommandError, RedisConnectionManager};
pub use redis_store::RedisWorkerStore;
pub use redis_stream::RedisStreamInspector;
