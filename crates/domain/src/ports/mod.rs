//! 注册中心依赖的外部系统接口
//!
//! 带TTL的键值存储和任务队列都通过trait抽象，生产环境使用Redis实现，
//! 嵌入式部署和测试使用内存实现。

pub mod store;
pub mod task_queue;

pub use store::KeyValueStore;
pub use task_queue::{QueueBinding, TaskQueueInspector};
