use std::time::{Duration, Instant};

use metrics::{counter, histogram};
use redis::aio::ConnectionManager;
use redis::{Client, FromRedisValue};
use registry_config::RedisConfig;
use registry_errors::{RegistryError, RegistryResult};
use tokio::time::timeout;
use tracing::{debug, error};

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error(transparent)]
    Redis(#[from] redis::RedisError),
    #[error("Redis命令超时 ({0:?})")]
    Timeout(Duration),
}

/// 共享的Redis连接，所有命令都受单命令超时约束
///
/// `ConnectionManager` 内部自动重连，克隆代价很低，存储和队列检查共用同一个实例。
#[derive(Clone)]
pub struct RedisConnectionManager {
    manager: ConnectionManager,
    command_timeout: Duration,
}

impl RedisConnectionManager {
    pub async fn connect(config: &RedisConfig) -> RegistryResult<Self> {
        let client = Client::open(config.url.as_str()).map_err(|e| {
            RegistryError::config_error(format!("Failed to create Redis client: {e}"))
        })?;

        let manager = timeout(config.command_timeout(), client.get_connection_manager())
            .await
            .map_err(|_| RegistryError::store("connect", &config.url, "connection timed out"))?
            .map_err(|e| RegistryError::store("connect", &config.url, e))?;

        let connection = Self {
            manager,
            command_timeout: config.command_timeout(),
        };
        connection.ping().await?;
        debug!("Successfully connected to Redis at {}", config.url);

        Ok(connection)
    }

    pub async fn query<T: FromRedisValue>(
        &self,
        command: &'static str,
        cmd: &redis::Cmd,
    ) -> Result<T, CommandError> {
        let start = Instant::now();
        let mut conn = self.manager.clone();
        let result: Result<redis::RedisResult<T>, _> =
            timeout(self.command_timeout, cmd.query_async(&mut conn)).await;

        histogram!("registry_redis_command_duration_ms", "command" => command)
            .record(start.elapsed().as_millis() as f64);

        match result {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => {
                counter!("registry_redis_command_errors_total", "command" => command).increment(1);
                Err(CommandError::Redis(e))
            }
            Err(_) => {
                counter!("registry_redis_command_errors_total", "command" => command).increment(1);
                error!(
                    "Redis {} timed out after {:?}",
                    command, self.command_timeout
                );
                Err(CommandError::Timeout(self.command_timeout))
            }
        }
    }

    pub async fn ping(&self) -> RegistryResult<()> {
        let response: String = self
            .query("PING", &redis::cmd("PING"))
            .await
            .map_err(|e| RegistryError::store("PING", "-", e))?;
        if response != "PONG" {
            return Err(RegistryError::store(
                "PING",
                "-",
                format!("Unexpected PING response: {response}"),
            ));
        }
        Ok(())
    }
}
