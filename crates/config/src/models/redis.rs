use std::time::Duration;

use registry_errors::RegistryResult;
use serde::{Deserialize, Serialize};

use crate::validation::{ConfigValidator, ValidationUtils};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RedisConfig {
    pub url: String,
    /// 单条命令的超时时间（毫秒）
    pub command_timeout_ms: u64,
    /// SCAN 每批返回的键数量提示
    pub scan_count: usize,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: "redis://127.0.0.1:6379".to_string(),
            command_timeout_ms: 3000,
            scan_count: 100,
        }
    }
}

impl RedisConfig {
    pub fn command_timeout(&self) -> Duration {
        Duration::from_millis(self.command_timeout_ms)
    }
}

impl ConfigValidator for RedisConfig {
    fn validate(&self) -> RegistryResult<()> {
        ValidationUtils::validate_redis_url(&self.url, "redis.url")?;
        ValidationUtils::validate_positive(self.command_timeout_ms, "redis.command_timeout_ms")?;
        ValidationUtils::validate_positive(self.scan_count as u64, "redis.scan_count")?;
        Ok(())
    }
}
