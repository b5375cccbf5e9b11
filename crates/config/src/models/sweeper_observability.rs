use std::time::Duration;

use registry_errors::RegistryResult;
use serde::{Deserialize, Serialize};

use crate::validation::{ConfigValidator, ValidationUtils};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SweeperConfig {
    pub enabled: bool,
    pub interval_seconds: u64,
    /// 心跳超过该时长的记录会被清理；存储TTL仍是主要的过期机制
    pub stale_timeout_seconds: u64,
}

impl Default for SweeperConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_seconds: 15,
            stale_timeout_seconds: 60,
        }
    }
}

impl SweeperConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_seconds)
    }

    pub fn stale_timeout(&self) -> Duration {
        Duration::from_secs(self.stale_timeout_seconds)
    }
}

impl ConfigValidator for SweeperConfig {
    fn validate(&self) -> RegistryResult<()> {
        if self.enabled {
            ValidationUtils::validate_positive(self.interval_seconds, "sweeper.interval_seconds")?;
            ValidationUtils::validate_positive(
                self.stale_timeout_seconds,
                "sweeper.stale_timeout_seconds",
            )?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    pub log_level: String,
    pub log_format: String,
    pub metrics_enabled: bool,
    pub metrics_bind_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
            metrics_enabled: false,
            metrics_bind_address: "0.0.0.0:9090".to_string(),
        }
    }
}

impl ConfigValidator for ObservabilityConfig {
    fn validate(&self) -> RegistryResult<()> {
        ValidationUtils::validate_one_of(
            &self.log_level,
            &["trace", "debug", "info", "warn", "error"],
            "observability.log_level",
        )?;
        ValidationUtils::validate_one_of(
            &self.log_format,
            &["json", "pretty"],
            "observability.log_format",
        )?;
        if self.metrics_enabled {
            ValidationUtils::validate_not_empty(
                &self.metrics_bind_address,
                "observability.metrics_bind_address",
            )?;
        }
        Ok(())
    }
}
