use anyhow::{Context, Result};
use config::{Config as ConfigBuilder, Environment, File, FileFormat};
use registry_errors::RegistryResult;
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::{
    liveness::{LivenessConfig, QueuesConfig},
    redis::RedisConfig,
    sweeper_observability::{ObservabilityConfig, SweeperConfig},
};
use crate::validation::ConfigValidator;

const DEFAULT_CONFIG_PATHS: [&str; 3] = [
    "config/registry.toml",
    "registry.toml",
    "/etc/worker-registry/config.toml",
];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    pub redis: RedisConfig,
    pub registry: LivenessConfig,
    pub queues: QueuesConfig,
    pub sweeper: SweeperConfig,
    pub observability: ObservabilityConfig,
}

impl RegistryConfig {
    /// 加载顺序: 内置默认值 -> TOML文件 -> REGISTRY_* 环境变量
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let defaults = ConfigBuilder::try_from(&RegistryConfig::default())
            .context("构建默认配置失败")?;
        let mut builder = ConfigBuilder::builder().add_source(defaults);

        if let Some(path) = config_path {
            if Path::new(path).exists() {
                builder = builder.add_source(File::new(path, FileFormat::Toml));
            } else {
                return Err(anyhow::anyhow!("配置文件不存在: {}", path));
            }
        } else if let Some(path) = DEFAULT_CONFIG_PATHS
            .iter()
            .find(|path| Path::new(path).exists())
        {
            builder = builder.add_source(File::new(path, FileFormat::Toml));
        }

        builder = builder.add_source(
            Environment::with_prefix("REGISTRY")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config: RegistryConfig = builder
            .build()
            .context("构建配置失败")?
            .try_deserialize()
            .context("反序列化配置失败")?;

        config.validate()?;

        Ok(config)
    }

    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let config: RegistryConfig = toml::from_str(toml_str).context("解析TOML配置失败")?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("序列化配置为TOML失败")
    }
}

impl ConfigValidator for RegistryConfig {
    fn validate(&self) -> RegistryResult<()> {
        self.redis.validate()?;
        self.registry.validate()?;
        self.queues.validate()?;
        self.sweeper.validate()?;
        self.observability.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::StoreBackend;
    use registry_domain::{SelfHealPolicy, WorkerType};
    use std::io::Write;
    use std::time::Duration;

    #[test]
    fn test_default_config_is_valid() {
        let config = RegistryConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.registry.ttl(), Duration::from_secs(30));
        assert_eq!(config.registry.key_prefix, "dago:workers:");
        assert_eq!(config.registry.self_heal, SelfHealPolicy::Infer);
        assert_eq!(
            config.queues.binding_for(WorkerType::Router).stream,
            "router.work"
        );
        assert_eq!(
            config.queues.binding_for(WorkerType::Executor).group,
            "executor-workers"
        );
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = RegistryConfig::from_toml(
            r#"
            [registry]
            backend = "memory"
            ttl_seconds = 10
            self_heal = "reject"

            [sweeper]
            stale_timeout_seconds = 120
            "#,
        )
        .unwrap();

        assert_eq!(config.registry.backend, StoreBackend::Memory);
        assert_eq!(config.registry.ttl_seconds, 10);
        assert_eq!(config.registry.self_heal, SelfHealPolicy::Reject);
        assert_eq!(config.registry.key_prefix, "dago:workers:");
        assert_eq!(config.sweeper.stale_timeout(), Duration::from_secs(120));
        assert_eq!(config.sweeper.interval_seconds, 15);
        assert_eq!(config.redis, RedisConfig::default());
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        assert!(RegistryConfig::from_toml("[registry]\nttl_seconds = 0\n").is_err());
        assert!(RegistryConfig::from_toml("[registry]\nkey_prefix = \"\"\n").is_err());
        assert!(RegistryConfig::from_toml("[redis]\nurl = \"http://x\"\n").is_err());
        assert!(RegistryConfig::from_toml("[observability]\nlog_format = \"xml\"\n").is_err());
        assert!(
            RegistryConfig::from_toml("[queues.executor]\nstream = \"\"\ngroup = \"g\"\n")
                .is_err()
        );
        // 禁用时不校验清理间隔
        assert!(
            RegistryConfig::from_toml("[sweeper]\nenabled = false\ninterval_seconds = 0\n")
                .is_ok()
        );
    }

    #[test]
    fn test_toml_round_trip() {
        let config = RegistryConfig::default();
        let text = config.to_toml().unwrap();
        assert_eq!(RegistryConfig::from_toml(&text).unwrap(), config);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
            [redis]
            url = "redis://cache.internal:6380/2"

            [queues.router]
            stream = "router.jobs"
            group = "routers"
            "#
        )
        .unwrap();

        let config = RegistryConfig::load(file.path().to_str()).unwrap();
        assert_eq!(config.redis.url, "redis://cache.internal:6380/2");
        assert_eq!(config.queues.router.stream, "router.jobs");
        assert_eq!(config.queues.executor.stream, "executor.work");
        assert_eq!(config.registry.ttl_seconds, 30);
    }

    #[test]
    fn test_load_missing_file_fails() {
        let result = RegistryConfig::load(Some("/nonexistent/registry.toml"));
        assert!(result.is_err());
    }
}
