// 基础配置验证

use registry_errors::{RegistryError, RegistryResult};

pub trait ConfigValidator {
    fn validate(&self) -> RegistryResult<()>;
}

pub struct ValidationUtils;

impl ValidationUtils {
    pub fn validate_not_empty(value: &str, field: &str) -> RegistryResult<()> {
        if value.trim().is_empty() {
            return Err(RegistryError::config_error(format!("{field} 不能为空")));
        }
        Ok(())
    }

    pub fn validate_positive(value: u64, field: &str) -> RegistryResult<()> {
        if value == 0 {
            return Err(RegistryError::config_error(format!("{field} 必须大于0")));
        }
        Ok(())
    }

    pub fn validate_redis_url(url: &str, field: &str) -> RegistryResult<()> {
        Self::validate_not_empty(url, field)?;
        if !url.starts_with("redis://") && !url.starts_with("rediss://") {
            return Err(RegistryError::config_error(format!(
                "{field} 必须以 redis:// 或 rediss:// 开头"
            )));
        }
        Ok(())
    }

    pub fn validate_one_of(value: &str, allowed: &[&str], field: &str) -> RegistryResult<()> {
        if !allowed.contains(&value) {
            return Err(RegistryError::config_error(format!(
                "{field} 的值 {value} 无效, 可选: {}",
                allowed.join(", ")
            )));
        }
        Ok(())
    }
}
