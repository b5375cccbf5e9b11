use anyhow::{Context, Result};
use clap::Parser;
use registry_config::RegistryConfig;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod cli;
mod commands;

use cli::RegistryCli;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = RegistryCli::parse();

    let mut config = RegistryConfig::load(cli.config.as_deref())
        .with_context(|| match &cli.config {
            Some(path) => format!("加载配置文件失败: {path}"),
            None => "加载默认配置失败".to_string(),
        })?;

    if let Some(level) = &cli.log_level {
        config.observability.log_level = level.clone();
    }
    if let Some(format) = &cli.log_format {
        config.observability.log_format = format.clone();
    }

    init_logging(
        &config.observability.log_level,
        &config.observability.log_format,
    )?;

    info!(
        backend = ?config.registry.backend,
        key_prefix = %config.registry.key_prefix,
        "Worker注册中心启动"
    );

    commands::run(cli.command, config).await
}

/// 初始化日志系统
fn init_logging(log_level: &str, log_format: &str) -> Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    // 日志写到stderr，stdout只输出命令结果
    let registry = tracing_subscriber::registry().with(env_filter);

    match log_format {
        "json" => {
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(std::io::stderr),
                )
                .try_init()
                .context("初始化JSON日志格式失败")?;
        }
        "pretty" => {
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .pretty()
                        .with_writer(std::io::stderr),
                )
                .try_init()
                .context("初始化Pretty日志格式失败")?;
        }
        _ => {
            return Err(anyhow::anyhow!("不支持的日志格式: {log_format}"));
        }
    }

    Ok(())
}
