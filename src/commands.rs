use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use metrics_exporter_prometheus::PrometheusBuilder;
use registry_config::RegistryConfig;
use registry_core::{SweepService, WorkerFilter, WorkerRecord, WorkerRegistry};
use registry_infrastructure::BackendFactory;
use serde::Serialize;
use serde_json::json;
use tokio::signal;
use tracing::{error, info, warn};

use crate::cli::Commands;

pub async fn run(command: Commands, config: RegistryConfig) -> Result<()> {
    let backends = BackendFactory::create(&config)
        .await
        .context("初始化存储后端失败")?;
    let registry = WorkerRegistry::from_config(&config, backends.store, backends.task_queue);

    match command {
        Commands::Register {
            worker_type,
            id,
            status,
            task,
        } => {
            let id = match id {
                Some(id) => id,
                None => default_worker_id(worker_type.as_str()),
            };
            let record = WorkerRecord::new(id, worker_type)
                .with_status(status)
                .with_current_task(task);
            registry
                .register(&record)
                .await
                .with_context(|| format!("注册Worker失败: {}", record.id))?;
            print_json(&record)
        }
        Commands::Heartbeat {
            id,
            status,
            task,
            worker_type,
        } => {
            let sent = match worker_type {
                Some(worker_type) => {
                    registry
                        .heartbeat_as(&id, worker_type, status, &task)
                        .await
                }
                None => registry.heartbeat(&id, status, &task).await,
            };
            sent.with_context(|| format!("发送心跳失败: {id}"))?;

            let worker = registry.get_worker(&id).await?;
            print_json(&worker)
        }
        Commands::Unregister { id } => {
            registry
                .unregister(&id)
                .await
                .with_context(|| format!("注销Worker失败: {id}"))?;
            print_json(&json!({ "id": id, "unregistered": true }))
        }
        Commands::Get { id } => {
            let worker = registry
                .get_worker(&id)
                .await
                .with_context(|| format!("查询Worker失败: {id}"))?;
            print_json(&worker)
        }
        Commands::List {
            types,
            statuses,
            healthy_only,
        } => {
            let filter = WorkerFilter {
                types,
                statuses,
                healthy_only,
            };
            let mut workers = registry
                .list_workers(&filter)
                .await
                .context("列出Worker失败")?;
            workers.sort_by(|a, b| a.id.cmp(&b.id));
            print_json(&workers)
        }
        Commands::Stats { worker_type } => match worker_type {
            Some(name) => {
                let stats = registry
                    .get_worker_stats_by_name(&name)
                    .await
                    .with_context(|| format!("统计Worker失败: {name}"))?;
                print_json(&stats)
            }
            None => {
                let stats = registry
                    .list_all_stats()
                    .await
                    .context("统计Worker失败")?;
                print_json(&stats)
            }
        },
        Commands::Sweep { timeout } => {
            let timeout = timeout
                .map(Duration::from_secs)
                .unwrap_or_else(|| config.sweeper.stale_timeout());
            match registry.cleanup_stale_workers(timeout).await {
                Ok(removed) => print_json(&json!({ "removed": removed })),
                Err(e) => {
                    print_json(&json!({ "removed": e.removed_count() }))?;
                    Err(e).context("清理过期Worker失败")
                }
            }
        }
        Commands::Sweeper => run_sweeper(registry, &config).await,
    }
}

async fn run_sweeper(registry: WorkerRegistry, config: &RegistryConfig) -> Result<()> {
    if config.observability.metrics_enabled {
        install_metrics_exporter(&config.observability.metrics_bind_address)?;
    }

    let mut service = SweepService::new(Arc::new(registry), config.sweeper.clone());
    service.start().await.context("启动清理服务失败")?;

    if !service.is_running() {
        warn!("清理服务未启用，请检查 sweeper.enabled 配置");
        return Ok(());
    }

    wait_for_shutdown_signal().await;
    info!("收到关闭信号，停止清理服务...");

    service.stop().await.context("停止清理服务失败")?;
    info!("清理服务已退出");
    Ok(())
}

fn install_metrics_exporter(bind_address: &str) -> Result<()> {
    let addr: SocketAddr = bind_address
        .parse()
        .with_context(|| format!("无效的指标监听地址: {bind_address}"))?;

    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .context("安装Prometheus指标导出器失败")?;

    info!("Prometheus指标导出器已启动: {addr}");
    Ok(())
}

fn default_worker_id(worker_type: &str) -> String {
    let host = hostname::get()
        .map(|h| h.to_string_lossy().into_owned())
        .unwrap_or_else(|_| "localhost".to_string());
    format!("{worker_type}-{host}")
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let output = serde_json::to_string_pretty(value).context("序列化输出失败")?;
    println!("{output}");
    Ok(())
}

/// 等待关闭信号
async fn wait_for_shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("安装Ctrl+C信号处理器失败: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("安装SIGTERM信号处理器失败: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("收到Ctrl+C信号");
        },
        _ = terminate => {
            info!("收到SIGTERM信号");
        },
    }
}
