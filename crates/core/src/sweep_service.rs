use std::sync::Arc;

use registry_config::SweeperConfig;
use registry_errors::RegistryResult;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{interval, timeout, MissedTickBehavior};
use tracing::{error, info, warn};

use crate::registry::WorkerRegistry;

/// 定时清理过期Worker的后台服务
///
/// 注册中心本身没有后台任务，需要定时清理的编排进程可以启动这个服务。
pub struct SweepService {
    registry: Arc<WorkerRegistry>,
    config: SweeperConfig,
    shutdown_tx: Option<oneshot::Sender<()>>,
    sweep_handle: Option<JoinHandle<()>>,
}

impl SweepService {
    pub fn new(registry: Arc<WorkerRegistry>, config: SweeperConfig) -> Self {
        Self {
            registry,
            config,
            shutdown_tx: None,
            sweep_handle: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.sweep_handle
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// 启动清理服务
    pub async fn start(&mut self) -> RegistryResult<()> {
        if !self.config.enabled {
            info!("Sweep service is disabled");
            return Ok(());
        }
        if self.is_running() {
            warn!("Sweep service already running");
            return Ok(());
        }

        info!(
            interval_ms = self.config.interval().as_millis() as u64,
            stale_timeout_ms = self.config.stale_timeout().as_millis() as u64,
            "Starting sweep service"
        );

        let (shutdown_tx, mut shutdown_rx) = oneshot::channel();
        self.shutdown_tx = Some(shutdown_tx);

        let registry = self.registry.clone();
        let config = self.config.clone();

        let handle = tokio::spawn(async move {
            let mut ticker = interval(config.interval());
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        Self::run_pass(&registry, &config).await;
                    }
                    _ = &mut shutdown_rx => {
                        info!("Sweep service shutdown requested");
                        break;
                    }
                }
            }
        });

        self.sweep_handle = Some(handle);
        Ok(())
    }

    /// 停止清理服务并等待后台任务退出
    pub async fn stop(&mut self) -> RegistryResult<()> {
        if let Some(shutdown_tx) = self.shutdown_tx.take() {
            let _ = shutdown_tx.send(());
        }

        if let Some(handle) = self.sweep_handle.take() {
            if let Err(e) = handle.await {
                warn!("Error waiting for sweep service to stop: {}", e);
            }
        }

        info!("Sweep service stopped");
        Ok(())
    }

    /// 执行一次清理，服务被禁用时返回0
    pub async fn sweep_once(&self) -> RegistryResult<usize> {
        if !self.config.enabled {
            return Ok(0);
        }
        self.registry
            .cleanup_stale_workers(self.config.stale_timeout())
            .await
    }

    async fn run_pass(registry: &WorkerRegistry, config: &SweeperConfig) {
        let pass = registry.cleanup_stale_workers(config.stale_timeout());
        match timeout(config.interval(), pass).await {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => error!(removed = e.removed_count(), "Stale worker sweep failed: {}", e),
            Err(_) => warn!(
                "Stale worker sweep did not finish within {:?}, abandoned",
                config.interval()
            ),
        }
    }
}

impl Drop for SweepService {
    fn drop(&mut self) {
        if let Some(shutdown_tx) = self.shutdown_tx.take() {
            let _ = shutdown_tx.send(());
        }
    }
}
