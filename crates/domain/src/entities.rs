use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, Utc};
use registry_errors::{RegistryError, RegistryResult};
use serde::{Deserialize, Serialize};

/// Worker能力类别
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum WorkerType {
    Executor,
    Router,
}

impl WorkerType {
    /// 所有已知类型，按推断优先级排列
    pub const ALL: [WorkerType; 2] = [WorkerType::Executor, WorkerType::Router];

    pub fn as_str(&self) -> &'static str {
        match self {
            WorkerType::Executor => "executor",
            WorkerType::Router => "router",
        }
    }

    /// 根据Worker ID中的类型标记推断类型，无法识别时回退为Executor
    pub fn infer_from_id(worker_id: &str) -> Self {
        let id = worker_id.to_ascii_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|t| id.contains(t.as_str()))
            .unwrap_or(WorkerType::Executor)
    }
}

impl fmt::Display for WorkerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WorkerType {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "executor" => Ok(WorkerType::Executor),
            "router" => Ok(WorkerType::Router),
            other => Err(RegistryError::UnsupportedType(other.to_string())),
        }
    }
}

/// Worker自己上报并持久化的状态
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ReportedStatus {
    Idle,
    Busy,
}

impl FromStr for ReportedStatus {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "idle" => Ok(ReportedStatus::Idle),
            "busy" => Ok(ReportedStatus::Busy),
            other => Err(RegistryError::invalid_worker(format!(
                "Worker只能上报 idle 或 busy, 收到: {other}"
            ))),
        }
    }
}

/// 读取时计算出的状态；Unhealthy 只存在于读取结果中
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum WorkerStatus {
    Idle,
    Busy,
    Unhealthy,
}

impl From<ReportedStatus> for WorkerStatus {
    fn from(status: ReportedStatus) -> Self {
        match status {
            ReportedStatus::Idle => WorkerStatus::Idle,
            ReportedStatus::Busy => WorkerStatus::Busy,
        }
    }
}

impl FromStr for WorkerStatus {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "idle" => Ok(WorkerStatus::Idle),
            "busy" => Ok(WorkerStatus::Busy),
            "unhealthy" => Ok(WorkerStatus::Unhealthy),
            other => Err(RegistryError::invalid_worker(format!(
                "未知的Worker状态: {other}"
            ))),
        }
    }
}

/// 存储中的Worker记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkerRecord {
    pub id: String,
    #[serde(rename = "type")]
    pub worker_type: WorkerType,
    pub status: ReportedStatus,
    pub registered_at: DateTime<Utc>,
    pub last_heartbeat: DateTime<Utc>,
    #[serde(default)]
    pub current_task: String,
    #[serde(default)]
    pub pending_tasks: u64,
}

impl WorkerRecord {
    pub fn new(id: impl Into<String>, worker_type: WorkerType) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            worker_type,
            status: ReportedStatus::Idle,
            registered_at: now,
            last_heartbeat: now,
            current_task: String::new(),
            pending_tasks: 0,
        }
    }

    pub fn with_status(mut self, status: ReportedStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_current_task(mut self, task: impl Into<String>) -> Self {
        self.current_task = task.into();
        self
    }

    pub fn validate(&self) -> RegistryResult<()> {
        if self.id.trim().is_empty() {
            return Err(RegistryError::invalid_worker("Worker ID不能为空"));
        }
        if self.last_heartbeat < self.registered_at {
            return Err(RegistryError::invalid_worker(format!(
                "Worker {} 的最后心跳早于注册时间",
                self.id
            )));
        }
        Ok(())
    }

    /// 距离上次心跳的时间；时钟回拨导致的负值按0处理
    pub fn heartbeat_age(&self, now: DateTime<Utc>) -> Duration {
        (now - self.last_heartbeat).to_std().unwrap_or(Duration::ZERO)
    }

    pub fn is_stale(&self, now: DateTime<Utc>, threshold: Duration) -> bool {
        self.heartbeat_age(now) > threshold
    }

    pub fn apply_heartbeat(
        &mut self,
        status: ReportedStatus,
        current_task: &str,
        now: DateTime<Utc>,
    ) {
        self.status = status;
        self.current_task = current_task.to_string();
        self.last_heartbeat = now.max(self.registered_at);
    }

    /// 以给定的TTL计算读取视图，不修改存储的记录
    pub fn project(&self, now: DateTime<Utc>, ttl: Duration) -> WorkerInfo {
        let healthy = !self.is_stale(now, ttl);
        let status = if healthy {
            self.status.into()
        } else {
            WorkerStatus::Unhealthy
        };

        WorkerInfo {
            id: self.id.clone(),
            worker_type: self.worker_type,
            status,
            registered_at: self.registered_at,
            last_heartbeat: self.last_heartbeat,
            current_task: self.current_task.clone(),
            pending_tasks: self.pending_tasks,
            healthy,
        }
    }
}

/// 调用方看到的Worker信息
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkerInfo {
    pub id: String,
    #[serde(rename = "type")]
    pub worker_type: WorkerType,
    pub status: WorkerStatus,
    pub registered_at: DateTime<Utc>,
    pub last_heartbeat: DateTime<Utc>,
    pub current_task: String,
    pub pending_tasks: u64,
    pub healthy: bool,
}

impl WorkerInfo {
    pub fn is_available(&self) -> bool {
        self.healthy && self.status == WorkerStatus::Idle
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkerFilter {
    pub types: Vec<WorkerType>,
    pub statuses: Vec<WorkerStatus>,
    pub healthy_only: bool,
}

impl WorkerFilter {
    pub fn of_type(worker_type: WorkerType) -> Self {
        Self {
            types: vec![worker_type],
            ..Default::default()
        }
    }

    pub fn with_status(mut self, status: WorkerStatus) -> Self {
        self.statuses.push(status);
        self
    }

    pub fn healthy_only(mut self) -> Self {
        self.healthy_only = true;
        self
    }

    pub fn matches(&self, worker: &WorkerInfo) -> bool {
        if !self.types.is_empty() && !self.types.contains(&worker.worker_type) {
            return false;
        }
        if !self.statuses.is_empty() && !self.statuses.contains(&worker.status) {
            return false;
        }
        !(self.healthy_only && !worker.healthy)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerStats {
    #[serde(rename = "type")]
    pub worker_type: WorkerType,
    pub total_workers: usize,
    pub idle_workers: usize,
    pub busy_workers: usize,
    pub unhealthy_workers: usize,
    pub total_pending_tasks: u64,
}

impl WorkerStats {
    pub fn new(worker_type: WorkerType) -> Self {
        Self {
            worker_type,
            total_workers: 0,
            idle_workers: 0,
            busy_workers: 0,
            unhealthy_workers: 0,
            total_pending_tasks: 0,
        }
    }

    pub fn from_workers<'a>(
        worker_type: WorkerType,
        workers: impl IntoIterator<Item = &'a WorkerInfo>,
    ) -> Self {
        let mut stats = Self::new(worker_type);
        for worker in workers {
            stats.record(worker);
        }
        stats
    }

    pub fn record(&mut self, worker: &WorkerInfo) {
        self.total_workers += 1;
        match worker.status {
            WorkerStatus::Idle => self.idle_workers += 1,
            WorkerStatus::Busy => self.busy_workers += 1,
            WorkerStatus::Unhealthy => self.unhealthy_workers += 1,
        }
        self.total_pending_tasks += worker.pending_tasks;
    }

    pub fn healthy_workers(&self) -> usize {
        self.idle_workers + self.busy_workers
    }
}
