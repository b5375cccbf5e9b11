use thiserror::Error;


#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Worker未找到: {id}")]
    WorkerNotFound { id: String },
    #[error("编码错误: {0}")]
    Encoding(String),
    #[error("存储错误: {0}")]
    Store(String),
    #[error("任务队列错误: {0}")]
    Queue(String),
    #[error("不支持的Worker类型: {0}")]
    UnsupportedType(String),
    #[error("无效的Worker记录: {0}")]
    InvalidWorker(String),
    #[error("未注册Worker的心跳被拒绝: {id}")]
    UnregisteredHeartbeat { id: String },
    #[error("配置错误: {0}")]
    Configuration(String),
    #[error("清理未完成: 已移除 {removed} 个Worker后失败: {source}")]
    PartialSweep {
        removed: usize,
        #[source]
        source: Box<RegistryError>,
    },
}

pub type RegistryResult<T> = Result<T, RegistryError>;

impl RegistryError {
    pub fn worker_not_found<S: Into<String>>(id: S) -> Self {
        Self::WorkerNotFound { id: id.into() }
    }

    /// 存储层错误，附带操作名与Worker ID
    pub fn store<E: std::fmt::Display>(operation: &str, id: &str, err: E) -> Self {
        Self::Store(format!("{operation}({id}): {err}"))
    }

    pub fn encoding<E: std::fmt::Display>(operation: &str, id: &str, err: E) -> Self {
        Self::Encoding(format!("{operation}({id}): {err}"))
    }

    pub fn queue<E: std::fmt::Display>(stream: &str, group: &str, err: E) -> Self {
        Self::Queue(format!("{stream}/{group}: {err}"))
    }

    pub fn invalid_worker<S: Into<String>>(msg: S) -> Self {
        Self::InvalidWorker(msg.into())
    }

    pub fn config_error<S: Into<String>>(msg: S) -> Self {
        Self::Configuration(msg.into())
    }

    pub fn partial_sweep(removed: usize, source: RegistryError) -> Self {
        Self::PartialSweep {
            removed,
            source: Box::new(source),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, RegistryError::WorkerNotFound { .. })
    }

    /// 调用方可以安全重试的错误（注册、心跳、注销都是幂等的）
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            RegistryError::Store(_) | RegistryError::Queue(_) | RegistryError::PartialSweep { .. }
        )
    }

    /// 部分失败的清理在出错前已经移除的记录数
    pub fn removed_count(&self) -> usize {
        match self {
            RegistryError::PartialSweep { removed, .. } => *removed,
            _ => 0,
        }
    }
}

impl From<serde_json::Error> for RegistryError {
    fn from(err: serde_json::Error) -> Self {
        RegistryError::Encoding(err.to_string())
    }
}

impl From<anyhow::Error> for RegistryError {
    fn from(err: anyhow::Error) -> Self {
        RegistryError::Configuration(err.to_string())
    }
}
