use clap::{Parser, Subcommand};
use registry_core::{ReportedStatus, WorkerStatus, WorkerType};

/// 分布式Worker存活注册中心
#[derive(Parser, Debug)]
#[command(name = "worker-registry")]
#[command(version = "1.0.0")]
#[command(about = "分布式Worker存活注册中心 - 命令行工具")]
#[command(long_about = "注册Worker、发送心跳、查询存活状态和统计，以及清理失联的Worker")]
pub struct RegistryCli {
    #[command(subcommand)]
    pub command: Commands,

    /// 配置文件路径
    #[arg(short, long, value_name = "FILE", global = true)]
    pub config: Option<String>,

    /// 日志级别（覆盖配置文件）
    #[arg(
        short = 'l',
        long,
        value_name = "LEVEL",
        global = true,
        value_parser = ["trace", "debug", "info", "warn", "error"]
    )]
    pub log_level: Option<String>,

    /// 日志格式（覆盖配置文件）
    #[arg(long, value_name = "FORMAT", global = true, value_parser = ["json", "pretty"])]
    pub log_format: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// 注册Worker
    Register {
        /// Worker类型 (executor | router)
        #[arg(short = 't', long = "type")]
        worker_type: WorkerType,
        /// Worker ID，默认为 <类型>-<主机名>
        #[arg(long)]
        id: Option<String>,
        /// 初始状态 (idle | busy)
        #[arg(short, long, default_value = "idle")]
        status: ReportedStatus,
        /// 当前任务ID
        #[arg(long, default_value = "")]
        task: String,
    },
    /// 发送心跳
    Heartbeat {
        /// Worker ID
        #[arg(long)]
        id: String,
        /// 当前状态 (idle | busy)
        #[arg(short, long)]
        status: ReportedStatus,
        /// 当前任务ID
        #[arg(long, default_value = "")]
        task: String,
        /// Worker未注册时使用的类型，不指定则按配置的自愈策略处理
        #[arg(short = 't', long = "type")]
        worker_type: Option<WorkerType>,
    },
    /// 注销Worker
    Unregister {
        /// Worker ID
        #[arg(long)]
        id: String,
    },
    /// 查看Worker详情
    Get {
        /// Worker ID
        #[arg(long)]
        id: String,
    },
    /// 列出Worker
    List {
        /// 按类型过滤，可重复
        #[arg(short = 't', long = "type")]
        types: Vec<WorkerType>,
        /// 按状态过滤 (idle | busy | unhealthy)，可重复
        #[arg(short, long = "status")]
        statuses: Vec<WorkerStatus>,
        /// 只显示健康的Worker
        #[arg(long)]
        healthy_only: bool,
    },
    /// Worker统计，不指定类型时输出所有类型
    Stats {
        /// Worker类型
        #[arg(short = 't', long = "type")]
        worker_type: Option<String>,
    },
    /// 执行一次过期Worker清理
    Sweep {
        /// 心跳超时（秒），默认使用配置中的 sweeper.stale_timeout_seconds
        #[arg(long)]
        timeout: Option<u64>,
    },
    /// 持续运行定时清理，直到收到 Ctrl+C 或 SIGTERM
    Sweeper,
}
