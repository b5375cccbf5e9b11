use serde::{Deserialize, Serialize};

/// 收到未注册Worker心跳时的处理方式
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SelfHealPolicy {
    /// 自动注册，类型从Worker ID推断
    #[default]
    Infer,
    /// 拒绝心跳，要求Worker先注册（或在心跳中显式给出类型）
    Reject,
}
