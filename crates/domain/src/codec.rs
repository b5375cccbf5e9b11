//! Worker记录与存储字节之间的编解码
//!
//! 记录以JSON保存，字段名保持不变，便于其他语言的服务直接读取。

use registry_errors::{RegistryError, RegistryResult};

use crate::entities::WorkerRecord;

pub fn encode_record(record: &WorkerRecord) -> RegistryResult<Vec<u8>> {
    serde_json::to_vec(record).map_err(|e| RegistryError::encoding("encode", &record.id, e))
}

/// `key` 仅用于错误上下文
pub fn decode_record(key: &str, payload: &[u8]) -> RegistryResult<WorkerRecord> {
    serde_json::from_slice(payload).map_err(|e| RegistryError::encoding("decode", key, e))
}
