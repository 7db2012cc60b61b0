//! 查询级统计信息
//!
//! 所有执行块共享一份统计，通过 `Arc<parking_lot::Mutex<_>>` 更新

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryStatistics {
    /// 全表扫描读取的文档数
    pub scanned_full: u64,
    /// 通过索引读取的文档数
    pub scanned_index: u64,
    /// 被过滤掉的行数
    pub filtered: u64,
    /// 设置了 fullCount 的 LIMIT 看到的总行数
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_count: Option<u64>,
}

impl QueryStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}
