//! 执行块统计信息
//!
//! 记录单个执行块产生的行数与耗时，用于性能分析。

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// 执行块统计信息
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExecutorStats {
    /// 输出的行数
    pub num_rows: usize,
    /// 执行时间（微秒）
    pub exec_time_us: u64,
    /// 其他统计信息
    pub other_stats: HashMap<String, String>,
}

impl ExecutorStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// 增加输出的行数
    pub fn add_row(&mut self, count: usize) {
        self.num_rows += count;
    }

    /// 增加执行时间
    pub fn add_exec_time(&mut self, duration: Duration) {
        self.exec_time_us += duration.as_micros() as u64;
    }

    /// 添加自定义统计信息
    pub fn add_stat(&mut self, key: String, value: String) {
        self.other_stats.insert(key, value);
    }

    /// 获取自定义统计信息
    pub fn get_stat(&self, key: &str) -> Option<&String> {
        self.other_stats.get(key)
    }

    /// 导出为格式化字符串
    pub fn to_formatted_string(&self) -> String {
        format!("rows: {}, exec_time: {}us", self.num_rows, self.exec_time_us)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_executor_stats() {
        let mut stats = ExecutorStats::new();
        stats.add_row(3);
        stats.add_row(2);
        stats.add_exec_time(Duration::from_micros(1500));
        stats.add_stat("skipped".to_string(), "4".to_string());

        assert_eq!(stats.num_rows, 5);
        assert_eq!(stats.exec_time_us, 1500);
        assert_eq!(stats.get_stat("skipped"), Some(&"4".to_string()));
        assert_eq!(stats.to_formatted_string(), "rows: 5, exec_time: 1500us");
    }
}
