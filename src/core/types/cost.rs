//! 代价估算类型

use serde::{Deserialize, Serialize};

/// 节点代价估算
///
/// 由依赖节点的估算加上本节点的逐行增量推导而来，两个分量都不会为负
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostEstimate {
    pub estimated_nr_items: u64,
    pub estimated_cost: f64,
}

impl CostEstimate {
    pub fn new(estimated_nr_items: u64, estimated_cost: f64) -> Self {
        Self {
            estimated_nr_items,
            estimated_cost: estimated_cost.max(0.0),
        }
    }

    /// 没有依赖时使用的起点
    pub fn empty() -> Self {
        Self::default()
    }
}
