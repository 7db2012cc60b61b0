//! 执行块 trait
//!
//! 执行块是计划节点编译后的可执行形式，采用拉取模型：
//! 每次调用 `next_row` 从输入块拉取所需的行并产出一行，返回 `None` 表示结束。
//! 停止拉取即向上游表示不再需要更多数据

use crate::core::error::DBResult;
use crate::query::planner::plan::core::nodes::NodeId;

use super::execution_context::Row;
use super::executor_stats::ExecutorStats;

pub trait ExecutionBlock: Send {
    /// 对应计划节点的 ID
    fn id(&self) -> NodeId;

    /// 执行块名称
    fn name(&self) -> &'static str;

    /// 产出下一行
    fn next_row(&mut self) -> DBResult<Option<Row>>;

    /// 获取执行统计信息
    fn stats(&self) -> &ExecutorStats;
}
