//! 返回执行块
//!
//! 计划的根块，按行取出输入变量的值作为查询结果

use serde_json::Value;

use crate::core::error::DBResult;
use crate::query::executor::base::{ExecutionBlock, ExecutorStats, Row};
use crate::query::executor::executor_enum::ExecutionBlockEnum;
use crate::query::planner::plan::core::nodes::NodeId;

#[derive(Debug)]
pub struct ReturnBlock {
    id: NodeId,
    input: Box<ExecutionBlockEnum>,
    in_register: usize,
    stats: ExecutorStats,
}

impl ReturnBlock {
    pub fn new(id: NodeId, input: ExecutionBlockEnum, in_register: usize) -> Self {
        Self {
            id,
            input: Box::new(input),
            in_register,
            stats: ExecutorStats::new(),
        }
    }

    /// 取出下一个结果值
    pub fn next_value(&mut self) -> DBResult<Option<Value>> {
        Ok(self
            .next_row()?
            .map(|mut row| std::mem::take(&mut row[self.in_register])))
    }
}

impl ExecutionBlock for ReturnBlock {
    fn id(&self) -> NodeId {
        self.id
    }

    fn name(&self) -> &'static str {
        "ReturnBlock"
    }

    fn next_row(&mut self) -> DBResult<Option<Row>> {
        let row = self.input.next_row()?;
        if row.is_some() {
            self.stats.add_row(1);
        }
        Ok(row)
    }

    fn stats(&self) -> &ExecutorStats {
        &self.stats
    }
}
