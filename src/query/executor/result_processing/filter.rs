//! 过滤执行块
//!
//! 只保留输入变量为真值的行，被丢弃的行计入 `filtered`

use crate::core::error::DBResult;
use crate::core::types::value::is_truthy;
use crate::query::executor::base::{ExecutionBlock, ExecutionContext, ExecutorStats, Row};
use crate::query::executor::executor_enum::ExecutionBlockEnum;
use crate::query::planner::plan::core::nodes::NodeId;

#[derive(Debug)]
pub struct FilterBlock {
    id: NodeId,
    input: Box<ExecutionBlockEnum>,
    in_register: usize,
    context: ExecutionContext,
    stats: ExecutorStats,
}

impl FilterBlock {
    pub fn new(
        id: NodeId,
        input: ExecutionBlockEnum,
        in_register: usize,
        context: ExecutionContext,
    ) -> Self {
        Self {
            id,
            input: Box::new(input),
            in_register,
            context,
            stats: ExecutorStats::new(),
        }
    }
}

impl ExecutionBlock for FilterBlock {
    fn id(&self) -> NodeId {
        self.id
    }

    fn name(&self) -> &'static str {
        "FilterBlock"
    }

    fn next_row(&mut self) -> DBResult<Option<Row>> {
        while let Some(row) = self.input.next_row()? {
            if is_truthy(&row[self.in_register]) {
                self.stats.add_row(1);
                return Ok(Some(row));
            }
            self.context.update_statistics(|stats| stats.filtered += 1);
        }
        Ok(None)
    }

    fn stats(&self) -> &ExecutorStats {
        &self.stats
    }
}
