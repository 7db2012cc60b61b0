//! 限制执行块
//!
//! 跳过前 `offset` 行后最多输出 `limit` 行。
//! 开启 fullCount 时，输出结束后继续读完输入，把跳过限制前的总行数记入统计

use crate::core::error::DBResult;
use crate::query::executor::base::{ExecutionBlock, ExecutionContext, ExecutorStats, Row};
use crate::query::executor::executor_enum::ExecutionBlockEnum;
use crate::query::planner::plan::core::nodes::NodeId;

#[derive(Debug)]
pub struct LimitBlock {
    id: NodeId,
    input: Box<ExecutionBlockEnum>,
    offset: u64,
    limit: u64,
    full_count: bool,
    context: ExecutionContext,
    /// 已从输入读取的行数
    seen: u64,
    returned: u64,
    finished: bool,
    stats: ExecutorStats,
}

impl LimitBlock {
    pub fn new(
        id: NodeId,
        input: ExecutionBlockEnum,
        offset: u64,
        limit: u64,
        full_count: bool,
        context: ExecutionContext,
    ) -> Self {
        Self {
            id,
            input: Box::new(input),
            offset,
            limit,
            full_count,
            context,
            seen: 0,
            returned: 0,
            finished: false,
            stats: ExecutorStats::new(),
        }
    }

    fn finish(&mut self) -> DBResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        if self.full_count {
            while self.input.next_row()?.is_some() {
                self.seen += 1;
            }
            let total = self.seen;
            self.context
                .update_statistics(|stats| stats.full_count = Some(total));
        }
        Ok(())
    }
}

impl ExecutionBlock for LimitBlock {
    fn id(&self) -> NodeId {
        self.id
    }

    fn name(&self) -> &'static str {
        "LimitBlock"
    }

    fn next_row(&mut self) -> DBResult<Option<Row>> {
        if self.finished {
            return Ok(None);
        }
        if self.returned >= self.limit {
            self.finish()?;
            return Ok(None);
        }
        while let Some(row) = self.input.next_row()? {
            self.seen += 1;
            if self.seen <= self.offset {
                continue;
            }
            self.returned += 1;
            self.stats.add_row(1);
            return Ok(Some(row));
        }
        self.finish()?;
        Ok(None)
    }

    fn stats(&self) -> &ExecutorStats {
        &self.stats
    }
}
