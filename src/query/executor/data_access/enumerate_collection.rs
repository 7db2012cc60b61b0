//! 全表扫描执行块
//!
//! 对每个输入行遍历集合中的全部文档，把文档写入输出寄存器

use crate::core::error::DBResult;
use crate::query::executor::base::{ExecutionBlock, ExecutionContext, ExecutorStats, Row};
use crate::query::executor::executor_enum::ExecutionBlockEnum;
use crate::query::planner::plan::core::nodes::NodeId;
use crate::storage::CollectionRef;

#[derive(Debug)]
pub struct EnumerateCollectionBlock {
    id: NodeId,
    input: Box<ExecutionBlockEnum>,
    collection: CollectionRef,
    out_register: usize,
    context: ExecutionContext,
    current: Option<Row>,
    position: usize,
    stats: ExecutorStats,
}

impl EnumerateCollectionBlock {
    pub fn new(
        id: NodeId,
        input: ExecutionBlockEnum,
        collection: CollectionRef,
        out_register: usize,
        context: ExecutionContext,
    ) -> Self {
        Self {
            id,
            input: Box::new(input),
            collection,
            out_register,
            context,
            current: None,
            position: 0,
            stats: ExecutorStats::new(),
        }
    }
}

impl ExecutionBlock for EnumerateCollectionBlock {
    fn id(&self) -> NodeId {
        self.id
    }

    fn name(&self) -> &'static str {
        "EnumerateCollectionBlock"
    }

    fn next_row(&mut self) -> DBResult<Option<Row>> {
        loop {
            if let Some(input_row) = &self.current {
                if let Some(document) = self.collection.documents().get(self.position) {
                    self.position += 1;
                    let mut row = input_row.clone();
                    row[self.out_register] = document.clone();
                    self.context.update_statistics(|stats| stats.scanned_full += 1);
                    self.stats.add_row(1);
                    return Ok(Some(row));
                }
            }
            match self.input.next_row()? {
                Some(row) => {
                    self.current = Some(row);
                    self.position = 0;
                }
                None => {
                    self.current = None;
                    return Ok(None);
                }
            }
        }
    }

    fn stats(&self) -> &ExecutorStats {
        &self.stats
    }
}
