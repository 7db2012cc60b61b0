//! 文档物化执行块
//!
//! 按文档主键从集合读取完整文档。文档不存在时丢弃该行

use log::debug;

use crate::core::error::{DBError, DBResult};
use crate::query::executor::base::{ExecutionBlock, ExecutorStats, Row};
use crate::query::executor::executor_enum::ExecutionBlockEnum;
use crate::query::planner::plan::core::nodes::NodeId;
use crate::storage::CollectionRef;

#[derive(Debug)]
pub struct MaterializeBlock {
    id: NodeId,
    input: Box<ExecutionBlockEnum>,
    collection: CollectionRef,
    in_register: usize,
    out_register: usize,
    stats: ExecutorStats,
}

impl MaterializeBlock {
    pub fn new(
        id: NodeId,
        input: ExecutionBlockEnum,
        collection: CollectionRef,
        in_register: usize,
        out_register: usize,
    ) -> Self {
        Self {
            id,
            input: Box::new(input),
            collection,
            in_register,
            out_register,
            stats: ExecutorStats::new(),
        }
    }
}

impl ExecutionBlock for MaterializeBlock {
    fn id(&self) -> NodeId {
        self.id
    }

    fn name(&self) -> &'static str {
        "MaterializeBlock"
    }

    fn next_row(&mut self) -> DBResult<Option<Row>> {
        while let Some(mut row) = self.input.next_row()? {
            let key = row[self.in_register]
                .as_str()
                .ok_or_else(|| DBError::execution(format!("文档主键必须是字符串: {}", row[self.in_register])))?;
            match self.collection.document(key) {
                Some(document) => {
                    row[self.out_register] = document.clone();
                    self.stats.add_row(1);
                    return Ok(Some(row));
                }
                None => debug!("集合 {} 中不存在文档 {}", self.collection.name(), key),
            }
        }
        Ok(None)
    }

    fn stats(&self) -> &ExecutorStats {
        &self.stats
    }
}
