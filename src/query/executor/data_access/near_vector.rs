//! 向量近邻扫描执行块
//!
//! 对每个输入行读取查询向量，向向量索引请求前 `offset + limit` 个候选，
//! 跳过 `offset` 个后按索引的自然顺序输出文档主键与距离

use std::collections::VecDeque;

use log::trace;
use serde_json::Value;

use crate::core::error::DBResult;
use crate::core::types::value::{as_vector, number};
use crate::index::{IndexError, IndexHandle, VectorMatch};
use crate::query::executor::base::{ExecutionBlock, ExecutionContext, ExecutorStats, Row};
use crate::query::executor::executor_enum::ExecutionBlockEnum;
use crate::query::executor::result_processing::NearVectorMerge;
use crate::query::planner::plan::core::nodes::NodeId;
use crate::storage::CollectionRef;

/// 近邻扫描使用的寄存器
#[derive(Debug, Clone, Copy)]
pub struct NearVectorRegisters {
    pub query: usize,
    pub document_id: usize,
    pub distance: usize,
}

#[derive(Debug)]
pub struct EnumerateNearVectorBlock {
    id: NodeId,
    input: Box<ExecutionBlockEnum>,
    collection: CollectionRef,
    index: IndexHandle,
    registers: NearVectorRegisters,
    merge: NearVectorMerge,
    n_probe: u64,
    context: ExecutionContext,
    current: Option<Row>,
    pending: VecDeque<VectorMatch>,
    stats: ExecutorStats,
}

impl EnumerateNearVectorBlock {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: NodeId,
        input: ExecutionBlockEnum,
        collection: CollectionRef,
        index: IndexHandle,
        registers: NearVectorRegisters,
        merge: NearVectorMerge,
        n_probe: u64,
        context: ExecutionContext,
    ) -> Self {
        Self {
            id,
            input: Box::new(input),
            collection,
            index,
            registers,
            merge,
            n_probe,
            context,
            current: None,
            pending: VecDeque::new(),
            stats: ExecutorStats::new(),
        }
    }

    fn search(&self, query: &Value) -> DBResult<Vec<VectorMatch>> {
        let query = as_vector(query).ok_or_else(|| {
            IndexError::InvalidQueryVector(format!("查询向量必须是数字数组，实际为 {}", query))
        })?;
        let top_k = usize::try_from(self.merge.top_k()).unwrap_or(usize::MAX);
        trace!(
            "近邻扫描 {}: 集合 {}，索引 {}，top_k={}",
            self.id,
            self.collection.name(),
            self.index.id,
            top_k
        );
        let matches = self.context.searcher().search(
            &self.collection,
            &self.index,
            &query,
            top_k,
            self.n_probe,
        )?;
        let found = matches.len() as u64;
        self.context.update_statistics(|stats| stats.scanned_index += found);
        Ok(self.merge.merge(vec![matches]))
    }
}

impl ExecutionBlock for EnumerateNearVectorBlock {
    fn id(&self) -> NodeId {
        self.id
    }

    fn name(&self) -> &'static str {
        "EnumerateNearVectorBlock"
    }

    fn next_row(&mut self) -> DBResult<Option<Row>> {
        loop {
            if let (Some(input_row), Some(found)) = (&self.current, self.pending.pop_front()) {
                let mut row = input_row.clone();
                row[self.registers.document_id] = Value::String(found.key);
                row[self.registers.distance] = number(found.score);
                self.stats.add_row(1);
                return Ok(Some(row));
            }
            let Some(row) = self.input.next_row()? else {
                self.current = None;
                return Ok(None);
            };
            if self.merge.limit() > 0 {
                self.pending = self.search(&row[self.registers.query])?.into();
            }
            self.current = Some(row);
        }
    }

    fn stats(&self) -> &ExecutorStats {
        &self.stats
    }
}
