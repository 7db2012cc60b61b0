//! 排序执行块
//!
//! 第一次取行时物化全部输入，按排序键做稳定排序

use std::cmp::Ordering;
use std::collections::VecDeque;

use crate::core::error::DBResult;
use crate::core::types::value::compare_values;
use crate::query::executor::base::{ExecutionBlock, ExecutorStats, Row};
use crate::query::executor::executor_enum::ExecutionBlockEnum;
use crate::query::planner::plan::core::nodes::NodeId;

/// 排序键：寄存器与方向
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortKey {
    pub register: usize,
    pub ascending: bool,
}

#[derive(Debug)]
pub struct SortBlock {
    id: NodeId,
    input: Box<ExecutionBlockEnum>,
    keys: Vec<SortKey>,
    sorted: Option<VecDeque<Row>>,
    stats: ExecutorStats,
}

impl SortBlock {
    pub fn new(id: NodeId, input: ExecutionBlockEnum, keys: Vec<SortKey>) -> Self {
        Self {
            id,
            input: Box::new(input),
            keys,
            sorted: None,
            stats: ExecutorStats::new(),
        }
    }

    fn compare_rows(keys: &[SortKey], a: &Row, b: &Row) -> Ordering {
        for key in keys {
            let ordering = compare_values(&a[key.register], &b[key.register]);
            let ordering = if key.ascending {
                ordering
            } else {
                ordering.reverse()
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    }

    fn materialize(&mut self) -> DBResult<VecDeque<Row>> {
        let mut rows = Vec::new();
        while let Some(row) = self.input.next_row()? {
            rows.push(row);
        }
        let keys = &self.keys;
        rows.sort_by(|a, b| Self::compare_rows(keys, a, b));
        Ok(rows.into())
    }
}

impl ExecutionBlock for SortBlock {
    fn id(&self) -> NodeId {
        self.id
    }

    fn name(&self) -> &'static str {
        "SortBlock"
    }

    fn next_row(&mut self) -> DBResult<Option<Row>> {
        if self.sorted.is_none() {
            let rows = self.materialize()?;
            self.sorted = Some(rows);
        }
        let row = self.sorted.as_mut().and_then(VecDeque::pop_front);
        if row.is_some() {
            self.stats.add_row(1);
        }
        Ok(row)
    }

    fn stats(&self) -> &ExecutorStats {
        &self.stats
    }
}
