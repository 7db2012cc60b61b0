//! 单行执行块
//!
//! 产出恰好一行，并把绑定参数写入对应的寄存器

use serde_json::Value;

use crate::core::error::{DBError, DBResult};
use crate::query::executor::base::{ExecutionBlock, ExecutionContext, ExecutorStats, Row};
use crate::query::planner::plan::core::nodes::NodeId;

#[derive(Debug)]
pub struct SingletonBlock {
    id: NodeId,
    width: usize,
    /// (寄存器, 参数名)
    bind_registers: Vec<(usize, String)>,
    context: ExecutionContext,
    done: bool,
    stats: ExecutorStats,
}

impl SingletonBlock {
    pub fn new(
        id: NodeId,
        width: usize,
        bind_registers: Vec<(usize, String)>,
        context: ExecutionContext,
    ) -> Self {
        Self {
            id,
            width,
            bind_registers,
            context,
            done: false,
            stats: ExecutorStats::new(),
        }
    }
}

impl ExecutionBlock for SingletonBlock {
    fn id(&self) -> NodeId {
        self.id
    }

    fn name(&self) -> &'static str {
        "SingletonBlock"
    }

    fn next_row(&mut self) -> DBResult<Option<Row>> {
        if self.done {
            return Ok(None);
        }
        self.done = true;

        let mut row = vec![Value::Null; self.width];
        for (register, name) in &self.bind_registers {
            let value = self
                .context
                .bind_parameter(name)
                .ok_or_else(|| DBError::execution(format!("未绑定的参数: @{}", name)))?;
            row[*register] = value.clone();
        }
        self.stats.add_row(1);
        Ok(Some(row))
    }

    fn stats(&self) -> &ExecutorStats {
        &self.stats
    }
}
