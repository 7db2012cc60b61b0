//! 执行引擎
//!
//! 校验计划、分配寄存器、从根节点递归创建执行块，并拉取全部结果

use log::{debug, trace};
use serde_json::{json, Value};

use crate::core::error::{DBError, DBResult};
use crate::query::executor::base::{ExecutionBlock, ExecutionContext, QueryStatistics};
use crate::query::executor::executor_enum::ExecutionBlockEnum;
use crate::query::executor::factory::ExecutorFactory;
use crate::query::planner::plan::core::nodes::PlanNodeEnum;
use crate::query::planner::plan::ExecutionPlan;

/// 查询结果
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResult {
    pub values: Vec<Value>,
    pub statistics: QueryStatistics,
}

impl QueryResult {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn to_json(&self) -> Value {
        json!({
            "result": self.values,
            "stats": self.statistics.to_json(),
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct ExecutionEngine {
    context: ExecutionContext,
}

impl ExecutionEngine {
    pub fn new(context: ExecutionContext) -> Self {
        Self { context }
    }

    pub fn context(&self) -> &ExecutionContext {
        &self.context
    }

    /// 创建整棵执行块树，根节点必须是 ReturnNode
    pub fn build(&self, plan: &ExecutionPlan) -> DBResult<ExecutionBlockEnum> {
        plan.validate()?;
        let root = plan
            .root()
            .ok_or_else(|| DBError::execution("计划没有根节点"))?;
        if !matches!(plan.get_node(root)?, PlanNodeEnum::Return(_)) {
            return Err(DBError::execution(format!(
                "计划的根节点 {} 必须是 ReturnNode",
                root
            )));
        }
        let factory = ExecutorFactory::for_plan(plan, self.context.clone())?;
        factory.build(plan, root)
    }

    /// 执行计划并收集全部结果
    pub fn execute(&self, plan: &ExecutionPlan) -> DBResult<QueryResult> {
        self.context.reset_statistics();
        let ExecutionBlockEnum::Return(mut root) = self.build(plan)? else {
            return Err(DBError::execution("根执行块必须是 ReturnBlock"));
        };

        let mut values = Vec::new();
        while let Some(value) = root.next_value()? {
            values.push(value);
        }
        trace!(
            "{} ({}): {}",
            root.name(),
            root.id(),
            root.stats().to_formatted_string()
        );

        let statistics = self.context.statistics();
        debug!(
            "查询完成: {} 行，scannedFull={}，scannedIndex={}，filtered={}",
            values.len(),
            statistics.scanned_full,
            statistics.scanned_index,
            statistics.filtered
        );
        Ok(QueryResult { values, statistics })
    }
}
