//! 计算执行块
//!
//! 对每一行求值表达式，把结果写入输出变量的寄存器

use std::sync::Arc;

use crate::core::error::DBResult;
use crate::core::types::expression::Expression;
use crate::expression::ExpressionEvaluator;
use crate::query::executor::base::{
    ExecutionBlock, ExecutionContext, ExecutorStats, RegisterPlan, Row, RowContext,
};
use crate::query::executor::executor_enum::ExecutionBlockEnum;
use crate::query::planner::plan::core::nodes::NodeId;

#[derive(Debug)]
pub struct CalculationBlock {
    id: NodeId,
    input: Box<ExecutionBlockEnum>,
    expression: Expression,
    out_register: usize,
    registers: Arc<RegisterPlan>,
    context: ExecutionContext,
    stats: ExecutorStats,
}

impl CalculationBlock {
    pub fn new(
        id: NodeId,
        input: ExecutionBlockEnum,
        expression: Expression,
        out_register: usize,
        registers: Arc<RegisterPlan>,
        context: ExecutionContext,
    ) -> Self {
        Self {
            id,
            input: Box::new(input),
            expression,
            out_register,
            registers,
            context,
            stats: ExecutorStats::new(),
        }
    }
}

impl ExecutionBlock for CalculationBlock {
    fn id(&self) -> NodeId {
        self.id
    }

    fn name(&self) -> &'static str {
        "CalculationBlock"
    }

    fn next_row(&mut self) -> DBResult<Option<Row>> {
        let Some(mut row) = self.input.next_row()? else {
            return Ok(None);
        };
        let value = {
            let row_context =
                RowContext::new(&row, &self.registers, self.context.bind_parameters());
            ExpressionEvaluator::evaluate(&self.expression, &row_context)?
        };
        row[self.out_register] = value;
        self.stats.add_row(1);
        Ok(Some(row))
    }

    fn stats(&self) -> &ExecutorStats {
        &self.stats
    }
}
