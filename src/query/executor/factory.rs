//! 执行块工厂模块
//!
//! 负责根据计划节点创建对应的执行块实例
//! 采用直接匹配模式，每种节点对应一种执行块

use std::sync::Arc;

use log::trace;

use crate::core::error::{DBError, DBResult};
use crate::core::types::variable::VariableRef;
use crate::query::executor::base::{ExecutionBlock, ExecutionContext, RegisterPlan};
use crate::query::executor::data_access::{
    EnumerateCollectionBlock, EnumerateNearVectorBlock, MaterializeBlock, NearVectorRegisters,
    SingletonBlock,
};
use crate::query::executor::executor_enum::ExecutionBlockEnum;
use crate::query::executor::result_processing::{
    CalculationBlock, FilterBlock, LimitBlock, NearVectorMerge, ReturnBlock, SortBlock, SortKey,
};
use crate::query::planner::plan::core::nodes::{NodeId, PlanNodeEnum};
use crate::query::planner::plan::ExecutionPlan;

/// 执行块工厂
#[derive(Debug, Clone)]
pub struct ExecutorFactory {
    registers: Arc<RegisterPlan>,
    context: ExecutionContext,
}

impl ExecutorFactory {
    pub fn new(registers: Arc<RegisterPlan>, context: ExecutionContext) -> Self {
        Self { registers, context }
    }

    /// 为整个计划分配寄存器并创建工厂
    pub fn for_plan(plan: &ExecutionPlan, context: ExecutionContext) -> DBResult<Self> {
        Ok(Self::new(Arc::new(RegisterPlan::from_plan(plan)?), context))
    }

    pub fn registers(&self) -> &Arc<RegisterPlan> {
        &self.registers
    }

    /// 从 `id` 开始递归创建执行块，依赖先于节点本身创建
    pub fn build(&self, plan: &ExecutionPlan, id: NodeId) -> DBResult<ExecutionBlockEnum> {
        let node = plan.get_node(id)?;
        let input = match plan.dependencies(id) {
            [] => None,
            [dependency] => Some(self.build(plan, *dependency)?),
            _ => {
                return Err(DBError::execution(format!(
                    "节点 {} 的依赖数量不受支持",
                    id
                )))
            }
        };
        let block = self.create_block(node, input)?;
        trace!("创建执行块 {} (节点 {})", block.name(), block.id());
        Ok(block)
    }

    fn register(&self, variable: &VariableRef) -> DBResult<usize> {
        self.registers.register(variable.id)
    }

    /// 创建单个执行块，`input` 是唯一依赖对应的执行块
    pub fn create_block(
        &self,
        node: &PlanNodeEnum,
        input: Option<ExecutionBlockEnum>,
    ) -> DBResult<ExecutionBlockEnum> {
        let id = node.id();
        let require_input = |input: Option<ExecutionBlockEnum>| {
            input.ok_or_else(|| {
                DBError::execution(format!("节点 {} ({}) 缺少输入", id, node.name()))
            })
        };

        let block = match node {
            PlanNodeEnum::Singleton(node) => {
                let bind_registers = node
                    .bind_parameter_out_vars()
                    .iter()
                    .map(|(name, variable)| Ok((self.register(variable)?, name.clone())))
                    .collect::<DBResult<Vec<_>>>()?;
                SingletonBlock::new(
                    id,
                    self.registers.width(),
                    bind_registers,
                    self.context.clone(),
                )
                .into()
            }
            PlanNodeEnum::EnumerateCollection(node) => EnumerateCollectionBlock::new(
                id,
                require_input(input)?,
                node.binding().collection().clone(),
                self.register(node.out_variable())?,
                self.context.clone(),
            )
            .into(),
            PlanNodeEnum::Calculation(node) => CalculationBlock::new(
                id,
                require_input(input)?,
                node.expression().clone(),
                self.register(node.out_variable())?,
                Arc::clone(&self.registers),
                self.context.clone(),
            )
            .into(),
            PlanNodeEnum::Filter(node) => FilterBlock::new(
                id,
                require_input(input)?,
                self.register(node.in_variable())?,
                self.context.clone(),
            )
            .into(),
            PlanNodeEnum::Sort(node) => {
                let keys = node
                    .sort_items()
                    .iter()
                    .map(|item| {
                        Ok(SortKey {
                            register: self.register(&item.variable)?,
                            ascending: item.is_ascending(),
                        })
                    })
                    .collect::<DBResult<Vec<_>>>()?;
                SortBlock::new(id, require_input(input)?, keys).into()
            }
            PlanNodeEnum::Limit(node) => LimitBlock::new(
                id,
                require_input(input)?,
                node.offset(),
                node.limit(),
                node.full_count(),
                self.context.clone(),
            )
            .into(),
            PlanNodeEnum::Return(node) => {
                ReturnBlock::new(id, require_input(input)?, self.register(node.in_variable())?)
                    .into()
            }
            PlanNodeEnum::EnumerateNearVectors(node) => {
                let (index, definition) = node
                    .index()
                    .and_then(|index| index.vector_definition().map(|d| (index, d)))
                    .ok_or_else(|| {
                        DBError::execution(format!("近邻扫描节点 {} 没有向量索引", id))
                    })?;
                let registers = NearVectorRegisters {
                    query: self.register(node.in_variable())?,
                    document_id: self.register(node.document_out_variable())?,
                    distance: self.register(node.distance_out_variable())?,
                };
                EnumerateNearVectorBlock::new(
                    id,
                    require_input(input)?,
                    node.binding().collection().clone(),
                    Arc::clone(index),
                    registers,
                    NearVectorMerge::for_node(node),
                    node.search_parameters().effective_n_probe(definition),
                    self.context.clone(),
                )
                .into()
            }
            PlanNodeEnum::Materialize(node) => MaterializeBlock::new(
                id,
                require_input(input)?,
                node.binding().collection().clone(),
                self.register(node.in_doc_id())?,
                self.register(node.out_variable())?,
            )
            .into(),
        };
        Ok(block)
    }
}
