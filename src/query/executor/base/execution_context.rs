//! 执行上下文
//!
//! 保存一次查询执行期间所有执行块共享的状态：绑定参数、向量搜索实现与查询统计。
//! 行以寄存器数组表示，`RegisterPlan` 为计划中的每个变量分配一个寄存器

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::Value;

use crate::core::error::{DBError, DBResult};
use crate::core::types::variable::{VarSet, VariableId};
use crate::expression::ExpressionContext;
use crate::index::{FlatVectorSearcher, VectorSearcher};
use crate::query::planner::plan::ExecutionPlan;

use super::query_statistics::QueryStatistics;

/// 一行数据，下标为寄存器编号
pub type Row = Vec<Value>;

/// 执行上下文
#[derive(Debug, Clone)]
pub struct ExecutionContext {
    bind_parameters: Arc<HashMap<String, Value>>,
    searcher: Arc<dyn VectorSearcher>,
    statistics: Arc<Mutex<QueryStatistics>>,
}

impl ExecutionContext {
    /// 使用精确向量搜索创建上下文
    pub fn new() -> Self {
        Self {
            bind_parameters: Arc::new(HashMap::new()),
            searcher: Arc::new(FlatVectorSearcher),
            statistics: Arc::new(Mutex::new(QueryStatistics::new())),
        }
    }

    pub fn with_bind_parameters(mut self, parameters: HashMap<String, Value>) -> Self {
        self.bind_parameters = Arc::new(parameters);
        self
    }

    pub fn with_bind_parameter(mut self, name: impl Into<String>, value: Value) -> Self {
        Arc::make_mut(&mut self.bind_parameters).insert(name.into(), value);
        self
    }

    pub fn with_searcher(mut self, searcher: Arc<dyn VectorSearcher>) -> Self {
        self.searcher = searcher;
        self
    }

    pub fn bind_parameters(&self) -> &HashMap<String, Value> {
        &self.bind_parameters
    }

    pub fn bind_parameter(&self, name: &str) -> Option<&Value> {
        self.bind_parameters.get(name)
    }

    pub fn searcher(&self) -> &dyn VectorSearcher {
        self.searcher.as_ref()
    }

    /// 当前统计信息的快照
    pub fn statistics(&self) -> QueryStatistics {
        self.statistics.lock().clone()
    }

    pub fn update_statistics<F: FnOnce(&mut QueryStatistics)>(&self, update: F) {
        let mut statistics = self.statistics.lock();
        update(&mut *statistics);
    }

    pub fn reset_statistics(&self) {
        *self.statistics.lock() = QueryStatistics::new();
    }
}

impl Default for ExecutionContext {
    fn default() -> Self {
        Self::new()
    }
}

/// 变量到寄存器的分配
#[derive(Debug, Clone, Default)]
pub struct RegisterPlan {
    registers: HashMap<VariableId, usize>,
}

impl RegisterPlan {
    pub fn new() -> Self {
        Self::default()
    }

    /// 为计划中读写的每个变量分配寄存器，按节点的执行顺序分配
    pub fn from_plan(plan: &ExecutionPlan) -> DBResult<Self> {
        let mut registers = Self::new();
        for id in plan.topological_order()? {
            let node = plan.get_node(id)?;
            for var in node.variables_set_here() {
                registers.allocate(var.id);
            }
            let mut used = VarSet::new();
            node.variables_used_here(&mut used);
            for var in used {
                registers.allocate(var);
            }
        }
        Ok(registers)
    }

    /// 分配寄存器，变量已有寄存器时返回原寄存器
    pub fn allocate(&mut self, var: VariableId) -> usize {
        let next = self.registers.len();
        *self.registers.entry(var).or_insert(next)
    }

    pub fn get(&self, var: VariableId) -> Option<usize> {
        self.registers.get(&var).copied()
    }

    pub fn register(&self, var: VariableId) -> DBResult<usize> {
        self.get(var)
            .ok_or_else(|| DBError::execution(format!("变量 #{} 没有分配寄存器", var)))
    }

    /// 行宽度（寄存器数量）
    pub fn width(&self) -> usize {
        self.registers.len()
    }

    pub fn empty_row(&self) -> Row {
        vec![Value::Null; self.width()]
    }
}

/// 在一行上求值表达式的上下文
pub struct RowContext<'a> {
    row: &'a [Value],
    registers: &'a RegisterPlan,
    parameters: &'a HashMap<String, Value>,
}

impl<'a> RowContext<'a> {
    pub fn new(row: &'a [Value], registers: &'a RegisterPlan, parameters: &'a HashMap<String, Value>) -> Self {
        Self {
            row,
            registers,
            parameters,
        }
    }
}

impl ExpressionContext for RowContext<'_> {
    fn variable(&self, id: VariableId) -> Option<&Value> {
        self.registers.get(id).and_then(|register| self.row.get(register))
    }

    fn bind_parameter(&self, name: &str) -> Option<&Value> {
        self.parameters.get(name)
    }
}
