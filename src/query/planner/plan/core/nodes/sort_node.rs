//! 排序与限制节点实现
//!
//! SortNode 按一个或多个变量排序输入行；
//! LimitNode 跳过前 `offset` 行并最多输出 `limit` 行

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::core::error::{PlanError, PlanResult};
use crate::core::types::json_utils::{as_object, get_array, get_bool, get_u64, JsonObject};
use crate::core::types::variable::replace_variable;
use crate::core::{CostEstimate, VarSet, VariableRef, VariableReplacements};
use crate::define_plan_node;

use super::plan_node_kind::NodeKind;
use super::plan_node_traits::{NodeDecoder, PlanNode};
use super::NodeId;

/// 排序方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderDirection {
    Asc,
    Desc,
}

impl OrderDirection {
    pub fn from_ascending(ascending: bool) -> Self {
        if ascending {
            OrderDirection::Asc
        } else {
            OrderDirection::Desc
        }
    }
}

/// 排序项定义
/// 包含排序变量和排序方向
#[derive(Debug, Clone, PartialEq)]
pub struct SortItem {
    /// 排序变量
    pub variable: VariableRef,
    /// 排序方向
    pub direction: OrderDirection,
}

impl SortItem {
    /// 创建新的排序项
    pub fn new(variable: VariableRef, direction: OrderDirection) -> Self {
        Self {
            variable,
            direction,
        }
    }

    /// 创建升序排序项
    pub fn asc(variable: VariableRef) -> Self {
        Self::new(variable, OrderDirection::Asc)
    }

    /// 创建降序排序项
    pub fn desc(variable: VariableRef) -> Self {
        Self::new(variable, OrderDirection::Desc)
    }

    pub fn is_ascending(&self) -> bool {
        self.direction == OrderDirection::Asc
    }

    fn to_json(&self) -> Value {
        json!({
            "inVariable": self.variable.to_json(),
            "ascending": self.is_ascending(),
        })
    }
}

define_plan_node! {
    pub struct SortNode {
        sort_items: Vec<SortItem>,
    }
    enum: Sort
}

impl SortNode {
    /// 创建新的排序节点
    pub fn new(id: NodeId, sort_items: Vec<SortItem>) -> Self {
        Self { id, sort_items }
    }

    /// 获取排序字段
    pub fn sort_items(&self) -> &[SortItem] {
        &self.sort_items
    }

    pub fn from_json(id: NodeId, obj: &JsonObject, decoder: &mut NodeDecoder) -> PlanResult<Self> {
        let mut sort_items = Vec::new();
        for element in get_array(obj, "elements")? {
            let element = as_object(element, "elements")?;
            let variable = decoder.variable(element, "inVariable")?;
            let ascending = get_bool(element, "ascending")?;
            sort_items.push(SortItem::new(variable, OrderDirection::from_ascending(ascending)));
        }
        if sort_items.is_empty() {
            return Err(PlanError::invalid_field("elements", "排序项不能为空"));
        }
        Ok(Self::new(id, sort_items))
    }
}

impl PlanNode for SortNode {
    fn id(&self) -> NodeId {
        self.id
    }

    fn kind(&self) -> NodeKind {
        NodeKind::Sort
    }

    /// 排序代价为 n·log2(n)，行数很少时按线性计
    fn estimate_cost(&self, dependency: Option<&CostEstimate>) -> CostEstimate {
        let dep = dependency.copied().unwrap_or_default();
        let n = dep.estimated_nr_items as f64;
        let sort_cost = if dep.estimated_nr_items <= 3 {
            n
        } else {
            n * n.log2()
        };
        CostEstimate::new(dep.estimated_nr_items, dep.estimated_cost + sort_cost)
    }

    fn variables_used_here(&self, vars: &mut VarSet) {
        for item in &self.sort_items {
            vars.insert(item.variable.id);
        }
    }

    fn variables_set_here(&self) -> Vec<VariableRef> {
        Vec::new()
    }

    fn replace_variables(&mut self, replacements: &VariableReplacements) {
        for item in &mut self.sort_items {
            replace_variable(&mut item.variable, replacements);
        }
    }

    fn serialize_fields(&self, obj: &mut JsonObject) {
        let elements: Vec<Value> = self.sort_items.iter().map(SortItem::to_json).collect();
        obj.insert("elements".to_string(), Value::Array(elements));
    }
}

/// 跳过一行的代价，远小于产生一行
pub const LIMIT_SKIP_COST: f64 = 0.000001;

define_plan_node! {
    pub struct LimitNode {
        offset: u64,
        limit: u64,
        full_count: bool,
    }
    enum: Limit
}

impl LimitNode {
    /// 创建新的限制节点
    pub fn new(id: NodeId, offset: u64, limit: u64) -> Self {
        Self {
            id,
            offset,
            limit,
            full_count: false,
        }
    }

    /// 获取偏移量
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// 获取限制数量
    pub fn limit(&self) -> u64 {
        self.limit
    }

    /// 开启后达到 limit 仍继续计数，用于报告匹配总数
    pub fn set_full_count(&mut self, full_count: bool) {
        self.full_count = full_count;
    }

    pub fn full_count(&self) -> bool {
        self.full_count
    }

    pub fn from_json(id: NodeId, obj: &JsonObject, _decoder: &mut NodeDecoder) -> PlanResult<Self> {
        let mut node = Self::new(id, get_u64(obj, "offset")?, get_u64(obj, "limit")?);
        node.full_count = get_bool(obj, "fullCount")?;
        Ok(node)
    }
}

impl PlanNode for LimitNode {
    fn id(&self) -> NodeId {
        self.id
    }

    fn kind(&self) -> NodeKind {
        NodeKind::Limit
    }

    fn estimate_cost(&self, dependency: Option<&CostEstimate>) -> CostEstimate {
        let dep = dependency.copied().unwrap_or_default();
        let skipped = self.offset.min(dep.estimated_nr_items);
        let remaining = dep.estimated_nr_items - skipped;
        let nr_items = self.limit.min(remaining);
        CostEstimate::new(
            nr_items,
            dep.estimated_cost + skipped as f64 * LIMIT_SKIP_COST + nr_items as f64,
        )
    }

    fn variables_used_here(&self, _vars: &mut VarSet) {}

    fn variables_set_here(&self) -> Vec<VariableRef> {
        Vec::new()
    }

    fn replace_variables(&mut self, _replacements: &VariableReplacements) {}

    fn serialize_fields(&self, obj: &mut JsonObject) {
        obj.insert("offset".to_string(), Value::from(self.offset));
        obj.insert("limit".to_string(), Value::from(self.limit));
        obj.insert("fullCount".to_string(), Value::Bool(self.full_count));
    }
}
