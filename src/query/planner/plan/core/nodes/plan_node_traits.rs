//! PlanNode 统一特征定义
//!
//! 定义所有计划节点需要实现的基础特征，以及从序列化形式重建节点时使用的解码器

use crate::core::error::{PlanError, PlanResult};
use crate::core::types::json_utils::{field, JsonObject};
use crate::core::{CostEstimate, Expression, VarSet, VariableRef, VariableRegistry, VariableReplacements};
use crate::storage::Catalog;

use super::collection_binding::CollectionBinding;
use super::plan_node_kind::NodeKind;
use super::NodeId;

/// PlanNode 基础特征
pub trait PlanNode {
    /// 获取节点的唯一ID
    fn id(&self) -> NodeId;

    /// 获取节点类型标签
    fn kind(&self) -> NodeKind;

    /// 获取节点类型的名称
    fn name(&self) -> &'static str {
        self.kind().type_string()
    }

    /// 根据依赖节点的估算计算本节点的代价
    ///
    /// 纯函数，不做 I/O；`dependency` 为空时按空输入处理
    fn estimate_cost(&self, dependency: Option<&CostEstimate>) -> CostEstimate;

    /// 本节点读取的变量
    fn variables_used_here(&self, vars: &mut VarSet);

    /// 本节点写入的变量
    fn variables_set_here(&self) -> Vec<VariableRef>;

    /// 替换节点持有的变量引用，不在替换表中的引用保持不变
    fn replace_variables(&mut self, replacements: &VariableReplacements);

    /// 写入节点特有的序列化字段
    fn serialize_fields(&self, obj: &mut JsonObject);

    /// 节点自身占用的内存
    fn memory_used_bytes(&self) -> usize
    where
        Self: Sized,
    {
        std::mem::size_of::<Self>()
    }

    /// 是否允许执行期异步预取上游数据
    fn is_async_prefetch_enabled(&self) -> bool {
        false
    }
}

/// 节点解码器
///
/// 从序列化计划重建节点时解析变量、表达式与集合绑定
pub struct NodeDecoder<'a> {
    variables: &'a mut VariableRegistry,
    catalog: &'a dyn Catalog,
}

impl<'a> NodeDecoder<'a> {
    pub fn new(variables: &'a mut VariableRegistry, catalog: &'a dyn Catalog) -> Self {
        Self { variables, catalog }
    }

    pub fn variable(&mut self, obj: &JsonObject, name: &str) -> PlanResult<VariableRef> {
        let value = field(obj, name)?;
        self.variables
            .from_json(value)
            .map_err(|e| PlanError::invalid_field(name, e.to_string()))
    }

    pub fn variable_value(&mut self, value: &serde_json::Value) -> PlanResult<VariableRef> {
        self.variables.from_json(value)
    }

    pub fn expression(&mut self, obj: &JsonObject, name: &str) -> PlanResult<Expression> {
        Expression::from_json(field(obj, name)?, self.variables)
    }

    pub fn binding(&self, obj: &JsonObject) -> PlanResult<CollectionBinding> {
        CollectionBinding::from_json(obj, self.catalog)
    }
}
