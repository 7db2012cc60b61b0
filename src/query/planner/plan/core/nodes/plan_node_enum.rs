//! PlanNode 枚举定义
//!
//! 封闭的节点集合，避免动态分发；通用契约通过 `dispatch!` 转发到具体节点

use serde_json::{Map, Value};

use crate::core::error::{PlanError, PlanResult};
use crate::core::types::json_utils::{as_object, get_array, get_str, get_u64, JsonObject};
use crate::core::{CostEstimate, VarSet, VariableRef, VariableReplacements};

use super::plan_node_kind::NodeKind;
use super::plan_node_traits::{NodeDecoder, PlanNode};
use super::NodeId;

pub use super::calculation_node::CalculationNode;
pub use super::collection_scan_node::EnumerateCollectionNode;
pub use super::filter_node::FilterNode;
pub use super::materialize_node::MaterializeNode;
pub use super::near_vector_node::EnumerateNearVectorNode;
pub use super::return_node::ReturnNode;
pub use super::singleton_node::SingletonNode;
pub use super::sort_node::{LimitNode, SortNode};

/// PlanNode 枚举，包含所有可能的节点类型
#[derive(Debug, Clone, PartialEq)]
pub enum PlanNodeEnum {
    Singleton(SingletonNode),
    EnumerateCollection(EnumerateCollectionNode),
    Calculation(CalculationNode),
    Filter(FilterNode),
    Sort(SortNode),
    Limit(LimitNode),
    Return(ReturnNode),
    EnumerateNearVectors(EnumerateNearVectorNode),
    Materialize(MaterializeNode),
}

macro_rules! dispatch {
    ($self:expr, $node:ident => $body:expr) => {
        match $self {
            PlanNodeEnum::Singleton($node) => $body,
            PlanNodeEnum::EnumerateCollection($node) => $body,
            PlanNodeEnum::Calculation($node) => $body,
            PlanNodeEnum::Filter($node) => $body,
            PlanNodeEnum::Sort($node) => $body,
            PlanNodeEnum::Limit($node) => $body,
            PlanNodeEnum::Return($node) => $body,
            PlanNodeEnum::EnumerateNearVectors($node) => $body,
            PlanNodeEnum::Materialize($node) => $body,
        }
    };
}

impl PlanNodeEnum {
    pub fn id(&self) -> NodeId {
        dispatch!(self, node => node.id())
    }

    pub fn kind(&self) -> NodeKind {
        dispatch!(self, node => PlanNode::kind(node))
    }

    pub fn name(&self) -> &'static str {
        self.kind().type_string()
    }

    pub fn estimate_cost(&self, dependency: Option<&CostEstimate>) -> CostEstimate {
        dispatch!(self, node => node.estimate_cost(dependency))
    }

    pub fn variables_used_here(&self, vars: &mut VarSet) {
        dispatch!(self, node => node.variables_used_here(vars))
    }

    pub fn variables_set_here(&self) -> Vec<VariableRef> {
        dispatch!(self, node => node.variables_set_here())
    }

    pub fn replace_variables(&mut self, replacements: &VariableReplacements) {
        dispatch!(self, node => node.replace_variables(replacements))
    }

    pub fn memory_used_bytes(&self) -> usize {
        dispatch!(self, node => node.memory_used_bytes())
    }

    pub fn is_async_prefetch_enabled(&self) -> bool {
        dispatch!(self, node => node.is_async_prefetch_enabled())
    }

    /// 是否写入给定变量
    pub fn sets_variable(&self, var_id: crate::core::VariableId) -> bool {
        self.variables_set_here().iter().any(|var| var.id == var_id)
    }

    // ==================== 类型访问 ====================

    pub fn is_singleton(&self) -> bool {
        matches!(self, PlanNodeEnum::Singleton(_))
    }

    pub fn as_enumerate_collection(&self) -> Option<&EnumerateCollectionNode> {
        match self {
            PlanNodeEnum::EnumerateCollection(node) => Some(node),
            _ => None,
        }
    }

    pub fn as_calculation(&self) -> Option<&CalculationNode> {
        match self {
            PlanNodeEnum::Calculation(node) => Some(node),
            _ => None,
        }
    }

    pub fn as_sort(&self) -> Option<&SortNode> {
        match self {
            PlanNodeEnum::Sort(node) => Some(node),
            _ => None,
        }
    }

    pub fn as_limit(&self) -> Option<&LimitNode> {
        match self {
            PlanNodeEnum::Limit(node) => Some(node),
            _ => None,
        }
    }

    pub fn as_near_vector(&self) -> Option<&EnumerateNearVectorNode> {
        match self {
            PlanNodeEnum::EnumerateNearVectors(node) => Some(node),
            _ => None,
        }
    }

    // ==================== 序列化 ====================

    /// 序列化为扁平对象：通用字段加节点特有字段
    pub fn to_json(&self, dependencies: &[NodeId], estimate: &CostEstimate) -> Value {
        let mut obj = Map::new();
        obj.insert("type".to_string(), Value::from(self.name()));
        obj.insert(
            "dependencies".to_string(),
            Value::Array(dependencies.iter().map(|&d| Value::from(d)).collect()),
        );
        obj.insert("id".to_string(), Value::from(self.id()));
        obj.insert(
            "estimatedCost".to_string(),
            Value::from(estimate.estimated_cost),
        );
        obj.insert(
            "estimatedNrItems".to_string(),
            Value::from(estimate.estimated_nr_items),
        );
        dispatch!(self, node => node.serialize_fields(&mut obj));
        Value::Object(obj)
    }

    /// 从序列化形式重建节点，返回节点与其依赖列表
    pub fn from_json(
        value: &Value,
        decoder: &mut NodeDecoder,
    ) -> PlanResult<(PlanNodeEnum, Vec<NodeId>)> {
        let obj: &JsonObject = as_object(value, "node")?;
        let type_name = get_str(obj, "type")?;
        let kind = NodeKind::from_type_string(type_name)
            .ok_or_else(|| PlanError::UnknownNodeType(type_name.to_string()))?;
        let id = get_u64(obj, "id")?;
        let dependencies = get_array(obj, "dependencies")?
            .iter()
            .map(|d| {
                d.as_u64()
                    .ok_or_else(|| PlanError::invalid_field("dependencies", "应为节点 id 数组"))
            })
            .collect::<PlanResult<Vec<_>>>()?;

        let node = match kind {
            NodeKind::Singleton => SingletonNode::from_json(id, obj, decoder)?.into(),
            NodeKind::EnumerateCollection => {
                EnumerateCollectionNode::from_json(id, obj, decoder)?.into()
            }
            NodeKind::Calculation => CalculationNode::from_json(id, obj, decoder)?.into(),
            NodeKind::Filter => FilterNode::from_json(id, obj, decoder)?.into(),
            NodeKind::Sort => SortNode::from_json(id, obj, decoder)?.into(),
            NodeKind::Limit => LimitNode::from_json(id, obj, decoder)?.into(),
            NodeKind::Return => ReturnNode::from_json(id, obj, decoder)?.into(),
            NodeKind::EnumerateNearVectors => {
                EnumerateNearVectorNode::from_json(id, obj, decoder)?.into()
            }
            NodeKind::Materialize => MaterializeNode::from_json(id, obj, decoder)?.into(),
        };
        Ok((node, dependencies))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::VariableRegistry;
    use crate::storage::InMemoryCatalog;
    use serde_json::json;

    #[test]
    fn test_common_fields() {
        let node: PlanNodeEnum = LimitNode::new(7, 2, 5).into();
        let json = node.to_json(&[6], &CostEstimate::new(5, 12.5));
        assert_eq!(json["type"], "LimitNode");
        assert_eq!(json["id"], 7);
        assert_eq!(json["dependencies"], json!([6]));
        assert_eq!(json["estimatedCost"], 12.5);
        assert_eq!(json["estimatedNrItems"], 5);
        assert_eq!(json["limit"], 5);
    }

    #[test]
    fn test_unknown_node_type() {
        let mut registry = VariableRegistry::new();
        let catalog = InMemoryCatalog::new();
        let mut decoder = NodeDecoder::new(&mut registry, &catalog);
        let err = PlanNodeEnum::from_json(
            &json!({"type": "IndexNode", "id": 1, "dependencies": []}),
            &mut decoder,
        );
        assert_eq!(err, Err(PlanError::UnknownNodeType("IndexNode".to_string())));
    }

    #[test]
    fn test_node_round_trip() {
        let mut registry = VariableRegistry::new();
        let cond = registry.create_variable("cond");
        let nodes: Vec<PlanNodeEnum> = vec![
            SingletonNode::new(1).into(),
            FilterNode::new(2, cond).into(),
            LimitNode::new(3, 1, 4).into(),
        ];
        let catalog = InMemoryCatalog::new();
        for node in nodes {
            let estimate = CostEstimate::new(3, 4.0);
            let json = node.to_json(&[9], &estimate);
            let mut decoder = NodeDecoder::new(&mut registry, &catalog);
            let (restored, deps) = PlanNodeEnum::from_json(&json, &mut decoder).expect("decode");
            assert_eq!(restored, node);
            assert_eq!(deps, vec![9]);
            assert_eq!(restored.to_json(&deps, &estimate), json);
        }
    }
}
