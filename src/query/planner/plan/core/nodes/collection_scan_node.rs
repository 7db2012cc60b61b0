//! 集合全表扫描节点实现
//!
//! EnumerateCollectionNode 对每个输入行遍历整个集合，把文档写入输出变量

use crate::core::error::PlanResult;
use crate::core::types::json_utils::JsonObject;
use crate::core::{CostEstimate, VarSet, VariableRef, VariableReplacements};
use crate::define_plan_node;

use super::collection_binding::CollectionBinding;
use super::plan_node_kind::NodeKind;
use super::plan_node_traits::{NodeDecoder, PlanNode};
use super::NodeId;

define_plan_node! {
    pub struct EnumerateCollectionNode {
        out_variable: VariableRef,
        binding: CollectionBinding,
    }
    enum: EnumerateCollection
}

impl EnumerateCollectionNode {
    pub fn new(id: NodeId, binding: CollectionBinding, out_variable: VariableRef) -> Self {
        Self {
            id,
            out_variable,
            binding,
        }
    }

    pub fn out_variable(&self) -> &VariableRef {
        &self.out_variable
    }

    pub fn binding(&self) -> &CollectionBinding {
        &self.binding
    }

    pub fn from_json(id: NodeId, obj: &JsonObject, decoder: &mut NodeDecoder) -> PlanResult<Self> {
        let out_variable = decoder.variable(obj, "outVariable")?;
        Ok(Self::new(id, decoder.binding(obj)?, out_variable))
    }
}

impl PlanNode for EnumerateCollectionNode {
    fn id(&self) -> NodeId {
        self.id
    }

    fn kind(&self) -> NodeKind {
        NodeKind::EnumerateCollection
    }

    /// 每个输入行扫描一次整个集合；额外的常数惩罚使索引扫描更受青睐
    fn estimate_cost(&self, dependency: Option<&CostEstimate>) -> CostEstimate {
        let dep = dependency.copied().unwrap_or_default();
        let count = self.binding.collection().count();
        CostEstimate::new(
            dep.estimated_nr_items.saturating_mul(count),
            dep.estimated_cost + count as f64 + 1.0,
        )
    }

    fn variables_used_here(&self, _vars: &mut VarSet) {}

    fn variables_set_here(&self) -> Vec<VariableRef> {
        vec![self.out_variable.clone()]
    }

    fn replace_variables(&mut self, _replacements: &VariableReplacements) {}

    fn serialize_fields(&self, obj: &mut JsonObject) {
        self.binding.serialize_fields(obj);
        obj.insert("outVariable".to_string(), self.out_variable.to_json());
    }
}
