//! 文档物化节点实现
//!
//! MaterializeNode 根据输入变量中的文档主键，从集合中读取完整文档写入输出变量。
//! 与只返回主键与距离的近邻扫描配合使用

use crate::core::error::PlanResult;
use crate::core::types::json_utils::JsonObject;
use crate::core::types::variable::replace_variable;
use crate::core::{CostEstimate, VarSet, VariableRef, VariableReplacements};
use crate::define_plan_node;

use super::collection_binding::CollectionBinding;
use super::plan_node_kind::NodeKind;
use super::plan_node_traits::{NodeDecoder, PlanNode};
use super::NodeId;

define_plan_node! {
    pub struct MaterializeNode {
        in_doc_id: VariableRef,
        out_variable: VariableRef,
        binding: CollectionBinding,
    }
    enum: Materialize
}

impl MaterializeNode {
    pub fn new(
        id: NodeId,
        binding: CollectionBinding,
        in_doc_id: VariableRef,
        out_variable: VariableRef,
    ) -> Self {
        Self {
            id,
            in_doc_id,
            out_variable,
            binding,
        }
    }

    pub fn in_doc_id(&self) -> &VariableRef {
        &self.in_doc_id
    }

    pub fn out_variable(&self) -> &VariableRef {
        &self.out_variable
    }

    pub fn binding(&self) -> &CollectionBinding {
        &self.binding
    }

    pub fn from_json(id: NodeId, obj: &JsonObject, decoder: &mut NodeDecoder) -> PlanResult<Self> {
        let in_doc_id = decoder.variable(obj, "inNmDocId")?;
        let out_variable = decoder.variable(obj, "outVariable")?;
        Ok(Self::new(id, decoder.binding(obj)?, in_doc_id, out_variable))
    }
}

impl PlanNode for MaterializeNode {
    fn id(&self) -> NodeId {
        self.id
    }

    fn kind(&self) -> NodeKind {
        NodeKind::Materialize
    }

    /// 物化依赖节点输出的全部行
    fn estimate_cost(&self, dependency: Option<&CostEstimate>) -> CostEstimate {
        let dep = dependency.copied().unwrap_or_default();
        CostEstimate::new(
            dep.estimated_nr_items,
            dep.estimated_cost + dep.estimated_nr_items as f64,
        )
    }

    fn variables_used_here(&self, vars: &mut VarSet) {
        vars.insert(self.in_doc_id.id);
    }

    fn variables_set_here(&self) -> Vec<VariableRef> {
        vec![self.out_variable.clone()]
    }

    fn replace_variables(&mut self, replacements: &VariableReplacements) {
        replace_variable(&mut self.in_doc_id, replacements);
    }

    fn serialize_fields(&self, obj: &mut JsonObject) {
        self.binding.serialize_fields(obj);
        obj.insert("inNmDocId".to_string(), self.in_doc_id.to_json());
        obj.insert("outVariable".to_string(), self.out_variable.to_json());
    }
}
