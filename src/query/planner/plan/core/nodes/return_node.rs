//! 返回节点实现
//!
//! ReturnNode 是计划的汇点，把输入变量的值作为查询结果输出

use crate::core::error::PlanResult;
use crate::core::types::json_utils::JsonObject;
use crate::core::types::variable::replace_variable;
use crate::core::{CostEstimate, VarSet, VariableRef, VariableReplacements};
use crate::define_plan_node;

use super::plan_node_kind::NodeKind;
use super::plan_node_traits::{NodeDecoder, PlanNode};
use super::NodeId;

define_plan_node! {
    pub struct ReturnNode {
        in_variable: VariableRef,
    }
    enum: Return
}

impl ReturnNode {
    pub fn new(id: NodeId, in_variable: VariableRef) -> Self {
        Self { id, in_variable }
    }

    pub fn in_variable(&self) -> &VariableRef {
        &self.in_variable
    }

    pub fn from_json(id: NodeId, obj: &JsonObject, decoder: &mut NodeDecoder) -> PlanResult<Self> {
        Ok(Self::new(id, decoder.variable(obj, "inVariable")?))
    }
}

impl PlanNode for ReturnNode {
    fn id(&self) -> NodeId {
        self.id
    }

    fn kind(&self) -> NodeKind {
        NodeKind::Return
    }

    fn estimate_cost(&self, dependency: Option<&CostEstimate>) -> CostEstimate {
        let dep = dependency.copied().unwrap_or_default();
        CostEstimate::new(
            dep.estimated_nr_items,
            dep.estimated_cost + dep.estimated_nr_items as f64,
        )
    }

    fn variables_used_here(&self, vars: &mut VarSet) {
        vars.insert(self.in_variable.id);
    }

    fn variables_set_here(&self) -> Vec<VariableRef> {
        Vec::new()
    }

    fn replace_variables(&mut self, replacements: &VariableReplacements) {
        replace_variable(&mut self.in_variable, replacements);
    }

    fn serialize_fields(&self, obj: &mut JsonObject) {
        obj.insert("inVariable".to_string(), self.in_variable.to_json());
    }
}
