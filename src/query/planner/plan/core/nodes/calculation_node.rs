//! 计算节点实现
//!
//! CalculationNode 对每一行求值一个表达式，结果写入输出变量

use crate::core::error::PlanResult;
use crate::core::types::json_utils::JsonObject;
use crate::core::{CostEstimate, Expression, VarSet, VariableRef, VariableReplacements};
use crate::define_plan_node;

use super::plan_node_kind::NodeKind;
use super::plan_node_traits::{NodeDecoder, PlanNode};
use super::NodeId;

define_plan_node! {
    pub struct CalculationNode {
        out_variable: VariableRef,
        expression: Expression,
    }
    enum: Calculation
}

impl CalculationNode {
    pub fn new(id: NodeId, out_variable: VariableRef, expression: Expression) -> Self {
        Self {
            id,
            out_variable,
            expression,
        }
    }

    pub fn out_variable(&self) -> &VariableRef {
        &self.out_variable
    }

    pub fn expression(&self) -> &Expression {
        &self.expression
    }

    pub fn from_json(id: NodeId, obj: &JsonObject, decoder: &mut NodeDecoder) -> PlanResult<Self> {
        let out_variable = decoder.variable(obj, "outVariable")?;
        let expression = decoder.expression(obj, "expression")?;
        Ok(Self::new(id, out_variable, expression))
    }
}

impl PlanNode for CalculationNode {
    fn id(&self) -> NodeId {
        self.id
    }

    fn kind(&self) -> NodeKind {
        NodeKind::Calculation
    }

    fn estimate_cost(&self, dependency: Option<&CostEstimate>) -> CostEstimate {
        let dep = dependency.copied().unwrap_or_default();
        CostEstimate::new(
            dep.estimated_nr_items,
            dep.estimated_cost + dep.estimated_nr_items as f64,
        )
    }

    fn variables_used_here(&self, vars: &mut VarSet) {
        self.expression.collect_variables(vars);
    }

    fn variables_set_here(&self) -> Vec<VariableRef> {
        vec![self.out_variable.clone()]
    }

    /// 只替换表达式中的输入变量，输出变量保持不变
    fn replace_variables(&mut self, replacements: &VariableReplacements) {
        self.expression.replace_variables(replacements);
    }

    fn serialize_fields(&self, obj: &mut JsonObject) {
        obj.insert("expression".to_string(), self.expression.to_json());
        obj.insert("outVariable".to_string(), self.out_variable.to_json());
    }

    fn is_async_prefetch_enabled(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::VariableRegistry;

    #[test]
    fn test_calculation_variables() {
        let mut registry = VariableRegistry::new();
        let doc = registry.create_document_variable("doc");
        let dist = registry.create_variable("dist");
        let node = CalculationNode::new(
            5,
            dist.clone(),
            Expression::function(
                "APPROX_NEAR_L2",
                vec![
                    Expression::attribute_path(&doc, &["vec"]),
                    Expression::parameter("qp"),
                ],
            ),
        );

        let mut used = VarSet::new();
        node.variables_used_here(&mut used);
        assert_eq!(used, VarSet::from([doc.id]));
        assert_eq!(node.variables_set_here(), vec![dist]);
        assert_eq!(
            node.estimate_cost(Some(&CostEstimate::new(10, 2.0))),
            CostEstimate::new(10, 12.0)
        );

        let mut obj = JsonObject::new();
        node.serialize_fields(&mut obj);
        assert_eq!(obj["expression"]["type"], "function call");
    }
}
