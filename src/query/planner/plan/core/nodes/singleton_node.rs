//! 单行节点实现
//!
//! SingletonNode 是每个执行计划的种子：没有依赖，只产生一行空行。
//! 可以携带绑定参数到计划变量的映射，在根部把命名绑定参数物化为变量

use std::collections::BTreeMap;

use serde_json::Value;

use crate::core::error::{PlanError, PlanResult};
use crate::core::types::json_utils::{get_optional, JsonObject};
use crate::core::{CostEstimate, VarSet, VariableRef, VariableReplacements};
use crate::define_plan_node;

use super::plan_node_kind::NodeKind;
use super::plan_node_traits::{NodeDecoder, PlanNode};
use super::NodeId;

define_plan_node! {
    pub struct SingletonNode {
        bind_parameter_out_vars: BTreeMap<String, VariableRef>,
    }
    enum: Singleton
}

impl SingletonNode {
    pub fn new(id: NodeId) -> Self {
        Self {
            id,
            bind_parameter_out_vars: BTreeMap::new(),
        }
    }

    pub fn with_bind_parameters(id: NodeId, vars: BTreeMap<String, VariableRef>) -> Self {
        Self {
            id,
            bind_parameter_out_vars: vars,
        }
    }

    pub fn bind_parameter_out_vars(&self) -> &BTreeMap<String, VariableRef> {
        &self.bind_parameter_out_vars
    }

    pub fn from_json(id: NodeId, obj: &JsonObject, decoder: &mut NodeDecoder) -> PlanResult<Self> {
        let mut vars = BTreeMap::new();
        if let Some(value) = get_optional(obj, "bindParameterVariables") {
            let map = value.as_object().ok_or_else(|| {
                PlanError::invalid_field("bindParameterVariables", "应为对象")
            })?;
            for (name, var) in map {
                vars.insert(name.clone(), decoder.variable_value(var)?);
            }
        }
        Ok(Self::with_bind_parameters(id, vars))
    }
}

impl PlanNode for SingletonNode {
    fn id(&self) -> NodeId {
        self.id
    }

    fn kind(&self) -> NodeKind {
        NodeKind::Singleton
    }

    fn estimate_cost(&self, _dependency: Option<&CostEstimate>) -> CostEstimate {
        CostEstimate::new(1, 1.0)
    }

    fn variables_used_here(&self, _vars: &mut VarSet) {}

    fn variables_set_here(&self) -> Vec<VariableRef> {
        self.bind_parameter_out_vars.values().cloned().collect()
    }

    /// 绑定参数变量都是输出变量，没有可替换的输入
    fn replace_variables(&mut self, _replacements: &VariableReplacements) {}

    fn serialize_fields(&self, obj: &mut JsonObject) {
        let vars: serde_json::Map<String, Value> = self
            .bind_parameter_out_vars
            .iter()
            .map(|(name, var)| (name.clone(), var.to_json()))
            .collect();
        obj.insert("bindParameterVariables".to_string(), Value::Object(vars));
    }
}
