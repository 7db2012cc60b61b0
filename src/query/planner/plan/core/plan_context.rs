//! 计划上下文
//!
//! 显式持有节点 ID 生成器与变量注册表，传入计划构建、反序列化与优化规则

use crate::core::{VariableRef, VariableRegistry};

use super::node_id_generator::NodeIdGenerator;
use super::nodes::NodeId;

#[derive(Debug, Default, Clone)]
pub struct PlanContext {
    id_generator: NodeIdGenerator,
    variables: VariableRegistry,
}

impl PlanContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_node_id(&mut self) -> NodeId {
        self.id_generator.next_id()
    }

    pub fn observe_node_id(&mut self, id: NodeId) {
        self.id_generator.observe(id);
    }

    pub fn create_variable(&mut self, name: impl Into<String>) -> VariableRef {
        self.variables.create_variable(name)
    }

    pub fn create_document_variable(&mut self, name: impl Into<String>) -> VariableRef {
        self.variables.create_document_variable(name)
    }

    pub fn create_temporary_variable(&mut self) -> VariableRef {
        self.variables.create_temporary_variable()
    }

    pub fn variables(&self) -> &VariableRegistry {
        &self.variables
    }

    pub fn variables_mut(&mut self) -> &mut VariableRegistry {
        &mut self.variables
    }
}
