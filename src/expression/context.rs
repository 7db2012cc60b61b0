//! 表达式求值上下文

use std::collections::HashMap;

use serde_json::Value;

use crate::core::types::variable::VariableId;

/// 求值时访问变量与绑定参数的接口
pub trait ExpressionContext {
    fn variable(&self, id: VariableId) -> Option<&Value>;

    fn bind_parameter(&self, name: &str) -> Option<&Value>;
}

/// 基于哈希表的上下文，用于常量求值与测试
#[derive(Debug, Default, Clone)]
pub struct DefaultExpressionContext {
    variables: HashMap<VariableId, Value>,
    parameters: HashMap<String, Value>,
}

impl DefaultExpressionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_variable(mut self, id: VariableId, value: Value) -> Self {
        self.variables.insert(id, value);
        self
    }

    pub fn with_parameter(mut self, name: impl Into<String>, value: Value) -> Self {
        self.parameters.insert(name.into(), value);
        self
    }

    pub fn set_variable(&mut self, id: VariableId, value: Value) {
        self.variables.insert(id, value);
    }
}

impl ExpressionContext for DefaultExpressionContext {
    fn variable(&self, id: VariableId) -> Option<&Value> {
        self.variables.get(&id)
    }

    fn bind_parameter(&self, name: &str) -> Option<&Value> {
        self.parameters.get(name)
    }
}
