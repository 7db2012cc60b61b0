//! 计划变量与变量注册表
//!
//! 变量由计划范围内的注册表拥有，节点只持有 `Arc` 引用；
//! 节点可以通过 `replace_variables` 替换所引用的变量，但不会修改变量本身

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::core::error::{PlanError, PlanResult};

pub type VariableId = u32;

/// 计划变量
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Variable {
    pub id: VariableId,
    pub name: String,
    #[serde(default)]
    pub is_full_document_from_collection: bool,
    #[serde(default)]
    pub is_data_from_collection: bool,
}

impl Variable {
    pub fn new(id: VariableId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            is_full_document_from_collection: false,
            is_data_from_collection: false,
        }
    }

    pub fn with_collection_flags(mut self, full_document: bool, data: bool) -> Self {
        self.is_full_document_from_collection = full_document;
        self.is_data_from_collection = data;
        self
    }

    /// 临时变量（由优化规则生成）名称以数字开头
    pub fn is_temporary(&self) -> bool {
        self.name.starts_with(|c: char| c.is_ascii_digit())
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "id": self.id,
            "name": self.name,
            "isFullDocumentFromCollection": self.is_full_document_from_collection,
            "isDataFromCollection": self.is_data_from_collection,
        })
    }
}

pub type VariableRef = Arc<Variable>;

/// 变量 id 集合，有序以保证输出稳定
pub type VarSet = BTreeSet<VariableId>;

/// 变量替换表：旧变量 id -> 新变量
pub type VariableReplacements = HashMap<VariableId, VariableRef>;

/// 按替换表替换单个变量引用，不在表中的引用保持原样
pub fn replace_variable(var: &mut VariableRef, replacements: &VariableReplacements) {
    if let Some(replacement) = replacements.get(&var.id) {
        *var = replacement.clone();
    }
}

/// 计划范围的变量注册表
#[derive(Debug, Default, Clone)]
pub struct VariableRegistry {
    variables: BTreeMap<VariableId, VariableRef>,
    next_id: VariableId,
}

impl VariableRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate(&mut self, variable: Variable) -> VariableRef {
        let var = Arc::new(variable);
        self.next_id = self.next_id.max(var.id + 1);
        self.variables.insert(var.id, var.clone());
        var
    }

    /// 创建用户可见的命名变量
    pub fn create_variable(&mut self, name: impl Into<String>) -> VariableRef {
        let id = self.next_id;
        self.allocate(Variable::new(id, name))
    }

    /// 创建持有集合文档的变量
    pub fn create_document_variable(&mut self, name: impl Into<String>) -> VariableRef {
        let id = self.next_id;
        self.allocate(Variable::new(id, name).with_collection_flags(true, true))
    }

    /// 创建临时变量，名称取自 id
    pub fn create_temporary_variable(&mut self) -> VariableRef {
        let id = self.next_id;
        self.allocate(Variable::new(id, id.to_string()))
    }

    pub fn get(&self, id: VariableId) -> Option<&VariableRef> {
        self.variables.get(&id)
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &VariableRef> {
        self.variables.values()
    }

    /// 注册一个已知 id 的变量
    ///
    /// 相同 id、相同内容时返回已有引用；id 冲突而内容不同时报错
    pub fn register(&mut self, variable: Variable) -> PlanResult<VariableRef> {
        if let Some(existing) = self.variables.get(&variable.id) {
            if **existing == variable {
                return Ok(existing.clone());
            }
            return Err(PlanError::invalid_field(
                "variable",
                format!(
                    "变量 id {} 已被 {} 使用，无法注册为 {}",
                    variable.id, existing.name, variable.name
                ),
            ));
        }
        Ok(self.allocate(variable))
    }

    /// 从序列化形式解析并注册变量
    pub fn from_json(&mut self, value: &serde_json::Value) -> PlanResult<VariableRef> {
        let variable: Variable = serde_json::from_value(value.clone())
            .map_err(|e| PlanError::invalid_field("variable", e.to_string()))?;
        self.register(variable)
    }
}
