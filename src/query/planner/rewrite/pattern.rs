//! 模式匹配定义
//!
//! 提供计划节点的模式匹配功能，用于重写规则识别特定计划结构。
//! 节点以类型名称（如 "EnumerateCollectionNode"）匹配。

use crate::query::planner::plan::core::nodes::{NodeId, NodeKind};
use crate::query::planner::plan::ExecutionPlan;

/// 模式结构体
///
/// 按节点类型名称匹配，名称为空时匹配任何节点。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pattern {
    node: Option<&'static str>,
}

impl Pattern {
    /// 创建空模式（匹配任何节点）
    pub fn new() -> Self {
        Self::default()
    }

    /// 使用节点名称创建模式
    pub fn new_with_name(name: &'static str) -> Self {
        Self { node: Some(name) }
    }

    /// 使用节点类型创建模式
    pub fn with_kind(kind: NodeKind) -> Self {
        Self::new_with_name(kind.type_string())
    }

    /// 模式要求的节点类型名称
    pub fn node_name(&self) -> Option<&'static str> {
        self.node
    }

    /// 检查模式是否匹配计划中的节点
    pub fn matches(&self, plan: &ExecutionPlan, id: NodeId) -> bool {
        let Some(node) = plan.node(id) else {
            return false;
        };
        self.node.map_or(true, |name| name == node.name())
    }
}
