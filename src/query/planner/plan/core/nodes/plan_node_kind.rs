//! 计划节点类型标签
//!
//! 封闭的节点类型枚举，每种具体节点对应唯一的标签与序列化类型名

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum NodeKind {
    Singleton,
    EnumerateCollection,
    Calculation,
    Filter,
    Sort,
    Limit,
    Return,
    EnumerateNearVectors,
    Materialize,
}

/// 节点允许的依赖数量
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputArity {
    /// 无依赖（计划的种子节点）
    ZeroInput,
    /// 恰好一个依赖
    SingleInput,
}

impl InputArity {
    pub fn accepts(&self, dependency_count: usize) -> bool {
        match self {
            InputArity::ZeroInput => dependency_count == 0,
            InputArity::SingleInput => dependency_count == 1,
        }
    }
}

impl NodeKind {
    pub const ALL: [NodeKind; 9] = [
        NodeKind::Singleton,
        NodeKind::EnumerateCollection,
        NodeKind::Calculation,
        NodeKind::Filter,
        NodeKind::Sort,
        NodeKind::Limit,
        NodeKind::Return,
        NodeKind::EnumerateNearVectors,
        NodeKind::Materialize,
    ];

    /// 序列化使用的类型名
    pub fn type_string(&self) -> &'static str {
        match self {
            NodeKind::Singleton => "SingletonNode",
            NodeKind::EnumerateCollection => "EnumerateCollectionNode",
            NodeKind::Calculation => "CalculationNode",
            NodeKind::Filter => "FilterNode",
            NodeKind::Sort => "SortNode",
            NodeKind::Limit => "LimitNode",
            NodeKind::Return => "ReturnNode",
            NodeKind::EnumerateNearVectors => "EnumerateNearVectorNode",
            NodeKind::Materialize => "MaterializeNode",
        }
    }

    pub fn from_type_string(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|kind| kind.type_string() == s)
    }

    pub fn input_arity(&self) -> InputArity {
        match self {
            NodeKind::Singleton => InputArity::ZeroInput,
            _ => InputArity::SingleInput,
        }
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.type_string())
    }
}
