//! 执行计划错误类型
//!
//! 涵盖计划构建、图结构修改以及从序列化形式重建计划时的错误。
//! 这些错误说明序列化计划已损坏或过期，对查询是致命的，不做重试。

use thiserror::Error;

/// 执行计划错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlanError {
    #[error("节点不存在: {0}")]
    NodeNotFound(u64),

    #[error("节点ID重复: {0}")]
    DuplicateNode(u64),

    #[error("无效的计划结构: {0}")]
    InvalidStructure(String),

    #[error("缺少字段: {0}")]
    MissingField(String),

    #[error("字段 {field} 无效: {reason}")]
    InvalidField { field: String, reason: String },

    #[error("未知的节点类型: {0}")]
    UnknownNodeType(String),

    #[error("集合不存在: {0}")]
    CollectionNotFound(String),

    #[error("集合 {collection} 上不存在索引 {index}")]
    IndexNotFound { collection: String, index: String },

    #[error("索引 {index} 不属于集合 {collection}")]
    IndexCollectionMismatch { collection: String, index: String },

    #[error("无效的搜索参数: {0}")]
    InvalidSearchParameters(String),

    #[error("无效的索引定义: {0}")]
    InvalidIndexDefinition(String),
}

impl PlanError {
    pub fn invalid_structure(msg: impl Into<String>) -> Self {
        Self::InvalidStructure(msg.into())
    }

    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingField(field.into())
    }

    pub fn invalid_field(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// 计划结果类型
pub type PlanResult<T> = Result<T, PlanError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_error_display() {
        let err = PlanError::IndexNotFound {
            collection: "docs".to_string(),
            index: "42".to_string(),
        };
        assert_eq!(err.to_string(), "集合 docs 上不存在索引 42");

        let err = PlanError::invalid_field("limit", "必须是非负整数");
        assert_eq!(err.to_string(), "字段 limit 无效: 必须是非负整数");
    }
}
