//! 重写结果定义
//!
//! 模式不匹配不是错误：规则返回 `Ok(false)` 并保持计划不变。
//! 只有计划本身损坏、或查询中的搜索参数无法解析时才返回错误

use crate::core::error::PlanError;

/// 重写错误类型
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RewriteError {
    #[error("计划错误: {0}")]
    Plan(#[from] PlanError),

    #[error("无效的计划节点: {0}")]
    InvalidNode(String),

    #[error("重写失败: {0}")]
    RewriteFailed(String),

    #[error("无效的计划结构: {0}")]
    InvalidPlanStructure(String),
}

impl RewriteError {
    pub fn invalid_node(msg: impl Into<String>) -> Self {
        Self::InvalidNode(msg.into())
    }

    pub fn rewrite_failed(msg: impl Into<String>) -> Self {
        Self::RewriteFailed(msg.into())
    }

    pub fn invalid_plan_structure(msg: impl Into<String>) -> Self {
        Self::InvalidPlanStructure(msg.into())
    }
}

/// 重写结果类型
pub type RewriteResult<T> = std::result::Result<T, RewriteError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rewrite_error() {
        let err = RewriteError::invalid_node("test node");
        assert!(err.to_string().contains("test node"));

        let err: RewriteError = PlanError::NodeNotFound(42).into();
        assert!(err.to_string().contains("42"));
        assert!(matches!(err, RewriteError::Plan(PlanError::NodeNotFound(42))));
    }
}
