//! 统一错误处理系统 for DocDB
//!
//! ## 设计理念
//!
//! 1. **按需设计**：计划重建错误（`PlanError`）使用结构化枚举，保留节点、变量、
//!    索引等定位信息；执行期错误使用简单字符串描述
//!
//! 2. **分层转换**：子模块错误通过 `#[from]` 自动转换为 `DBError`
//!
//! 3. **统一接口**：`DBResult<T>` 提供统一的返回类型，简化错误传播

use thiserror::Error;

pub mod plan;

pub use plan::{PlanError, PlanResult};

pub use crate::index::IndexError;
pub use crate::query::planner::rewrite::result::RewriteError;

/// 统一的数据库错误类型
#[derive(Error, Debug)]
pub enum DBError {
    #[error("计划错误: {0}")]
    Plan(#[from] PlanError),

    #[error("重写错误: {0}")]
    Rewrite(#[from] RewriteError),

    #[error("索引错误: {0}")]
    Index(#[from] IndexError),

    #[error("存储错误: {0}")]
    Storage(String),

    #[error("表达式错误: {0}")]
    Expression(String),

    #[error("执行错误: {0}")]
    Execution(String),

    #[error("序列化错误: {0}")]
    Serialization(String),

    #[error("配置错误: {0}")]
    Config(String),
}

/// 统一的结果类型
pub type DBResult<T> = Result<T, DBError>;

impl DBError {
    pub fn expression(msg: impl Into<String>) -> Self {
        Self::Expression(msg.into())
    }

    pub fn execution(msg: impl Into<String>) -> Self {
        Self::Execution(msg.into())
    }

    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }
}

// ==================== 外部错误转换实现 ====================

impl From<serde_json::Error> for DBError {
    fn from(err: serde_json::Error) -> Self {
        DBError::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_error_conversion() {
        let err: DBError = PlanError::NodeNotFound(7).into();
        assert!(matches!(err, DBError::Plan(_)));
        assert!(err.to_string().contains('7'));
    }

    #[test]
    fn test_serde_error_conversion() {
        let parse_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: DBError = parse_err.into();
        assert!(matches!(err, DBError::Serialization(_)));
    }
}
