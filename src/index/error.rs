//! 索引错误类型
//!
//! 涵盖向量索引定义校验与查询过程中的错误

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum IndexError {
    #[error("向量维度不匹配: 索引为 {expected}，查询为 {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
    #[error("无效的查询向量: {0}")]
    InvalidQueryVector(String),
    #[error("无效的索引定义: {0}")]
    InvalidDefinition(String),
    #[error("索引不支持该操作: {0}")]
    Unsupported(String),
    #[error("索引查询错误: {0}")]
    IndexQueryError(String),
}

impl From<String> for IndexError {
    fn from(msg: String) -> Self {
        IndexError::IndexQueryError(msg)
    }
}

impl From<&str> for IndexError {
    fn from(msg: &str) -> Self {
        IndexError::IndexQueryError(msg.to_string())
    }
}

pub type IndexResult<T> = Result<T, IndexError>;
