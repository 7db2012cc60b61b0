//! 索引系统模块
//!
//! - 统一索引类型定义（主键、持久化、向量）
//! - 向量索引的构建期定义与查询期搜索参数
//! - 向量搜索接口及精确（暴力）实现
//! - 索引错误处理
//!
//! 近似近邻算法本身（训练、码本、分区搜索）不在本模块中实现

pub mod error;
pub mod flat_search;
pub mod types;
pub mod vector;

pub use error::*;
pub use flat_search::{FlatVectorSearcher, VectorMatch, VectorSearcher};
pub use types::*;
pub use vector::{SearchParameters, VectorIndexDefinition, VectorMetric};
