//! 向量索引规则
//!
//! - `UseVectorIndexRule`: 把「全表扫描 + 距离计算 + 排序 + LIMIT」改写为向量索引近邻扫描

pub mod use_vector_index;

pub use use_vector_index::UseVectorIndexRule;
