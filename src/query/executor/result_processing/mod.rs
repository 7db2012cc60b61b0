//! 结果处理执行块
//!
//! 对输入行做计算、过滤、排序、限制并返回结果

pub mod calculation;
pub mod filter;
pub mod limit;
pub mod near_vector_merge;
pub mod return_block;
pub mod sort;

pub use calculation::CalculationBlock;
pub use filter::FilterBlock;
pub use limit::LimitBlock;
pub use near_vector_merge::NearVectorMerge;
pub use return_block::ReturnBlock;
pub use sort::{SortBlock, SortKey};
