//! 执行器基础类型统一模块
//!
//! 模块结构：
//! - executor_stats.rs    - 执行块统计信息
//! - query_statistics.rs  - 查询级统计信息
//! - execution_context.rs - 执行上下文与寄存器分配
//! - execution_block.rs   - 执行块 trait

pub mod execution_block;
pub mod execution_context;
pub mod executor_stats;
pub mod query_statistics;

pub use execution_block::ExecutionBlock;
pub use execution_context::{ExecutionContext, RegisterPlan, Row, RowContext};
pub use executor_stats::ExecutorStats;
pub use query_statistics::QueryStatistics;
