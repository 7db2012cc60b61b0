//! 查询处理模块
//!
//! - `planner`: 执行计划表示、代价估算与优化规则
//! - `executor`: 把执行计划编译为可拉取的执行块并运行

pub mod executor;
pub mod planner;

pub use executor::{ExecutionEngine, QueryResult, QueryStatistics};
pub use planner::{ExecutionPlan, PlanContext};
