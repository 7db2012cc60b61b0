//! 查询执行器
//!
//! 拉取式行引擎：每个计划节点对应一个执行块，每个计划变量对应一个寄存器

pub mod base;
pub mod data_access;
pub mod engine;
pub mod executor_enum;
pub mod factory;
pub mod result_processing;

pub use base::{
    ExecutionBlock, ExecutionContext, ExecutorStats, QueryStatistics, RegisterPlan, Row,
    RowContext,
};
pub use engine::{ExecutionEngine, QueryResult};
pub use executor_enum::ExecutionBlockEnum;
pub use factory::ExecutorFactory;
pub use result_processing::NearVectorMerge;
