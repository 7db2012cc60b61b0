//! 执行计划与计划重写
//!
//! - `plan`: 执行计划节点与基于 arena 的执行计划
//! - `rewrite`: 启发式重写规则及其驱动

pub mod plan;
pub mod rewrite;

pub use plan::execution_plan::ExecutionPlan;
pub use plan::PlanContext;
pub use rewrite::{create_default_rewriter, rewrite_plan, PlanRewriter};
