pub mod core;
pub mod execution_plan;

pub use self::core::nodes::*;
pub use self::core::{NodeIdGenerator, PlanContext, PlanNodeEnum};
pub use execution_plan::ExecutionPlan;
