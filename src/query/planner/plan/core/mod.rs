pub mod node_id_generator;
pub mod nodes;
pub mod plan_context;

pub use node_id_generator::NodeIdGenerator;
pub use nodes::plan_node_enum::PlanNodeEnum;
pub use nodes::plan_node_traits::PlanNode;
pub use nodes::*;
pub use plan_context::PlanContext;
