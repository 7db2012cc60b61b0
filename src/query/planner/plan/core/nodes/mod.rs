pub mod calculation_node;
pub mod collection_binding;
pub mod collection_scan_node;
pub mod filter_node;
pub mod macros;
pub mod materialize_node;
pub mod near_vector_node;
pub mod plan_node_enum;
pub mod plan_node_kind;
pub mod plan_node_traits;
pub mod return_node;
pub mod singleton_node;
pub mod sort_node;

/// 计划节点 ID，在计划内唯一，克隆时保持不变
pub type NodeId = u64;

pub use calculation_node::CalculationNode;
pub use collection_binding::CollectionBinding;
pub use collection_scan_node::EnumerateCollectionNode;
pub use filter_node::FilterNode;
pub use materialize_node::MaterializeNode;
pub use near_vector_node::{EnumerateNearVectorNode, NearVectorVariables};
pub use plan_node_enum::PlanNodeEnum;
pub use plan_node_kind::{InputArity, NodeKind};
pub use plan_node_traits::{NodeDecoder, PlanNode};
pub use return_node::ReturnNode;
pub use singleton_node::SingletonNode;
pub use sort_node::{LimitNode, OrderDirection, SortItem, SortNode, LIMIT_SKIP_COST};
