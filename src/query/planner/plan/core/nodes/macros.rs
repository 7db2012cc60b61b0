//! 计划节点宏定义
//!
//! 提供宏来简化计划节点的定义，减少样板代码

/// 定义计划节点的宏
///
/// 生成带 `id` 字段的节点结构体、基础访问方法以及到 `PlanNodeEnum` 的转换
///
/// # 示例
/// ```ignore
/// define_plan_node! {
///     pub struct FilterNode {
///         in_variable: VariableRef,
///     }
///     enum: Filter
/// }
/// ```
#[macro_export]
macro_rules! define_plan_node {
    (
        $(#[$meta:meta])*
        pub struct $name:ident {
            $($field:ident: $type:ty),* $(,)?
        }
        enum: $variant:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq)]
        pub struct $name {
            id: $crate::query::planner::plan::core::nodes::NodeId,
            $($field: $type,)*
        }

        impl $name {
            pub fn id(&self) -> $crate::query::planner::plan::core::nodes::NodeId {
                self.id
            }

            pub fn type_name(&self) -> &'static str {
                $crate::query::planner::plan::core::nodes::NodeKind::$variant.type_string()
            }

            pub fn into_enum(
                self,
            ) -> $crate::query::planner::plan::core::nodes::plan_node_enum::PlanNodeEnum {
                $crate::query::planner::plan::core::nodes::plan_node_enum::PlanNodeEnum::$variant(
                    self,
                )
            }
        }

        impl From<$name> for $crate::query::planner::plan::core::nodes::plan_node_enum::PlanNodeEnum {
            fn from(node: $name) -> Self {
                $crate::query::planner::plan::core::nodes::plan_node_enum::PlanNodeEnum::$variant(
                    node,
                )
            }
        }
    };
}
