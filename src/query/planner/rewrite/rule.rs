//! 重写规则 trait 定义
//!
//! 规则通过模式匹配找到候选节点，然后只借助执行计划的修改原语改写计划。
//! 前置条件不满足时规则返回 `Ok(false)`，计划保持不变。

use crate::query::planner::plan::core::nodes::NodeId;
use crate::query::planner::plan::ExecutionPlan;
use crate::query::planner::rewrite::context::RewriteContext;
use crate::query::planner::rewrite::pattern::Pattern;
use crate::query::planner::rewrite::result::RewriteResult;

/// 重写规则 trait
///
/// # 示例
/// ```ignore
/// #[derive(Debug)]
/// struct MyRule;
///
/// impl RewriteRule for MyRule {
///     fn name(&self) -> &'static str { "MyRule" }
///
///     fn pattern(&self) -> Pattern {
///         Pattern::new_with_name("FilterNode")
///     }
///
///     fn apply(
///         &self,
///         ctx: &mut RewriteContext<'_>,
///         plan: &mut ExecutionPlan,
///         node: NodeId,
///     ) -> RewriteResult<bool> {
///         Ok(false)
///     }
/// }
/// ```
pub trait RewriteRule: std::fmt::Debug + Send + Sync {
    /// 规则名称
    fn name(&self) -> &'static str;

    /// 返回规则的模式
    fn pattern(&self) -> Pattern;

    /// 对匹配模式的节点应用规则
    ///
    /// # 返回
    /// - `Ok(true)`: 计划已被改写
    /// - `Ok(false)`: 前置条件不满足，计划未改变
    /// - `Err(e)`: 计划损坏或查询参数无效
    fn apply(
        &self,
        ctx: &mut RewriteContext<'_>,
        plan: &mut ExecutionPlan,
        node: NodeId,
    ) -> RewriteResult<bool>;

    /// 检查规则是否匹配
    fn matches(&self, plan: &ExecutionPlan, node: NodeId) -> bool {
        self.pattern().matches(plan, node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::planner::plan::core::nodes::{LimitNode, SingletonNode};
    use crate::query::planner::plan::PlanContext;

    /// 移除 LimitNode 的测试规则
    #[derive(Debug)]
    struct DropLimitRule;

    impl RewriteRule for DropLimitRule {
        fn name(&self) -> &'static str {
            "DropLimitRule"
        }

        fn pattern(&self) -> Pattern {
            Pattern::new_with_name("LimitNode")
        }

        fn apply(
            &self,
            _ctx: &mut RewriteContext<'_>,
            plan: &mut ExecutionPlan,
            node: NodeId,
        ) -> RewriteResult<bool> {
            plan.unlink_node(node)?;
            Ok(true)
        }
    }

    #[test]
    fn test_rule_matches_and_applies() {
        let mut plan_ctx = PlanContext::new();
        let mut plan = ExecutionPlan::new();
        let singleton = plan
            .register_node(SingletonNode::new(plan_ctx.next_node_id()))
            .expect("register");
        let limit = plan
            .register_node(LimitNode::new(plan_ctx.next_node_id(), 0, 1))
            .expect("register");
        plan.add_dependency(limit, singleton).expect("edge");
        plan.set_root(limit).expect("root");

        let rule = DropLimitRule;
        assert_eq!(rule.name(), "DropLimitRule");
        assert!(rule.matches(&plan, limit));
        assert!(!rule.matches(&plan, singleton));

        let mut ctx = RewriteContext::new(&mut plan_ctx);
        assert_eq!(rule.apply(&mut ctx, &mut plan, limit), Ok(true));
        assert_eq!(plan.root(), Some(singleton));
        assert!(rule.apply(&mut ctx, &mut plan, singleton).is_err());
    }
}
