//! 计划重写器实现
//!
//! 按注册顺序把规则应用到计划的每个节点，重复多轮直到计划不再变化，
//! 轮数受 `OptimizerConfig::max_passes` 限制

use log::{debug, info};

use crate::config::OptimizerConfig;
use crate::query::planner::plan::{ExecutionPlan, PlanContext};
use crate::query::planner::rewrite::context::RewriteContext;
use crate::query::planner::rewrite::result::RewriteResult;
use crate::query::planner::rewrite::rule_enum::{RewriteRule, RuleRegistry};

/// 计划重写器
#[derive(Debug)]
pub struct PlanRewriter {
    registry: RuleRegistry,
    max_passes: usize,
}

impl PlanRewriter {
    /// 创建不含规则的重写器
    pub fn new() -> Self {
        Self {
            registry: RuleRegistry::new(),
            max_passes: OptimizerConfig::default().max_passes,
        }
    }

    pub fn with_registry(registry: RuleRegistry, max_passes: usize) -> Self {
        Self {
            registry,
            max_passes: max_passes.max(1),
        }
    }

    /// 添加重写规则
    pub fn add_rule(&mut self, rule: RewriteRule) {
        self.registry.add(rule);
    }

    pub fn rule_count(&self) -> usize {
        self.registry.len()
    }

    pub fn max_passes(&self) -> usize {
        self.max_passes
    }

    /// 应用所有重写规则，返回计划是否被修改
    pub fn rewrite(&self, plan: &mut ExecutionPlan, plan_ctx: &mut PlanContext) -> RewriteResult<bool> {
        let mut ctx = RewriteContext::new(plan_ctx);
        let mut changed = false;

        for pass in 0..self.max_passes {
            let mut pass_changed = false;
            for rule in self.registry.iter() {
                // 规则可能删除或替换节点，按本轮开始时的快照遍历
                let candidates = plan.topological_order()?;
                for id in candidates {
                    if !plan.contains(id) || !rule.matches(plan, id) {
                        continue;
                    }
                    if rule.apply(&mut ctx, plan, id)? {
                        ctx.record_application(rule.name());
                        pass_changed = true;
                    }
                }
            }
            if !pass_changed {
                debug!("重写在第 {} 轮达到不动点", pass + 1);
                break;
            }
            changed = true;
        }

        for (rule, count) in ctx.applications() {
            info!("规则 {} 应用了 {} 次", rule, count);
        }
        Ok(changed)
    }
}

impl Default for PlanRewriter {
    fn default() -> Self {
        Self::new()
    }
}

/// 创建默认的计划重写器
///
/// 包含所有未被配置禁用的规则
pub fn create_default_rewriter(config: &OptimizerConfig) -> PlanRewriter {
    PlanRewriter::with_registry(RuleRegistry::from_config(config), config.max_passes)
}

/// 使用默认规则集重写计划
pub fn rewrite_plan(
    plan: &mut ExecutionPlan,
    plan_ctx: &mut PlanContext,
    config: &OptimizerConfig,
) -> RewriteResult<bool> {
    create_default_rewriter(config).rewrite(plan, plan_ctx)
}
