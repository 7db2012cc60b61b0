//! 重写上下文定义
//!
//! 规则通过上下文分配节点 ID 和创建变量，不访问任何全局状态，
//! 因此规则的效果完全由计划和上下文决定。

use std::collections::BTreeMap;

use crate::core::VariableRef;
use crate::query::planner::plan::core::nodes::NodeId;
use crate::query::planner::plan::PlanContext;

/// 重写上下文
#[derive(Debug)]
pub struct RewriteContext<'a> {
    plan_context: &'a mut PlanContext,
    /// 规则名称 -> 成功应用次数
    applications: BTreeMap<&'static str, usize>,
}

impl<'a> RewriteContext<'a> {
    /// 创建新的重写上下文
    pub fn new(plan_context: &'a mut PlanContext) -> Self {
        Self {
            plan_context,
            applications: BTreeMap::new(),
        }
    }

    /// 分配新的节点ID
    pub fn next_node_id(&mut self) -> NodeId {
        self.plan_context.next_node_id()
    }

    /// 创建规则内部使用的临时变量
    pub fn create_temporary_variable(&mut self) -> VariableRef {
        self.plan_context.create_temporary_variable()
    }

    pub fn plan_context(&self) -> &PlanContext {
        &*self.plan_context
    }

    pub fn plan_context_mut(&mut self) -> &mut PlanContext {
        &mut *self.plan_context
    }

    /// 记录一次成功的规则应用
    pub fn record_application(&mut self, rule: &'static str) {
        *self.applications.entry(rule).or_insert(0) += 1;
    }

    /// 各规则的应用次数
    pub fn applications(&self) -> &BTreeMap<&'static str, usize> {
        &self.applications
    }

    pub fn total_applications(&self) -> usize {
        self.applications.values().sum()
    }
}
