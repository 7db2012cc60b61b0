//! 重写规则枚举 - 静态分发实现
//!
//! 所有规则都作为枚举变体，通过 match 分发，无需 `Box<dyn RewriteRule>`。
//! `RuleRegistry` 按注册顺序保存启用的规则

use crate::config::OptimizerConfig;
use crate::query::planner::plan::core::nodes::NodeId;
use crate::query::planner::plan::ExecutionPlan;
use crate::query::planner::rewrite::context::RewriteContext;
use crate::query::planner::rewrite::pattern::Pattern;
use crate::query::planner::rewrite::result::RewriteResult;
use crate::query::planner::rewrite::rule::RewriteRule as RewriteRuleTrait;
use crate::query::planner::rewrite::vector_index;

macro_rules! define_rewrite_rules {
    (
        $(#[$enum_meta:meta])*
        pub enum $enum_name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant_name:ident($rule_type:ty)
            ),+ $(,)?
        }
    ) => {
        $(#[$enum_meta])*
        #[derive(Debug)]
        pub enum $enum_name {
            $(
                $(#[$variant_meta])*
                $variant_name($rule_type),
            )+
        }

        impl $enum_name {
            pub fn name(&self) -> &'static str {
                match self {
                    $(
                        $enum_name::$variant_name(rule) => RewriteRuleTrait::name(rule),
                    )+
                }
            }

            pub fn pattern(&self) -> Pattern {
                match self {
                    $(
                        $enum_name::$variant_name(rule) => rule.pattern(),
                    )+
                }
            }

            pub fn apply(
                &self,
                ctx: &mut RewriteContext<'_>,
                plan: &mut ExecutionPlan,
                node: NodeId,
            ) -> RewriteResult<bool> {
                match self {
                    $(
                        $enum_name::$variant_name(rule) => rule.apply(ctx, plan, node),
                    )+
                }
            }

            pub fn matches(&self, plan: &ExecutionPlan, node: NodeId) -> bool {
                self.pattern().matches(plan, node)
            }

            /// 所有已知规则的默认实例
            pub fn all() -> Vec<$enum_name> {
                vec![
                    $(
                        $enum_name::$variant_name(<$rule_type>::default()),
                    )+
                ]
            }
        }

        impl RewriteRuleTrait for $enum_name {
            fn name(&self) -> &'static str {
                self.name()
            }

            fn pattern(&self) -> Pattern {
                self.pattern()
            }

            fn apply(
                &self,
                ctx: &mut RewriteContext<'_>,
                plan: &mut ExecutionPlan,
                node: NodeId,
            ) -> RewriteResult<bool> {
                self.apply(ctx, plan, node)
            }
        }
    };
}

define_rewrite_rules! {
    pub enum RewriteRule {
        // ==================== 索引选择规则 ====================
        UseVectorIndex(vector_index::UseVectorIndexRule),
    }
}

#[derive(Debug)]
pub struct RuleRegistry {
    rules: Vec<RewriteRule>,
}

impl RuleRegistry {
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// 按配置创建注册表，跳过被禁用的规则
    pub fn from_config(config: &OptimizerConfig) -> Self {
        let mut registry = Self::new();
        for rule in RewriteRule::all() {
            if config.is_rule_enabled(rule.name()) {
                registry.add(rule);
            } else {
                log::debug!("规则 {} 已被配置禁用", rule.name());
            }
        }
        registry
    }

    pub fn add(&mut self, rule: RewriteRule) {
        self.rules.push(rule);
    }

    pub fn iter(&self) -> impl Iterator<Item = &RewriteRule> {
        self.rules.iter()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl Default for RuleRegistry {
    fn default() -> Self {
        Self::from_config(&OptimizerConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_registry_default() {
        let registry = RuleRegistry::default();
        assert_eq!(registry.len(), RewriteRule::all().len());
        for rule in registry.iter() {
            let name = rule.name();
            assert!(name.ends_with("Rule"));
        }
    }

    #[test]
    fn test_rule_registry_respects_disabled_rules() {
        let config = OptimizerConfig {
            disabled_rules: vec!["UseVectorIndexRule".to_string()],
            ..OptimizerConfig::default()
        };
        let registry = RuleRegistry::from_config(&config);
        assert!(registry.iter().all(|rule| rule.name() != "UseVectorIndexRule"));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_rule_pattern() {
        let rule = RewriteRule::UseVectorIndex(vector_index::UseVectorIndexRule::new());
        assert_eq!(rule.name(), "UseVectorIndexRule");
        assert_eq!(rule.pattern().node_name(), Some("EnumerateCollectionNode"));
    }
}
