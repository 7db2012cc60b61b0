//! 计划重写模块
//!
//! 该模块包含启发式优化规则，在执行之前单线程地应用到执行计划上。
//! 规则只通过执行计划的修改原语改变图结构。
//!
//! # 模块结构
//!
//! - `context`: 重写上下文（节点 ID 与变量分配）
//! - `pattern`: 模式匹配定义
//! - `result`: 重写错误定义
//! - `rule`: 重写规则 trait 定义
//! - `rule_enum`: 静态分发的规则枚举与注册表
//! - `plan_rewriter`: 计划重写器实现
//! - `expression_utils`: 表达式匹配器
//! - `vector_index`: 向量索引规则
//!
//! # 使用示例
//!
//! ```ignore
//! use docdb::config::OptimizerConfig;
//! use docdb::query::planner::rewrite::rewrite_plan;
//!
//! let changed = rewrite_plan(&mut plan, &mut plan_ctx, &OptimizerConfig::default())?;
//! ```

pub mod context;
pub mod expression_utils;
pub mod pattern;
pub mod plan_rewriter;
pub mod result;
pub mod rule;
pub mod rule_enum;

// 具体规则模块
pub mod vector_index;

pub use context::RewriteContext;
pub use pattern::Pattern;
pub use plan_rewriter::{create_default_rewriter, rewrite_plan, PlanRewriter};
pub use result::{RewriteError, RewriteResult};
pub use rule::RewriteRule;
pub use rule_enum::{RewriteRule as RewriteRuleEnum, RuleRegistry};
pub use vector_index::UseVectorIndexRule;
