//! 核心类型定义
//!
//! 变量、表达式、代价估算与值比较等执行计划各层共用的基础类型

pub mod cost;
pub mod expression;
pub mod json_utils;
pub mod operators;
pub mod value;
pub mod variable;

pub use cost::CostEstimate;
pub use expression::Expression;
pub use operators::BinaryOperator;
pub use value::Value;
pub use variable::{VarSet, Variable, VariableId, VariableRef, VariableRegistry, VariableReplacements};
