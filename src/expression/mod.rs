//! 表达式求值
//!
//! 计算节点与过滤节点在执行期通过 `ExpressionEvaluator` 求值表达式，
//! 变量与绑定参数由 `ExpressionContext` 提供

pub mod context;
pub mod evaluator;
pub mod functions;

pub use context::{DefaultExpressionContext, ExpressionContext};
pub use evaluator::ExpressionEvaluator;
pub use functions::call_function;
