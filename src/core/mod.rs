pub mod error;
pub mod types;

// 错误和结果类型
pub use error::{DBError, DBResult, PlanError, PlanResult};

// 核心数据类型
pub use types::cost::CostEstimate;
pub use types::expression::Expression;
pub use types::operators::BinaryOperator;
pub use types::value::Value;
pub use types::variable::{
    VarSet, Variable, VariableId, VariableRef, VariableRegistry, VariableReplacements,
};
