//! 表达式求值器实现

use std::cmp::Ordering;

use serde_json::{Map, Value};

use crate::core::error::{DBError, DBResult};
use crate::core::types::expression::Expression;
use crate::core::types::operators::BinaryOperator;
use crate::core::types::value::{compare_values, is_truthy, number};
use crate::expression::context::ExpressionContext;
use crate::expression::functions::call_function;

/// 表达式求值器（unit struct，零开销）
#[derive(Debug)]
pub struct ExpressionEvaluator;

impl ExpressionEvaluator {
    /// 在给定上下文中求值表达式
    pub fn evaluate<C: ExpressionContext + ?Sized>(
        expression: &Expression,
        context: &C,
    ) -> DBResult<Value> {
        match expression {
            Expression::Literal(value) => Ok(value.clone()),
            Expression::Variable(var) => context.variable(var.id).cloned().ok_or_else(|| {
                DBError::expression(format!("变量 {} (#{}) 未赋值", var.name, var.id))
            }),
            Expression::Parameter(name) => context
                .bind_parameter(name)
                .cloned()
                .ok_or_else(|| DBError::expression(format!("未绑定的参数: @{}", name))),
            Expression::Property { object, property } => {
                let value = Self::evaluate(object, context)?;
                Ok(value.get(property).cloned().unwrap_or(Value::Null))
            }
            Expression::Binary { left, op, right } => {
                Self::evaluate_binary(left, *op, right, context)
            }
            Expression::Function { name, args } => {
                let values = Self::evaluate_batch(args, context)?;
                call_function(name, &values)
            }
            Expression::List(items) => Ok(Value::Array(Self::evaluate_batch(items, context)?)),
            Expression::Map(entries) => {
                let mut obj = Map::with_capacity(entries.len());
                for (key, value) in entries {
                    obj.insert(key.clone(), Self::evaluate(value, context)?);
                }
                Ok(Value::Object(obj))
            }
        }
    }

    /// 批量求值表达式列表
    pub fn evaluate_batch<C: ExpressionContext + ?Sized>(
        expressions: &[Expression],
        context: &C,
    ) -> DBResult<Vec<Value>> {
        expressions
            .iter()
            .map(|expression| Self::evaluate(expression, context))
            .collect()
    }

    fn evaluate_binary<C: ExpressionContext + ?Sized>(
        left: &Expression,
        op: BinaryOperator,
        right: &Expression,
        context: &C,
    ) -> DBResult<Value> {
        let lhs = Self::evaluate(left, context)?;
        // AND / OR 短路，返回决定结果的操作数
        match op {
            BinaryOperator::And if !is_truthy(&lhs) => return Ok(lhs),
            BinaryOperator::Or if is_truthy(&lhs) => return Ok(lhs),
            BinaryOperator::And | BinaryOperator::Or => return Self::evaluate(right, context),
            _ => {}
        }
        let rhs = Self::evaluate(right, context)?;
        let ord = compare_values(&lhs, &rhs);
        let result = match op {
            BinaryOperator::Equal => Value::Bool(ord == Ordering::Equal),
            BinaryOperator::NotEqual => Value::Bool(ord != Ordering::Equal),
            BinaryOperator::LessThan => Value::Bool(ord == Ordering::Less),
            BinaryOperator::LessThanOrEqual => Value::Bool(ord != Ordering::Greater),
            BinaryOperator::GreaterThan => Value::Bool(ord == Ordering::Greater),
            BinaryOperator::GreaterThanOrEqual => Value::Bool(ord != Ordering::Less),
            BinaryOperator::Add
            | BinaryOperator::Subtract
            | BinaryOperator::Multiply
            | BinaryOperator::Divide => match (lhs.as_f64(), rhs.as_f64()) {
                (Some(a), Some(b)) => match op {
                    BinaryOperator::Add => number(a + b),
                    BinaryOperator::Subtract => number(a - b),
                    BinaryOperator::Multiply => number(a * b),
                    // 除以零得到 null
                    _ if b == 0.0 => Value::Null,
                    _ => number(a / b),
                },
                _ => Value::Null,
            },
            BinaryOperator::And | BinaryOperator::Or => Value::Null,
        };
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::variable::VariableRegistry;
    use crate::expression::context::DefaultExpressionContext;
    use serde_json::json;

    #[test]
    fn test_evaluate_distance_over_document() {
        let mut registry = VariableRegistry::new();
        let doc = registry.create_document_variable("doc");
        let expr = Expression::function(
            "APPROX_NEAR_L2",
            vec![
                Expression::attribute_path(&doc, &["emb", "v"]),
                Expression::parameter("qp"),
            ],
        );
        let context = DefaultExpressionContext::new()
            .with_variable(doc.id, json!({"emb": {"v": [1.0, 1.0]}}))
            .with_parameter("qp", json!([1.0, 4.0]));

        let value = ExpressionEvaluator::evaluate(&expr, &context).expect("evaluates");
        assert_eq!(value, json!(3.0));
    }

    #[test]
    fn test_missing_variable_and_parameter() {
        let mut registry = VariableRegistry::new();
        let doc = registry.create_variable("doc");
        let context = DefaultExpressionContext::new();

        assert!(ExpressionEvaluator::evaluate(&Expression::variable(&doc), &context).is_err());
        assert!(ExpressionEvaluator::evaluate(&Expression::parameter("x"), &context).is_err());
    }

    #[test]
    fn test_property_on_non_object_is_null() {
        let context = DefaultExpressionContext::new();
        let expr = Expression::property(Expression::literal(3), "a");
        assert_eq!(
            ExpressionEvaluator::evaluate(&expr, &context).expect("null"),
            Value::Null
        );
    }

    #[test]
    fn test_binary_operators() {
        let context = DefaultExpressionContext::new();
        let eval = |l: Value, op: BinaryOperator, r: Value| {
            ExpressionEvaluator::evaluate(
                &Expression::binary(Expression::Literal(l), op, Expression::Literal(r)),
                &context,
            )
            .expect("evaluates")
        };

        assert_eq!(eval(json!(1), BinaryOperator::LessThan, json!(2)), json!(true));
        assert_eq!(eval(json!("a"), BinaryOperator::GreaterThan, json!(2)), json!(true));
        assert_eq!(eval(json!(1), BinaryOperator::Equal, json!(1.0)), json!(true));
        assert_eq!(eval(json!(0), BinaryOperator::And, json!(5)), json!(0));
        assert_eq!(eval(json!(0), BinaryOperator::Or, json!(5)), json!(5));
        assert_eq!(eval(json!(6), BinaryOperator::Divide, json!(3)), json!(2.0));
        assert_eq!(eval(json!(6), BinaryOperator::Divide, json!(0)), Value::Null);
        assert_eq!(eval(json!("x"), BinaryOperator::Add, json!(1)), Value::Null);
    }

    #[test]
    fn test_object_and_array_literals() {
        let context = DefaultExpressionContext::new().with_parameter("p", json!(2));
        let expr = Expression::Map(vec![(
            "list".to_string(),
            Expression::List(vec![Expression::literal(1), Expression::parameter("p")]),
        )]);
        assert_eq!(
            ExpressionEvaluator::evaluate(&expr, &context).expect("evaluates"),
            json!({"list": [1, 2]})
        );
    }
}
