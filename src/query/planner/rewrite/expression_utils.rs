//! 表达式工具函数
//!
//! 重写规则使用的表达式匹配器。每个匹配器只检查一种形状，
//! 匹配成功返回 `Some`，否则返回 `None`，便于单独测试每个前置条件

use serde_json::{Map, Value};

use crate::core::{Expression, VarSet, VariableId};

/// 匹配变量上的属性访问，返回属性路径
///
/// `doc.a.b` 在 `var_id` 为 `doc` 时返回 `["a", "b"]`；
/// 直接引用变量本身（空路径）或访问其他变量时返回 `None`
pub fn attribute_path_on(expr: &Expression, var_id: VariableId) -> Option<Vec<String>> {
    let mut path = Vec::new();
    let mut current = expr;
    loop {
        match current {
            Expression::Property { object, property } => {
                path.push(property.clone());
                current = object;
            }
            Expression::Variable(var) if var.id == var_id && !path.is_empty() => {
                path.reverse();
                return Some(path);
            }
            _ => return None,
        }
    }
}

/// 匹配名称属于 `names` 的函数调用，返回函数名和参数
pub fn match_function_call<'e>(
    expr: &'e Expression,
    names: &[&str],
) -> Option<(&'e str, &'e [Expression])> {
    expr.as_function_call()
        .filter(|(name, _)| names.contains(name))
}

/// 把只由字面量构成的表达式（包括数组和对象字面量）转换为值
pub fn constant_value(expr: &Expression) -> Option<Value> {
    match expr {
        Expression::Literal(value) => Some(value.clone()),
        Expression::List(items) => items
            .iter()
            .map(constant_value)
            .collect::<Option<Vec<_>>>()
            .map(Value::Array),
        Expression::Map(entries) => {
            let mut obj = Map::new();
            for (key, value) in entries {
                obj.insert(key.clone(), constant_value(value)?);
            }
            Some(Value::Object(obj))
        }
        _ => None,
    }
}

/// 匹配对象字面量，返回其 JSON 形式
///
/// 常量对象既可以是对象构造表达式，也可以是值为对象的字面量
pub fn constant_object(expr: &Expression) -> Option<Map<String, Value>> {
    match constant_value(expr)? {
        Value::Object(obj) => Some(obj),
        _ => None,
    }
}

/// 检查表达式是否引用了集合中的任一变量
pub fn references_any(expr: &Expression, vars: &VarSet) -> bool {
    expr.variables().iter().any(|id| vars.contains(id))
}
