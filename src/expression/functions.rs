//! 内置函数
//!
//! 只实现执行计划用到的函数子集；未知函数名在求值时报错

use serde_json::Value;

use crate::core::error::{DBError, DBResult};
use crate::core::types::value::{as_vector, number};
use crate::index::VectorMetric;

/// 按名称调用内置函数，名称需为大写
pub fn call_function(name: &str, args: &[Value]) -> DBResult<Value> {
    if let Some(metric) = VectorMetric::from_function_name(name) {
        return approx_near(name, metric, args);
    }
    match name {
        "LENGTH" => length(args),
        _ => Err(DBError::expression(format!("未知的函数: {}", name))),
    }
}

/// `APPROX_NEAR_L2(a, b[, params])` / `APPROX_NEAR_COSINE(a, b[, params])`
///
/// 在没有向量索引时精确计算欧氏距离或余弦相似度，第三个参数只对索引生效
fn approx_near(name: &str, metric: VectorMetric, args: &[Value]) -> DBResult<Value> {
    if !(2..=3).contains(&args.len()) {
        return Err(DBError::expression(format!(
            "{} 需要 2 或 3 个参数，实际为 {}",
            name,
            args.len()
        )));
    }
    if let Some(params) = args.get(2) {
        if !params.is_object() {
            return Err(DBError::expression(format!("{} 的第三个参数必须是对象", name)));
        }
    }
    let (a, b) = match (as_vector(&args[0]), as_vector(&args[1])) {
        (Some(a), Some(b)) => (a, b),
        _ => {
            return Err(DBError::expression(format!(
                "{} 的参数必须是数值数组",
                name
            )))
        }
    };
    if a.len() != b.len() {
        return Err(DBError::expression(format!(
            "{} 的两个向量维度不同: {} 与 {}",
            name,
            a.len(),
            b.len()
        )));
    }
    Ok(metric.score(&a, &b).map(number).unwrap_or(Value::Null))
}

fn length(args: &[Value]) -> DBResult<Value> {
    let [arg] = args else {
        return Err(DBError::expression("LENGTH 需要 1 个参数"));
    };
    let len = match arg {
        Value::Null => 0,
        Value::Bool(b) => usize::from(*b),
        Value::String(s) => s.chars().count(),
        Value::Array(items) => items.len(),
        Value::Object(obj) => obj.len(),
        Value::Number(_) => arg.to_string().chars().count(),
    };
    Ok(Value::from(len))
}
