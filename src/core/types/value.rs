//! 文档值与 AQL 比较语义
//!
//! 文档与行中的值直接使用 `serde_json::Value`。比较遵循 AQL 的类型顺序：
//! null < bool < number < string < array < object

use std::cmp::Ordering;

pub use serde_json::Value;

fn type_weight(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}

/// 按 AQL 语义比较两个值
pub fn compare_values(left: &Value, right: &Value) -> Ordering {
    let (lw, rw) = (type_weight(left), type_weight(right));
    if lw != rw {
        return lw.cmp(&rw);
    }
    match (left, right) {
        (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
        (Value::Number(a), Value::Number(b)) => {
            let a = a.as_f64().unwrap_or(0.0);
            let b = b.as_f64().unwrap_or(0.0);
            a.partial_cmp(&b).unwrap_or(Ordering::Equal)
        }
        (Value::String(a), Value::String(b)) => a.cmp(b),
        (Value::Array(a), Value::Array(b)) => {
            for (x, y) in a.iter().zip(b.iter()) {
                let ord = compare_values(x, y);
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            a.len().cmp(&b.len())
        }
        (Value::Object(a), Value::Object(b)) => {
            let mut keys: Vec<&String> = a.keys().chain(b.keys()).collect();
            keys.sort();
            keys.dedup();
            for key in keys {
                let x = a.get(key).unwrap_or(&Value::Null);
                let y = b.get(key).unwrap_or(&Value::Null);
                let ord = compare_values(x, y);
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            Ordering::Equal
        }
        _ => Ordering::Equal,
    }
}

/// AQL 真值判断
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// 数值转换，非数值返回 `None`
pub fn as_number(value: &Value) -> Option<f64> {
    value.as_f64()
}

/// 把 f64 转为 JSON 数值，NaN / 无穷大转为 null
pub fn number(value: f64) -> Value {
    serde_json::Number::from_f64(value)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}

/// 取出数值数组（向量），任一元素不是数值时返回 `None`
pub fn as_vector(value: &Value) -> Option<Vec<f64>> {
    value.as_array()?.iter().map(|v| v.as_f64()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_type_order() {
        let ordered = [
            json!(null),
            json!(false),
            json!(true),
            json!(-1),
            json!(2.5),
            json!(""),
            json!("a"),
            json!([]),
            json!([1]),
            json!({}),
        ];
        for pair in ordered.windows(2) {
            assert_eq!(compare_values(&pair[0], &pair[1]), Ordering::Less);
            assert_eq!(compare_values(&pair[1], &pair[0]), Ordering::Greater);
        }
        assert_eq!(compare_values(&json!(1), &json!(1.0)), Ordering::Equal);
    }

    #[test]
    fn test_truthiness() {
        assert!(!is_truthy(&json!(null)));
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!("")));
        assert!(is_truthy(&json!("x")));
        assert!(is_truthy(&json!([])));
        assert!(is_truthy(&json!({})));
    }

    #[test]
    fn test_as_vector() {
        assert_eq!(as_vector(&json!([1, 2.5])), Some(vec![1.0, 2.5]));
        assert_eq!(as_vector(&json!([1, "a"])), None);
        assert_eq!(as_vector(&json!(3)), None);
        assert_eq!(number(f64::NAN), Value::Null);
    }
}
