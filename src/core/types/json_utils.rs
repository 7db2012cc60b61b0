//! 序列化计划的字段读取工具
//!
//! 计划节点以扁平 JSON 对象序列化，这里统一处理缺失字段与类型错误，
//! 全部转换为 `PlanError`

use serde_json::{Map, Value};

use crate::core::error::{PlanError, PlanResult};

pub type JsonObject = Map<String, Value>;

pub fn as_object<'a>(value: &'a Value, what: &str) -> PlanResult<&'a JsonObject> {
    value
        .as_object()
        .ok_or_else(|| PlanError::invalid_field(what, "应为对象"))
}

pub fn field<'a>(obj: &'a JsonObject, name: &str) -> PlanResult<&'a Value> {
    obj.get(name).ok_or_else(|| PlanError::missing_field(name))
}

pub fn get_u64(obj: &JsonObject, name: &str) -> PlanResult<u64> {
    field(obj, name)?
        .as_u64()
        .ok_or_else(|| PlanError::invalid_field(name, "应为非负整数"))
}

pub fn get_bool(obj: &JsonObject, name: &str) -> PlanResult<bool> {
    field(obj, name)?
        .as_bool()
        .ok_or_else(|| PlanError::invalid_field(name, "应为布尔值"))
}

pub fn get_str<'a>(obj: &'a JsonObject, name: &str) -> PlanResult<&'a str> {
    field(obj, name)?
        .as_str()
        .ok_or_else(|| PlanError::invalid_field(name, "应为字符串"))
}

pub fn get_object<'a>(obj: &'a JsonObject, name: &str) -> PlanResult<&'a JsonObject> {
    field(obj, name)?
        .as_object()
        .ok_or_else(|| PlanError::invalid_field(name, "应为对象"))
}

pub fn get_array<'a>(obj: &'a JsonObject, name: &str) -> PlanResult<&'a Vec<Value>> {
    field(obj, name)?
        .as_array()
        .ok_or_else(|| PlanError::invalid_field(name, "应为数组"))
}

/// 可选字段：缺失或为 null 时返回 `None`
pub fn get_optional<'a>(obj: &'a JsonObject, name: &str) -> Option<&'a Value> {
    obj.get(name).filter(|v| !v.is_null())
}
