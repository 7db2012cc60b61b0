//! 索引类型定义模块
//!
//! 集合上的索引：主键、持久化（普通属性）索引与向量索引

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::core::error::{PlanError, PlanResult};
use crate::core::types::json_utils::{as_object, get_array, get_optional, get_str};
use crate::index::vector::VectorIndexDefinition;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IndexType {
    #[serde(rename = "primary")]
    Primary,
    #[serde(rename = "persistent")]
    Persistent,
    #[serde(rename = "vector")]
    Vector,
}

impl IndexType {
    pub fn as_str(&self) -> &'static str {
        match self {
            IndexType::Primary => "primary",
            IndexType::Persistent => "persistent",
            IndexType::Vector => "vector",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "primary" => Some(IndexType::Primary),
            "persistent" => Some(IndexType::Persistent),
            "vector" => Some(IndexType::Vector),
            _ => None,
        }
    }
}

/// 属性路径，如 `["embedding", "v"]` 对应 `doc.embedding.v`
pub type AttributePath = Vec<String>;

pub fn parse_attribute_path(s: &str) -> AttributePath {
    s.split('.').map(str::to_string).collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct Index {
    pub id: String,
    pub name: String,
    pub index_type: IndexType,
    pub fields: Vec<AttributePath>,
    pub vector: Option<VectorIndexDefinition>,
}

pub type IndexHandle = Arc<Index>;

impl Index {
    pub fn primary() -> Self {
        Self {
            id: "0".to_string(),
            name: "primary".to_string(),
            index_type: IndexType::Primary,
            fields: vec![vec!["_key".to_string()]],
            vector: None,
        }
    }

    pub fn persistent(id: impl Into<String>, name: impl Into<String>, fields: &[&str]) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            index_type: IndexType::Persistent,
            fields: fields.iter().map(|f| parse_attribute_path(f)).collect(),
            vector: None,
        }
    }

    /// 创建单字段向量索引
    pub fn vector(
        id: impl Into<String>,
        name: impl Into<String>,
        field: &str,
        definition: VectorIndexDefinition,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            index_type: IndexType::Vector,
            fields: vec![parse_attribute_path(field)],
            vector: Some(definition),
        }
    }

    pub fn is_vector(&self) -> bool {
        self.index_type == IndexType::Vector && self.vector.is_some()
    }

    pub fn vector_definition(&self) -> Option<&VectorIndexDefinition> {
        self.vector.as_ref()
    }

    pub fn to_json(&self) -> serde_json::Value {
        let fields: Vec<String> = self.fields.iter().map(|f| f.join(".")).collect();
        let mut value = json!({
            "id": self.id,
            "name": self.name,
            "type": self.index_type.as_str(),
            "fields": fields,
        });
        if let (Some(definition), Some(obj)) = (&self.vector, value.as_object_mut()) {
            obj.insert("params".to_string(), definition.to_json());
        }
        value
    }

    pub fn from_json(value: &serde_json::Value) -> PlanResult<Self> {
        let obj = as_object(value, "index")?;
        let type_str = get_str(obj, "type")?;
        let index_type = IndexType::parse(type_str).ok_or_else(|| {
            PlanError::invalid_field("type", format!("未知的索引类型 {}", type_str))
        })?;
        let fields = get_array(obj, "fields")?
            .iter()
            .map(|f| {
                f.as_str()
                    .map(parse_attribute_path)
                    .ok_or_else(|| PlanError::invalid_field("fields", "应为字符串数组"))
            })
            .collect::<PlanResult<Vec<_>>>()?;
        let vector = match get_optional(obj, "params") {
            Some(params) => Some(VectorIndexDefinition::from_json(params)?),
            None => None,
        };
        if index_type == IndexType::Vector && vector.is_none() {
            return Err(PlanError::missing_field("params"));
        }
        Ok(Self {
            id: get_str(obj, "id")?.to_string(),
            name: get_str(obj, "name")?.to_string(),
            index_type,
            fields,
            vector,
        })
    }
}
