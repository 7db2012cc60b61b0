//! 文档集合与目录
//!
//! 集合以 `_key` 为主键保存 JSON 文档，并持有其上的索引。
//! 执行计划通过 `Catalog` 按名称解析集合

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use crate::core::error::{DBError, DBResult};
use crate::index::{Index, IndexHandle};

#[derive(Debug)]
pub struct Collection {
    name: String,
    documents: Vec<Value>,
    key_positions: HashMap<String, usize>,
    indexes: Vec<IndexHandle>,
    next_key: u64,
}

pub type CollectionRef = Arc<Collection>;

impl Collection {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            documents: Vec::new(),
            key_positions: HashMap::new(),
            indexes: vec![Arc::new(Index::primary())],
            next_key: 1,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// 插入文档，缺少 `_key` 时自动分配，返回文档的 `_key`
    pub fn insert(&mut self, mut document: Value) -> DBResult<String> {
        let obj = document
            .as_object_mut()
            .ok_or_else(|| DBError::storage("文档必须是对象"))?;
        let key = match obj.get("_key") {
            Some(Value::String(key)) => key.clone(),
            Some(_) => return Err(DBError::storage("_key 必须是字符串")),
            None => {
                let key = self.next_key.to_string();
                self.next_key += 1;
                obj.insert("_key".to_string(), Value::String(key.clone()));
                key
            }
        };
        if self.key_positions.contains_key(&key) {
            return Err(DBError::storage(format!(
                "集合 {} 中已存在文档 {}",
                self.name, key
            )));
        }
        self.key_positions.insert(key.clone(), self.documents.len());
        self.documents.push(document);
        Ok(key)
    }

    /// 添加索引，id 重复时报错
    pub fn add_index(&mut self, index: Index) -> DBResult<IndexHandle> {
        if self.index_by_id(&index.id).is_some() {
            return Err(DBError::storage(format!(
                "集合 {} 中已存在索引 {}",
                self.name, index.id
            )));
        }
        let handle = Arc::new(index);
        self.indexes.push(handle.clone());
        Ok(handle)
    }

    pub fn documents(&self) -> &[Value] {
        &self.documents
    }

    pub fn document(&self, key: &str) -> Option<&Value> {
        self.key_positions
            .get(key)
            .and_then(|&pos| self.documents.get(pos))
    }

    pub fn count(&self) -> u64 {
        self.documents.len() as u64
    }

    pub fn indexes(&self) -> &[IndexHandle] {
        &self.indexes
    }

    pub fn index_by_id(&self, id: &str) -> Option<&IndexHandle> {
        self.indexes.iter().find(|index| index.id == id)
    }

    pub fn vector_indexes(&self) -> impl Iterator<Item = &IndexHandle> {
        self.indexes.iter().filter(|index| index.is_vector())
    }

    pub fn has_vector_index(&self) -> bool {
        self.vector_indexes().next().is_some()
    }

    /// 检查索引句柄是否属于本集合
    pub fn owns_index(&self, index: &IndexHandle) -> bool {
        self.index_by_id(&index.id)
            .map(|own| Arc::ptr_eq(own, index) || **own == **index)
            .unwrap_or(false)
    }
}

/// 集合目录
pub trait Catalog: Send + Sync {
    fn collection(&self, name: &str) -> Option<CollectionRef>;
}

#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    collections: HashMap<String, CollectionRef>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_collection(&mut self, collection: Collection) -> CollectionRef {
        let collection = Arc::new(collection);
        self.collections
            .insert(collection.name().to_string(), collection.clone());
        collection
    }
}

impl Catalog for InMemoryCatalog {
    fn collection(&self, name: &str) -> Option<CollectionRef> {
        self.collections.get(name).cloned()
    }
}
