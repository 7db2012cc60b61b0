//! 集合绑定
//!
//! 需要访问集合的节点（全表扫描、近邻扫描、文档物化）内嵌一个 `CollectionBinding`，
//! 记录目标集合以及可选的索引。索引若存在必须属于该集合

use std::fmt;

use serde_json::Value;

use crate::core::error::{PlanError, PlanResult};
use crate::core::types::json_utils::{as_object, get_optional, get_str, JsonObject};
use crate::index::IndexHandle;
use crate::storage::{Catalog, CollectionRef};

#[derive(Clone)]
pub struct CollectionBinding {
    collection: CollectionRef,
    index: Option<IndexHandle>,
}

impl CollectionBinding {
    pub fn new(collection: CollectionRef) -> Self {
        Self {
            collection,
            index: None,
        }
    }

    /// 绑定集合与索引，索引不属于集合时报错
    pub fn with_index(collection: CollectionRef, index: IndexHandle) -> PlanResult<Self> {
        if !collection.owns_index(&index) {
            return Err(PlanError::IndexCollectionMismatch {
                collection: collection.name().to_string(),
                index: index.id.clone(),
            });
        }
        Ok(Self {
            collection,
            index: Some(index),
        })
    }

    pub fn collection(&self) -> &CollectionRef {
        &self.collection
    }

    pub fn collection_name(&self) -> &str {
        self.collection.name()
    }

    pub fn index(&self) -> Option<&IndexHandle> {
        self.index.as_ref()
    }

    pub fn serialize_fields(&self, obj: &mut JsonObject) {
        obj.insert(
            "collection".to_string(),
            Value::String(self.collection.name().to_string()),
        );
        if let Some(index) = &self.index {
            obj.insert("index".to_string(), index.to_json());
        }
    }

    /// 从节点的序列化字段重建绑定
    ///
    /// 集合必须存在于目录中；索引按 id 在集合上查找，找不到说明序列化计划已过期
    pub fn from_json(obj: &JsonObject, catalog: &dyn Catalog) -> PlanResult<Self> {
        let name = get_str(obj, "collection")?;
        let collection = catalog
            .collection(name)
            .ok_or_else(|| PlanError::CollectionNotFound(name.to_string()))?;

        let index = match get_optional(obj, "index") {
            None => None,
            Some(value) => {
                let index_obj = as_object(value, "index")?;
                let id = get_str(index_obj, "id")?;
                let handle = collection.index_by_id(id).cloned().ok_or_else(|| {
                    PlanError::IndexNotFound {
                        collection: name.to_string(),
                        index: id.to_string(),
                    }
                })?;
                Some(handle)
            }
        };
        Ok(Self { collection, index })
    }
}

impl PartialEq for CollectionBinding {
    fn eq(&self, other: &Self) -> bool {
        self.collection.name() == other.collection.name() && self.index == other.index
    }
}

impl fmt::Debug for CollectionBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CollectionBinding")
            .field("collection", &self.collection.name())
            .field("index", &self.index.as_ref().map(|i| i.id.as_str()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::{Index, VectorIndexDefinition, VectorMetric};
    use crate::storage::{Collection, InMemoryCatalog};
    use serde_json::json;
    use std::sync::Arc;

    fn catalog() -> (InMemoryCatalog, CollectionRef, IndexHandle) {
        let mut collection = Collection::new("docs");
        let definition = VectorIndexDefinition::new(3, VectorMetric::L2, 4).expect("valid");
        let index = collection
            .add_index(Index::vector("11", "vec", "v", definition))
            .expect("add index");
        let mut catalog = InMemoryCatalog::new();
        let collection = catalog.add_collection(collection);
        (catalog, collection, index)
    }

    #[test]
    fn test_binding_round_trip() {
        let (catalog, collection, index) = catalog();
        let binding = CollectionBinding::with_index(collection, index).expect("owned index");

        let mut obj = JsonObject::new();
        binding.serialize_fields(&mut obj);
        assert_eq!(obj["collection"], json!("docs"));
        assert_eq!(obj["index"]["id"], json!("11"));

        let restored = CollectionBinding::from_json(&obj, &catalog).expect("round trip");
        assert_eq!(restored, binding);
    }

    #[test]
    fn test_foreign_index_is_rejected() {
        let (_, collection, _) = catalog();
        let definition = VectorIndexDefinition::new(3, VectorMetric::L2, 4).expect("valid");
        let foreign = Arc::new(Index::vector("99", "other", "v", definition));
        assert!(matches!(
            CollectionBinding::with_index(collection, foreign),
            Err(PlanError::IndexCollectionMismatch { .. })
        ));
    }

    #[test]
    fn test_stale_references() {
        let (catalog, _, _) = catalog();

        let obj = json!({"collection": "missing"});
        let err = CollectionBinding::from_json(obj.as_object().expect("object"), &catalog);
        assert_eq!(err, Err(PlanError::CollectionNotFound("missing".to_string())));

        let obj = json!({"collection": "docs", "index": {"id": "12"}});
        let err = CollectionBinding::from_json(obj.as_object().expect("object"), &catalog);
        assert_eq!(
            err,
            Err(PlanError::IndexNotFound {
                collection: "docs".to_string(),
                index: "12".to_string()
            })
        );
    }
}
