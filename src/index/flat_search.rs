//! 向量搜索接口
//!
//! 近邻扫描执行块通过 `VectorSearcher` 访问向量索引。
//! `FlatVectorSearcher` 对集合做精确的暴力搜索，作为近似算法的参照实现

use std::cmp::Ordering;

use log::trace;
use serde_json::Value;

use crate::core::types::value::as_vector;
use crate::index::error::{IndexError, IndexResult};
use crate::index::types::{AttributePath, Index};
use crate::storage::Collection;

/// 一条搜索结果：文档主键与距离（或相似度）
#[derive(Debug, Clone, PartialEq)]
pub struct VectorMatch {
    pub key: String,
    pub score: f64,
}

pub trait VectorSearcher: Send + Sync + std::fmt::Debug {
    /// 返回最多 `top_k` 条结果，按索引度量的自然顺序排列
    fn search(
        &self,
        collection: &Collection,
        index: &Index,
        query: &[f64],
        top_k: usize,
        n_probe: u64,
    ) -> IndexResult<Vec<VectorMatch>>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct FlatVectorSearcher;

fn extract_path<'a>(document: &'a Value, path: &AttributePath) -> Option<&'a Value> {
    path.iter()
        .try_fold(document, |current, attribute| current.get(attribute))
}

impl VectorSearcher for FlatVectorSearcher {
    fn search(
        &self,
        collection: &Collection,
        index: &Index,
        query: &[f64],
        top_k: usize,
        n_probe: u64,
    ) -> IndexResult<Vec<VectorMatch>> {
        let definition = index
            .vector_definition()
            .ok_or_else(|| IndexError::Unsupported(format!("索引 {} 不是向量索引", index.id)))?;
        if query.len() != definition.dimension {
            return Err(IndexError::DimensionMismatch {
                expected: definition.dimension,
                actual: query.len(),
            });
        }
        let field = match index.fields.as_slice() {
            [field] => field,
            _ => {
                return Err(IndexError::InvalidDefinition(
                    "向量索引必须恰好包含一个字段".to_string(),
                ))
            }
        };
        trace!(
            "flat vector search on {}/{}: top_k={}, n_probe={}",
            collection.name(),
            index.name,
            top_k,
            n_probe
        );

        let metric = definition.metric;
        let mut matches: Vec<VectorMatch> = collection
            .documents()
            .iter()
            .filter_map(|document| {
                let key = document.get("_key")?.as_str()?;
                let vector = as_vector(extract_path(document, field)?)?;
                // 维度不符或零向量的文档不在索引中
                let score = metric.score(&vector, query)?;
                Some(VectorMatch {
                    key: key.to_string(),
                    score,
                })
            })
            .collect();

        matches.sort_by(|a, b| {
            let ord = if metric.ascending() {
                a.score.total_cmp(&b.score)
            } else {
                b.score.total_cmp(&a.score)
            };
            if ord == Ordering::Equal {
                a.key.cmp(&b.key)
            } else {
                ord
            }
        });
        matches.truncate(top_k);
        Ok(matches)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::{VectorIndexDefinition, VectorMetric};
    use serde_json::json;

    fn collection() -> Collection {
        let mut collection = Collection::new("docs");
        for (key, v) in [("a", [1.0, 0.0]), ("b", [0.0, 2.0]), ("c", [3.0, 3.0])] {
            collection
                .insert(json!({"_key": key, "emb": {"v": v}}))
                .expect("insert");
        }
        collection
            .insert(json!({"_key": "bad", "emb": {"v": [1.0]}}))
            .expect("insert");
        collection
    }

    fn index(metric: VectorMetric) -> Index {
        let definition = VectorIndexDefinition::new(2, metric, 1).expect("valid");
        Index::vector("1", "vec", "emb.v", definition)
    }

    #[test]
    fn test_l2_search_is_ascending() {
        let results = FlatVectorSearcher
            .search(&collection(), &index(VectorMetric::L2), &[0.0, 0.0], 2, 1)
            .expect("search");
        let keys: Vec<&str> = results.iter().map(|m| m.key.as_str()).collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert_eq!(results[0].score, 1.0);
    }

    #[test]
    fn test_cosine_search_is_descending() {
        let results = FlatVectorSearcher
            .search(&collection(), &index(VectorMetric::Cosine), &[0.0, 1.0], 3, 1)
            .expect("search");
        let keys: Vec<&str> = results.iter().map(|m| m.key.as_str()).collect();
        assert_eq!(keys, vec!["b", "c", "a"]);
    }

    #[test]
    fn test_dimension_mismatch() {
        let err = FlatVectorSearcher.search(
            &collection(),
            &index(VectorMetric::L2),
            &[0.0, 0.0, 0.0],
            2,
            1,
        );
        assert_eq!(
            err,
            Err(IndexError::DimensionMismatch {
                expected: 2,
                actual: 3
            })
        );
    }
}
