//! 计划执行集成测试
//!
//! 测试范围:
//! - 改写前后的计划返回相同的结果
//! - 查询统计（scannedFull / scannedIndex / fullCount）
//! - 查询向量错误与搜索参数的传递

mod common;

use std::sync::Arc;

use common::{build_scenario, keys, sample_documents, shared, vector_collection, QueryShape};
use docdb::config::OptimizerConfig;
use docdb::core::{DBError, Expression};
use docdb::index::{
    FlatVectorSearcher, Index, IndexError, IndexResult, VectorMatch, VectorMetric, VectorSearcher,
};
use docdb::query::planner::rewrite::rewrite_plan;
use docdb::query::{ExecutionEngine, QueryResult};
use docdb::query::executor::ExecutionContext;
use docdb::storage::{Collection, CollectionRef};
use parking_lot::Mutex;
use serde_json::{json, Value};

/// 到查询点 [1.0, 0.5, 0.2] 的 L2 距离升序
const L2_ORDER: [&str; 6] = ["e", "a", "b", "c", "f", "d"];
/// 与查询点的余弦相似度降序
const COSINE_ORDER: [&str; 6] = ["e", "d", "a", "b", "c", "f"];

fn query_point() -> Value {
    json!([1.0, 0.5, 0.2])
}

fn collection() -> CollectionRef {
    shared(vector_collection(
        "docs",
        3,
        &[VectorMetric::L2, VectorMetric::Cosine],
        &sample_documents(),
    ))
}

fn engine() -> ExecutionEngine {
    ExecutionEngine::new(ExecutionContext::new().with_bind_parameter("qp", query_point()))
}

fn shape_for(metric: VectorMetric) -> QueryShape {
    QueryShape {
        function: metric.function_name(),
        ascending: metric.ascending(),
        ..QueryShape::default()
    }
}

/// 分别执行原计划与改写后的计划
fn run_both(shape: QueryShape) -> (QueryResult, QueryResult) {
    let engine = engine();
    let mut scenario = build_scenario(collection(), shape);
    let original = engine.execute(&scenario.plan).expect("执行原计划失败");

    let changed = rewrite_plan(&mut scenario.plan, &mut scenario.ctx, &OptimizerConfig::default())
        .expect("改写失败");
    assert!(changed);
    let rewritten = engine.execute(&scenario.plan).expect("执行改写后的计划失败");
    (original, rewritten)
}

#[test]
fn test_rewritten_plan_returns_same_documents() {
    for (metric, order) in [(VectorMetric::L2, L2_ORDER), (VectorMetric::Cosine, COSINE_ORDER)] {
        for offset in 0..8u64 {
            for limit in 1..8u64 {
                let (original, rewritten) = run_both(shape_for(metric).with_limit(offset, limit));
                let expected: Vec<String> = order
                    .iter()
                    .skip(offset as usize)
                    .take(limit as usize)
                    .map(|key| key.to_string())
                    .collect();

                let context = format!("metric={} offset={} limit={}", metric, offset, limit);
                assert_eq!(keys(&original.values), expected, "{}", context);
                assert_eq!(keys(&rewritten.values), expected, "{}", context);
                assert_eq!(rewritten.values, original.values, "{}", context);
            }
        }
    }
}

#[test]
fn test_statistics_reflect_index_usage() {
    let (original, rewritten) = run_both(shape_for(VectorMetric::L2).with_limit(1, 2));

    assert_eq!(original.statistics.scanned_full, 6);
    assert_eq!(original.statistics.scanned_index, 0);

    assert_eq!(rewritten.statistics.scanned_full, 0);
    assert_eq!(rewritten.statistics.scanned_index, 3);
    assert_eq!(rewritten.statistics.full_count, None);
}

#[test]
fn test_full_count_plan_keeps_total() {
    let shape = QueryShape {
        full_count: true,
        ..shape_for(VectorMetric::L2).with_limit(0, 2)
    };
    let mut scenario = build_scenario(collection(), shape);
    let changed = rewrite_plan(&mut scenario.plan, &mut scenario.ctx, &OptimizerConfig::default())
        .expect("改写失败");
    assert!(!changed);

    let result = engine().execute(&scenario.plan).expect("执行失败");
    assert_eq!(keys(&result.values), vec!["e", "a"]);
    assert_eq!(result.statistics.full_count, Some(6));
    assert_eq!(result.to_json()["stats"]["fullCount"], json!(6));
}

#[test]
fn test_query_vector_errors() {
    let mut scenario = build_scenario(collection(), QueryShape::default());
    rewrite_plan(&mut scenario.plan, &mut scenario.ctx, &OptimizerConfig::default())
        .expect("改写失败");

    let wrong_dimension =
        ExecutionEngine::new(ExecutionContext::new().with_bind_parameter("qp", json!([1.0, 2.0])));
    assert!(matches!(
        wrong_dimension.execute(&scenario.plan),
        Err(DBError::Index(IndexError::DimensionMismatch {
            expected: 3,
            actual: 2
        }))
    ));

    let not_a_vector =
        ExecutionEngine::new(ExecutionContext::new().with_bind_parameter("qp", json!("near")));
    assert!(matches!(
        not_a_vector.execute(&scenario.plan),
        Err(DBError::Index(IndexError::InvalidQueryVector(_)))
    ));

    let unbound = ExecutionEngine::default();
    assert!(matches!(
        unbound.execute(&scenario.plan),
        Err(DBError::Expression(_))
    ));
}

/// 记录每次搜索参数的搜索器
#[derive(Debug, Default)]
struct RecordingSearcher {
    calls: Mutex<Vec<(usize, u64)>>,
}

impl VectorSearcher for RecordingSearcher {
    fn search(
        &self,
        collection: &Collection,
        index: &Index,
        query: &[f64],
        top_k: usize,
        n_probe: u64,
    ) -> IndexResult<Vec<VectorMatch>> {
        self.calls.lock().push((top_k, n_probe));
        FlatVectorSearcher.search(collection, index, query, top_k, n_probe)
    }
}

#[test]
fn test_search_parameters_reach_searcher() {
    for (params, expected_n_probe) in [
        (None, 1),
        (
            Some(Expression::Map(vec![("nProbe".to_string(), Expression::literal(8))])),
            8,
        ),
    ] {
        let shape = QueryShape {
            params,
            ..QueryShape::default().with_limit(2, 3)
        };
        let mut scenario = build_scenario(collection(), shape);
        rewrite_plan(&mut scenario.plan, &mut scenario.ctx, &OptimizerConfig::default())
            .expect("改写失败");

        let searcher = Arc::new(RecordingSearcher::default());
        let context = ExecutionContext::new()
            .with_bind_parameter("qp", query_point())
            .with_searcher(searcher.clone());
        let result = ExecutionEngine::new(context)
            .execute(&scenario.plan)
            .expect("执行失败");

        assert_eq!(keys(&result.values), vec!["b", "c", "f"]);
        assert_eq!(*searcher.calls.lock(), vec![(5, expected_n_probe)]);
    }
}
