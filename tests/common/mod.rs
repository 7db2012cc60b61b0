//! 集成测试共享工具模块
//!
//! 提供带向量索引的集合、各测试场景的计划构造器与断言辅助函数

#![allow(dead_code)]

use std::sync::Arc;

use docdb::core::{Expression, VariableRef};
use docdb::index::{Index, VectorIndexDefinition, VectorMetric};
use docdb::query::planner::plan::{
    CalculationNode, CollectionBinding, EnumerateCollectionNode, LimitNode, NodeId, NodeKind,
    PlanNodeEnum, ReturnNode, SingletonNode, SortItem, SortNode,
};
use docdb::query::{ExecutionPlan, PlanContext};
use docdb::storage::{Collection, CollectionRef, InMemoryCatalog};
use serde_json::{json, Value};

/// 向量索引的字段
pub const VECTOR_FIELD: &str = "vec";

/// 创建带向量索引的集合，`metrics` 中每个度量对应一个索引（id 从 "100" 开始）
pub fn vector_collection(
    name: &str,
    dimension: usize,
    metrics: &[VectorMetric],
    documents: &[(&str, Vec<f64>)],
) -> Collection {
    let mut collection = Collection::new(name);
    for (key, vector) in documents {
        collection
            .insert(json!({"_key": key, "vec": vector}))
            .expect("插入文档失败");
    }
    for (i, metric) in metrics.iter().enumerate() {
        let definition = VectorIndexDefinition::new(dimension, *metric, 100).expect("索引定义无效");
        collection
            .add_index(Index::vector(
                format!("{}", 100 + i),
                format!("vec_{}", i),
                VECTOR_FIELD,
                definition,
            ))
            .expect("添加索引失败");
    }
    collection
}

/// 三维小集合，各文档到原点的 L2 距离互不相同
pub fn sample_documents() -> Vec<(&'static str, Vec<f64>)> {
    vec![
        ("a", vec![1.0, 0.0, 0.0]),
        ("b", vec![0.0, 2.0, 0.0]),
        ("c", vec![0.0, 0.0, 3.0]),
        ("d", vec![4.0, 4.0, 0.0]),
        ("e", vec![0.5, 0.5, 0.1]),
        ("f", vec![-2.0, 1.0, 1.0]),
    ]
}

/// 注册集合到目录中，返回目录与集合引用
pub fn catalog_with(collection: Collection) -> (InMemoryCatalog, CollectionRef) {
    let mut catalog = InMemoryCatalog::new();
    let collection = catalog.add_collection(collection);
    (catalog, collection)
}

/// 近邻查询的形状
///
/// FOR doc IN coll LET dist = FUNC(doc.vec, @qp[, params]) SORT dist DIR LIMIT offset, limit RETURN doc
#[derive(Debug, Clone)]
pub struct QueryShape {
    pub function: &'static str,
    pub ascending: bool,
    /// `None` 表示计划中没有 LimitNode
    pub limit: Option<(u64, u64)>,
    pub full_count: bool,
    pub swap_args: bool,
    pub params: Option<Expression>,
}

impl Default for QueryShape {
    fn default() -> Self {
        Self {
            function: "APPROX_NEAR_L2",
            ascending: true,
            limit: Some((0, 10)),
            full_count: false,
            swap_args: false,
            params: None,
        }
    }
}

impl QueryShape {
    pub fn cosine() -> Self {
        Self {
            function: "APPROX_NEAR_COSINE",
            ascending: false,
            ..Self::default()
        }
    }

    pub fn with_limit(mut self, offset: u64, limit: u64) -> Self {
        self.limit = Some((offset, limit));
        self
    }

    pub fn without_limit(mut self) -> Self {
        self.limit = None;
        self
    }
}

/// 构造好的场景计划
pub struct Scenario {
    pub ctx: PlanContext,
    pub plan: ExecutionPlan,
    pub scan: NodeId,
    pub doc: VariableRef,
    pub dist: VariableRef,
}

impl Scenario {
    /// 计划中某类节点的数量
    pub fn count(&self, kind: NodeKind) -> usize {
        self.plan.find_nodes(kind).len()
    }

    /// 计划中唯一的近邻扫描节点
    pub fn near_node(&self) -> Option<&docdb::query::planner::plan::EnumerateNearVectorNode> {
        match self.plan.find_nodes(NodeKind::EnumerateNearVectors).as_slice() {
            [id] => self.plan.node(*id).and_then(PlanNodeEnum::as_near_vector),
            _ => None,
        }
    }
}

/// 按形状构造场景计划
pub fn build_scenario(collection: CollectionRef, shape: QueryShape) -> Scenario {
    let mut ctx = PlanContext::new();
    let doc = ctx.create_document_variable("doc");
    let dist = ctx.create_variable("dist");

    let field = Expression::attribute_path(&doc, &[VECTOR_FIELD]);
    let query = Expression::parameter("qp");
    let mut args = if shape.swap_args {
        vec![query, field]
    } else {
        vec![field, query]
    };
    if let Some(params) = shape.params {
        args.push(params);
    }

    let sort_item = if shape.ascending {
        SortItem::asc(dist.clone())
    } else {
        SortItem::desc(dist.clone())
    };

    let mut nodes: Vec<PlanNodeEnum> = vec![
        SingletonNode::new(ctx.next_node_id()).into(),
        EnumerateCollectionNode::new(
            ctx.next_node_id(),
            CollectionBinding::new(collection),
            doc.clone(),
        )
        .into(),
        CalculationNode::new(
            ctx.next_node_id(),
            dist.clone(),
            Expression::function(shape.function, args),
        )
        .into(),
        SortNode::new(ctx.next_node_id(), vec![sort_item]).into(),
    ];
    if let Some((offset, limit)) = shape.limit {
        let mut limit_node = LimitNode::new(ctx.next_node_id(), offset, limit);
        limit_node.set_full_count(shape.full_count);
        nodes.push(limit_node.into());
    }
    nodes.push(ReturnNode::new(ctx.next_node_id(), doc.clone()).into());

    let mut plan = ExecutionPlan::new();
    let ids = chain(&mut plan, nodes);
    plan.validate().expect("场景计划无效");

    Scenario {
        ctx,
        plan,
        scan: ids[1],
        doc,
        dist,
    }
}

/// 按顺序注册节点并串成一条链，最后一个节点为根
pub fn chain(plan: &mut ExecutionPlan, nodes: Vec<PlanNodeEnum>) -> Vec<NodeId> {
    let ids: Vec<NodeId> = nodes
        .into_iter()
        .map(|node| plan.register_node(node).expect("注册节点失败"))
        .collect();
    for pair in ids.windows(2) {
        plan.add_dependency(pair[1], pair[0]).expect("添加依赖失败");
    }
    if let Some(root) = ids.last() {
        plan.set_root(*root).expect("设置根节点失败");
    }
    ids
}

/// 结果中各文档的 `_key`
pub fn keys(values: &[Value]) -> Vec<String> {
    values
        .iter()
        .filter_map(|value| value.get("_key").and_then(Value::as_str))
        .map(str::to_string)
        .collect()
}

/// 计划节点按拓扑顺序的类型列表
pub fn node_kinds(plan: &ExecutionPlan) -> Vec<NodeKind> {
    plan.topological_order()
        .expect("计划存在环")
        .into_iter()
        .filter_map(|id| plan.node(id).map(PlanNodeEnum::kind))
        .collect()
}

pub fn shared(collection: Collection) -> CollectionRef {
    Arc::new(collection)
}
