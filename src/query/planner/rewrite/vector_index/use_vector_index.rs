//! 使用向量索引的改写规则
//!
//! 识别如下形状的计划：
//!
//! ```text
//! EnumerateCollection(doc) -> Calculation(dist = APPROX_NEAR_L2(doc.vec, @qp)) -> Sort(dist) -> Limit
//! ```
//!
//! 并改写为：
//!
//! ```text
//! Calculation(qp) -> EnumerateNearVector(qp -> docId, dist) -> Materialize(docId -> doc)
//! ```
//!
//! 扫描与排序之间的其他计算节点保留在物化节点之后。
//! 任何前置条件不满足时放弃该候选，计划保持不变

use log::{debug, info};

use crate::core::{Expression, VarSet, VariableRef};
use crate::index::{IndexHandle, SearchParameters, VectorMetric};
use crate::query::planner::plan::core::nodes::{
    CalculationNode, CollectionBinding, EnumerateNearVectorNode, MaterializeNode,
    NearVectorVariables, NodeId, NodeKind,
};
use crate::query::planner::plan::ExecutionPlan;
use crate::query::planner::rewrite::context::RewriteContext;
use crate::query::planner::rewrite::expression_utils::{
    attribute_path_on, constant_object, match_function_call, references_any,
};
use crate::query::planner::rewrite::pattern::Pattern;
use crate::query::planner::rewrite::result::RewriteResult;
use crate::query::planner::rewrite::rule::RewriteRule;
use crate::storage::CollectionRef;

/// 规则识别的函数名，封闭集合
const NEAR_FUNCTIONS: [&str; 2] = ["APPROX_NEAR_L2", "APPROX_NEAR_COSINE"];

/// 使用向量索引的改写规则
#[derive(Debug, Default, Clone, Copy)]
pub struct UseVectorIndexRule;

impl UseVectorIndexRule {
    pub fn new() -> Self {
        Self
    }
}

/// 通过全部检查的候选
#[derive(Debug)]
struct Candidate {
    scan: NodeId,
    distance_calculation: NodeId,
    sort: NodeId,
    limit: NodeId,
    collection: CollectionRef,
    index: IndexHandle,
    document_variable: VariableRef,
    distance_variable: VariableRef,
    query_point: Expression,
    search_parameters: SearchParameters,
    offset: u64,
    limit_value: u64,
}

enum Analysis {
    Rewrite(Box<Candidate>),
    Abandon(String),
}

macro_rules! abandon {
    ($($arg:tt)*) => {
        return Ok(Analysis::Abandon(format!($($arg)*)))
    };
}

impl UseVectorIndexRule {
    fn analyze(&self, plan: &ExecutionPlan, scan_id: NodeId) -> RewriteResult<Analysis> {
        let Some(scan) = plan.get_node(scan_id)?.as_enumerate_collection() else {
            abandon!("节点不是全表扫描");
        };
        let collection = scan.binding().collection().clone();
        if !collection.has_vector_index() {
            abandon!("集合 {} 上没有向量索引", collection.name());
        }
        let document_variable = scan.out_variable().clone();

        // 沿唯一的消费者链向上，跳过计算节点，直到 SortNode
        let mut calculations = Vec::new();
        let mut current = scan_id;
        let sort_id = loop {
            let parent = match plan.parents(current) {
                [parent] => *parent,
                [] => abandon!("节点 {} 没有消费者", current),
                parents => abandon!("节点 {} 有 {} 个消费者", current, parents.len()),
            };
            match plan.get_node(parent)?.kind() {
                NodeKind::Calculation => {
                    calculations.push(parent);
                    current = parent;
                }
                NodeKind::Sort => break parent,
                other => abandon!("扫描之后的节点 {} 是 {}，不是 SortNode", parent, other.type_string()),
            }
        };

        let Some(sort) = plan.get_node(sort_id)?.as_sort() else {
            abandon!("节点 {} 不是 SortNode", sort_id);
        };
        let [sort_item] = sort.sort_items() else {
            abandon!("SortNode {} 有 {} 个排序项", sort_id, sort.sort_items().len());
        };
        let distance_variable = sort_item.variable.clone();

        let distance_calculation = calculations.iter().copied().find(|&id| {
            plan.node(id)
                .and_then(|node| node.as_calculation())
                .map(|calc| calc.out_variable().id == distance_variable.id)
                .unwrap_or(false)
        });
        let Some(distance_calculation) = distance_calculation else {
            abandon!("排序变量 {} 不是在扫描与排序之间计算的", distance_variable.name);
        };
        let Some(calc) = plan.get_node(distance_calculation)?.as_calculation() else {
            abandon!("节点 {} 不是 CalculationNode", distance_calculation);
        };
        let Some((function, args)) = match_function_call(calc.expression(), &NEAR_FUNCTIONS) else {
            abandon!("排序变量 {} 不是近似近邻函数的结果", distance_variable.name);
        };
        let Some(metric) = VectorMetric::from_function_name(function) else {
            abandon!("未知的近邻函数 {}", function);
        };
        if !(2..=3).contains(&args.len()) {
            abandon!("{} 的参数数量 {} 无效", function, args.len());
        }
        if sort_item.is_ascending() != metric.ascending() {
            abandon!(
                "排序方向 {:?} 与度量 {:?} 的自然顺序不一致",
                sort_item.direction,
                metric
            );
        }

        let limit_id = match plan.parents(sort_id) {
            [parent] => *parent,
            _ => abandon!("SortNode {} 之后没有唯一的 LimitNode", sort_id),
        };
        let Some(limit) = plan.get_node(limit_id)?.as_limit() else {
            abandon!("SortNode {} 之后不是 LimitNode", sort_id);
        };
        if limit.limit() == 0 {
            abandon!("LimitNode {} 的 limit 为 0", limit_id);
        }
        if limit.full_count() {
            abandon!("LimitNode {} 需要 fullCount", limit_id);
        }

        // 查询向量会被提到扫描之前，不能依赖循环内产生的变量
        let mut loop_variables = VarSet::new();
        loop_variables.insert(document_variable.id);
        for &id in &calculations {
            for var in plan.get_node(id)?.variables_set_here() {
                loop_variables.insert(var.id);
            }
        }

        let mut chosen = None;
        for index in collection.vector_indexes() {
            let Some(definition) = index.vector_definition() else {
                continue;
            };
            if definition.metric != metric {
                continue;
            }
            let [field] = index.fields.as_slice() else {
                debug!("UseVectorIndexRule: 索引 {} 不是单字段索引", index.id);
                continue;
            };
            let on_field = |arg: &Expression| {
                attribute_path_on(arg, document_variable.id).as_ref() == Some(field)
            };
            let query_point = match (on_field(&args[0]), on_field(&args[1])) {
                (true, false) => &args[1],
                (false, true) => &args[0],
                _ => {
                    debug!(
                        "UseVectorIndexRule: {} 的参数与索引 {} 的字段不匹配",
                        function, index.id
                    );
                    continue;
                }
            };
            if references_any(query_point, &loop_variables) {
                debug!("UseVectorIndexRule: 查询向量依赖循环内的变量");
                continue;
            }
            chosen = Some((index.clone(), query_point.clone()));
            break;
        }
        let Some((index, query_point)) = chosen else {
            abandon!("集合 {} 上没有与 {} 匹配的向量索引", collection.name(), function);
        };

        let search_parameters = match args.get(2).map(constant_object) {
            Some(Some(params)) => SearchParameters::from_json(&serde_json::Value::Object(params))?,
            Some(None) => {
                debug!("UseVectorIndexRule: 第三个参数不是对象字面量，使用默认搜索参数");
                SearchParameters::default()
            }
            None => SearchParameters::default(),
        };

        Ok(Analysis::Rewrite(Box::new(Candidate {
            scan: scan_id,
            distance_calculation,
            sort: sort_id,
            limit: limit_id,
            collection,
            index,
            document_variable,
            distance_variable,
            query_point,
            search_parameters,
            offset: limit.offset(),
            limit_value: limit.limit(),
        })))
    }

    /// 在计划副本上完成全部修改，成功后整体替换原计划
    fn rewrite(
        &self,
        ctx: &mut RewriteContext<'_>,
        plan: &mut ExecutionPlan,
        candidate: Candidate,
    ) -> RewriteResult<NodeId> {
        let mut staged = plan.clone();

        let query_variable = ctx.create_temporary_variable();
        let document_id_variable = ctx.create_temporary_variable();

        let near_id = ctx.next_node_id();
        let near = EnumerateNearVectorNode::new(
            near_id,
            NearVectorVariables {
                in_variable: query_variable.clone(),
                old_document_variable: candidate.document_variable.clone(),
                document_out_variable: document_id_variable.clone(),
                distance_out_variable: candidate.distance_variable,
            },
            candidate.limit_value,
            candidate.offset,
            candidate.search_parameters,
            CollectionBinding::with_index(candidate.collection.clone(), candidate.index)?,
        )?;
        staged.replace_node(candidate.scan, near)?;

        let query_calculation =
            CalculationNode::new(ctx.next_node_id(), query_variable, candidate.query_point);
        staged.insert_before(near_id, query_calculation)?;

        let materialize = MaterializeNode::new(
            ctx.next_node_id(),
            CollectionBinding::new(candidate.collection),
            document_id_variable,
            candidate.document_variable,
        );
        staged.insert_after(near_id, materialize)?;

        // 近邻扫描的输出已按距离排好序并应用了 offset/limit
        staged.unlink_node(candidate.sort)?;
        staged.unlink_node(candidate.distance_calculation)?;
        staged.unlink_node(candidate.limit)?;

        staged.mark_excluded_from_scatter_gather(near_id)?;
        staged.add_applied_rule(self.name());
        staged.validate()?;

        *plan = staged;
        Ok(near_id)
    }
}

impl RewriteRule for UseVectorIndexRule {
    fn name(&self) -> &'static str {
        "UseVectorIndexRule"
    }

    fn pattern(&self) -> Pattern {
        Pattern::with_kind(NodeKind::EnumerateCollection)
    }

    fn apply(
        &self,
        ctx: &mut RewriteContext<'_>,
        plan: &mut ExecutionPlan,
        node: NodeId,
    ) -> RewriteResult<bool> {
        match self.analyze(plan, node)? {
            Analysis::Abandon(reason) => {
                debug!("UseVectorIndexRule: 放弃节点 {}: {}", node, reason);
                Ok(false)
            }
            Analysis::Rewrite(candidate) => {
                let scan = candidate.scan;
                let index = candidate.index.id.clone();
                let near = self.rewrite(ctx, plan, *candidate)?;
                info!(
                    "UseVectorIndexRule: 全表扫描 {} 改写为使用索引 {} 的近邻扫描 {}",
                    scan, index, near
                );
                Ok(true)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use serde_json::json;

    use crate::core::error::PlanError;
    use crate::index::{Index, VectorIndexDefinition};
    use crate::query::planner::plan::core::nodes::{
        EnumerateCollectionNode, LimitNode, ReturnNode, SingletonNode, SortItem, SortNode,
    };
    use crate::query::planner::plan::PlanContext;
    use crate::query::planner::rewrite::result::RewriteError;
    use crate::storage::Collection;

    fn collection_with(metrics: &[VectorMetric]) -> CollectionRef {
        let mut collection = Collection::new("docs");
        for (i, metric) in metrics.iter().enumerate() {
            let definition = VectorIndexDefinition::new(3, *metric, 4).expect("definition");
            collection
                .add_index(Index::vector(format!("{}", i + 10), format!("vec_{}", i), "vec", definition))
                .expect("index");
        }
        Arc::new(collection)
    }

    struct Shape {
        function: &'static str,
        ascending: bool,
        limit: Option<(u64, u64)>,
        swap_args: bool,
        params: Option<Expression>,
    }

    impl Default for Shape {
        fn default() -> Self {
            Self {
                function: "APPROX_NEAR_L2",
                ascending: true,
                limit: Some((0, 10)),
                swap_args: false,
                params: None,
            }
        }
    }

    struct Built {
        ctx: PlanContext,
        plan: ExecutionPlan,
        scan: NodeId,
        doc: VariableRef,
        dist: VariableRef,
    }

    fn build(collection: CollectionRef, shape: Shape) -> Built {
        let mut ctx = PlanContext::new();
        let doc = ctx.create_document_variable("doc");
        let dist = ctx.create_variable("dist");
        let mut plan = ExecutionPlan::new();

        let singleton = plan
            .register_node(SingletonNode::new(ctx.next_node_id()))
            .expect("register");
        let scan = plan
            .register_node(EnumerateCollectionNode::new(
                ctx.next_node_id(),
                CollectionBinding::new(collection),
                doc.clone(),
            ))
            .expect("register");
        let field = Expression::attribute_path(&doc, &["vec"]);
        let query = Expression::parameter("qp");
        let mut args = if shape.swap_args {
            vec![query, field]
        } else {
            vec![field, query]
        };
        if let Some(params) = shape.params {
            args.push(params);
        }
        let calc = plan
            .register_node(CalculationNode::new(
                ctx.next_node_id(),
                dist.clone(),
                Expression::function(shape.function, args),
            ))
            .expect("register");
        let item = if shape.ascending {
            SortItem::asc(dist.clone())
        } else {
            SortItem::desc(dist.clone())
        };
        let sort = plan
            .register_node(SortNode::new(ctx.next_node_id(), vec![item]))
            .expect("register");
        plan.add_dependency(scan, singleton).expect("edge");
        plan.add_dependency(calc, scan).expect("edge");
        plan.add_dependency(sort, calc).expect("edge");

        let mut top = sort;
        if let Some((offset, limit)) = shape.limit {
            let limit = plan
                .register_node(LimitNode::new(ctx.next_node_id(), offset, limit))
                .expect("register");
            plan.add_dependency(limit, top).expect("edge");
            top = limit;
        }
        let ret = plan
            .register_node(ReturnNode::new(ctx.next_node_id(), doc.clone()))
            .expect("register");
        plan.add_dependency(ret, top).expect("edge");
        plan.set_root(ret).expect("root");
        plan.validate().expect("valid input plan");

        Built {
            ctx,
            plan,
            scan,
            doc,
            dist,
        }
    }

    fn run(built: &mut Built) -> RewriteResult<bool> {
        let mut ctx = RewriteContext::new(&mut built.ctx);
        UseVectorIndexRule::new().apply(&mut ctx, &mut built.plan, built.scan)
    }

    fn assert_unchanged(mut built: Built) {
        let before = built.plan.clone();
        assert_eq!(run(&mut built), Ok(false));
        assert_eq!(built.plan, before);
    }

    #[test]
    fn test_rewrite_l2() {
        let mut built = build(collection_with(&[VectorMetric::L2]), Shape::default());
        assert_eq!(run(&mut built), Ok(true));

        let plan = &built.plan;
        plan.validate().expect("valid rewritten plan");
        assert!(plan.find_nodes(NodeKind::Sort).is_empty());
        assert!(plan.find_nodes(NodeKind::Limit).is_empty());
        assert!(plan.find_nodes(NodeKind::EnumerateCollection).is_empty());

        let near_ids = plan.find_nodes(NodeKind::EnumerateNearVectors);
        assert_eq!(near_ids.len(), 1);
        let near = plan
            .node(near_ids[0])
            .and_then(|node| node.as_near_vector())
            .expect("near node");
        assert_eq!(near.limit(), 10);
        assert_eq!(near.offset(), 0);
        assert!(near.ascending());
        assert_eq!(near.old_document_variable(), &built.doc);
        assert_eq!(near.distance_out_variable(), &built.dist);
        assert_eq!(near.search_parameters(), &SearchParameters::default());
        assert!(plan.is_excluded_from_scatter_gather(near_ids[0]));
        assert_eq!(plan.applied_rules(), &["UseVectorIndexRule".to_string()]);

        // Singleton -> Calculation(qp) -> Near -> Materialize -> Return
        let order = plan.topological_order().expect("order");
        let kinds: Vec<NodeKind> = order
            .iter()
            .map(|&id| plan.get_node(id).expect("node").kind())
            .collect();
        assert_eq!(
            kinds,
            vec![
                NodeKind::Singleton,
                NodeKind::Calculation,
                NodeKind::EnumerateNearVectors,
                NodeKind::Materialize,
                NodeKind::Return,
            ]
        );
        let query_calc = plan.get_node(order[1]).expect("node").as_calculation().expect("calc");
        assert_eq!(query_calc.expression(), &Expression::parameter("qp"));
        assert_eq!(query_calc.out_variable(), near.in_variable());

        let materialize = plan.get_node(order[3]).expect("node");
        assert!(materialize.sets_variable(built.doc.id));
    }

    #[test]
    fn test_rewrite_cosine_descending() {
        let mut built = build(
            collection_with(&[VectorMetric::Cosine]),
            Shape {
                function: "APPROX_NEAR_COSINE",
                ascending: false,
                limit: Some((5, 3)),
                ..Shape::default()
            },
        );
        assert_eq!(run(&mut built), Ok(true));
        let near_ids = built.plan.find_nodes(NodeKind::EnumerateNearVectors);
        let near = built
            .plan
            .node(near_ids[0])
            .and_then(|node| node.as_near_vector())
            .expect("near node");
        assert!(!near.ascending());
        assert_eq!((near.offset(), near.limit()), (5, 3));
    }

    #[test]
    fn test_direction_mismatch_is_not_rewritten() {
        assert_unchanged(build(
            collection_with(&[VectorMetric::L2]),
            Shape {
                ascending: false,
                ..Shape::default()
            },
        ));
        assert_unchanged(build(
            collection_with(&[VectorMetric::Cosine]),
            Shape {
                function: "APPROX_NEAR_COSINE",
                ..Shape::default()
            },
        ));
    }

    #[test]
    fn test_limit_required() {
        assert_unchanged(build(
            collection_with(&[VectorMetric::L2]),
            Shape {
                limit: None,
                ..Shape::default()
            },
        ));
        assert_unchanged(build(
            collection_with(&[VectorMetric::L2]),
            Shape {
                limit: Some((0, 0)),
                ..Shape::default()
            },
        ));
    }

    #[test]
    fn test_full_count_limit_is_not_rewritten() {
        let mut built = build(collection_with(&[VectorMetric::L2]), Shape::default());
        let limit_id = built.plan.find_nodes(NodeKind::Limit)[0];
        if let Some(crate::query::planner::plan::PlanNodeEnum::Limit(limit)) =
            built.plan.node_mut(limit_id)
        {
            limit.set_full_count(true);
        }
        assert_unchanged(built);
    }

    #[test]
    fn test_collection_without_vector_index() {
        assert_unchanged(build(collection_with(&[]), Shape::default()));
    }

    #[test]
    fn test_function_selects_matching_metric() {
        // 只有 Cosine 索引时，APPROX_NEAR_L2 不能使用它
        assert_unchanged(build(collection_with(&[VectorMetric::Cosine]), Shape::default()));

        let mut built = build(
            collection_with(&[VectorMetric::Cosine, VectorMetric::L2]),
            Shape::default(),
        );
        assert_eq!(run(&mut built), Ok(true));
        let near_ids = built.plan.find_nodes(NodeKind::EnumerateNearVectors);
        let near = built
            .plan
            .node(near_ids[0])
            .and_then(|node| node.as_near_vector())
            .expect("near node");
        assert_eq!(near.index().map(|index| index.id.as_str()), Some("11"));
    }

    #[test]
    fn test_swapped_arguments() {
        let mut built = build(
            collection_with(&[VectorMetric::L2]),
            Shape {
                swap_args: true,
                ..Shape::default()
            },
        );
        assert_eq!(run(&mut built), Ok(true));
    }

    #[test]
    fn test_search_parameters() {
        let params = Expression::Map(vec![("nProbe".to_string(), Expression::literal(8))]);
        let mut built = build(
            collection_with(&[VectorMetric::L2]),
            Shape {
                params: Some(params),
                ..Shape::default()
            },
        );
        assert_eq!(run(&mut built), Ok(true));
        let near_ids = built.plan.find_nodes(NodeKind::EnumerateNearVectors);
        let near = built
            .plan
            .node(near_ids[0])
            .and_then(|node| node.as_near_vector())
            .expect("near node");
        assert_eq!(near.search_parameters(), &SearchParameters::with_n_probe(8));

        // 非对象参数使用默认值
        let mut built = build(
            collection_with(&[VectorMetric::L2]),
            Shape {
                params: Some(Expression::literal(json!(3))),
                ..Shape::default()
            },
        );
        assert_eq!(run(&mut built), Ok(true));

        // 格式错误的参数对象是错误，计划不变
        let bad = Expression::Map(vec![("nProbe".to_string(), Expression::literal("many"))]);
        let mut built = build(
            collection_with(&[VectorMetric::L2]),
            Shape {
                params: Some(bad),
                ..Shape::default()
            },
        );
        let before = built.plan.clone();
        assert!(matches!(
            run(&mut built),
            Err(RewriteError::Plan(PlanError::InvalidSearchParameters(_)))
        ));
        assert_eq!(built.plan, before);
    }

    /// 用给定参数的 APPROX_NEAR_L2 替换距离计算节点
    fn with_distance_arguments(mut built: Built, args: Vec<Expression>) -> Built {
        let calc_id = built.plan.find_nodes(NodeKind::Calculation)[0];
        let expr = Expression::function("APPROX_NEAR_L2", args);
        let calc = CalculationNode::new(calc_id + 100, built.dist.clone(), expr);
        built.plan.replace_node(calc_id, calc).expect("replace");
        built
    }

    #[test]
    fn test_literal_object_search_parameters() {
        let mut built = build(
            collection_with(&[VectorMetric::L2]),
            Shape {
                params: Some(Expression::literal(json!({"nProbe": 8}))),
                ..Shape::default()
            },
        );
        assert_eq!(run(&mut built), Ok(true));
        let near_ids = built.plan.find_nodes(NodeKind::EnumerateNearVectors);
        let near = built
            .plan
            .node(near_ids[0])
            .and_then(|node| node.as_near_vector())
            .expect("near node");
        assert_eq!(near.search_parameters(), &SearchParameters::with_n_probe(8));

        let mut built = build(
            collection_with(&[VectorMetric::L2]),
            Shape {
                params: Some(Expression::literal(json!({"nProbe": "many"}))),
                ..Shape::default()
            },
        );
        let before = built.plan.clone();
        assert!(matches!(
            run(&mut built),
            Err(RewriteError::Plan(PlanError::InvalidSearchParameters(_)))
        ));
        assert_eq!(built.plan, before);
    }

    #[test]
    fn test_both_arguments_on_indexed_field_is_not_rewritten() {
        let built = build(collection_with(&[VectorMetric::L2]), Shape::default());
        let doc = built.doc.clone();
        assert_unchanged(with_distance_arguments(
            built,
            vec![
                Expression::attribute_path(&doc, &["vec"]),
                Expression::attribute_path(&doc, &["vec"]),
            ],
        ));
    }

    #[test]
    fn test_no_argument_on_indexed_field_is_not_rewritten() {
        let built = build(collection_with(&[VectorMetric::L2]), Shape::default());
        let doc = built.doc.clone();
        assert_unchanged(with_distance_arguments(
            built,
            vec![
                Expression::attribute_path(&doc, &["other"]),
                Expression::parameter("qp"),
            ],
        ));
    }

    #[test]
    fn test_query_point_referencing_document_is_not_rewritten() {
        let built = build(collection_with(&[VectorMetric::L2]), Shape::default());
        let doc = built.doc.clone();
        assert_unchanged(with_distance_arguments(
            built,
            vec![
                Expression::attribute_path(&doc, &["vec"]),
                Expression::attribute_path(&doc, &["other"]),
            ],
        ));
    }

    #[test]
    fn test_rule_is_idempotent() {
        let mut built = build(collection_with(&[VectorMetric::L2]), Shape::default());
        assert_eq!(run(&mut built), Ok(true));
        let after = built.plan.clone();
        // 改写后不再有全表扫描候选
        let rule = UseVectorIndexRule::new();
        for id in after.node_ids() {
            assert!(!rule.matches(&after, id));
        }
    }
}
